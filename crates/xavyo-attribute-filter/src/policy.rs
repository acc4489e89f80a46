//! Filter policies and attribute rules

use crate::matcher::Matcher;
use crate::requirement::PolicyRequirementRule;

/// Permits or denies values of one attribute.
#[derive(Debug)]
pub struct AttributeRule {
    id: String,
    attribute_id: String,
    deny: bool,
    matcher: Box<dyn Matcher>,
}

impl AttributeRule {
    /// A rule releasing the values its matcher permits.
    pub fn permit(
        id: impl Into<String>,
        attribute_id: impl Into<String>,
        matcher: Box<dyn Matcher>,
    ) -> Self {
        Self {
            id: id.into(),
            attribute_id: attribute_id.into(),
            deny: false,
            matcher,
        }
    }

    /// A rule withholding the values its matcher permits, whatever other rules say.
    pub fn deny(
        id: impl Into<String>,
        attribute_id: impl Into<String>,
        matcher: Box<dyn Matcher>,
    ) -> Self {
        Self {
            id: id.into(),
            attribute_id: attribute_id.into(),
            deny: true,
            matcher,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn attribute_id(&self) -> &str {
        &self.attribute_id
    }

    pub fn is_deny_rule(&self) -> bool {
        self.deny
    }

    pub fn matcher(&self) -> &dyn Matcher {
        self.matcher.as_ref()
    }
}

/// A requirement rule plus the attribute rules it gates.
#[derive(Debug)]
pub struct FilterPolicy {
    id: String,
    requirement: Box<dyn PolicyRequirementRule>,
    rules: Vec<AttributeRule>,
}

impl FilterPolicy {
    pub fn new(id: impl Into<String>, requirement: Box<dyn PolicyRequirementRule>) -> Self {
        Self {
            id: id.into(),
            requirement,
            rules: Vec::new(),
        }
    }

    /// Add an attribute rule using builder pattern.
    pub fn with_rule(mut self, rule: AttributeRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn requirement(&self) -> &dyn PolicyRequirementRule {
        self.requirement.as_ref()
    }

    pub fn rules(&self) -> &[AttributeRule] {
        &self.rules
    }
}
