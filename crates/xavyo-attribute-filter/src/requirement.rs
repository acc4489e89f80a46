//! Policy requirement rules
//!
//! A policy's attribute rules apply only when its requirement rule
//! evaluates to `Permit`.

use xavyo_attribute::IdPAttribute;

use crate::context::FilterContext;
use crate::matcher::Matcher;
use crate::result::MatchResult;

/// Decides whether a policy is active for a request.
pub trait PolicyRequirementRule: Send + Sync + std::fmt::Debug {
    fn evaluate(&self, context: &FilterContext<'_>) -> MatchResult;
}

/// Always active.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyRequirement;

impl PolicyRequirementRule for AnyRequirement {
    fn evaluate(&self, _: &FilterContext<'_>) -> MatchResult {
        MatchResult::Permit
    }
}

/// Active when a value matcher permits some value of the unfiltered attributes.
///
/// With `attribute_id` set only that attribute is searched.
#[derive(Debug)]
pub struct MatcherRequirement {
    matcher: Box<dyn Matcher>,
    attribute_id: Option<String>,
}

impl MatcherRequirement {
    /// Search every attribute.
    pub fn any_attribute(matcher: Box<dyn Matcher>) -> Self {
        Self {
            matcher,
            attribute_id: None,
        }
    }

    /// Search a single attribute.
    pub fn attribute(attribute_id: impl Into<String>, matcher: Box<dyn Matcher>) -> Self {
        Self {
            matcher,
            attribute_id: Some(attribute_id.into()),
        }
    }

    fn evaluate_attribute(
        &self,
        context: &FilterContext<'_>,
        attribute: &IdPAttribute,
    ) -> MatchResult {
        MatchResult::any(
            attribute
                .values()
                .iter()
                .map(|value| self.matcher.matches(context, attribute, value)),
        )
    }
}

impl PolicyRequirementRule for MatcherRequirement {
    fn evaluate(&self, context: &FilterContext<'_>) -> MatchResult {
        match &self.attribute_id {
            Some(id) => match context.attributes().get(id) {
                Some(attribute) => self.evaluate_attribute(context, attribute),
                None => MatchResult::Deny,
            },
            None => MatchResult::any(
                context
                    .attributes()
                    .values()
                    .map(|attribute| self.evaluate_attribute(context, attribute)),
            ),
        }
    }
}

#[derive(Debug)]
pub struct AndRequirement {
    rules: Vec<Box<dyn PolicyRequirementRule>>,
}

impl AndRequirement {
    pub fn new(rules: Vec<Box<dyn PolicyRequirementRule>>) -> Self {
        Self { rules }
    }
}

impl PolicyRequirementRule for AndRequirement {
    fn evaluate(&self, context: &FilterContext<'_>) -> MatchResult {
        MatchResult::all(self.rules.iter().map(|r| r.evaluate(context)))
    }
}

#[derive(Debug)]
pub struct OrRequirement {
    rules: Vec<Box<dyn PolicyRequirementRule>>,
}

impl OrRequirement {
    pub fn new(rules: Vec<Box<dyn PolicyRequirementRule>>) -> Self {
        Self { rules }
    }
}

impl PolicyRequirementRule for OrRequirement {
    fn evaluate(&self, context: &FilterContext<'_>) -> MatchResult {
        MatchResult::any(self.rules.iter().map(|r| r.evaluate(context)))
    }
}

#[derive(Debug)]
pub struct NotRequirement {
    rule: Box<dyn PolicyRequirementRule>,
}

impl NotRequirement {
    pub fn new(rule: Box<dyn PolicyRequirementRule>) -> Self {
        Self { rule }
    }
}

impl PolicyRequirementRule for NotRequirement {
    fn evaluate(&self, context: &FilterContext<'_>) -> MatchResult {
        self.rule.evaluate(context).not()
    }
}
