//! Declarative filter policy configuration
//!
//! Policies load from JSON and compile into an [`AttributeFilter`]. Regexes
//! are compiled at load time, so a bad pattern fails the load rather than a
//! request.

use serde::{Deserialize, Serialize};

use crate::compare::{ComparisonMode, StringComparison};
use crate::engine::AttributeFilter;
use crate::error::{FilterConfigError, FilterConfigResult};
use crate::matcher::{
    AndMatcher, AnyMatcher, ContextMatcher, Matcher, NotMatcher, OrMatcher, RequestField,
    ScopeMatcher, ValueMatcher,
};
use crate::policy::{AttributeRule, FilterPolicy};
use crate::requirement::{
    AndRequirement, AnyRequirement, MatcherRequirement, NotRequirement, OrRequirement,
    PolicyRequirementRule,
};

fn default_true() -> bool {
    true
}

/// A string comparison as written in configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StringComparisonConfig {
    #[serde(default)]
    pub mode: ComparisonMode,
    pub value: String,
    #[serde(default = "default_true")]
    pub case_sensitive: bool,
}

impl StringComparisonConfig {
    fn compile(&self) -> FilterConfigResult<StringComparison> {
        StringComparison::from_mode(self.mode, &self.value, self.case_sensitive)
    }
}

/// Value matcher configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MatcherConfig {
    Any,
    Value(StringComparisonConfig),
    Scope(StringComparisonConfig),
    Requester(StringComparisonConfig),
    Issuer(StringComparisonConfig),
    Principal(StringComparisonConfig),
    And { matchers: Vec<MatcherConfig> },
    Or { matchers: Vec<MatcherConfig> },
    Not { matcher: Box<MatcherConfig> },
}

impl MatcherConfig {
    pub fn build(&self) -> FilterConfigResult<Box<dyn Matcher>> {
        Ok(match self {
            MatcherConfig::Any => Box::new(AnyMatcher),
            MatcherConfig::Value(cmp) => Box::new(ValueMatcher::new(cmp.compile()?)),
            MatcherConfig::Scope(cmp) => Box::new(ScopeMatcher::new(cmp.compile()?)),
            MatcherConfig::Requester(cmp) => {
                Box::new(ContextMatcher::new(RequestField::Requester, cmp.compile()?))
            }
            MatcherConfig::Issuer(cmp) => {
                Box::new(ContextMatcher::new(RequestField::Issuer, cmp.compile()?))
            }
            MatcherConfig::Principal(cmp) => {
                Box::new(ContextMatcher::new(RequestField::Principal, cmp.compile()?))
            }
            MatcherConfig::And { matchers } => Box::new(AndMatcher::new(build_all(matchers)?)),
            MatcherConfig::Or { matchers } => Box::new(OrMatcher::new(build_all(matchers)?)),
            MatcherConfig::Not { matcher } => Box::new(NotMatcher::new(matcher.build()?)),
        })
    }
}

fn build_all(configs: &[MatcherConfig]) -> FilterConfigResult<Vec<Box<dyn Matcher>>> {
    configs.iter().map(MatcherConfig::build).collect()
}

/// Policy requirement configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RequirementConfig {
    Any,
    Requester(StringComparisonConfig),
    Issuer(StringComparisonConfig),
    Principal(StringComparisonConfig),
    /// Some value of the unfiltered attributes satisfies the matcher.
    AttributeValue {
        #[serde(default)]
        attribute_id: Option<String>,
        matcher: MatcherConfig,
    },
    And { rules: Vec<RequirementConfig> },
    Or { rules: Vec<RequirementConfig> },
    Not { rule: Box<RequirementConfig> },
}

impl RequirementConfig {
    pub fn build(&self) -> FilterConfigResult<Box<dyn PolicyRequirementRule>> {
        Ok(match self {
            RequirementConfig::Any => Box::new(AnyRequirement),
            RequirementConfig::Requester(cmp) => {
                Box::new(ContextMatcher::requester(cmp.compile()?))
            }
            RequirementConfig::Issuer(cmp) => Box::new(ContextMatcher::issuer(cmp.compile()?)),
            RequirementConfig::Principal(cmp) => {
                Box::new(ContextMatcher::principal(cmp.compile()?))
            }
            RequirementConfig::AttributeValue {
                attribute_id,
                matcher,
            } => {
                let matcher = matcher.build()?;
                Box::new(match attribute_id {
                    Some(id) => MatcherRequirement::attribute(id.clone(), matcher),
                    None => MatcherRequirement::any_attribute(matcher),
                })
            }
            RequirementConfig::And { rules } => Box::new(AndRequirement::new(
                rules.iter().map(Self::build).collect::<Result<_, _>>()?,
            )),
            RequirementConfig::Or { rules } => Box::new(OrRequirement::new(
                rules.iter().map(Self::build).collect::<Result<_, _>>()?,
            )),
            RequirementConfig::Not { rule } => Box::new(NotRequirement::new(rule.build()?)),
        })
    }
}

/// Attribute rule configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeRuleConfig {
    #[serde(default)]
    pub id: Option<String>,
    pub attribute_id: String,
    #[serde(default)]
    pub deny: bool,
    pub matcher: MatcherConfig,
}

/// Filter policy configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterPolicyConfig {
    pub id: String,
    #[serde(default = "default_requirement")]
    pub requirement: RequirementConfig,
    #[serde(default)]
    pub rules: Vec<AttributeRuleConfig>,
}

fn default_requirement() -> RequirementConfig {
    RequirementConfig::Any
}

impl FilterPolicyConfig {
    pub fn build(&self) -> FilterConfigResult<FilterPolicy> {
        if self.id.trim().is_empty() {
            return Err(FilterConfigError::InvalidPolicy {
                policy_id: self.id.clone(),
                message: "policy id must not be blank".to_string(),
            });
        }

        let mut policy = FilterPolicy::new(self.id.clone(), self.requirement.build()?);
        for (index, rule) in self.rules.iter().enumerate() {
            let id = rule
                .id
                .clone()
                .unwrap_or_else(|| format!("{}:{}:{index}", self.id, rule.attribute_id));
            let matcher = rule.matcher.build()?;
            policy = policy.with_rule(if rule.deny {
                AttributeRule::deny(id, rule.attribute_id.clone(), matcher)
            } else {
                AttributeRule::permit(id, rule.attribute_id.clone(), matcher)
            });
        }
        Ok(policy)
    }
}

/// A full filter configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterConfig {
    #[serde(default)]
    pub policies: Vec<FilterPolicyConfig>,
}

impl FilterConfig {
    /// Parse configuration from JSON.
    pub fn from_json(json: &str) -> FilterConfigResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Compile the configured policies.
    pub fn build(&self) -> FilterConfigResult<AttributeFilter> {
        let policies = self
            .policies
            .iter()
            .map(FilterPolicyConfig::build)
            .collect::<FilterConfigResult<Vec<_>>>()?;
        AttributeFilter::new(policies)
    }
}
