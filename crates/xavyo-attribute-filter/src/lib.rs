//! # Attribute Filter
//!
//! Decides which resolved attribute values may be released to a relying party.
//!
//! A [`FilterPolicy`] pairs a requirement rule, evaluated against the request
//! and the unfiltered attributes, with attribute rules that permit or deny
//! individual values. Matchers answer with a three-valued [`MatchResult`]:
//! `Indeterminate` means the matcher could not decide and never activates a
//! policy or releases a value.
//!
//! Release is deny-by-default. A value is released when at least one active
//! permit rule matches it and no active deny rule does.
//!
//! ## Crate Organization
//!
//! - [`result`] - The three-valued match result and its combinators
//! - [`compare`] - Exact, substring and regex string comparison
//! - [`matcher`] - Value matchers
//! - [`requirement`] - Policy requirement rules
//! - [`policy`] - Policies and attribute rules
//! - [`engine`] - The filter engine
//! - [`config`] - Declarative policy configuration

pub mod compare;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod policy;
pub mod requirement;
pub mod result;

pub use compare::{ComparisonMode, StringComparison};
pub use config::FilterConfig;
pub use context::FilterContext;
pub use engine::{filter_attributes, AttributeFilter};
pub use error::{FilterConfigError, FilterConfigResult};
pub use matcher::Matcher;
pub use policy::{AttributeRule, FilterPolicy};
pub use requirement::PolicyRequirementRule;
pub use result::MatchResult;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::compare::StringComparison;
    pub use crate::config::FilterConfig;
    pub use crate::context::FilterContext;
    pub use crate::engine::{filter_attributes, AttributeFilter};
    pub use crate::error::{FilterConfigError, FilterConfigResult};
    pub use crate::matcher::{AnyMatcher, ContextMatcher, Matcher, ScopeMatcher, ValueMatcher};
    pub use crate::policy::{AttributeRule, FilterPolicy};
    pub use crate::requirement::{AnyRequirement, MatcherRequirement, PolicyRequirementRule};
    pub use crate::result::MatchResult;
}
