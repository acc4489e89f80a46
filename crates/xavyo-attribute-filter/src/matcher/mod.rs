//! Value matchers
//!
//! A matcher decides, for one value of one attribute, whether a rule
//! applies. Matchers never mutate the request.

mod context;
mod logic;
mod value;

pub use context::{ContextMatcher, RequestField};
pub use logic::{AndMatcher, NotMatcher, OrMatcher};
pub use value::{ScopeMatcher, ValueMatcher};

use xavyo_attribute::{AttributeValue, IdPAttribute};

use crate::context::FilterContext;
use crate::result::MatchResult;

/// Decides whether a rule applies to a candidate value.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    fn matches(
        &self,
        context: &FilterContext<'_>,
        attribute: &IdPAttribute,
        value: &AttributeValue,
    ) -> MatchResult;
}

/// Matches every value.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyMatcher;

impl Matcher for AnyMatcher {
    fn matches(&self, _: &FilterContext<'_>, _: &IdPAttribute, _: &AttributeValue) -> MatchResult {
        MatchResult::Permit
    }
}
