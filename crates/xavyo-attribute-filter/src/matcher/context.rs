//! Matchers on the request rather than the value.

use serde::{Deserialize, Serialize};
use xavyo_attribute::{AttributeValue, IdPAttribute, RequestContext};

use super::Matcher;
use crate::compare::StringComparison;
use crate::context::FilterContext;
use crate::requirement::PolicyRequirementRule;
use crate::result::MatchResult;

/// A field of the request a [`ContextMatcher`] inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestField {
    Requester,
    Issuer,
    Principal,
}

impl RequestField {
    fn read(self, request: &RequestContext) -> Option<&str> {
        match self {
            RequestField::Requester => request.requester_id(),
            RequestField::Issuer => request.issuer_id(),
            RequestField::Principal => request.principal_name(),
        }
    }
}

/// Compares a request field. `Indeterminate` when the request lacks the field.
///
/// The outcome is the same for every value, so this also serves as a
/// policy requirement rule.
#[derive(Debug, Clone)]
pub struct ContextMatcher {
    field: RequestField,
    comparison: StringComparison,
}

impl ContextMatcher {
    pub fn new(field: RequestField, comparison: StringComparison) -> Self {
        Self { field, comparison }
    }

    pub fn requester(comparison: StringComparison) -> Self {
        Self::new(RequestField::Requester, comparison)
    }

    pub fn issuer(comparison: StringComparison) -> Self {
        Self::new(RequestField::Issuer, comparison)
    }

    pub fn principal(comparison: StringComparison) -> Self {
        Self::new(RequestField::Principal, comparison)
    }

    fn check(&self, request: &RequestContext) -> MatchResult {
        match self.field.read(request) {
            Some(actual) => MatchResult::from_bool(self.comparison.matches(actual)),
            None => MatchResult::Indeterminate,
        }
    }
}

impl Matcher for ContextMatcher {
    fn matches(&self, context: &FilterContext<'_>, _: &IdPAttribute, _: &AttributeValue) -> MatchResult {
        self.check(context.request())
    }
}

impl PolicyRequirementRule for ContextMatcher {
    fn evaluate(&self, context: &FilterContext<'_>) -> MatchResult {
        self.check(context.request())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xavyo_attribute::AttributeMap;

    fn evaluate(matcher: &ContextMatcher, request: &RequestContext) -> MatchResult {
        let attributes = AttributeMap::new();
        matcher.evaluate(&FilterContext::new(request, &attributes))
    }

    #[test]
    fn test_principal_case_sensitivity() {
        let request = RequestContext::new().with_principal("JSmith");

        let sensitive = ContextMatcher::principal(StringComparison::exact("jsmith", true));
        assert_eq!(evaluate(&sensitive, &request), MatchResult::Deny);

        let insensitive = ContextMatcher::principal(StringComparison::exact("jsmith", false));
        assert_eq!(evaluate(&insensitive, &request), MatchResult::Permit);
    }

    #[test]
    fn test_missing_field_is_indeterminate() {
        let matcher = ContextMatcher::requester(StringComparison::exact("https://sp.example.org", true));
        assert_eq!(evaluate(&matcher, &RequestContext::new()), MatchResult::Indeterminate);
    }

    #[test]
    fn test_requester_regex() {
        let matcher = ContextMatcher::requester(
            StringComparison::regex(r"https://[a-z]+\.example\.org", true).unwrap(),
        );
        let request = RequestContext::new().with_requester("https://wiki.example.org");
        assert_eq!(evaluate(&matcher, &request), MatchResult::Permit);

        let request = RequestContext::new().with_requester("https://evil.example.com");
        assert_eq!(evaluate(&matcher, &request), MatchResult::Deny);
    }

    #[test]
    fn test_issuer() {
        let matcher = ContextMatcher::issuer(StringComparison::exact("https://idp.example.org", true));
        let request = RequestContext::new().with_issuer("https://idp.example.org");
        assert_eq!(evaluate(&matcher, &request), MatchResult::Permit);
    }
}
