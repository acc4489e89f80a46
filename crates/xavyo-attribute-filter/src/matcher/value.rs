//! Matchers on the candidate value itself.

use xavyo_attribute::{AttributeValue, IdPAttribute};

use super::Matcher;
use crate::compare::StringComparison;
use crate::context::FilterContext;
use crate::result::MatchResult;

/// Compares the string content of a value. Non-string values never match.
///
/// For scoped values the unscoped part is compared.
#[derive(Debug, Clone)]
pub struct ValueMatcher {
    comparison: StringComparison,
}

impl ValueMatcher {
    pub fn new(comparison: StringComparison) -> Self {
        Self { comparison }
    }
}

impl Matcher for ValueMatcher {
    fn matches(&self, _: &FilterContext<'_>, _: &IdPAttribute, value: &AttributeValue) -> MatchResult {
        MatchResult::from_bool(value.as_str().is_some_and(|s| self.comparison.matches(s)))
    }
}

/// Compares the scope of scoped values. Other values never match.
#[derive(Debug, Clone)]
pub struct ScopeMatcher {
    comparison: StringComparison,
}

impl ScopeMatcher {
    pub fn new(comparison: StringComparison) -> Self {
        Self { comparison }
    }
}

impl Matcher for ScopeMatcher {
    fn matches(&self, _: &FilterContext<'_>, _: &IdPAttribute, value: &AttributeValue) -> MatchResult {
        MatchResult::from_bool(value.scope().is_some_and(|s| self.comparison.matches(s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xavyo_attribute::{AttributeMap, RequestContext};

    fn check(matcher: &dyn Matcher, value: AttributeValue) -> MatchResult {
        let request = RequestContext::new();
        let attributes = AttributeMap::new();
        let context = FilterContext::new(&request, &attributes);
        let attribute = IdPAttribute::new("a").unwrap();
        matcher.matches(&context, &attribute, &value)
    }

    #[test]
    fn test_value_matcher() {
        let matcher = ValueMatcher::new(StringComparison::exact("jsmith", false));
        assert_eq!(check(&matcher, AttributeValue::string("JSMITH")), MatchResult::Permit);
        assert_eq!(check(&matcher, AttributeValue::string("admin")), MatchResult::Deny);
        assert_eq!(
            check(&matcher, AttributeValue::scoped("jsmith", "example.org")),
            MatchResult::Permit
        );
        assert_eq!(check(&matcher, AttributeValue::bytes(b"jsmith".to_vec())), MatchResult::Deny);
        assert_eq!(check(&matcher, AttributeValue::null()), MatchResult::Deny);
    }

    #[test]
    fn test_scope_matcher() {
        let matcher = ScopeMatcher::new(StringComparison::exact("example.org", true));
        assert_eq!(
            check(&matcher, AttributeValue::scoped("staff", "example.org")),
            MatchResult::Permit
        );
        assert_eq!(
            check(&matcher, AttributeValue::scoped("staff", "other.org")),
            MatchResult::Deny
        );
        assert_eq!(check(&matcher, AttributeValue::string("example.org")), MatchResult::Deny);
    }
}
