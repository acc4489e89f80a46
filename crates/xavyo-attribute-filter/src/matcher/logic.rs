//! Boolean combinations of matchers.

use xavyo_attribute::{AttributeValue, IdPAttribute};

use super::Matcher;
use crate::context::FilterContext;
use crate::result::MatchResult;

#[derive(Debug)]
pub struct AndMatcher {
    matchers: Vec<Box<dyn Matcher>>,
}

impl AndMatcher {
    pub fn new(matchers: Vec<Box<dyn Matcher>>) -> Self {
        Self { matchers }
    }
}

impl Matcher for AndMatcher {
    fn matches(
        &self,
        context: &FilterContext<'_>,
        attribute: &IdPAttribute,
        value: &AttributeValue,
    ) -> MatchResult {
        MatchResult::all(self.matchers.iter().map(|m| m.matches(context, attribute, value)))
    }
}

#[derive(Debug)]
pub struct OrMatcher {
    matchers: Vec<Box<dyn Matcher>>,
}

impl OrMatcher {
    pub fn new(matchers: Vec<Box<dyn Matcher>>) -> Self {
        Self { matchers }
    }
}

impl Matcher for OrMatcher {
    fn matches(
        &self,
        context: &FilterContext<'_>,
        attribute: &IdPAttribute,
        value: &AttributeValue,
    ) -> MatchResult {
        MatchResult::any(self.matchers.iter().map(|m| m.matches(context, attribute, value)))
    }
}

#[derive(Debug)]
pub struct NotMatcher {
    matcher: Box<dyn Matcher>,
}

impl NotMatcher {
    pub fn new(matcher: Box<dyn Matcher>) -> Self {
        Self { matcher }
    }
}

impl Matcher for NotMatcher {
    fn matches(
        &self,
        context: &FilterContext<'_>,
        attribute: &IdPAttribute,
        value: &AttributeValue,
    ) -> MatchResult {
        self.matcher.matches(context, attribute, value).not()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::StringComparison;
    use crate::matcher::{AnyMatcher, ContextMatcher, ValueMatcher};
    use xavyo_attribute::{AttributeMap, RequestContext};

    fn check(matcher: &dyn Matcher, request: &RequestContext, value: &str) -> MatchResult {
        let attributes = AttributeMap::new();
        let context = FilterContext::new(request, &attributes);
        let attribute = IdPAttribute::new("a").unwrap();
        matcher.matches(&context, &attribute, &AttributeValue::string(value))
    }

    fn value(expected: &str) -> Box<dyn Matcher> {
        Box::new(ValueMatcher::new(StringComparison::exact(expected, true)))
    }

    fn requester(expected: &str) -> Box<dyn Matcher> {
        Box::new(ContextMatcher::requester(StringComparison::exact(expected, true)))
    }

    #[test]
    fn test_and_or_not() {
        let request = RequestContext::new().with_requester("https://sp.example.org");

        let and = AndMatcher::new(vec![value("staff"), requester("https://sp.example.org")]);
        assert_eq!(check(&and, &request, "staff"), MatchResult::Permit);
        assert_eq!(check(&and, &request, "member"), MatchResult::Deny);

        let or = OrMatcher::new(vec![value("staff"), value("member")]);
        assert_eq!(check(&or, &request, "member"), MatchResult::Permit);
        assert_eq!(check(&or, &request, "student"), MatchResult::Deny);

        let not = NotMatcher::new(value("staff"));
        assert_eq!(check(&not, &request, "member"), MatchResult::Permit);
        assert_eq!(check(&not, &request, "staff"), MatchResult::Deny);
    }

    #[test]
    fn test_indeterminate_propagation() {
        let anonymous = RequestContext::new();

        let and = AndMatcher::new(vec![Box::new(AnyMatcher), requester("https://sp.example.org")]);
        assert_eq!(check(&and, &anonymous, "x"), MatchResult::Indeterminate);

        let and = AndMatcher::new(vec![value("y"), requester("https://sp.example.org")]);
        assert_eq!(check(&and, &anonymous, "x"), MatchResult::Deny);

        let or = OrMatcher::new(vec![value("x"), requester("https://sp.example.org")]);
        assert_eq!(check(&or, &anonymous, "x"), MatchResult::Permit);

        let not = NotMatcher::new(requester("https://sp.example.org"));
        assert_eq!(check(&not, &anonymous, "x"), MatchResult::Indeterminate);
    }
}
