//! Filter engine
//!
//! Release is deny-by-default: a value survives only if an active permit
//! rule permits it and no active deny rule matches it. The verdicts of all
//! active policies are combined before anything is removed, so policy order
//! does not change the outcome.

use std::collections::{BTreeMap, HashSet};
use tracing::{debug, trace};
use xavyo_attribute::AttributeMap;

use crate::context::FilterContext;
use crate::error::{FilterConfigError, FilterConfigResult};
use crate::policy::FilterPolicy;
use crate::result::MatchResult;

#[derive(Debug, Clone, Copy, Default)]
struct Verdict {
    permitted: bool,
    denied: bool,
}

/// Filter attributes through a set of policies.
pub fn filter_attributes(
    context: &FilterContext<'_>,
    policies: &[FilterPolicy],
    attributes: &AttributeMap,
) -> AttributeMap {
    let mut verdicts: BTreeMap<&str, Vec<Verdict>> = BTreeMap::new();

    for policy in policies {
        let active = policy.requirement().evaluate(context);
        if active != MatchResult::Permit {
            trace!(policy_id = %policy.id(), result = %active, "Filter policy not active");
            continue;
        }
        trace!(policy_id = %policy.id(), "Filter policy active");

        for rule in policy.rules() {
            let Some((id, attribute)) = attributes.get_key_value(rule.attribute_id()) else {
                continue;
            };
            let slots = verdicts
                .entry(id.as_str())
                .or_insert_with(|| vec![Verdict::default(); attribute.values().len()]);

            for (slot, value) in slots.iter_mut().zip(attribute.values()) {
                if rule.matcher().matches(context, attribute, value) != MatchResult::Permit {
                    continue;
                }
                if rule.is_deny_rule() {
                    trace!(
                        policy_id = %policy.id(),
                        rule_id = %rule.id(),
                        attribute_id = %id,
                        value = %value,
                        "Value denied"
                    );
                    slot.denied = true;
                } else {
                    slot.permitted = true;
                }
            }
        }
    }

    let mut released = AttributeMap::new();
    for (id, attribute) in attributes {
        let Some(slots) = verdicts.get(id.as_str()) else {
            debug!(attribute_id = %id, "No active rule for attribute, withholding it");
            continue;
        };

        let values: Vec<_> = attribute
            .values()
            .iter()
            .zip(slots)
            .filter(|(_, v)| v.permitted && !v.denied)
            .map(|(value, _)| value.clone())
            .collect();
        if values.is_empty() {
            debug!(attribute_id = %id, "No values released");
            continue;
        }

        let mut filtered = attribute.clone();
        filtered.set_values(values);
        released.insert(id.clone(), filtered);
    }

    debug!(
        requester = ?context.request().requester_id(),
        input = attributes.len(),
        released = released.len(),
        "Attribute filtering complete"
    );
    released
}

/// A validated set of filter policies.
#[derive(Debug, Default)]
pub struct AttributeFilter {
    policies: Vec<FilterPolicy>,
}

impl AttributeFilter {
    /// Create a filter, rejecting duplicate policy ids.
    pub fn new(policies: Vec<FilterPolicy>) -> FilterConfigResult<Self> {
        let mut ids = HashSet::new();
        for policy in &policies {
            if !ids.insert(policy.id()) {
                return Err(FilterConfigError::DuplicatePolicy {
                    id: policy.id().to_string(),
                });
            }
        }
        Ok(Self { policies })
    }

    pub fn policies(&self) -> &[FilterPolicy] {
        &self.policies
    }

    /// Filter attributes for a request.
    #[must_use]
    pub fn filter(&self, context: &FilterContext<'_>, attributes: &AttributeMap) -> AttributeMap {
        filter_attributes(context, &self.policies, attributes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::StringComparison;
    use crate::matcher::{AnyMatcher, ContextMatcher, ValueMatcher};
    use crate::policy::AttributeRule;
    use crate::requirement::AnyRequirement;
    use xavyo_attribute::{AttributeValue, IdPAttribute, RequestContext};

    fn attributes() -> AttributeMap {
        let mut map = AttributeMap::new();
        map.insert(
            "eduPersonAffiliation".into(),
            IdPAttribute::new("eduPersonAffiliation")
                .unwrap()
                .with_values(["member", "staff", "student"])
                .with_display_name("en", "Affiliation"),
        );
        map.insert(
            "mail".into(),
            IdPAttribute::new("mail").unwrap().with_values(["jsmith@example.org"]),
        );
        map
    }

    fn value(expected: &str) -> Box<dyn crate::matcher::Matcher> {
        Box::new(ValueMatcher::new(StringComparison::exact(expected, true)))
    }

    #[test]
    fn test_deny_by_default() {
        let request = RequestContext::new();
        let attributes = attributes();
        let context = FilterContext::new(&request, &attributes);

        let policy = FilterPolicy::new("release", Box::new(AnyRequirement)).with_rule(
            AttributeRule::permit("rule", "eduPersonAffiliation", Box::new(AnyMatcher)),
        );
        let released = filter_attributes(&context, &[policy], &attributes);

        assert!(!released.contains_key("mail"));
        assert_eq!(released["eduPersonAffiliation"].values().len(), 3);
        assert_eq!(
            released["eduPersonAffiliation"].display_name("en"),
            Some("Affiliation")
        );
    }

    #[test]
    fn test_deny_rule_wins_across_policies() {
        let request = RequestContext::new();
        let attributes = attributes();
        let context = FilterContext::new(&request, &attributes);

        let deny = FilterPolicy::new("deny", Box::new(AnyRequirement)).with_rule(
            AttributeRule::deny("no-students", "eduPersonAffiliation", value("student")),
        );
        let permit = FilterPolicy::new("permit", Box::new(AnyRequirement)).with_rule(
            AttributeRule::permit("all", "eduPersonAffiliation", Box::new(AnyMatcher)),
        );

        let released = filter_attributes(&context, &[deny, permit], &attributes);
        assert_eq!(
            released["eduPersonAffiliation"].values(),
            &[AttributeValue::string("member"), AttributeValue::string("staff")]
        );
    }

    #[test]
    fn test_inactive_policy_ignored() {
        let request = RequestContext::new().with_requester("https://other.example.org");
        let attributes = attributes();
        let context = FilterContext::new(&request, &attributes);

        let policy = FilterPolicy::new(
            "sp-only",
            Box::new(ContextMatcher::requester(StringComparison::exact(
                "https://sp.example.org",
                true,
            ))),
        )
        .with_rule(AttributeRule::permit("mail", "mail", Box::new(AnyMatcher)));

        let released = filter_attributes(&context, &[policy], &attributes);
        assert!(released.is_empty());
    }

    #[test]
    fn test_indeterminate_rule_contributes_nothing() {
        // No principal in the request: the deny rule has no opinion
        let request = RequestContext::new();
        let attributes = attributes();
        let context = FilterContext::new(&request, &attributes);

        let policy = FilterPolicy::new("p", Box::new(AnyRequirement))
            .with_rule(AttributeRule::permit("all", "mail", Box::new(AnyMatcher)))
            .with_rule(AttributeRule::deny(
                "not-for-jsmith",
                "mail",
                Box::new(ContextMatcher::principal(StringComparison::exact("jsmith", true))),
            ));

        let released = filter_attributes(&context, &[policy], &attributes);
        assert!(released.contains_key("mail"));
    }

    #[test]
    fn test_duplicate_policy_rejected() {
        let result = AttributeFilter::new(vec![
            FilterPolicy::new("p", Box::new(AnyRequirement)),
            FilterPolicy::new("p", Box::new(AnyRequirement)),
        ]);
        assert!(matches!(result, Err(FilterConfigError::DuplicatePolicy { .. })));
    }
}
