//! OIDC claim representation and codec

use serde_json::Value;
use std::any::Any;
use tracing::{debug, warn};
use xavyo_attribute::{AttributeValue, IdPAttribute, RequestContext};

use crate::error::TranscodingResult;
use crate::rule::TranscodingRule;
use crate::transcoder::{
    decoded_attribute, expect_type, required_name, string_value, AttributeTranscoder,
};
use crate::types::{EncodedAttribute, TypeTag};

/// Canonical name of an OIDC claim.
pub fn oidc_name(name: &str) -> String {
    format!("OIDC:{name}")
}

/// A single OIDC claim.
#[derive(Debug, Clone, PartialEq)]
pub struct OidcClaim {
    pub name: String,
    pub value: Value,
}

impl OidcClaim {
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    /// Canonical name used for reverse lookup.
    pub fn canonical_name(&self) -> String {
        oidc_name(&self.name)
    }
}

impl EncodedAttribute for OidcClaim {
    fn type_tag(&self) -> TypeTag {
        TypeTag::OIDC_CLAIM
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn decode_scalar(value: &Value) -> Option<AttributeValue> {
    match value {
        Value::String(s) => Some(AttributeValue::string(s.as_str())),
        Value::Number(n) => Some(AttributeValue::string(n.to_string())),
        Value::Bool(b) => Some(AttributeValue::string(b.to_string())),
        _ => None,
    }
}

/// String claims.
///
/// A single value becomes a JSON string unless the rule asks for an array.
/// Several values always become an array so decoding gets them all back.
#[derive(Debug, Clone, Copy, Default)]
pub struct OidcStringTranscoder;

impl AttributeTranscoder for OidcStringTranscoder {
    fn encoded_type(&self) -> TypeTag {
        TypeTag::OIDC_CLAIM
    }

    fn encoded_name(&self, rule: &TranscodingRule) -> Option<String> {
        Some(oidc_name(rule.name()?))
    }

    fn encode(
        &self,
        _request: &RequestContext,
        attribute: &IdPAttribute,
        rule: &TranscodingRule,
    ) -> TranscodingResult<Option<Box<dyn EncodedAttribute>>> {
        let name = required_name(rule)?;
        let strings: Vec<&str> = attribute
            .values()
            .iter()
            .filter_map(|value| string_value(attribute, value, "oidc_string"))
            .filter(|text| !text.is_empty())
            .collect();

        if strings.is_empty() {
            warn!(attribute_id = %attribute.id(), "Attribute did not contain any encodable values");
            return Ok(None);
        }

        let value = match strings.as_slice() {
            [single] if !rule.as_array() => Value::String(single.to_string()),
            _ => Value::Array(strings.iter().map(|s| Value::String(s.to_string())).collect()),
        };
        debug!(attribute_id = %attribute.id(), claim = %name, "Encoded OIDC claim");
        Ok(Some(Box::new(OidcClaim::new(name, value))))
    }

    fn decode(
        &self,
        _request: &RequestContext,
        encoded: &dyn EncodedAttribute,
        rule: &TranscodingRule,
    ) -> TranscodingResult<Option<IdPAttribute>> {
        let claim = expect_type::<OidcClaim>(encoded, TypeTag::OIDC_CLAIM, rule)?;
        let values = match &claim.value {
            Value::Array(items) => items
                .iter()
                .filter_map(|item| {
                    let decoded = decode_scalar(item);
                    if decoded.is_none() {
                        warn!(claim = %claim.name, "Skipping non-scalar array element");
                    }
                    decoded
                })
                .collect(),
            Value::Null => Vec::new(),
            other => match decode_scalar(other) {
                Some(value) => vec![value],
                None => {
                    warn!(claim = %claim.name, "Skipping claim with object value");
                    return Ok(None);
                }
            },
        };
        Ok(Some(decoded_attribute(rule, values)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    fn rule(as_array: bool) -> TranscodingRule {
        TranscodingRule::with_tag("oidc_string")
            .with_name("groups")
            .with_as_array(as_array)
            .install("memberOf", Arc::new(OidcStringTranscoder))
    }

    fn encode(rule: &TranscodingRule, values: &[&str]) -> Value {
        let attribute = IdPAttribute::new("memberOf")
            .unwrap()
            .with_values(values.iter().copied());
        let encoded = OidcStringTranscoder
            .encode(&RequestContext::new(), &attribute, rule)
            .unwrap()
            .unwrap();
        encoded.downcast_ref::<OidcClaim>().unwrap().value.clone()
    }

    #[test]
    fn test_encode_shapes() {
        assert_eq!(encode(&rule(false), &["staff"]), json!("staff"));
        assert_eq!(encode(&rule(false), &["staff", "admin"]), json!(["staff", "admin"]));
        assert_eq!(encode(&rule(true), &["staff"]), json!(["staff"]));
        assert_eq!(encode(&rule(true), &["staff", "admin"]), json!(["staff", "admin"]));
    }

    #[test]
    fn test_multi_value_round_trip() {
        let rule = rule(false);
        let attribute = IdPAttribute::new("memberOf")
            .unwrap()
            .with_values(["staff", "admin"]);
        let request = RequestContext::new();

        let encoded = OidcStringTranscoder
            .encode(&request, &attribute, &rule)
            .unwrap()
            .unwrap();
        let decoded = OidcStringTranscoder
            .decode(&request, encoded.as_ref(), &rule)
            .unwrap()
            .unwrap();
        assert_eq!(decoded.values(), attribute.values());
    }

    #[test]
    fn test_decode_scalars_and_arrays() {
        let rule = rule(true);
        let claim = OidcClaim::new("groups", json!(["staff", 42, true, {"nested": 1}]));
        let decoded = OidcStringTranscoder
            .decode(&RequestContext::new(), &claim, &rule)
            .unwrap()
            .unwrap();

        assert_eq!(decoded.id(), "memberOf");
        assert_eq!(
            decoded.values(),
            &[
                AttributeValue::string("staff"),
                AttributeValue::string("42"),
                AttributeValue::string("true"),
            ]
        );

        let object = OidcClaim::new("groups", json!({"a": 1}));
        assert!(OidcStringTranscoder
            .decode(&RequestContext::new(), &object, &rule)
            .unwrap()
            .is_none());
    }
}
