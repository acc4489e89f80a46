//! SAML attribute representations and codecs

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::any::Any;
use tracing::{debug, warn};
use xavyo_attribute::{AttributeValue, IdPAttribute, RequestContext};

use crate::error::TranscodingResult;
use crate::rule::{ScopeEncoding, TranscodingRule};
use crate::transcoder::{
    decoded_attribute, expect_type, required_name, string_value, AttributeTranscoder,
};
use crate::types::{EncodedAttribute, TypeTag};

/// SAML 2.0 URI name format, used when a rule names none.
pub const URI_NAME_FORMAT: &str = "urn:oasis:names:tc:SAML:2.0:attrname-format:uri";
/// SAML 2.0 unspecified name format, assumed for attributes that carry none.
pub const UNSPECIFIED_NAME_FORMAT: &str = "urn:oasis:names:tc:SAML:2.0:attrname-format:unspecified";
/// Default SAML 1 attribute namespace.
pub const SHIBBOLETH_NAMESPACE: &str = "urn:mace:shibboleth:1.0:attributeNamespace:uri";

const XSD_STRING: &str = "xsd:string";
const XSD_BASE64: &str = "xsd:base64Binary";
const SCOPE_DELIMITER: char = '@';

/// Canonical name of a SAML 2 attribute.
pub fn saml2_name(name: &str, name_format: &str) -> String {
    format!("SAML2:{name}|{name_format}")
}

/// Canonical name of a SAML 1 attribute.
pub fn saml1_name(name: &str, namespace: &str) -> String {
    format!("SAML1:{name}|{namespace}")
}

/// One `<AttributeValue>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamlAttributeValue {
    pub text: String,
    pub xsi_type: Option<&'static str>,
    /// Separate `Scope` XML attribute.
    pub scope: Option<String>,
}

impl SamlAttributeValue {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            xsi_type: None,
            scope: None,
        }
    }

    fn typed(text: impl Into<String>, xsi_type: &'static str, encode_type: bool) -> Self {
        Self {
            text: text.into(),
            xsi_type: encode_type.then_some(xsi_type),
            scope: None,
        }
    }
}

/// A SAML 2.0 `<Attribute>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamlAttribute {
    pub name: String,
    pub name_format: Option<String>,
    pub friendly_name: Option<String>,
    pub values: Vec<SamlAttributeValue>,
}

impl SamlAttribute {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            name_format: None,
            friendly_name: None,
            values: Vec::new(),
        }
    }

    pub fn with_name_format(mut self, format: impl Into<String>) -> Self {
        self.name_format = Some(format.into());
        self
    }

    pub fn with_value(mut self, value: SamlAttributeValue) -> Self {
        self.values.push(value);
        self
    }

    /// Canonical name used for reverse lookup.
    pub fn canonical_name(&self) -> String {
        saml2_name(
            &self.name,
            self.name_format.as_deref().unwrap_or(UNSPECIFIED_NAME_FORMAT),
        )
    }
}

impl EncodedAttribute for SamlAttribute {
    fn type_tag(&self) -> TypeTag {
        TypeTag::SAML2_ATTRIBUTE
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A SAML 1.1 `<Attribute>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Saml1Attribute {
    pub name: String,
    pub namespace: String,
    pub values: Vec<SamlAttributeValue>,
}

impl Saml1Attribute {
    /// Canonical name used for reverse lookup.
    pub fn canonical_name(&self) -> String {
        saml1_name(&self.name, &self.namespace)
    }
}

impl EncodedAttribute for Saml1Attribute {
    fn type_tag(&self) -> TypeTag {
        TypeTag::SAML1_ATTRIBUTE
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn rule_name_format(rule: &TranscodingRule) -> &str {
    rule.name_format().unwrap_or(URI_NAME_FORMAT)
}

/// Wrap encoded values in a SAML 2 attribute, or nothing if none survived.
fn build_saml2(
    attribute: &IdPAttribute,
    rule: &TranscodingRule,
    values: Vec<SamlAttributeValue>,
) -> TranscodingResult<Option<Box<dyn EncodedAttribute>>> {
    if values.is_empty() {
        warn!(attribute_id = %attribute.id(), "Attribute did not contain any encodable values");
        return Ok(None);
    }
    debug!(
        attribute_id = %attribute.id(),
        count = values.len(),
        "Encoded SAML 2 attribute"
    );
    Ok(Some(Box::new(SamlAttribute {
        name: required_name(rule)?.to_string(),
        name_format: Some(rule_name_format(rule).to_string()),
        friendly_name: rule.friendly_name().map(str::to_string),
        values,
    })))
}

/// Plain string values. Scoped values lose their scope.
#[derive(Debug, Clone, Copy, Default)]
pub struct Saml2StringTranscoder;

impl AttributeTranscoder for Saml2StringTranscoder {
    fn encoded_type(&self) -> TypeTag {
        TypeTag::SAML2_ATTRIBUTE
    }

    fn encoded_name(&self, rule: &TranscodingRule) -> Option<String> {
        Some(saml2_name(rule.name()?, rule_name_format(rule)))
    }

    fn encode(
        &self,
        _request: &RequestContext,
        attribute: &IdPAttribute,
        rule: &TranscodingRule,
    ) -> TranscodingResult<Option<Box<dyn EncodedAttribute>>> {
        let values = attribute
            .values()
            .iter()
            .filter_map(|value| string_value(attribute, value, "saml2_string"))
            .filter(|text| !text.is_empty())
            .map(|text| SamlAttributeValue::typed(text, XSD_STRING, rule.encode_type()))
            .collect();
        build_saml2(attribute, rule, values)
    }

    fn decode(
        &self,
        _request: &RequestContext,
        encoded: &dyn EncodedAttribute,
        rule: &TranscodingRule,
    ) -> TranscodingResult<Option<IdPAttribute>> {
        let saml = expect_type::<SamlAttribute>(encoded, TypeTag::SAML2_ATTRIBUTE, rule)?;
        let values = saml
            .values
            .iter()
            .map(|v| AttributeValue::string(v.text.as_str()))
            .collect();
        Ok(Some(decoded_attribute(rule, values)?))
    }
}

/// Scoped values, inline or with a separate scope.
#[derive(Debug, Clone, Copy, Default)]
pub struct Saml2ScopedTranscoder;

impl AttributeTranscoder for Saml2ScopedTranscoder {
    fn encoded_type(&self) -> TypeTag {
        TypeTag::SAML2_ATTRIBUTE
    }

    fn encoded_name(&self, rule: &TranscodingRule) -> Option<String> {
        Some(saml2_name(rule.name()?, rule_name_format(rule)))
    }

    fn encode(
        &self,
        _request: &RequestContext,
        attribute: &IdPAttribute,
        rule: &TranscodingRule,
    ) -> TranscodingResult<Option<Box<dyn EncodedAttribute>>> {
        let mut values = Vec::new();
        for value in attribute.values() {
            let AttributeValue::Scoped(scoped) = value else {
                warn!(
                    attribute_id = %attribute.id(),
                    kind = value.kind(),
                    "Skipping non-scoped value"
                );
                continue;
            };
            let mut encoded = match rule.scope_encoding() {
                ScopeEncoding::Inline => SamlAttributeValue::new(format!(
                    "{}{SCOPE_DELIMITER}{}",
                    scoped.value(),
                    scoped.scope()
                )),
                ScopeEncoding::Attribute => SamlAttributeValue {
                    text: scoped.value().to_string(),
                    xsi_type: None,
                    scope: Some(scoped.scope().to_string()),
                },
            };
            if rule.encode_type() {
                encoded.xsi_type = Some(XSD_STRING);
            }
            values.push(encoded);
        }
        build_saml2(attribute, rule, values)
    }

    fn decode(
        &self,
        _request: &RequestContext,
        encoded: &dyn EncodedAttribute,
        rule: &TranscodingRule,
    ) -> TranscodingResult<Option<IdPAttribute>> {
        let saml = expect_type::<SamlAttribute>(encoded, TypeTag::SAML2_ATTRIBUTE, rule)?;
        let mut values = Vec::new();
        for value in &saml.values {
            let scoped = match &value.scope {
                Some(scope) => Some((value.text.as_str(), scope.as_str())),
                None => value.text.rsplit_once(SCOPE_DELIMITER),
            };
            match scoped {
                Some((v, scope)) => values.push(AttributeValue::scoped(v, scope)),
                None => warn!(
                    attribute_id = %rule.attribute_id(),
                    "Skipping value without a scope"
                ),
            }
        }
        Ok(Some(decoded_attribute(rule, values)?))
    }
}

/// Binary values as base64.
#[derive(Debug, Clone, Copy, Default)]
pub struct Saml2Base64Transcoder;

impl AttributeTranscoder for Saml2Base64Transcoder {
    fn encoded_type(&self) -> TypeTag {
        TypeTag::SAML2_ATTRIBUTE
    }

    fn encoded_name(&self, rule: &TranscodingRule) -> Option<String> {
        Some(saml2_name(rule.name()?, rule_name_format(rule)))
    }

    fn encode(
        &self,
        _request: &RequestContext,
        attribute: &IdPAttribute,
        rule: &TranscodingRule,
    ) -> TranscodingResult<Option<Box<dyn EncodedAttribute>>> {
        let values = attribute
            .values()
            .iter()
            .filter_map(|value| match value.as_bytes() {
                Some(bytes) if !bytes.is_empty() => Some(SamlAttributeValue::typed(
                    STANDARD.encode(bytes),
                    XSD_BASE64,
                    rule.encode_type(),
                )),
                Some(_) => None,
                None => {
                    warn!(
                        attribute_id = %attribute.id(),
                        kind = value.kind(),
                        "Skipping non-binary value"
                    );
                    None
                }
            })
            .collect();
        build_saml2(attribute, rule, values)
    }

    fn decode(
        &self,
        _request: &RequestContext,
        encoded: &dyn EncodedAttribute,
        rule: &TranscodingRule,
    ) -> TranscodingResult<Option<IdPAttribute>> {
        let saml = expect_type::<SamlAttribute>(encoded, TypeTag::SAML2_ATTRIBUTE, rule)?;
        let mut values = Vec::new();
        for value in &saml.values {
            match STANDARD.decode(value.text.trim()) {
                Ok(bytes) => values.push(AttributeValue::bytes(bytes)),
                Err(e) => warn!(
                    attribute_id = %rule.attribute_id(),
                    error = %e,
                    "Skipping value that is not valid base64"
                ),
            }
        }
        Ok(Some(decoded_attribute(rule, values)?))
    }
}

/// SAML 1 string values.
#[derive(Debug, Clone, Copy, Default)]
pub struct Saml1StringTranscoder;

impl Saml1StringTranscoder {
    fn namespace(rule: &TranscodingRule) -> &str {
        rule.namespace().unwrap_or(SHIBBOLETH_NAMESPACE)
    }
}

impl AttributeTranscoder for Saml1StringTranscoder {
    fn encoded_type(&self) -> TypeTag {
        TypeTag::SAML1_ATTRIBUTE
    }

    fn encoded_name(&self, rule: &TranscodingRule) -> Option<String> {
        Some(saml1_name(rule.name()?, Self::namespace(rule)))
    }

    fn encode(
        &self,
        _request: &RequestContext,
        attribute: &IdPAttribute,
        rule: &TranscodingRule,
    ) -> TranscodingResult<Option<Box<dyn EncodedAttribute>>> {
        let values: Vec<_> = attribute
            .values()
            .iter()
            .filter_map(|value| string_value(attribute, value, "saml1_string"))
            .filter(|text| !text.is_empty())
            .map(|text| SamlAttributeValue::typed(text, XSD_STRING, rule.encode_type()))
            .collect();
        if values.is_empty() {
            warn!(attribute_id = %attribute.id(), "Attribute did not contain any encodable values");
            return Ok(None);
        }
        Ok(Some(Box::new(Saml1Attribute {
            name: required_name(rule)?.to_string(),
            namespace: Self::namespace(rule).to_string(),
            values,
        })))
    }

    fn decode(
        &self,
        _request: &RequestContext,
        encoded: &dyn EncodedAttribute,
        rule: &TranscodingRule,
    ) -> TranscodingResult<Option<IdPAttribute>> {
        let saml = expect_type::<Saml1Attribute>(encoded, TypeTag::SAML1_ATTRIBUTE, rule)?;
        let values = saml
            .values
            .iter()
            .map(|v| AttributeValue::string(v.text.as_str()))
            .collect();
        Ok(Some(decoded_attribute(rule, values)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn rule(transcoder: Arc<dyn AttributeTranscoder>, id: &str) -> TranscodingRule {
        TranscodingRule::with_transcoder(Arc::clone(&transcoder))
            .with_name("urn:oid:1.3.6.1.4.1.5923.1.1.1.9")
            .with_friendly_name("eduPersonScopedAffiliation")
            .install(id, transcoder)
    }

    fn scoped_attribute() -> IdPAttribute {
        IdPAttribute::new("affiliation").unwrap().with_values([
            AttributeValue::scoped("staff", "example.org"),
            AttributeValue::string("member"),
        ])
    }

    fn encode(
        transcoder: &dyn AttributeTranscoder,
        attribute: &IdPAttribute,
        rule: &TranscodingRule,
    ) -> SamlAttribute {
        let encoded = transcoder
            .encode(&RequestContext::new(), attribute, rule)
            .unwrap()
            .unwrap();
        encoded.downcast_ref::<SamlAttribute>().unwrap().clone()
    }

    #[test]
    fn test_string_encoding_is_lossy_for_scoped() {
        let transcoder = Arc::new(Saml2StringTranscoder);
        let rule = rule(transcoder.clone(), "affiliation");
        let saml = encode(transcoder.as_ref(), &scoped_attribute(), &rule);

        assert_eq!(saml.name_format.as_deref(), Some(URI_NAME_FORMAT));
        assert_eq!(saml.friendly_name.as_deref(), Some("eduPersonScopedAffiliation"));
        let texts: Vec<_> = saml.values.iter().map(|v| v.text.as_str()).collect();
        assert_eq!(texts, vec!["staff", "member"]);
        assert_eq!(saml.values[0].xsi_type, Some(XSD_STRING));
    }

    #[test]
    fn test_scoped_encoding_modes() {
        let transcoder = Arc::new(Saml2ScopedTranscoder);
        let attribute = scoped_attribute();

        let separate = rule(transcoder.clone(), "affiliation");
        let saml = encode(transcoder.as_ref(), &attribute, &separate);
        assert_eq!(saml.values.len(), 1);
        assert_eq!(saml.values[0].text, "staff");
        assert_eq!(saml.values[0].scope.as_deref(), Some("example.org"));

        let inline =
            rule(transcoder.clone(), "affiliation").with_scope_encoding(ScopeEncoding::Inline);
        let saml = encode(transcoder.as_ref(), &attribute, &inline);
        assert_eq!(saml.values[0].text, "staff@example.org");
        assert_eq!(saml.values[0].scope, None);

        let decoded = transcoder
            .decode(&RequestContext::new(), &saml, &inline)
            .unwrap()
            .unwrap();
        assert_eq!(decoded.values(), &[AttributeValue::scoped("staff", "example.org")]);
    }

    #[test]
    fn test_base64_round_trip() {
        let transcoder = Arc::new(Saml2Base64Transcoder);
        let rule = rule(transcoder.clone(), "certificate");
        let attribute = IdPAttribute::new("certificate")
            .unwrap()
            .with_values([AttributeValue::bytes(vec![0xde, 0xad, 0xbe, 0xef])]);

        let saml = encode(transcoder.as_ref(), &attribute, &rule);
        assert_eq!(saml.values[0].text, "3q2+7w==");

        let decoded = transcoder
            .decode(&RequestContext::new(), &saml, &rule)
            .unwrap()
            .unwrap();
        assert_eq!(decoded.values(), attribute.values());
    }

    #[test]
    fn test_nothing_encodable_yields_none() {
        let transcoder = Saml2Base64Transcoder;
        let rule = rule(Arc::new(Saml2Base64Transcoder), "uid");
        let attribute = IdPAttribute::new("uid").unwrap().with_values(["jsmith"]);
        assert!(transcoder
            .encode(&RequestContext::new(), &attribute, &rule)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_encode_without_name_fails() {
        let transcoder = Arc::new(Saml2StringTranscoder);
        let rule =
            TranscodingRule::with_transcoder(transcoder.clone()).install("uid", transcoder.clone());
        let attribute = IdPAttribute::new("uid").unwrap().with_values(["jsmith"]);

        assert!(transcoder.encoded_name(&rule).is_none());
        let err = transcoder
            .encode(&RequestContext::new(), &attribute, &rule)
            .unwrap_err();
        assert_eq!(err.error_code(), "MISSING_PROPERTY");
    }

    #[test]
    fn test_saml1_namespace() {
        let transcoder = Arc::new(Saml1StringTranscoder);
        let rule = TranscodingRule::with_transcoder(transcoder.clone())
            .with_name("urn:mace:dir:attribute-def:uid")
            .install("uid", transcoder.clone());
        let attribute = IdPAttribute::new("uid").unwrap().with_values(["jsmith"]);

        let encoded = transcoder
            .encode(&RequestContext::new(), &attribute, &rule)
            .unwrap()
            .unwrap();
        let saml1 = encoded.downcast_ref::<Saml1Attribute>().unwrap();
        assert_eq!(saml1.namespace, SHIBBOLETH_NAMESPACE);
        assert_eq!(Some(saml1.canonical_name()), transcoder.encoded_name(&rule));
    }

    #[test]
    fn test_decode_wrong_type_rejected() {
        let transcoder = Saml1StringTranscoder;
        let rule = rule(Arc::new(Saml1StringTranscoder), "uid");
        let saml2 = SamlAttribute::new("uid");
        let err = transcoder
            .decode(&RequestContext::new(), &saml2, &rule)
            .unwrap_err();
        assert_eq!(err.error_code(), "UNSUPPORTED_TYPE");
    }
}
