//! Transcoder SPI

use std::fmt::Debug;
use tracing::warn;
use xavyo_attribute::{AttributeValue, IdPAttribute, RequestContext};

use crate::error::{TranscodingError, TranscodingResult};
use crate::rule::TranscodingRule;
use crate::types::{EncodedAttribute, TypeTag};

/// Converts attributes to and from one external representation.
///
/// A value the transcoder cannot handle is skipped with a warning; the
/// remaining values are still transcoded. `Ok(None)` means nothing was
/// produced.
pub trait AttributeTranscoder: Send + Sync + Debug {
    /// The representation this transcoder produces.
    fn encoded_type(&self) -> TypeTag;

    /// The canonical name of the external attribute a rule describes.
    ///
    /// `None` when the rule lacks what the name is built from.
    fn encoded_name(&self, rule: &TranscodingRule) -> Option<String>;

    fn encode(
        &self,
        request: &RequestContext,
        attribute: &IdPAttribute,
        rule: &TranscodingRule,
    ) -> TranscodingResult<Option<Box<dyn EncodedAttribute>>>;

    fn decode(
        &self,
        request: &RequestContext,
        encoded: &dyn EncodedAttribute,
        rule: &TranscodingRule,
    ) -> TranscodingResult<Option<IdPAttribute>>;
}

/// Downcast an encoded object, or fail with the expected type.
pub(crate) fn expect_type<'a, T: EncodedAttribute>(
    encoded: &'a dyn EncodedAttribute,
    expected: TypeTag,
    rule: &TranscodingRule,
) -> TranscodingResult<&'a T> {
    encoded
        .downcast_ref::<T>()
        .ok_or_else(|| TranscodingError::UnsupportedType {
            attribute_id: rule.attribute_id().to_string(),
            expected,
            actual: encoded.type_tag(),
        })
}

/// Get the rule's name, or fail.
pub(crate) fn required_name(rule: &TranscodingRule) -> TranscodingResult<&str> {
    rule.name().ok_or_else(|| TranscodingError::MissingProperty {
        attribute_id: rule.attribute_id().to_string(),
        property: "name",
    })
}

/// String form of a value for string-typed encodings.
///
/// Scoped values lose their scope. Other value kinds are skipped.
pub(crate) fn string_value<'a>(
    attribute: &IdPAttribute,
    value: &'a AttributeValue,
    codec: &str,
) -> Option<&'a str> {
    match value {
        AttributeValue::String(s) => Some(s.as_str()),
        AttributeValue::Scoped(scoped) => {
            warn!(
                attribute_id = %attribute.id(),
                codec = codec,
                "Lossy encoding of scoped value, scope dropped"
            );
            Some(scoped.value())
        }
        AttributeValue::Empty(_) => None,
        other => {
            warn!(
                attribute_id = %attribute.id(),
                codec = codec,
                kind = other.kind(),
                "Skipping value that cannot be encoded"
            );
            None
        }
    }
}

/// Build the internal attribute a decoding produces.
pub(crate) fn decoded_attribute(
    rule: &TranscodingRule,
    values: Vec<AttributeValue>,
) -> TranscodingResult<IdPAttribute> {
    let mut attribute = IdPAttribute::new(rule.attribute_id())?;
    attribute.set_values(values);
    attribute.set_display_names(rule.display_names().clone());
    attribute.set_display_descriptions(rule.display_descriptions().clone());
    Ok(attribute)
}
