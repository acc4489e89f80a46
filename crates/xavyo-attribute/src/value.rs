//! Attribute value types
//!
//! Values are immutable once built. Equality and hashing are by variant and
//! content, which is what value de-duplication relies on.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{AttributeError, AttributeResult};

/// A single value of an identity attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum AttributeValue {
    /// A plain string value.
    String(String),
    /// A string qualified by a security domain (e.g. `staff@example.org`).
    Scoped(ScopedValue),
    /// Raw binary data.
    Bytes(Vec<u8>),
    /// A placeholder for a missing or zero-length value.
    Empty(EmptyValue),
    /// An opaque structured value carried through unchanged.
    Object(OpaqueValue),
}

/// A string value with an associated scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScopedValue {
    value: String,
    scope: String,
}

impl ScopedValue {
    /// Create a scoped value, rejecting empty parts.
    pub fn new(value: impl Into<String>, scope: impl Into<String>) -> AttributeResult<Self> {
        let value = value.into();
        let scope = scope.into();
        if value.is_empty() || scope.is_empty() {
            return Err(AttributeError::InvalidScopedValue {
                message: format!("value '{value}' and scope '{scope}' must both be non-empty"),
            });
        }
        Ok(Self { value, scope })
    }

    /// Get the unscoped value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Get the scope.
    pub fn scope(&self) -> &str {
        &self.scope
    }
}

/// Kinds of empty value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyValue {
    /// The source held a null.
    Null,
    /// The source held a zero-length string or byte array.
    ZeroLength,
}

/// A structured value the pipeline does not interpret.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OpaqueValue {
    /// Name of the structure type (e.g. an XML element name).
    pub type_name: String,
    /// Serialized content.
    pub content: String,
}

impl AttributeValue {
    /// Create a string value. A zero-length string becomes `Empty(ZeroLength)`.
    pub fn string(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.is_empty() {
            AttributeValue::Empty(EmptyValue::ZeroLength)
        } else {
            AttributeValue::String(value)
        }
    }

    /// Create a scoped value, falling back to a plain string when the scope is empty.
    pub fn scoped(value: impl Into<String>, scope: impl Into<String>) -> Self {
        let value = value.into();
        match ScopedValue::new(value.clone(), scope) {
            Ok(scoped) => AttributeValue::Scoped(scoped),
            Err(_) => AttributeValue::string(value),
        }
    }

    /// Create a byte value. An empty slice becomes `Empty(ZeroLength)`.
    pub fn bytes(value: impl Into<Vec<u8>>) -> Self {
        let value = value.into();
        if value.is_empty() {
            AttributeValue::Empty(EmptyValue::ZeroLength)
        } else {
            AttributeValue::Bytes(value)
        }
    }

    /// Create a null value.
    pub fn null() -> Self {
        AttributeValue::Empty(EmptyValue::Null)
    }

    /// Create an opaque value.
    pub fn object(type_name: impl Into<String>, content: impl Into<String>) -> Self {
        AttributeValue::Object(OpaqueValue {
            type_name: type_name.into(),
            content: content.into(),
        })
    }

    /// Get the string content of a string or scoped value.
    ///
    /// For scoped values this is the unscoped part.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) => Some(s),
            AttributeValue::Scoped(s) => Some(s.value()),
            _ => None,
        }
    }

    /// Get the scope of a scoped value.
    pub fn scope(&self) -> Option<&str> {
        match self {
            AttributeValue::Scoped(s) => Some(s.scope()),
            _ => None,
        }
    }

    /// Get the bytes of a byte value.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            AttributeValue::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Check whether this is an `Empty` value.
    pub fn is_empty_value(&self) -> bool {
        matches!(self, AttributeValue::Empty(_))
    }

    /// Short name of the variant, used in log messages.
    pub fn kind(&self) -> &'static str {
        match self {
            AttributeValue::String(_) => "string",
            AttributeValue::Scoped(_) => "scoped",
            AttributeValue::Bytes(_) => "bytes",
            AttributeValue::Empty(_) => "empty",
            AttributeValue::Object(_) => "object",
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::String(s) => write!(f, "{s}"),
            AttributeValue::Scoped(s) => write!(f, "{}@{}", s.value(), s.scope()),
            AttributeValue::Bytes(b) => write!(f, "<{} bytes>", b.len()),
            AttributeValue::Empty(EmptyValue::Null) => write!(f, "<null>"),
            AttributeValue::Empty(EmptyValue::ZeroLength) => write!(f, "<empty>"),
            AttributeValue::Object(o) => write!(f, "<{}>", o.type_name),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        AttributeValue::string(s)
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        AttributeValue::string(s)
    }
}

impl From<ScopedValue> for AttributeValue {
    fn from(s: ScopedValue) -> Self {
        AttributeValue::Scoped(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_zero_length_string_is_empty() {
        assert_eq!(
            AttributeValue::string(""),
            AttributeValue::Empty(EmptyValue::ZeroLength)
        );
        assert_eq!(
            AttributeValue::bytes(Vec::new()),
            AttributeValue::Empty(EmptyValue::ZeroLength)
        );
    }

    #[test]
    fn test_scoped_value() {
        let value = AttributeValue::scoped("staff", "example.org");
        assert_eq!(value.as_str(), Some("staff"));
        assert_eq!(value.scope(), Some("example.org"));
        assert_eq!(value.to_string(), "staff@example.org");

        // Missing scope degrades to a plain string
        assert_eq!(
            AttributeValue::scoped("staff", ""),
            AttributeValue::string("staff")
        );
        assert!(ScopedValue::new("", "example.org").is_err());
    }

    #[test]
    fn test_equality_is_by_variant_and_content() {
        let plain = AttributeValue::string("staff");
        let scoped = AttributeValue::scoped("staff", "example.org");
        assert_ne!(plain, scoped);
        assert_eq!(plain, AttributeValue::from("staff"));

        let set: HashSet<AttributeValue> = [
            plain.clone(),
            plain.clone(),
            scoped,
            AttributeValue::null(),
            AttributeValue::null(),
        ]
        .into_iter()
        .collect();
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_serde_shape() {
        let value = AttributeValue::string("jsmith");
        let json = serde_json::to_value(&value).unwrap();
        assert_eq!(json, serde_json::json!({"type": "string", "value": "jsmith"}));

        let back: AttributeValue = serde_json::from_value(json).unwrap();
        assert_eq!(back, value);
    }
}
