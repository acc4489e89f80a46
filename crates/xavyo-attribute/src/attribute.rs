//! Identity attributes

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{AttributeError, AttributeResult};
use crate::value::AttributeValue;

/// Attributes keyed by id.
pub type AttributeMap = BTreeMap<String, IdPAttribute>;

/// An identity attribute: an id plus an ordered list of values.
///
/// Value order is significant and duplicates are allowed until the resolver
/// finalizes the attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdPAttribute {
    id: String,
    #[serde(default)]
    values: Vec<AttributeValue>,
    /// Display names keyed by language tag.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    display_names: BTreeMap<String, String>,
    /// Display descriptions keyed by language tag.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    display_descriptions: BTreeMap<String, String>,
}

impl IdPAttribute {
    /// Create an attribute with no values.
    pub fn new(id: impl Into<String>) -> AttributeResult<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(AttributeError::InvalidId { id });
        }
        Ok(Self {
            id,
            values: Vec::new(),
            display_names: BTreeMap::new(),
            display_descriptions: BTreeMap::new(),
        })
    }

    /// Replace the values using builder pattern.
    pub fn with_values<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<AttributeValue>,
    {
        self.values = values.into_iter().map(Into::into).collect();
        self
    }

    /// Add a display name using builder pattern.
    pub fn with_display_name(mut self, lang: impl Into<String>, name: impl Into<String>) -> Self {
        self.display_names.insert(lang.into(), name.into());
        self
    }

    /// Add a display description using builder pattern.
    pub fn with_display_description(
        mut self,
        lang: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        self.display_descriptions
            .insert(lang.into(), description.into());
        self
    }

    /// Get the attribute id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Get the values in insertion order.
    pub fn values(&self) -> &[AttributeValue] {
        &self.values
    }

    /// Replace all values.
    pub fn set_values(&mut self, values: Vec<AttributeValue>) {
        self.values = values;
    }

    /// Append a value.
    pub fn add_value(&mut self, value: impl Into<AttributeValue>) {
        self.values.push(value.into());
    }

    /// Take the values out, leaving the attribute empty.
    pub fn take_values(&mut self) -> Vec<AttributeValue> {
        std::mem::take(&mut self.values)
    }

    /// Check whether an equal value is present.
    pub fn contains_value(&self, value: &AttributeValue) -> bool {
        self.values.contains(value)
    }

    /// Check whether the attribute has no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get the display names keyed by language.
    pub fn display_names(&self) -> &BTreeMap<String, String> {
        &self.display_names
    }

    /// Get the display descriptions keyed by language.
    pub fn display_descriptions(&self) -> &BTreeMap<String, String> {
        &self.display_descriptions
    }

    /// Replace the display names.
    pub fn set_display_names(&mut self, names: BTreeMap<String, String>) {
        self.display_names = names;
    }

    /// Replace the display descriptions.
    pub fn set_display_descriptions(&mut self, descriptions: BTreeMap<String, String>) {
        self.display_descriptions = descriptions;
    }

    /// Display name for a language, if any.
    pub fn display_name(&self, lang: &str) -> Option<&str> {
        self.display_names.get(lang).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_id_rejected() {
        assert!(IdPAttribute::new("").is_err());
        assert!(IdPAttribute::new("   ").is_err());
        assert!(IdPAttribute::new("mail").is_ok());
    }

    #[test]
    fn test_values_keep_insertion_order_and_duplicates() {
        let mut attribute = IdPAttribute::new("eduPersonAffiliation")
            .unwrap()
            .with_values(["member", "staff"]);
        attribute.add_value("member");

        let values: Vec<_> = attribute.values().iter().filter_map(|v| v.as_str()).collect();
        assert_eq!(values, vec!["member", "staff", "member"]);
    }

    #[test]
    fn test_display_metadata() {
        let attribute = IdPAttribute::new("mail")
            .unwrap()
            .with_display_name("en", "E-mail")
            .with_display_name("de", "E-Mail")
            .with_display_description("en", "Primary e-mail address");

        assert_eq!(attribute.display_name("de"), Some("E-Mail"));
        assert_eq!(attribute.display_name("fr"), None);
        assert_eq!(attribute.display_descriptions().len(), 1);
    }

    #[test]
    fn test_take_values() {
        let mut attribute = IdPAttribute::new("uid").unwrap().with_values(["jsmith"]);
        let values = attribute.take_values();
        assert_eq!(values.len(), 1);
        assert!(attribute.is_empty());
    }
}
