//! Value post-processing applied when attributes are finalized.

use std::collections::HashSet;
use xavyo_attribute::{AttributeValue, IdPAttribute};

/// Remove duplicate values, keeping the first occurrence.
///
/// With `strip_nulls`, empty values are removed as well. Returns `false`
/// when the attribute is left without values.
pub fn post_process_values(attribute: &mut IdPAttribute, strip_nulls: bool) -> bool {
    let mut seen: HashSet<AttributeValue> = HashSet::new();
    let values: Vec<AttributeValue> = attribute
        .take_values()
        .into_iter()
        .filter(|value| !(strip_nulls && value.is_empty_value()))
        .filter(|value| seen.insert(value.clone()))
        .collect();

    attribute.set_values(values);
    !attribute.is_empty()
}
