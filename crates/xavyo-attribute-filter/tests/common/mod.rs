//! Shared helpers for xavyo-attribute-filter integration tests.

#![allow(dead_code)]

use std::sync::Once;
use xavyo_attribute::{AttributeMap, IdPAttribute};

static INIT: Once = Once::new();

/// Initialize logging for tests (once).
pub fn init_test_logging() {
    INIT.call_once(|| {
        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::fmt()
                .with_test_writer()
                .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
                .try_init()
                .ok();
        }
    });
}

/// Build an attribute map from `(id, values)` pairs.
pub fn attributes(entries: &[(&str, &[&str])]) -> AttributeMap {
    entries
        .iter()
        .map(|(id, values)| {
            let attribute = IdPAttribute::new(*id)
                .unwrap()
                .with_values(values.iter().copied());
            (id.to_string(), attribute)
        })
        .collect()
}

pub fn strings(map: &AttributeMap, id: &str) -> Vec<String> {
    map.get(id)
        .map(|a| a.values().iter().map(ToString::to_string).collect())
        .unwrap_or_default()
}
