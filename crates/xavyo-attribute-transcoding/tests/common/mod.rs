//! Shared helpers for xavyo-attribute-transcoding integration tests.

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

pub fn attribute(id: &str, values: &[&str]) -> IdPAttribute {
    IdPAttribute::new(id)
        .unwrap()
        .with_values(values.iter().copied())
}

pub fn attribute_map(attributes: Vec<IdPAttribute>) -> AttributeMap {
    attributes
        .into_iter()
        .map(|a| (a.id().to_string(), a))
        .collect()
}
