//! Shared helpers for xavyo-attribute-resolver integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Once};
use xavyo_attribute::{AttributeMap, AttributeValue, IdPAttribute};
use xavyo_attribute_resolver::prelude::*;

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

pub fn strings(attribute: &IdPAttribute) -> Vec<String> {
    attribute.values().iter().map(ToString::to_string).collect()
}

/// Definition that concatenates its dependency values and counts invocations.
pub struct CountingDefinition {
    settings: DefinitionSettings,
    own_values: Vec<AttributeValue>,
    pub calls: Arc<AtomicUsize>,
}

impl CountingDefinition {
    pub fn new(settings: DefinitionSettings, own_values: &[&str]) -> Self {
        Self {
            settings,
            own_values: own_values.iter().map(|v| AttributeValue::string(*v)).collect(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl AttributeDefinition for CountingDefinition {
    fn settings(&self) -> &DefinitionSettings {
        &self.settings
    }

    async fn resolve(&self, context: &ResolutionContext) -> ResolutionResult<Option<IdPAttribute>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut values = self.own_values.clone();
        for dependency_values in context
            .dependency_values(&self.settings.dependencies)
            .into_values()
        {
            values.extend(dependency_values);
        }
        let attribute = IdPAttribute::new(self.settings.id.as_str())?.with_values(values);
        Ok(Some(attribute))
    }
}

/// Connector whose outcome can be switched between success, failure and no result.
pub struct ScriptedConnector {
    settings: ConnectorSettings,
    attributes: AttributeMap,
    pub fail: Arc<AtomicBool>,
    pub empty: Arc<AtomicBool>,
    pub calls: Arc<AtomicUsize>,
}

impl ScriptedConnector {
    pub fn new(settings: ConnectorSettings, attributes: &[(&str, &[&str])]) -> Self {
        Self {
            settings,
            attributes: attributes
                .iter()
                .map(|(id, values)| (id.to_string(), attribute(id, values)))
                .collect(),
            fail: Arc::new(AtomicBool::new(false)),
            empty: Arc::new(AtomicBool::new(false)),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing(self) -> Self {
        self.fail.store(true, Ordering::SeqCst);
        self
    }

    pub fn empty(self) -> Self {
        self.empty.store(true, Ordering::SeqCst);
        self
    }
}

#[async_trait]
impl DataConnector for ScriptedConnector {
    fn settings(&self) -> &ConnectorSettings {
        &self.settings
    }

    async fn resolve(&self, _context: &ResolutionContext) -> ResolutionResult<Option<AttributeMap>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(ResolutionError::failed_with_source(
                self.settings.id.as_str(),
                "source unavailable",
                std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused"),
            ));
        }
        if self.empty.load(Ordering::SeqCst) {
            return Ok(None);
        }
        Ok(Some(self.attributes.clone()))
    }
}
