//! Computed persistent identifiers
//!
//! The identifier is `base64(SHA-1(requester "!" source "!" salt))`, so it
//! is stable per relying party and cannot be correlated across them.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use sha1::{Digest, Sha1};
use tracing::{debug, warn};
use xavyo_attribute::{AttributeMap, AttributeValue, IdPAttribute};

use crate::context::ResolutionContext;
use crate::error::{ResolutionError, ResolutionResult, ResolverConfigError};
use crate::plugin::DataConnector;
use crate::settings::ConnectorSettings;

/// Minimum salt length in bytes.
pub const MIN_SALT_LENGTH: usize = 16;

#[derive(Clone)]
pub struct ComputedIdConnector {
    settings: ConnectorSettings,
    source_attribute_id: String,
    generated_attribute_id: String,
    salt: Vec<u8>,
}

impl std::fmt::Debug for ComputedIdConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComputedIdConnector")
            .field("settings", &self.settings)
            .field("source_attribute_id", &self.source_attribute_id)
            .field("generated_attribute_id", &self.generated_attribute_id)
            .field("salt", &"<redacted>")
            .finish()
    }
}

impl ComputedIdConnector {
    /// Create the connector. The generated attribute id defaults to the connector id.
    pub fn new(
        settings: ConnectorSettings,
        source_attribute_id: impl Into<String>,
        salt: impl Into<Vec<u8>>,
    ) -> Result<Self, ResolverConfigError> {
        let salt = salt.into();
        if salt.len() < MIN_SALT_LENGTH {
            return Err(ResolverConfigError::invalid_plugin(
                settings.id.as_str(),
                format!("salt must be at least {MIN_SALT_LENGTH} bytes"),
            ));
        }
        let source_attribute_id = source_attribute_id.into();
        if source_attribute_id.trim().is_empty() {
            return Err(ResolverConfigError::invalid_plugin(
                settings.id.as_str(),
                "source attribute id is required",
            ));
        }

        Ok(Self {
            generated_attribute_id: settings.id.clone(),
            settings,
            source_attribute_id,
            salt,
        })
    }

    pub fn with_generated_attribute_id(mut self, id: impl Into<String>) -> Self {
        self.generated_attribute_id = id.into();
        self
    }

    /// Compute the identifier for a requester and source value.
    pub fn compute(&self, requester_id: &str, source_value: &str) -> String {
        let mut hasher = Sha1::new();
        hasher.update(requester_id.as_bytes());
        hasher.update(b"!");
        hasher.update(source_value.as_bytes());
        hasher.update(b"!");
        hasher.update(&self.salt);
        STANDARD.encode(hasher.finalize())
    }
}

#[async_trait]
impl DataConnector for ComputedIdConnector {
    fn settings(&self) -> &ConnectorSettings {
        &self.settings
    }

    async fn resolve(&self, context: &ResolutionContext) -> ResolutionResult<Option<AttributeMap>> {
        let requester_id = context.request().requester_id().ok_or_else(|| {
            ResolutionError::invalid_input(self.settings.id.as_str(), "no requester to compute an id for")
        })?;

        let values = context.merged_values(&self.settings.dependencies, &self.source_attribute_id);
        let mut strings = values.iter().filter_map(AttributeValue::as_str);
        let Some(source_value) = strings.next() else {
            debug!(
                connector_id = %self.settings.id,
                source = %self.source_attribute_id,
                "Source attribute has no string value"
            );
            return Ok(None);
        };
        if strings.next().is_some() {
            warn!(
                connector_id = %self.settings.id,
                source = %self.source_attribute_id,
                "Source attribute has several values, using the first"
            );
        }

        let id = self.compute(requester_id, source_value);
        let attribute = IdPAttribute::new(self.generated_attribute_id.as_str())?.with_values([id]);

        let mut attributes = AttributeMap::new();
        attributes.insert(self.generated_attribute_id.clone(), attribute);
        Ok(Some(attributes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::test_support::context_with_source;
    use crate::settings::PluginDependencies;
    use xavyo_attribute::RequestContext;

    const SALT: &[u8] = b"abcdefghijklmnopqrst";

    fn connector() -> ComputedIdConnector {
        ComputedIdConnector::new(
            ConnectorSettings::new("computedId")
                .with_dependencies(PluginDependencies::new().connector("source")),
            "uid",
            SALT,
        )
        .unwrap()
    }

    fn expected(requester: &str, value: &str) -> String {
        let mut input = Vec::new();
        input.extend_from_slice(requester.as_bytes());
        input.push(b'!');
        input.extend_from_slice(value.as_bytes());
        input.push(b'!');
        input.extend_from_slice(SALT);
        STANDARD.encode(Sha1::digest(&input))
    }

    #[tokio::test]
    async fn test_computes_id() {
        let context = context_with_source(
            RequestContext::new().with_requester("https://sp.example.org"),
            &[("uid", &["jsmith", "ignored"])],
        );

        let attributes = connector().resolve(&context).await.unwrap().unwrap();
        let value = attributes["computedId"].values()[0].as_str().unwrap().to_string();
        assert_eq!(value, expected("https://sp.example.org", "jsmith"));
        // 20 byte digest
        assert_eq!(value.len(), 28);
    }

    #[tokio::test]
    async fn test_differs_per_requester() {
        let connector = connector();
        assert_ne!(
            connector.compute("https://a.example.org", "jsmith"),
            connector.compute("https://b.example.org", "jsmith")
        );
    }

    #[tokio::test]
    async fn test_generated_attribute_id() {
        let context = context_with_source(
            RequestContext::new().with_requester("https://sp.example.org"),
            &[("uid", &["jsmith"])],
        );
        let attributes = connector()
            .with_generated_attribute_id("persistentId")
            .resolve(&context)
            .await
            .unwrap()
            .unwrap();
        assert!(attributes.contains_key("persistentId"));
    }

    #[tokio::test]
    async fn test_missing_requester_is_invalid_input() {
        let context = context_with_source(RequestContext::new(), &[("uid", &["jsmith"])]);
        let err = connector().resolve(&context).await.unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
        assert!(!err.is_source_failure());
    }

    #[tokio::test]
    async fn test_missing_source_is_no_result() {
        let context = context_with_source(
            RequestContext::new().with_requester("https://sp.example.org"),
            &[],
        );
        assert!(connector().resolve(&context).await.unwrap().is_none());
    }

    #[test]
    fn test_short_salt_rejected() {
        let err = ComputedIdConnector::new(ConnectorSettings::new("computedId"), "uid", b"short".to_vec())
            .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_PLUGIN");
    }
}
