//! Resolver plugin traits
//!
//! Attribute definitions compute one attribute, data connectors fetch a set
//! of attributes from an external source. The engine resolves a plugin's
//! declared dependencies before calling it, so `resolve` can read them from
//! the context.

use async_trait::async_trait;
use xavyo_attribute::{AttributeMap, IdPAttribute};

use crate::context::ResolutionContext;
use crate::error::ResolutionResult;
use crate::settings::{ConnectorSettings, DefinitionSettings};

/// A plugin producing a single attribute.
#[async_trait]
pub trait AttributeDefinition: Send + Sync {
    /// Get the static settings of this definition.
    fn settings(&self) -> &DefinitionSettings;

    /// Get the plugin id.
    fn id(&self) -> &str {
        &self.settings().id
    }

    /// Compute the attribute.
    ///
    /// `Ok(None)` means there is nothing to produce for this request. An
    /// error is logged by the engine and the definition is omitted.
    async fn resolve(&self, context: &ResolutionContext) -> ResolutionResult<Option<IdPAttribute>>;
}

/// A plugin fetching attributes from an external source.
#[async_trait]
pub trait DataConnector: Send + Sync {
    /// Get the static settings of this connector.
    fn settings(&self) -> &ConnectorSettings;

    /// Get the plugin id.
    fn id(&self) -> &str {
        &self.settings().id
    }

    /// Fetch the attributes.
    ///
    /// Return `Ok(None)` or an empty map when the source has nothing for the
    /// subject, `ResolutionError::Failed` when the source could not be queried.
    async fn resolve(&self, context: &ResolutionContext) -> ResolutionResult<Option<AttributeMap>>;
}
