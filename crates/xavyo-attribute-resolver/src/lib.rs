//! # Attribute Resolver
//!
//! Resolves a subject's attributes by walking a graph of resolver plugins.
//!
//! Attribute definitions compute one attribute each; data connectors fetch
//! attributes from external sources and can fail over to another connector.
//! The graph is validated once when the resolver is built (unknown
//! dependencies, cycles, failover loops). Each request then gets its own
//! [`ResolutionContext`] in which every plugin is resolved at most once.
//!
//! ## Crate Organization
//!
//! - [`plugin`] - The `AttributeDefinition` and `DataConnector` traits
//! - [`settings`] - Static plugin settings (dependencies, failover, export)
//! - [`context`] - Per-request state and dependency helpers for plugins
//! - [`resolver`] - The resolution engine and its builder
//! - [`definitions`] - Built-in attribute definitions
//! - [`connectors`] - Built-in data connectors
//! - [`config`] - Declarative configuration
//! - [`error`] - Resolution and configuration errors
//!
//! ## Example
//!
//! ```no_run
//! use xavyo_attribute_resolver::prelude::*;
//! use xavyo_attribute::RequestContext;
//!
//! # async fn example(resolver: AttributeResolver) -> ResolutionResult<()> {
//! let request = RequestContext::new()
//!     .with_principal("jsmith")
//!     .with_requester("https://sp.example.org");
//! let mut context = ResolutionContext::new(request).with_requested_ids(["mail"]);
//!
//! resolver.resolve(&mut context).await?;
//! for (id, attribute) in context.resolved_attributes() {
//!     println!("{id}: {} values", attribute.values().len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod connectors;
pub mod context;
pub mod definitions;
pub mod error;
pub mod failure;
pub mod plugin;
pub mod resolver;
pub mod settings;
pub mod validation;
pub mod values;

pub use config::ResolverConfig;
pub use context::{ResolutionContext, ResolvedAttributeDefinition, ResolvedDataConnector};
pub use error::{ResolutionError, ResolutionResult, ResolverConfigError};
pub use plugin::{AttributeDefinition, DataConnector};
pub use resolver::{AttributeResolver, AttributeResolverBuilder};
pub use settings::{
    ConnectorDependency, ConnectorSettings, DefinitionSettings, ExportPolicy, PluginDependencies,
};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::ResolverConfig;
    pub use crate::context::ResolutionContext;
    pub use crate::error::{ResolutionError, ResolutionResult, ResolverConfigError};
    pub use crate::plugin::{AttributeDefinition, DataConnector};
    pub use crate::resolver::{AttributeResolver, AttributeResolverBuilder};
    pub use crate::settings::{
        ConnectorSettings, DefinitionSettings, ExportPolicy, PluginDependencies,
    };
}
