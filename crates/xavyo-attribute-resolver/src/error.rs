//! Attribute resolution error types
//!
//! Two families: `ResolverConfigError` is raised once while building a
//! resolver and is fatal to startup; `ResolutionError` is raised per request
//! by plugins and the engine.

use thiserror::Error;
use xavyo_attribute::AttributeError;

/// Error raised while resolving attributes for one request.
#[derive(Debug, Error)]
pub enum ResolutionError {
    /// A data connector found nothing for the subject.
    #[error("no result from data connector '{plugin_id}'")]
    NoResult { plugin_id: String },

    /// A plugin failed to reach or query its source.
    #[error("plugin '{plugin_id}' failed: {message}")]
    Failed {
        plugin_id: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A plugin could not build its input from the request or its dependencies.
    #[error("plugin '{plugin_id}' has invalid input: {message}")]
    InvalidInput { plugin_id: String, message: String },

    /// A connector is inside its no-retry window and has no failover.
    #[error("data connector '{connector_id}' failed recently and is not retried yet")]
    NoRetryWindow { connector_id: String },

    /// A produced attribute was malformed.
    #[error(transparent)]
    Attribute(#[from] AttributeError),
}

impl ResolutionError {
    /// Create a no-result error.
    pub fn no_result(plugin_id: impl Into<String>) -> Self {
        ResolutionError::NoResult {
            plugin_id: plugin_id.into(),
        }
    }

    /// Create a failure without an underlying cause.
    pub fn failed(plugin_id: impl Into<String>, message: impl Into<String>) -> Self {
        ResolutionError::Failed {
            plugin_id: plugin_id.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Create a failure wrapping the cause reported by a client.
    pub fn failed_with_source(
        plugin_id: impl Into<String>,
        message: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        ResolutionError::Failed {
            plugin_id: plugin_id.into(),
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Create an invalid-input error.
    pub fn invalid_input(plugin_id: impl Into<String>, message: impl Into<String>) -> Self {
        ResolutionError::InvalidInput {
            plugin_id: plugin_id.into(),
            message: message.into(),
        }
    }

    /// Check whether this is the "no result" sub-kind.
    pub fn is_no_result(&self) -> bool {
        matches!(self, ResolutionError::NoResult { .. })
    }

    /// Check whether this error reflects a failure of the external source.
    ///
    /// Only these errors start a connector's no-retry window.
    pub fn is_source_failure(&self) -> bool {
        matches!(self, ResolutionError::Failed { .. })
    }

    /// Get an error code for classification.
    pub fn error_code(&self) -> &'static str {
        match self {
            ResolutionError::NoResult { .. } => "NO_RESULT",
            ResolutionError::Failed { .. } => "RESOLUTION_FAILED",
            ResolutionError::InvalidInput { .. } => "INVALID_INPUT",
            ResolutionError::NoRetryWindow { .. } => "NO_RETRY_WINDOW",
            ResolutionError::Attribute(_) => "INVALID_ATTRIBUTE",
        }
    }
}

/// Result type for resolution operations.
pub type ResolutionResult<T> = Result<T, ResolutionError>;

/// Error raised while building a resolver from its plugins or configuration.
#[derive(Debug, Error)]
pub enum ResolverConfigError {
    /// Two plugins share an id.
    #[error("duplicate plugin id: {id}")]
    DuplicatePlugin { id: String },

    /// An attribute definition and a data connector share an id.
    #[error("id '{id}' is used by both an attribute definition and a data connector")]
    IdCollision { id: String },

    /// A declared dependency does not name a configured plugin.
    #[error("plugin '{plugin_id}' depends on unknown plugin '{dependency_id}'")]
    MissingDependency {
        plugin_id: String,
        dependency_id: String,
    },

    /// The dependency graph contains a cycle.
    #[error("circular dependency: {}", path.join(" -> "))]
    CircularDependency { path: Vec<String> },

    /// A failover reference does not name a configured data connector.
    #[error("data connector '{connector_id}' fails over to unknown connector '{failover_id}'")]
    UnknownFailover {
        connector_id: String,
        failover_id: String,
    },

    /// Following failover references leads back to an earlier connector.
    #[error("failover loop: {}", path.join(" -> "))]
    FailoverLoop { path: Vec<String> },

    /// A plugin was configured with unusable settings.
    #[error("invalid plugin '{plugin_id}': {message}")]
    InvalidPlugin { plugin_id: String, message: String },

    /// The configuration document could not be parsed.
    #[error("invalid resolver configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ResolverConfigError {
    /// Create an invalid-plugin error.
    pub fn invalid_plugin(plugin_id: impl Into<String>, message: impl Into<String>) -> Self {
        ResolverConfigError::InvalidPlugin {
            plugin_id: plugin_id.into(),
            message: message.into(),
        }
    }

    /// Get an error code for classification.
    pub fn error_code(&self) -> &'static str {
        match self {
            ResolverConfigError::DuplicatePlugin { .. } => "DUPLICATE_PLUGIN",
            ResolverConfigError::IdCollision { .. } => "ID_COLLISION",
            ResolverConfigError::MissingDependency { .. } => "MISSING_DEPENDENCY",
            ResolverConfigError::CircularDependency { .. } => "CIRCULAR_DEPENDENCY",
            ResolverConfigError::UnknownFailover { .. } => "UNKNOWN_FAILOVER",
            ResolverConfigError::FailoverLoop { .. } => "FAILOVER_LOOP",
            ResolverConfigError::InvalidPlugin { .. } => "INVALID_PLUGIN",
            ResolverConfigError::Parse(_) => "INVALID_CONFIGURATION",
        }
    }
}
