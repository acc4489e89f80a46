//! Filter configuration error types

use thiserror::Error;

/// Error raised while building filter policies.
#[derive(Debug, Error)]
pub enum FilterConfigError {
    /// A regular expression did not compile.
    #[error("invalid regex '{pattern}': {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Two policies share an id.
    #[error("duplicate filter policy id: {id}")]
    DuplicatePolicy { id: String },

    /// A policy or rule is unusable.
    #[error("invalid filter policy '{policy_id}': {message}")]
    InvalidPolicy { policy_id: String, message: String },

    /// The configuration document could not be parsed.
    #[error("invalid filter configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

impl FilterConfigError {
    /// Get an error code for classification.
    pub fn error_code(&self) -> &'static str {
        match self {
            FilterConfigError::InvalidRegex { .. } => "INVALID_REGEX",
            FilterConfigError::DuplicatePolicy { .. } => "DUPLICATE_POLICY",
            FilterConfigError::InvalidPolicy { .. } => "INVALID_POLICY",
            FilterConfigError::Parse(_) => "INVALID_CONFIGURATION",
        }
    }
}

/// Result type for filter configuration.
pub type FilterConfigResult<T> = Result<T, FilterConfigError>;
