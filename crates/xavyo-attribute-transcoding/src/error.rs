//! Transcoding error types

use thiserror::Error;

use crate::types::TypeTag;

/// Error raised while encoding or decoding a single attribute.
#[derive(Debug, Error)]
pub enum TranscodingError {
    /// The transcoder was handed an object of a type it does not produce.
    #[error("transcoder for '{attribute_id}' expects {expected}, got {actual}")]
    UnsupportedType {
        attribute_id: String,
        expected: TypeTag,
        actual: TypeTag,
    },

    /// The rule lacks a property the transcoder needs.
    #[error("transcoding rule for '{attribute_id}' is missing {property}")]
    MissingProperty {
        attribute_id: String,
        property: &'static str,
    },

    /// The decoded attribute could not be built.
    #[error("attribute model error: {0}")]
    Attribute(#[from] xavyo_attribute::AttributeError),
}

impl TranscodingError {
    /// Get an error code for classification.
    pub fn error_code(&self) -> &'static str {
        match self {
            TranscodingError::UnsupportedType { .. } => "UNSUPPORTED_TYPE",
            TranscodingError::MissingProperty { .. } => "MISSING_PROPERTY",
            TranscodingError::Attribute(_) => "INVALID_ATTRIBUTE",
        }
    }
}

/// Result type for transcoding operations.
pub type TranscodingResult<T> = Result<T, TranscodingError>;

/// Error raised while loading transcoding configuration.
#[derive(Debug, Error)]
pub enum TranscodingConfigError {
    /// A rule names a transcoder tag with no registered factory.
    #[error("unknown transcoder '{tag}' in rule for '{attribute_id}'")]
    UnknownTranscoder { attribute_id: String, tag: String },

    /// A rule is unusable.
    #[error("invalid transcoding rule for '{attribute_id}': {message}")]
    InvalidRule { attribute_id: String, message: String },

    /// The configuration document could not be parsed.
    #[error("invalid transcoding configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

impl TranscodingConfigError {
    /// Get an error code for classification.
    pub fn error_code(&self) -> &'static str {
        match self {
            TranscodingConfigError::UnknownTranscoder { .. } => "UNKNOWN_TRANSCODER",
            TranscodingConfigError::InvalidRule { .. } => "INVALID_RULE",
            TranscodingConfigError::Parse(_) => "INVALID_CONFIGURATION",
        }
    }
}
