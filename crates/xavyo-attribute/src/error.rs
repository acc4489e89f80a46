//! Attribute model error types

use thiserror::Error;

/// Error raised when constructing attribute model objects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttributeError {
    /// Attribute ids must be non-empty and not made only of whitespace.
    #[error("invalid attribute id: '{id}'")]
    InvalidId { id: String },

    /// A scoped value needs both a value and a scope.
    #[error("invalid scoped value: {message}")]
    InvalidScopedValue { message: String },
}

impl AttributeError {
    /// Get an error code for classification.
    pub fn error_code(&self) -> &'static str {
        match self {
            AttributeError::InvalidId { .. } => "INVALID_ATTRIBUTE_ID",
            AttributeError::InvalidScopedValue { .. } => "INVALID_SCOPED_VALUE",
        }
    }
}

/// Result type for attribute model operations.
pub type AttributeResult<T> = Result<T, AttributeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AttributeError::InvalidId { id: " ".to_string() };
        assert_eq!(err.to_string(), "invalid attribute id: ' '");
        assert_eq!(err.error_code(), "INVALID_ATTRIBUTE_ID");
    }
}
