//! Error types for the record cache.
//!
//! All errors are strongly typed using thiserror so callers can pattern
//! match on the exact failure: a schema violation, a malformed operation,
//! or a failure while applying an accepted operation to the record graph.

use thiserror::Error;

use crate::identity::RecordIdentity;
use crate::schema::SchemaError;

/// Validation errors raised before an operation may touch the record graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// An operation names a model type that the schema does not register.
    #[error("Model '{model}' not found in schema")]
    ModelNotFound {
        model: String,
    },

    #[error("Required field '{field}' is missing")]
    MissingField {
        field: String,
    },

    #[error("Invalid field '{field}': {reason}")]
    InvalidField {
        field: String,
        reason: String,
    },

    #[error("Malformed operation: {reason}")]
    MalformedOperation {
        reason: String,
    },
}

impl ValidationError {
    /// Creates a `ModelNotFound` error for the given model type.
    #[must_use]
    pub fn model_not_found(model: impl Into<String>) -> Self {
        Self::ModelNotFound {
            model: model.into(),
        }
    }

    /// Returns true if this error is a schema violation.
    #[must_use]
    pub const fn is_schema_violation(&self) -> bool {
        matches!(self, Self::ModelNotFound { .. })
    }
}

/// Execution errors raised while deriving or applying accepted operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    #[error("Relationship '{relationship}' on {record} is not {expected}")]
    RelationshipKindMismatch {
        record: RecordIdentity,
        relationship: String,
        expected: &'static str,
    },

    #[error("Transform exceeded the limit of {limit} operations")]
    OperationLimitExceeded {
        limit: usize,
    },

    #[error("Processor '{processor}' failed: {reason}")]
    Processor {
        processor: String,
        reason: String,
    },
}

/// Top-level error type for the record cache.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Internal error: {message}")]
    Internal {
        message: String,
    },
}

impl CacheError {
    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this is a validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this is a schema violation (unknown model type).
    #[must_use]
    pub const fn is_schema_violation(&self) -> bool {
        matches!(self, Self::Validation(ValidationError::ModelNotFound { .. }))
    }

    /// Returns true if this is an execution error.
    #[must_use]
    pub const fn is_execution(&self) -> bool {
        matches!(self, Self::Execution(_))
    }

    /// Returns true if this is a schema construction error.
    #[must_use]
    pub const fn is_schema(&self) -> bool {
        matches!(self, Self::Schema(_))
    }

    /// Returns true if this is an internal error.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal { .. })
    }

    /// Returns true if this error is retryable.
    ///
    /// Nothing the pipeline rejects can succeed when resubmitted unchanged.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        false
    }
}

/// Result type alias for record cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_not_found_message() {
        let err = ValidationError::model_not_found("comment");
        let msg = format!("{err}");
        assert!(msg.contains("comment"));
        assert!(msg.contains("not found"));
        assert!(err.is_schema_violation());
    }

    #[test]
    fn test_malformed_operation_is_not_schema_violation() {
        let err = ValidationError::MalformedOperation {
            reason: "bad".to_string(),
        };
        assert!(!err.is_schema_violation());
    }

    #[test]
    fn test_kind_mismatch_message() {
        let err = ExecutionError::RelationshipKindMismatch {
            record: RecordIdentity::new("article", "1"),
            relationship: "author".to_string(),
            expected: "to-many",
        };
        let msg = format!("{err}");
        assert!(msg.contains("author"));
        assert!(msg.contains("article:1"));
        assert!(msg.contains("to-many"));
    }

    #[test]
    fn test_operation_limit_message() {
        let err = ExecutionError::OperationLimitExceeded { limit: 42 };
        assert!(format!("{err}").contains("42"));
    }

    #[test]
    fn test_cache_error_from_validation() {
        let err: CacheError = ValidationError::model_not_found("comment").into();
        assert!(err.is_validation());
        assert!(err.is_schema_violation());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_cache_error_from_execution() {
        let err: CacheError = ExecutionError::OperationLimitExceeded { limit: 1 }.into();
        assert!(err.is_execution());
        assert!(!err.is_schema_violation());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_cache_error_from_schema() {
        let err: CacheError = SchemaError::UnknownRelatedModel {
            model: "article".to_string(),
            relationship: "author".to_string(),
            related: "person".to_string(),
        }
        .into();
        assert!(err.is_schema());
        assert!(format!("{err}").contains("person"));
    }

    #[test]
    fn test_cache_error_internal() {
        let err = CacheError::internal("unexpected state");
        assert!(err.is_internal());
        assert!(format!("{err}").contains("unexpected state"));
    }
}
