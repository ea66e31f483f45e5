//! Operation serialization helpers.
//!
//! Serde already provides JSON serialization. This module centralizes the
//! helpers adapters use and maps decode failures to `MalformedOperation`.

use crate::error::{CacheError, ValidationError};
use crate::operation::operations::{RecordOperation, Transform};

/// Serialize a transform to pretty JSON.
pub fn to_json_pretty(transform: &Transform) -> Result<String, CacheError> {
    serde_json::to_string_pretty(transform)
        .map_err(|e| CacheError::internal(format!("serialize transform: {e}")))
}

/// Deserialize a transform from JSON.
///
/// Callers should then invoke `transform.validate()` (or hand it to the
/// cache, which does) before applying.
pub fn from_json(s: &str) -> Result<Transform, CacheError> {
    serde_json::from_str::<Transform>(s).map_err(|e| {
        ValidationError::MalformedOperation {
            reason: format!("decode transform: {e}"),
        }
        .into()
    })
}

/// Deserialize a single operation from JSON.
pub fn operation_from_json(s: &str) -> Result<RecordOperation, CacheError> {
    serde_json::from_str::<RecordOperation>(s).map_err(|e| {
        ValidationError::MalformedOperation {
            reason: format!("decode operation: {e}"),
        }
        .into()
    })
}
