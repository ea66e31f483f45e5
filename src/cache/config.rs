//! Cache configuration.

use serde::{Deserialize, Serialize};

/// Configuration for [`RecordCache`](super::RecordCache).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Max original plus derived operations applied for one transform.
    pub max_operations_per_transform: usize,
    /// Register the schema validation processor.
    pub validate_schema: bool,
    /// Register the cache integrity processor.
    pub maintain_integrity: bool,
    /// Register the inverse relationship processor.
    pub maintain_inverses: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_operations_per_transform: 10_000,
            validate_schema: true,
            maintain_integrity: true,
            maintain_inverses: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CacheConfig::default();
        assert_eq!(config.max_operations_per_transform, 10_000);
        assert!(config.validate_schema);
        assert!(config.maintain_integrity);
        assert!(config.maintain_inverses);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: CacheConfig = serde_json::from_str(r#"{ "maintain_inverses": false }"#).unwrap();
        assert!(!config.maintain_inverses);
        assert!(config.validate_schema);
        assert_eq!(config.max_operations_per_transform, 10_000);
    }
}
