//! Record identity.
//!
//! Every record in the graph is addressed by the pair of its model type and
//! its id. Two identities are equal exactly when both parts are equal.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Globally unique address of a record: `(type, id)`.
///
/// # Examples
///
/// ```
/// use recordcache::RecordIdentity;
///
/// let a = RecordIdentity::new("article", "1");
/// let b = RecordIdentity::new("article", "1");
/// assert_eq!(a, b);
/// assert_eq!(a.to_string(), "article:1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordIdentity {
    /// Model type name, as registered in the schema.
    #[serde(rename = "type")]
    pub model: String,

    /// Record id, unique within its model type.
    pub id: String,
}

impl RecordIdentity {
    /// Creates a new identity.
    #[must_use]
    pub fn new(model: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            id: id.into(),
        }
    }

    /// Returns the model type name.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Returns the record id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for RecordIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.model, self.id)
    }
}

impl<M: Into<String>, I: Into<String>> From<(M, I)> for RecordIdentity {
    fn from((model, id): (M, I)) -> Self {
        Self::new(model, id)
    }
}
