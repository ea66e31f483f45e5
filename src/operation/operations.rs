//! Record operation definitions and the transform envelope.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::identity::RecordIdentity;
use crate::record::Record;

/// Groups operations that must commit together.
///
/// Every transform carries:
/// - A unique id for correlation in logs
/// - A timestamp for audit
/// - The ordered operations to apply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Unique identifier for this transform.
    pub id: Uuid,

    /// When this transform was created.
    pub timestamp: DateTime<Utc>,

    /// Operations, applied in order.
    pub operations: Vec<RecordOperation>,
}

impl Transform {
    /// Creates a new transform over the given operations.
    pub fn new(operations: Vec<RecordOperation>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            operations,
        }
    }

    /// Sets a custom transform id (useful for correlation).
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }
}

impl From<RecordOperation> for Transform {
    fn from(operation: RecordOperation) -> Self {
        Self::new(vec![operation])
    }
}

/// All supported record operations.
///
/// Serialized as `{"op": "<tag>", ...fields}` with camelCase tags and fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum RecordOperation {
    /// Store a record, replacing any prior state.
    AddRecord {
        record: Record,
    },

    /// Merge a record into any prior state.
    ReplaceRecord {
        record: Record,
    },

    /// Delete a record.
    RemoveRecord {
        record: RecordIdentity,
    },

    /// Set one secondary key.
    ReplaceKey {
        record: RecordIdentity,
        key: String,
        value: String,
    },

    /// Set one attribute.
    ReplaceAttribute {
        record: RecordIdentity,
        attribute: String,
        value: serde_json::Value,
    },

    /// Add one member to a to-many relationship.
    AddToRelatedRecords {
        record: RecordIdentity,
        relationship: String,
        #[serde(rename = "relatedRecord")]
        related_record: RecordIdentity,
    },

    /// Remove one member from a to-many relationship.
    RemoveFromRelatedRecords {
        record: RecordIdentity,
        relationship: String,
        #[serde(rename = "relatedRecord")]
        related_record: RecordIdentity,
    },

    /// Overwrite a to-many relationship.
    ReplaceRelatedRecords {
        record: RecordIdentity,
        relationship: String,
        #[serde(rename = "relatedRecords")]
        related_records: Vec<RecordIdentity>,
    },

    /// Overwrite a to-one relationship; `None` clears it.
    ReplaceRelatedRecord {
        record: RecordIdentity,
        relationship: String,
        #[serde(rename = "relatedRecord", deserialize_with = "present_or_null")]
        related_record: Option<RecordIdentity>,
    },
}

/// Decodes a nullable identity whose field must still be present.
///
/// Routing through `deserialize_with` makes serde report a missing field
/// instead of defaulting it to `None`.
fn present_or_null<'de, D>(deserializer: D) -> Result<Option<RecordIdentity>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<RecordIdentity>::deserialize(deserializer)
}

impl RecordOperation {
    /// `addRecord`.
    #[must_use]
    pub fn add_record(record: Record) -> Self {
        Self::AddRecord { record }
    }

    /// `replaceRecord`.
    #[must_use]
    pub fn replace_record(record: Record) -> Self {
        Self::ReplaceRecord { record }
    }

    /// `removeRecord`.
    #[must_use]
    pub fn remove_record(record: RecordIdentity) -> Self {
        Self::RemoveRecord { record }
    }

    /// `replaceKey`.
    #[must_use]
    pub fn replace_key(record: RecordIdentity, key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::ReplaceKey {
            record,
            key: key.into(),
            value: value.into(),
        }
    }

    /// `replaceAttribute`.
    #[must_use]
    pub fn replace_attribute(
        record: RecordIdentity,
        attribute: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        Self::ReplaceAttribute {
            record,
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    /// `addToRelatedRecords`.
    #[must_use]
    pub fn add_to_related_records(
        record: RecordIdentity,
        relationship: impl Into<String>,
        related_record: RecordIdentity,
    ) -> Self {
        Self::AddToRelatedRecords {
            record,
            relationship: relationship.into(),
            related_record,
        }
    }

    /// `removeFromRelatedRecords`.
    #[must_use]
    pub fn remove_from_related_records(
        record: RecordIdentity,
        relationship: impl Into<String>,
        related_record: RecordIdentity,
    ) -> Self {
        Self::RemoveFromRelatedRecords {
            record,
            relationship: relationship.into(),
            related_record,
        }
    }

    /// `replaceRelatedRecords`.
    #[must_use]
    pub fn replace_related_records(
        record: RecordIdentity,
        relationship: impl Into<String>,
        related_records: Vec<RecordIdentity>,
    ) -> Self {
        Self::ReplaceRelatedRecords {
            record,
            relationship: relationship.into(),
            related_records,
        }
    }

    /// `replaceRelatedRecord`.
    #[must_use]
    pub fn replace_related_record(
        record: RecordIdentity,
        relationship: impl Into<String>,
        related_record: Option<RecordIdentity>,
    ) -> Self {
        Self::ReplaceRelatedRecord {
            record,
            relationship: relationship.into(),
            related_record,
        }
    }

    /// Returns the wire tag of this operation.
    #[must_use]
    pub const fn op_name(&self) -> &'static str {
        match self {
            Self::AddRecord { .. } => "addRecord",
            Self::ReplaceRecord { .. } => "replaceRecord",
            Self::RemoveRecord { .. } => "removeRecord",
            Self::ReplaceKey { .. } => "replaceKey",
            Self::ReplaceAttribute { .. } => "replaceAttribute",
            Self::AddToRelatedRecords { .. } => "addToRelatedRecords",
            Self::RemoveFromRelatedRecords { .. } => "removeFromRelatedRecords",
            Self::ReplaceRelatedRecords { .. } => "replaceRelatedRecords",
            Self::ReplaceRelatedRecord { .. } => "replaceRelatedRecord",
        }
    }

    /// Returns the identity of the record this operation mutates.
    #[must_use]
    pub fn record(&self) -> &RecordIdentity {
        match self {
            Self::AddRecord { record } | Self::ReplaceRecord { record } => &record.identity,
            Self::RemoveRecord { record }
            | Self::ReplaceKey { record, .. }
            | Self::ReplaceAttribute { record, .. }
            | Self::AddToRelatedRecords { record, .. }
            | Self::RemoveFromRelatedRecords { record, .. }
            | Self::ReplaceRelatedRecords { record, .. }
            | Self::ReplaceRelatedRecord { record, .. } => record,
        }
    }

    /// Returns the relationship name for relationship operations.
    #[must_use]
    pub fn relationship(&self) -> Option<&str> {
        match self {
            Self::AddToRelatedRecords { relationship, .. }
            | Self::RemoveFromRelatedRecords { relationship, .. }
            | Self::ReplaceRelatedRecords { relationship, .. }
            | Self::ReplaceRelatedRecord { relationship, .. } => Some(relationship),
            Self::AddRecord { .. }
            | Self::ReplaceRecord { .. }
            | Self::RemoveRecord { .. }
            | Self::ReplaceKey { .. }
            | Self::ReplaceAttribute { .. } => None,
        }
    }

    /// Returns every identity embedded in this operation.
    ///
    /// The subject identity comes first, followed by related identities in
    /// payload order.
    #[must_use]
    pub fn identities(&self) -> Vec<&RecordIdentity> {
        let mut out = vec![self.record()];
        match self {
            Self::AddRecord { record } | Self::ReplaceRecord { record } => {
                out.extend(record.related_identities());
            }
            Self::AddToRelatedRecords { related_record, .. }
            | Self::RemoveFromRelatedRecords { related_record, .. } => out.push(related_record),
            Self::ReplaceRelatedRecords { related_records, .. } => out.extend(related_records),
            Self::ReplaceRelatedRecord { related_record, .. } => out.extend(related_record),
            Self::RemoveRecord { .. } | Self::ReplaceKey { .. } | Self::ReplaceAttribute { .. } => {}
        }
        out
    }
}
