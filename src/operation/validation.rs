//! Structural operation validation.
//!
//! Rejects operations whose fields are present but unusable (empty identity
//! parts, empty field names) before they reach any processor. Schema checks
//! live in the schema validation processor, not here.

use crate::error::ValidationError;
use crate::identity::RecordIdentity;
use crate::operation::operations::{RecordOperation, Transform};
use crate::record::Record;

/// Upper bound for model, id and field names.
pub const MAX_NAME_LEN: usize = 1024;

/// Validate a non-empty trimmed name.
fn validate_name(field: &'static str, value: &str) -> Result<(), ValidationError> {
    let v = value.trim();
    if v.is_empty() {
        return Err(ValidationError::MissingField {
            field: field.to_string(),
        });
    }
    if v.len() > MAX_NAME_LEN {
        return Err(ValidationError::InvalidField {
            field: field.to_string(),
            reason: format!("exceeds maximum length of {MAX_NAME_LEN}"),
        });
    }
    Ok(())
}

fn validate_identity(identity: &RecordIdentity) -> Result<(), ValidationError> {
    validate_name("type", &identity.model)?;
    validate_name("id", &identity.id)?;
    Ok(())
}

fn validate_record(record: &Record) -> Result<(), ValidationError> {
    validate_identity(&record.identity)?;
    for name in record.attributes.keys() {
        validate_name("attribute", name)?;
    }
    for name in record.keys.keys() {
        validate_name("key", name)?;
    }
    for (name, data) in &record.relationships {
        validate_name("relationship", name)?;
        for related in data.identities() {
            validate_identity(related)?;
        }
    }
    Ok(())
}

impl RecordOperation {
    /// Validates the operation's structure.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::AddRecord { record } | Self::ReplaceRecord { record } => validate_record(record),
            Self::RemoveRecord { record } => validate_identity(record),
            Self::ReplaceKey { record, key, .. } => {
                validate_identity(record)?;
                validate_name("key", key)
            }
            Self::ReplaceAttribute { record, attribute, .. } => {
                validate_identity(record)?;
                validate_name("attribute", attribute)
            }
            Self::AddToRelatedRecords { record, relationship, related_record }
            | Self::RemoveFromRelatedRecords { record, relationship, related_record } => {
                validate_identity(record)?;
                validate_name("relationship", relationship)?;
                validate_identity(related_record)
            }
            Self::ReplaceRelatedRecords { record, relationship, related_records } => {
                validate_identity(record)?;
                validate_name("relationship", relationship)?;
                related_records.iter().try_for_each(validate_identity)
            }
            Self::ReplaceRelatedRecord { record, relationship, related_record } => {
                validate_identity(record)?;
                validate_name("relationship", relationship)?;
                related_record.iter().try_for_each(validate_identity)
            }
        }
    }
}

impl Transform {
    /// Validates every operation in the transform.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.operations.is_empty() {
            return Err(ValidationError::MissingField {
                field: "operations".to_string(),
            });
        }
        self.operations.iter().try_for_each(RecordOperation::validate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article() -> RecordIdentity {
        RecordIdentity::new("article", "1")
    }

    #[test]
    fn test_valid_operations_pass() {
        let ops = vec![
            RecordOperation::add_record(Record::new("article", "1").with_attribute("title", "x")),
            RecordOperation::remove_record(article()),
            RecordOperation::replace_key(article(), "remoteId", "a1"),
            RecordOperation::replace_related_record(article(), "author", None),
            RecordOperation::replace_related_records(article(), "comments", vec![]),
        ];
        for op in ops {
            assert!(op.validate().is_ok(), "{op:?}");
        }
    }

    #[test]
    fn test_empty_id_rejected() {
        let op = RecordOperation::remove_record(RecordIdentity::new("article", "  "));
        assert_eq!(
            op.validate().unwrap_err(),
            ValidationError::MissingField {
                field: "id".to_string()
            }
        );
    }

    #[test]
    fn test_empty_relationship_rejected() {
        let op = RecordOperation::add_to_related_records(article(), "", RecordIdentity::new("comment", "1"));
        assert!(matches!(op.validate(), Err(ValidationError::MissingField { field }) if field == "relationship"));
    }

    #[test]
    fn test_malformed_related_identity_in_set_rejected() {
        let op = RecordOperation::replace_related_records(
            article(),
            "comments",
            vec![RecordIdentity::new("comment", "1"), RecordIdentity::new("", "2")],
        );
        assert!(matches!(op.validate(), Err(ValidationError::MissingField { field }) if field == "type"));
    }

    #[test]
    fn test_overlong_name_rejected() {
        let op = RecordOperation::replace_attribute(article(), "x".repeat(MAX_NAME_LEN + 1), 1);
        assert!(matches!(op.validate(), Err(ValidationError::InvalidField { .. })));
    }

    #[test]
    fn test_record_relationship_identities_checked() {
        let op = RecordOperation::add_record(
            Record::new("article", "1").with_to_one("author", Some(RecordIdentity::new("author", ""))),
        );
        assert!(op.validate().is_err());
    }

    #[test]
    fn test_empty_transform_rejected() {
        let transform = Transform::new(vec![]);
        assert!(matches!(transform.validate(), Err(ValidationError::MissingField { .. })));
    }
}
