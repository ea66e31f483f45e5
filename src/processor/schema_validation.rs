//! Schema validation processor.
//!
//! Rejects any operation that names a model type the schema does not
//! register. Every check reduces to one schema lookup per identity.

use crate::error::ValidationError;
use crate::identity::RecordIdentity;
use crate::operation::RecordOperation;
use crate::record::Record;
use crate::schema::Schema;

use super::{OperationProcessor, ProcessorContext};

/// Ensures every identity in an operation refers to a registered model.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaValidationProcessor;

impl SchemaValidationProcessor {
    /// Creates the processor.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

fn validate_identity(schema: &Schema, identity: &RecordIdentity) -> Result<(), ValidationError> {
    schema.model(&identity.model).map(|_| ())
}

/// The record's own identity, then every identity held in its relationships.
fn validate_record(schema: &Schema, record: &Record) -> Result<(), ValidationError> {
    validate_identity(schema, &record.identity)?;
    record
        .related_identities()
        .try_for_each(|related| validate_identity(schema, related))
}

impl OperationProcessor for SchemaValidationProcessor {
    fn name(&self) -> &'static str {
        "schema-validation"
    }

    fn validate(&self, ctx: &ProcessorContext<'_>, operation: &RecordOperation) -> Result<(), ValidationError> {
        let schema = ctx.schema;
        match operation {
            RecordOperation::AddRecord { record } | RecordOperation::ReplaceRecord { record } => {
                validate_record(schema, record)
            }
            RecordOperation::RemoveRecord { record }
            | RecordOperation::ReplaceKey { record, .. }
            | RecordOperation::ReplaceAttribute { record, .. } => validate_identity(schema, record),
            RecordOperation::AddToRelatedRecords { record, related_record, .. }
            | RecordOperation::RemoveFromRelatedRecords { record, related_record, .. } => {
                validate_identity(schema, record)?;
                validate_identity(schema, related_record)
            }
            RecordOperation::ReplaceRelatedRecords { record, related_records, .. } => {
                validate_identity(schema, record)?;
                related_records
                    .iter()
                    .try_for_each(|related| validate_identity(schema, related))
            }
            RecordOperation::ReplaceRelatedRecord { record, related_record, .. } => {
                validate_identity(schema, record)?;
                match related_record {
                    Some(related) => validate_identity(schema, related),
                    None => Ok(()),
                }
            }
        }
    }
}
