//! Cache integrity processor.
//!
//! Removing a record must not leave other records pointing at it. On
//! `removeRecord` this processor derives one cleanup operation per inbound
//! reference found in the graph.

use crate::error::ExecutionError;
use crate::operation::RecordOperation;

use super::{OperationProcessor, ProcessorContext};

/// Drops dangling references to removed records.
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheIntegrityProcessor;

impl CacheIntegrityProcessor {
    /// Creates the processor.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl OperationProcessor for CacheIntegrityProcessor {
    fn name(&self) -> &'static str {
        "cache-integrity"
    }

    fn derive(
        &self,
        ctx: &ProcessorContext<'_>,
        operation: &RecordOperation,
    ) -> Result<Vec<RecordOperation>, ExecutionError> {
        let RecordOperation::RemoveRecord { record } = operation else {
            return Ok(Vec::new());
        };

        let ops = ctx
            .graph
            .inbound_references(record)
            .into_iter()
            .map(|r| {
                if r.to_many {
                    RecordOperation::remove_from_related_records(r.record, r.relationship, record.clone())
                } else {
                    RecordOperation::replace_related_record(r.record, r.relationship, None)
                }
            })
            .collect();
        Ok(ops)
    }
}
