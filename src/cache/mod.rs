//! Record cache: the operation pipeline.
//!
//! Every mutation enters through [`RecordCache::patch`] or
//! [`RecordCache::transform`]. For each operation the cache runs, in order:
//!
//! 1. structural validation of the operation itself,
//! 2. every processor's `validate` hook, in registration order,
//! 3. every processor's `derive` hook, against the pre-apply graph,
//! 4. the apply itself, recording the touched record's prior state,
//! 5. the same steps for each derived operation, depth-first.
//!
//! Any failure restores every recorded prior state in reverse order, so a
//! rejected transform leaves the graph exactly as it found it.

mod config;

pub use config::CacheConfig;

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{CacheResult, ExecutionError};
use crate::graph::{RecordGraph, UndoEntry};
use crate::identity::RecordIdentity;
use crate::operation::{RecordOperation, Transform};
use crate::processor::{
    CacheIntegrityProcessor, InverseRelationshipProcessor, OperationProcessor, ProcessorContext,
    SchemaValidationProcessor,
};
use crate::record::Record;
use crate::schema::Schema;

/// Result of a committed transform.
#[derive(Debug, Clone, PartialEq)]
pub struct PatchOutcome {
    /// Id of the committed transform.
    pub transform_id: Uuid,
    /// Every applied operation, in apply order (originals and derived).
    pub applied: Vec<RecordOperation>,
    /// How many of `applied` were derived by processors.
    pub derived_count: usize,
}

/// In-memory record graph guarded by an ordered processor pipeline.
///
/// # Examples
///
/// ```
/// use recordcache::{ModelDefinition, Record, RecordCache, RecordOperation, Schema};
///
/// let schema = Schema::builder()
///     .model("article", ModelDefinition::new().attribute("title", "string"))
///     .build()
///     .unwrap();
/// let mut cache = RecordCache::new(schema);
///
/// cache
///     .patch(RecordOperation::add_record(Record::new("article", "1").with_attribute("title", "x")))
///     .unwrap();
/// assert!(cache.patch(RecordOperation::add_record(Record::new("comment", "9"))).is_err());
/// assert_eq!(cache.graph().len(), 1);
/// ```
pub struct RecordCache {
    schema: Arc<Schema>,
    graph: RecordGraph,
    processors: Vec<Box<dyn OperationProcessor>>,
    config: CacheConfig,
}

impl RecordCache {
    /// Creates a cache with the default processors.
    pub fn new(schema: impl Into<Arc<Schema>>) -> Self {
        Self::with_config(schema, CacheConfig::default())
    }

    /// Creates a cache whose default processors are selected by `config`.
    ///
    /// Registration order is schema validation, cache integrity, then
    /// inverse relationships.
    pub fn with_config(schema: impl Into<Arc<Schema>>, config: CacheConfig) -> Self {
        let mut processors: Vec<Box<dyn OperationProcessor>> = Vec::new();
        if config.validate_schema {
            processors.push(Box::new(SchemaValidationProcessor::new()));
        }
        if config.maintain_integrity {
            processors.push(Box::new(CacheIntegrityProcessor::new()));
        }
        if config.maintain_inverses {
            processors.push(Box::new(InverseRelationshipProcessor::new()));
        }
        Self::with_processors(schema, config, processors)
    }

    /// Creates a cache with an explicit processor list, run in the given order.
    ///
    /// The `validate_schema`/`maintain_*` flags of `config` are ignored.
    pub fn with_processors(
        schema: impl Into<Arc<Schema>>,
        config: CacheConfig,
        processors: Vec<Box<dyn OperationProcessor>>,
    ) -> Self {
        Self {
            schema: schema.into(),
            graph: RecordGraph::new(),
            processors,
            config,
        }
    }

    /// Appends a processor to the end of the pipeline.
    pub fn register(&mut self, processor: Box<dyn OperationProcessor>) {
        self.processors.push(processor);
    }

    /// The schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Committed graph state.
    pub fn graph(&self) -> &RecordGraph {
        &self.graph
    }

    /// The configuration.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Names of registered processors, in run order.
    pub fn processor_names(&self) -> Vec<&'static str> {
        self.processors.iter().map(|p| p.name()).collect()
    }

    /// Looks up a committed record.
    pub fn record(&self, identity: &RecordIdentity) -> Option<&Record> {
        self.graph.get(identity)
    }

    /// Runs structural and processor validation without deriving or applying.
    pub fn validate(&self, operation: &RecordOperation) -> CacheResult<()> {
        operation.validate()?;
        let ctx = ProcessorContext::new(&self.schema, &self.graph);
        for processor in &self.processors {
            processor.validate(&ctx, operation)?;
        }
        Ok(())
    }

    /// Applies one operation and everything it derives, atomically.
    pub fn patch(&mut self, operation: RecordOperation) -> CacheResult<PatchOutcome> {
        self.transform(Transform::from(operation))
    }

    /// Applies every operation of `transform` and everything they derive, atomically.
    pub fn transform(&mut self, transform: Transform) -> CacheResult<PatchOutcome> {
        let transform_id = transform.id;
        if let Err(err) = transform.validate() {
            warn!(transform = %transform_id, error = %err, "transform rejected before processing");
            return Err(err.into());
        }

        let originals = transform.operations.len();
        let mut journal = Vec::new();
        let mut applied = Vec::new();

        match self.run(transform.operations, &mut journal, &mut applied) {
            Ok(()) => {
                let derived_count = applied.len() - originals;
                debug!(
                    transform = %transform_id,
                    applied = applied.len(),
                    derived = derived_count,
                    "transform committed"
                );
                Ok(PatchOutcome {
                    transform_id,
                    applied,
                    derived_count,
                })
            }
            Err(err) => {
                let undone = journal.len();
                self.rollback(journal);
                warn!(transform = %transform_id, error = %err, undone, "transform rejected; graph rolled back");
                Err(err)
            }
        }
    }

    fn run(
        &mut self,
        operations: Vec<RecordOperation>,
        journal: &mut Vec<UndoEntry>,
        applied: &mut Vec<RecordOperation>,
    ) -> CacheResult<()> {
        let limit = self.config.max_operations_per_transform;
        let mut pending: Vec<RecordOperation> = operations.into_iter().rev().collect();

        while let Some(operation) = pending.pop() {
            if applied.len() >= limit {
                return Err(ExecutionError::OperationLimitExceeded { limit }.into());
            }
            operation.validate()?;

            let derived = {
                let ctx = ProcessorContext::new(&self.schema, &self.graph);
                for processor in &self.processors {
                    if let Err(err) = processor.validate(&ctx, &operation) {
                        debug!(processor = processor.name(), op = operation.op_name(), record = %operation.record(), "operation rejected");
                        return Err(err.into());
                    }
                }

                // Processors may derive the same cleanup; keep the first.
                let mut derived: Vec<RecordOperation> = Vec::new();
                for processor in &self.processors {
                    for op in processor.derive(&ctx, &operation)? {
                        if !derived.contains(&op) {
                            derived.push(op);
                        }
                    }
                }
                derived
            };

            journal.push(self.graph.apply(&operation)?);
            debug!(
                op = operation.op_name(),
                record = %operation.record(),
                derived = derived.len(),
                "operation applied"
            );
            applied.push(operation);
            pending.extend(derived.into_iter().rev());
        }
        Ok(())
    }

    fn rollback(&mut self, journal: Vec<UndoEntry>) {
        for entry in journal.into_iter().rev() {
            self.graph.restore(entry);
        }
    }
}

impl fmt::Debug for RecordCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordCache")
            .field("records", &self.graph.len())
            .field("processors", &self.processor_names())
            .field("config", &self.config)
            .finish()
    }
}
