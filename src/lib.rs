//! # recordcache - Schema-checked mutation pipeline for a normalized record graph
//!
//! recordcache holds typed, identity-addressed records and the relationships
//! between them, and only lets them change through a closed set of atomic
//! operations. Every operation passes an ordered pipeline of processors that
//! can reject it or derive follow-up operations before anything is committed.
//!
//! ## Core Concepts
//!
//! - **RecordIdentity**: The `(type, id)` pair that addresses a record
//! - **RecordOperation**: One atomic mutation intent (add record, replace attribute, ...)
//! - **OperationProcessor**: A pipeline stage that validates or derives operations
//! - **RecordCache**: Runs the pipeline and commits to the record graph, all or nothing
//!
//! ## Usage
//!
//! ```rust,ignore
//! use recordcache::{ModelDefinition, Record, RecordCache, RecordIdentity, RecordOperation,
//!     RelationshipDefinition, Schema};
//!
//! let schema = Schema::builder()
//!     .model("article", ModelDefinition::new()
//!         .relationship("author", RelationshipDefinition::has_one("author").with_inverse("articles")))
//!     .model("author", ModelDefinition::new()
//!         .relationship("articles", RelationshipDefinition::has_many("article").with_inverse("author")))
//!     .build()?;
//!
//! let mut cache = RecordCache::new(schema);
//! cache.patch(RecordOperation::add_record(Record::new("author", "7")))?;
//! cache.patch(RecordOperation::add_record(
//!     Record::new("article", "1").with_to_one("author", Some(RecordIdentity::new("author", "7"))),
//! ))?;
//!
//! // The inverse side was kept in sync.
//! assert_eq!(cache.graph().related_records(&RecordIdentity::new("author", "7"), "articles").len(), 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Data model
pub mod error;
pub mod identity;
pub mod record;
pub mod schema;

// Operations and pipeline
pub mod cache;
pub mod graph;
pub mod operation;
pub mod processor;

// Re-export primary types at crate root for convenience
pub use cache::{CacheConfig, PatchOutcome, RecordCache};
pub use error::{CacheError, CacheResult, ExecutionError, ValidationError};
pub use graph::{InboundReference, RecordGraph, UndoEntry};
pub use identity::RecordIdentity;
pub use operation::{RecordOperation, Transform};
pub use processor::{
    CacheIntegrityProcessor, InverseRelationshipProcessor, OperationProcessor, ProcessorContext,
    SchemaValidationProcessor,
};
pub use record::{Record, RelationshipData};
pub use schema::{
    AttributeDefinition, KeyDefinition, ModelDefinition, RelationshipDefinition, RelationshipKind,
    Schema, SchemaBuilder, SchemaError,
};
