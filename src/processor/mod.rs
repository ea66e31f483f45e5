//! Operation processors.
//!
//! A processor reacts to every operation entering the cache. It may reject
//! the operation in [`OperationProcessor::validate`], or return follow-up
//! operations from [`OperationProcessor::derive`] that keep the graph
//! consistent. Processors never mutate the graph; the cache applies the
//! original and derived operations itself.

mod cache_integrity;
mod inverse_relationships;
mod schema_validation;

pub use cache_integrity::CacheIntegrityProcessor;
pub use inverse_relationships::InverseRelationshipProcessor;
pub use schema_validation::SchemaValidationProcessor;

use crate::error::{ExecutionError, ValidationError};
use crate::graph::RecordGraph;
use crate::operation::RecordOperation;
use crate::schema::Schema;

/// Read-only state handed to every processor hook.
#[derive(Debug, Clone, Copy)]
pub struct ProcessorContext<'a> {
    /// The schema the cache was built with.
    pub schema: &'a Schema,
    /// Committed graph state as of this operation (before it is applied).
    pub graph: &'a RecordGraph,
}

impl<'a> ProcessorContext<'a> {
    /// Creates a context.
    #[must_use]
    pub const fn new(schema: &'a Schema, graph: &'a RecordGraph) -> Self {
        Self { schema, graph }
    }
}

/// A pluggable unit run for every operation.
///
/// Both hooks default to no-ops, so a processor implements only what it
/// needs. Hooks must be pure with respect to the context: calling either
/// twice with the same inputs yields the same result.
pub trait OperationProcessor: Send + Sync {
    /// Name used in logs and error reports.
    fn name(&self) -> &'static str;

    /// Rejects operations that must not be applied.
    fn validate(&self, _ctx: &ProcessorContext<'_>, _operation: &RecordOperation) -> Result<(), ValidationError> {
        Ok(())
    }

    /// Returns operations to apply alongside `operation`.
    fn derive(
        &self,
        _ctx: &ProcessorContext<'_>,
        _operation: &RecordOperation,
    ) -> Result<Vec<RecordOperation>, ExecutionError> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::schema::{ModelDefinition, RelationshipDefinition, Schema};

    /// `article` and `author`, linked both one-to-many and many-to-many.
    pub(crate) fn blog_schema() -> Schema {
        Schema::builder()
            .model(
                "article",
                ModelDefinition::new()
                    .attribute("title", "string")
                    .key("remoteId")
                    .relationship("author", RelationshipDefinition::has_one("author").with_inverse("articles"))
                    .relationship(
                        "coauthors",
                        RelationshipDefinition::has_many("author").with_inverse("coauthored"),
                    )
                    .relationship("related", RelationshipDefinition::has_many("article")),
            )
            .model(
                "author",
                ModelDefinition::new()
                    .attribute("name", "string")
                    .relationship("articles", RelationshipDefinition::has_many("article").with_inverse("author"))
                    .relationship(
                        "coauthored",
                        RelationshipDefinition::has_many("article").with_inverse("coauthors"),
                    ),
            )
            .build()
            .expect("blog schema is well-formed")
    }
}
