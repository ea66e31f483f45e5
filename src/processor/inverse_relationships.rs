//! Inverse relationship maintenance.
//!
//! When a relationship declares an `inverse` in the schema, a change on one
//! side must be mirrored on the other. This processor compares the incoming
//! operation against the committed graph and derives the mirror operations.
//! It emits nothing when the inverse side already agrees, which is what
//! stops mirror operations from bouncing back and forth.

use crate::error::ExecutionError;
use crate::identity::RecordIdentity;
use crate::operation::RecordOperation;
use crate::record::{Record, RelationshipData};
use crate::schema::RelationshipKind;

use super::{OperationProcessor, ProcessorContext};

/// Keeps both sides of declared inverse relationships in sync.
#[derive(Debug, Clone, Copy, Default)]
pub struct InverseRelationshipProcessor;

impl InverseRelationshipProcessor {
    /// Creates the processor.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

fn identities_of(data: Option<&RelationshipData>) -> Vec<RecordIdentity> {
    data.map(|d| d.identities().cloned().collect()).unwrap_or_default()
}

/// Collects mirror operations for one subject relationship.
struct Mirror<'c, 'a> {
    ctx: &'c ProcessorContext<'a>,
    out: Vec<RecordOperation>,
}

impl<'c, 'a> Mirror<'c, 'a> {
    fn new(ctx: &'c ProcessorContext<'a>) -> Self {
        Self {
            ctx,
            out: Vec::new(),
        }
    }

    fn inverse_of(
        &self,
        subject: &RecordIdentity,
        relationship: &str,
        related: &RecordIdentity,
    ) -> Option<(&'a str, RelationshipKind)> {
        let schema = self.ctx.schema;
        let inverse = schema
            .relationship(&subject.model, relationship)?
            .inverse
            .as_deref()?;
        let def = schema.relationship(&related.model, inverse)?;
        Some((inverse, def.kind))
    }

    /// Mirrors a relationship moving from `before` to `after`.
    fn diff(&mut self, subject: &RecordIdentity, relationship: &str, before: &[RecordIdentity], after: &[RecordIdentity]) {
        for related in before.iter().filter(|id| !after.contains(id)) {
            self.unlink(subject, relationship, related);
        }
        for related in after.iter().filter(|id| !before.contains(id)) {
            self.link(subject, relationship, related);
        }
    }

    fn link(&mut self, subject: &RecordIdentity, relationship: &str, related: &RecordIdentity) {
        let Some((inverse, kind)) = self.inverse_of(subject, relationship, related) else { return; };
        let graph = self.ctx.graph;
        if !graph.contains(related) {
            return;
        }
        match kind {
            RelationshipKind::HasMany => {
                if !graph.related_records(related, inverse).contains(subject) {
                    self.out.push(RecordOperation::add_to_related_records(
                        related.clone(),
                        inverse,
                        subject.clone(),
                    ));
                }
            }
            RelationshipKind::HasOne => {
                if graph.related_record(related, inverse) != Some(subject) {
                    self.out.push(RecordOperation::replace_related_record(
                        related.clone(),
                        inverse,
                        Some(subject.clone()),
                    ));
                }
            }
        }
    }

    fn unlink(&mut self, subject: &RecordIdentity, relationship: &str, related: &RecordIdentity) {
        let Some((inverse, kind)) = self.inverse_of(subject, relationship, related) else { return; };
        let graph = self.ctx.graph;
        match kind {
            RelationshipKind::HasMany => {
                if graph.related_records(related, inverse).contains(subject) {
                    self.out.push(RecordOperation::remove_from_related_records(
                        related.clone(),
                        inverse,
                        subject.clone(),
                    ));
                }
            }
            RelationshipKind::HasOne => {
                if graph.related_record(related, inverse) == Some(subject) {
                    self.out
                        .push(RecordOperation::replace_related_record(related.clone(), inverse, None));
                }
            }
        }
    }

    /// Mirrors every relationship carried by an incoming record.
    ///
    /// With `replace_all`, relationships the prior record had but the
    /// incoming one omits count as cleared.
    fn record(&mut self, record: &Record, replace_all: bool) {
        let subject = &record.identity;
        let graph = self.ctx.graph;
        let prior = graph.get(subject);

        let mut names: Vec<&String> = record.relationships.keys().collect();
        if replace_all {
            if let Some(prior) = prior {
                names.extend(prior.relationships.keys().filter(|k| !record.relationships.contains_key(*k)));
            }
        }

        for name in names {
            let before = identities_of(prior.and_then(|p| p.relationship(name)));
            let after = identities_of(record.relationship(name));
            self.diff(subject, name, &before, &after);
        }
    }
}

impl OperationProcessor for InverseRelationshipProcessor {
    fn name(&self) -> &'static str {
        "inverse-relationships"
    }

    fn derive(
        &self,
        ctx: &ProcessorContext<'_>,
        operation: &RecordOperation,
    ) -> Result<Vec<RecordOperation>, ExecutionError> {
        let mut mirror = Mirror::new(ctx);
        match operation {
            RecordOperation::AddRecord { record } => mirror.record(record, true),
            RecordOperation::ReplaceRecord { record } => mirror.record(record, false),
            RecordOperation::RemoveRecord { record } => {
                if let Some(existing) = ctx.graph.get(record) {
                    for (name, data) in &existing.relationships {
                        for related in data.identities() {
                            mirror.unlink(record, name, related);
                        }
                    }
                }
            }
            RecordOperation::AddToRelatedRecords { record, relationship, related_record } => {
                mirror.link(record, relationship, related_record);
            }
            RecordOperation::RemoveFromRelatedRecords { record, relationship, related_record } => {
                mirror.unlink(record, relationship, related_record);
            }
            RecordOperation::ReplaceRelatedRecords { record, relationship, related_records } => {
                let before = ctx.graph.related_records(record, relationship).to_vec();
                mirror.diff(record, relationship, &before, related_records);
            }
            RecordOperation::ReplaceRelatedRecord { record, relationship, related_record } => {
                let before: Vec<RecordIdentity> = ctx.graph.related_record(record, relationship).cloned().into_iter().collect();
                let after: Vec<RecordIdentity> = related_record.iter().cloned().collect();
                mirror.diff(record, relationship, &before, &after);
            }
            RecordOperation::ReplaceKey { .. } | RecordOperation::ReplaceAttribute { .. } => {}
        }
        Ok(mirror.out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::RecordGraph;
    use crate::processor::fixtures::blog_schema;

    fn article(id: &str) -> RecordIdentity {
        RecordIdentity::new("article", id)
    }

    fn author(id: &str) -> RecordIdentity {
        RecordIdentity::new("author", id)
    }

    fn derive(graph: &RecordGraph, op: &RecordOperation) -> Vec<RecordOperation> {
        let schema = blog_schema();
        InverseRelationshipProcessor::new()
            .derive(&ProcessorContext::new(&schema, graph), op)
            .unwrap()
    }

    fn seeded() -> RecordGraph {
        let mut graph = RecordGraph::new();
        graph.put(Record::new("article", "1"));
        graph.put(Record::new("author", "1"));
        graph.put(Record::new("author", "2"));
        graph
    }

    #[test]
    fn test_has_one_links_has_many_inverse() {
        let graph = seeded();
        let ops = derive(
            &graph,
            &RecordOperation::replace_related_record(article("1"), "author", Some(author("1"))),
        );
        assert_eq!(
            ops,
            vec![RecordOperation::add_to_related_records(author("1"), "articles", article("1"))]
        );
    }

    #[test]
    fn test_has_one_swap_unlinks_previous() {
        let mut graph = seeded();
        graph.put(Record::new("article", "1").with_to_one("author", Some(author("1"))));
        graph.put(Record::new("author", "1").with_to_many("articles", vec![article("1")]));

        let ops = derive(
            &graph,
            &RecordOperation::replace_related_record(article("1"), "author", Some(author("2"))),
        );
        assert_eq!(
            ops,
            vec![
                RecordOperation::remove_from_related_records(author("1"), "articles", article("1")),
                RecordOperation::add_to_related_records(author("2"), "articles", article("1")),
            ]
        );
    }

    #[test]
    fn test_has_many_links_has_one_inverse() {
        let graph = seeded();
        let ops = derive(
            &graph,
            &RecordOperation::add_to_related_records(author("1"), "articles", article("1")),
        );
        assert_eq!(
            ops,
            vec![RecordOperation::replace_related_record(article("1"), "author", Some(author("1")))]
        );
    }

    #[test]
    fn test_no_op_when_inverse_already_agrees() {
        let mut graph = seeded();
        graph.put(Record::new("article", "1").with_to_one("author", Some(author("1"))));
        let ops = derive(
            &graph,
            &RecordOperation::add_to_related_records(author("1"), "articles", article("1")),
        );
        assert!(ops.is_empty());
    }

    #[test]
    fn test_many_to_many_replace_set() {
        let mut graph = seeded();
        graph.put(Record::new("article", "1").with_to_many("coauthors", vec![author("1")]));
        graph.put(Record::new("author", "1").with_to_many("coauthored", vec![article("1")]));

        let ops = derive(
            &graph,
            &RecordOperation::replace_related_records(article("1"), "coauthors", vec![author("2")]),
        );
        assert_eq!(
            ops,
            vec![
                RecordOperation::remove_from_related_records(author("1"), "coauthored", article("1")),
                RecordOperation::add_to_related_records(author("2"), "coauthored", article("1")),
            ]
        );
    }

    #[test]
    fn test_remove_record_unlinks_inverses() {
        let mut graph = seeded();
        graph.put(Record::new("author", "1").with_to_many("articles", vec![article("1")]));
        graph.put(Record::new("article", "1").with_to_one("author", Some(author("1"))));

        let ops = derive(&graph, &RecordOperation::remove_record(author("1")));
        assert_eq!(
            ops,
            vec![RecordOperation::replace_related_record(article("1"), "author", None)]
        );
    }

    #[test]
    fn test_add_record_links_and_clears() {
        let mut graph = seeded();
        graph.put(Record::new("article", "1").with_to_many("coauthors", vec![author("1")]));
        graph.put(Record::new("author", "1").with_to_many("coauthored", vec![article("1")]));

        // Overwrite: coauthors omitted, author set.
        let ops = derive(
            &graph,
            &RecordOperation::add_record(Record::new("article", "1").with_to_one("author", Some(author("2")))),
        );
        assert_eq!(
            ops,
            vec![
                RecordOperation::add_to_related_records(author("2"), "articles", article("1")),
                RecordOperation::remove_from_related_records(author("1"), "coauthored", article("1")),
            ]
        );

        // Merge: omitted relationships are untouched.
        let ops = derive(
            &graph,
            &RecordOperation::replace_record(Record::new("article", "1").with_to_one("author", Some(author("2")))),
        );
        assert_eq!(
            ops,
            vec![RecordOperation::add_to_related_records(author("2"), "articles", article("1"))]
        );
    }

    #[test]
    fn test_absent_related_record_not_created() {
        let graph = seeded();
        let ops = derive(
            &graph,
            &RecordOperation::replace_related_record(article("1"), "author", Some(author("404"))),
        );
        assert!(ops.is_empty());
    }

    #[test]
    fn test_relationship_without_inverse_ignored() {
        let graph = seeded();
        let ops = derive(
            &graph,
            &RecordOperation::add_to_related_records(article("1"), "related", article("2")),
        );
        assert!(ops.is_empty());
    }
}
