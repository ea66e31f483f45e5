//! In-memory record graph.
//!
//! The graph owns all committed record state. It is mutated only through
//! [`RecordGraph::apply`], which the cache calls after every processor has
//! accepted an operation. Each apply hands back the record's prior state so
//! a failed transform can be rolled back exactly.
//!
//! The graph is not synchronized; callers sharing one across threads must
//! serialize access themselves.

use std::collections::BTreeMap;

use crate::error::ExecutionError;
use crate::identity::RecordIdentity;
use crate::operation::RecordOperation;
use crate::record::{Record, RelationshipData};

/// Prior state of one record, captured before an apply.
#[derive(Debug, Clone, PartialEq)]
pub struct UndoEntry {
    /// Record the apply touched.
    pub identity: RecordIdentity,
    /// State before the apply; `None` if the record did not exist.
    pub prior: Option<Record>,
}

/// A relationship on some record that points at a given identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundReference {
    /// Record holding the reference.
    pub record: RecordIdentity,
    /// Relationship name on that record.
    pub relationship: String,
    /// Whether the relationship is to-many.
    pub to_many: bool,
}

fn kind_mismatch(record: &RecordIdentity, relationship: &str, expected: &'static str) -> ExecutionError {
    ExecutionError::RelationshipKindMismatch {
        record: record.clone(),
        relationship: relationship.to_string(),
        expected,
    }
}

/// Returns true if `record` holds `relationship` with data of the other kind.
fn holds_other_kind(record: Option<&Record>, relationship: &str, to_many: bool) -> bool {
    record
        .and_then(|r| r.relationship(relationship))
        .is_some_and(|data| data.is_to_many() != to_many)
}

/// Committed records keyed by identity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordGraph {
    records: BTreeMap<RecordIdentity, Record>,
}

impl RecordGraph {
    /// Create a new empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the graph holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Get a record by identity.
    #[must_use]
    pub fn get(&self, identity: &RecordIdentity) -> Option<&Record> {
        self.records.get(identity)
    }

    /// Returns true if a record with this identity exists.
    #[must_use]
    pub fn contains(&self, identity: &RecordIdentity) -> bool {
        self.records.contains_key(identity)
    }

    /// Iterate over all records in identity order.
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.records.values()
    }

    /// Returns the to-one related identity, if set.
    #[must_use]
    pub fn related_record(&self, identity: &RecordIdentity, relationship: &str) -> Option<&RecordIdentity> {
        match self.get(identity)?.relationship(relationship)? {
            RelationshipData::ToOne(related) => related.as_ref(),
            RelationshipData::ToMany(_) => None,
        }
    }

    /// Returns the to-many related identities; empty if unset.
    #[must_use]
    pub fn related_records(&self, identity: &RecordIdentity, relationship: &str) -> &[RecordIdentity] {
        match self.get(identity).and_then(|r| r.relationship(relationship)) {
            Some(RelationshipData::ToMany(ids)) => ids,
            _ => &[],
        }
    }

    /// Finds every relationship on another record that references `identity`.
    #[must_use]
    pub fn inbound_references(&self, identity: &RecordIdentity) -> Vec<InboundReference> {
        let mut out = Vec::new();
        for record in self.records.values() {
            if &record.identity == identity {
                continue;
            }
            for (name, data) in &record.relationships {
                if data.contains(identity) {
                    out.push(InboundReference {
                        record: record.identity.clone(),
                        relationship: name.clone(),
                        to_many: data.is_to_many(),
                    });
                }
            }
        }
        out
    }

    /// Store a record directly, bypassing the pipeline.
    ///
    /// Intended for seeding; returns the replaced record, if any.
    pub fn put(&mut self, record: Record) -> Option<Record> {
        self.records.insert(record.identity.clone(), record)
    }

    /// Delete a record directly, bypassing the pipeline.
    pub fn delete(&mut self, identity: &RecordIdentity) -> Option<Record> {
        self.records.remove(identity)
    }

    /// Apply one operation, returning the touched record's prior state.
    ///
    /// On error the graph is unchanged.
    pub fn apply(&mut self, operation: &RecordOperation) -> Result<UndoEntry, ExecutionError> {
        let identity = operation.record().clone();
        let prior = self.records.get(&identity).cloned();

        match operation {
            RecordOperation::AddRecord { record } => {
                self.records.insert(identity.clone(), record.clone());
            }
            RecordOperation::ReplaceRecord { record } => {
                self.entry(&identity).merge(record);
            }
            RecordOperation::RemoveRecord { .. } => {
                self.records.remove(&identity);
            }
            RecordOperation::ReplaceKey { key, value, .. } => {
                self.entry(&identity).keys.insert(key.clone(), value.clone());
            }
            RecordOperation::ReplaceAttribute { attribute, value, .. } => {
                self.entry(&identity)
                    .attributes
                    .insert(attribute.clone(), value.clone());
            }
            RecordOperation::AddToRelatedRecords { relationship, related_record, .. } => {
                if holds_other_kind(prior.as_ref(), relationship, true) {
                    return Err(kind_mismatch(&identity, relationship, "to-many"));
                }
                let data = self
                    .entry(&identity)
                    .relationships
                    .entry(relationship.clone())
                    .or_insert_with(|| RelationshipData::ToMany(Vec::new()));
                if let RelationshipData::ToMany(ids) = data {
                    if !ids.contains(related_record) {
                        ids.push(related_record.clone());
                    }
                }
            }
            RecordOperation::RemoveFromRelatedRecords { relationship, related_record, .. } => {
                let Some(record) = self.records.get_mut(&identity) else {
                    return Ok(UndoEntry { identity, prior });
                };
                match record.relationships.get_mut(relationship) {
                    Some(RelationshipData::ToMany(ids)) => ids.retain(|id| id != related_record),
                    Some(RelationshipData::ToOne(_)) => {
                        return Err(kind_mismatch(&identity, relationship, "to-many"));
                    }
                    None => {}
                }
            }
            RecordOperation::ReplaceRelatedRecords { relationship, related_records, .. } => {
                if holds_other_kind(prior.as_ref(), relationship, true) {
                    return Err(kind_mismatch(&identity, relationship, "to-many"));
                }
                let mut deduped: Vec<RecordIdentity> = Vec::with_capacity(related_records.len());
                for id in related_records {
                    if !deduped.contains(id) {
                        deduped.push(id.clone());
                    }
                }
                self.entry(&identity)
                    .relationships
                    .insert(relationship.clone(), RelationshipData::ToMany(deduped));
            }
            RecordOperation::ReplaceRelatedRecord { relationship, related_record, .. } => {
                if holds_other_kind(prior.as_ref(), relationship, false) {
                    return Err(kind_mismatch(&identity, relationship, "to-one"));
                }
                self.entry(&identity)
                    .relationships
                    .insert(relationship.clone(), RelationshipData::ToOne(related_record.clone()));
            }
        }

        Ok(UndoEntry { identity, prior })
    }

    /// Put a record back into the state captured by `entry`.
    pub fn restore(&mut self, entry: UndoEntry) {
        match entry.prior {
            Some(record) => {
                self.records.insert(entry.identity, record);
            }
            None => {
                self.records.remove(&entry.identity);
            }
        }
    }

    fn entry(&mut self, identity: &RecordIdentity) -> &mut Record {
        self.records
            .entry(identity.clone())
            .or_insert_with(|| Record::from_identity(identity.clone()))
    }
}
