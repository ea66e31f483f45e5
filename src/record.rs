//! Records and relationship data.
//!
//! A record is an identity plus optional attributes, secondary keys, and
//! relationships to other records. Relationships store identities only; the
//! related records live in the graph under their own identities.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::identity::RecordIdentity;

/// Data held by one named relationship of a record.
///
/// Serialized untagged: a to-many relationship is a JSON array of
/// identities, a to-one relationship is a single identity or `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RelationshipData {
    /// Set of related records, insertion order preserved.
    ToMany(Vec<RecordIdentity>),
    /// Single related record, or none.
    ToOne(Option<RecordIdentity>),
}

impl RelationshipData {
    /// Returns true for to-one data.
    #[must_use]
    pub const fn is_to_one(&self) -> bool {
        matches!(self, Self::ToOne(_))
    }

    /// Returns true for to-many data.
    #[must_use]
    pub const fn is_to_many(&self) -> bool {
        matches!(self, Self::ToMany(_))
    }

    /// Returns true if `identity` is among the related records.
    #[must_use]
    pub fn contains(&self, identity: &RecordIdentity) -> bool {
        match self {
            Self::ToMany(ids) => ids.contains(identity),
            Self::ToOne(id) => id.as_ref() == Some(identity),
        }
    }

    /// Iterates over every related identity.
    pub fn identities(&self) -> impl Iterator<Item = &RecordIdentity> {
        let slice: &[RecordIdentity] = match self {
            Self::ToMany(ids) => ids,
            Self::ToOne(id) => id.as_slice(),
        };
        slice.iter()
    }

    /// Returns a short human-readable kind name.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::ToMany(_) => "to-many",
            Self::ToOne(_) => "to-one",
        }
    }
}

/// A normalized record.
///
/// # Examples
///
/// ```
/// use recordcache::{Record, RecordIdentity};
///
/// let article = Record::new("article", "1")
///     .with_attribute("title", "x")
///     .with_to_one("author", Some(RecordIdentity::new("author", "7")));
///
/// assert_eq!(article.attribute("title"), Some(&serde_json::json!("x")));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// The record's identity.
    #[serde(flatten)]
    pub identity: RecordIdentity,

    /// Attribute values by attribute name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, serde_json::Value>,

    /// Secondary key values by key name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub keys: BTreeMap<String, String>,

    /// Relationship data by relationship name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub relationships: BTreeMap<String, RelationshipData>,
}

impl Record {
    /// Creates an empty record with the given identity.
    #[must_use]
    pub fn new(model: impl Into<String>, id: impl Into<String>) -> Self {
        Self::from_identity(RecordIdentity::new(model, id))
    }

    /// Creates an empty record for an existing identity.
    #[must_use]
    pub fn from_identity(identity: RecordIdentity) -> Self {
        Self {
            identity,
            attributes: BTreeMap::new(),
            keys: BTreeMap::new(),
            relationships: BTreeMap::new(),
        }
    }

    /// Sets an attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Sets a secondary key.
    #[must_use]
    pub fn with_key(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.keys.insert(name.into(), value.into());
        self
    }

    /// Sets a to-one relationship.
    #[must_use]
    pub fn with_to_one(mut self, name: impl Into<String>, related: Option<RecordIdentity>) -> Self {
        self.relationships
            .insert(name.into(), RelationshipData::ToOne(related));
        self
    }

    /// Sets a to-many relationship.
    #[must_use]
    pub fn with_to_many(mut self, name: impl Into<String>, related: Vec<RecordIdentity>) -> Self {
        self.relationships
            .insert(name.into(), RelationshipData::ToMany(related));
        self
    }

    /// Returns an attribute value.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&serde_json::Value> {
        self.attributes.get(name)
    }

    /// Returns a key value.
    #[must_use]
    pub fn key(&self, name: &str) -> Option<&str> {
        self.keys.get(name).map(String::as_str)
    }

    /// Returns relationship data.
    #[must_use]
    pub fn relationship(&self, name: &str) -> Option<&RelationshipData> {
        self.relationships.get(name)
    }

    /// Iterates over every identity referenced by this record's relationships.
    pub fn related_identities(&self) -> impl Iterator<Item = &RecordIdentity> {
        self.relationships.values().flat_map(RelationshipData::identities)
    }

    /// Merges `other` into this record: fields present in `other` win.
    pub fn merge(&mut self, other: &Self) {
        for (k, v) in &other.attributes {
            self.attributes.insert(k.clone(), v.clone());
        }
        for (k, v) in &other.keys {
            self.keys.insert(k.clone(), v.clone());
        }
        for (k, v) in &other.relationships {
            self.relationships.insert(k.clone(), v.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_relationship_data_untagged_json() {
        let many: RelationshipData = serde_json::from_value(json!([
            { "type": "comment", "id": "1" },
            { "type": "comment", "id": "2" }
        ]))
        .unwrap();
        assert!(many.is_to_many());
        assert_eq!(many.identities().count(), 2);

        let one: RelationshipData =
            serde_json::from_value(json!({ "type": "author", "id": "1" })).unwrap();
        assert_eq!(one, RelationshipData::ToOne(Some(RecordIdentity::new("author", "1"))));

        let none: RelationshipData = serde_json::from_value(json!(null)).unwrap();
        assert_eq!(none, RelationshipData::ToOne(None));
        assert_eq!(none.identities().count(), 0);
    }

    #[test]
    fn test_record_json_shape() {
        let record = Record::new("article", "1")
            .with_attribute("title", "x")
            .with_to_one("author", None);
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "article",
                "id": "1",
                "attributes": { "title": "x" },
                "relationships": { "author": null }
            })
        );

        let decoded: Record = serde_json::from_value(value).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn test_record_without_optional_sections() {
        let decoded: Record = serde_json::from_value(json!({ "type": "comment", "id": "9" })).unwrap();
        assert_eq!(decoded.identity, RecordIdentity::new("comment", "9"));
        assert!(decoded.attributes.is_empty());
        assert!(decoded.relationships.is_empty());
    }

    #[test]
    fn test_merge_overwrites_present_fields_only() {
        let mut base = Record::new("article", "1")
            .with_attribute("title", "old")
            .with_attribute("body", "kept")
            .with_key("remoteId", "a1");
        let patch = Record::new("article", "1").with_attribute("title", "new");
        base.merge(&patch);

        assert_eq!(base.attribute("title"), Some(&json!("new")));
        assert_eq!(base.attribute("body"), Some(&json!("kept")));
        assert_eq!(base.key("remoteId"), Some("a1"));
    }

    #[test]
    fn test_related_identities_spans_all_relationships() {
        let record = Record::new("article", "1")
            .with_to_one("author", Some(RecordIdentity::new("author", "1")))
            .with_to_many(
                "comments",
                vec![RecordIdentity::new("comment", "1"), RecordIdentity::new("comment", "2")],
            );
        assert_eq!(record.related_identities().count(), 3);
        assert!(record
            .relationship("comments")
            .unwrap()
            .contains(&RecordIdentity::new("comment", "2")));
    }
}
