//! Schema registry.
//!
//! The schema maps model type names to their definitions. It is built once,
//! checked for referential sanity, and then only read by the pipeline.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::error::ValidationError;

/// Errors raised while constructing a schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// A relationship points at a model that is not registered.
    #[error("Relationship '{model}.{relationship}' references unknown model '{related}'")]
    UnknownRelatedModel {
        model: String,
        relationship: String,
        related: String,
    },

    /// A declared inverse does not exist on the related model.
    #[error("Inverse '{related}.{inverse}' of relationship '{model}.{relationship}' is not defined")]
    MissingInverse {
        model: String,
        relationship: String,
        related: String,
        inverse: String,
    },

    /// A declared inverse does not point back at the original relationship.
    #[error("Inverse '{related}.{inverse}' does not point back to '{model}.{relationship}'")]
    InverseMismatch {
        model: String,
        relationship: String,
        related: String,
        inverse: String,
    },

    /// Schema JSON could not be decoded.
    #[error("Failed to decode schema: {0}")]
    Decode(String),
}

/// Cardinality of a relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RelationshipKind {
    /// At most one related record.
    HasOne,
    /// A set of related records.
    HasMany,
}

impl RelationshipKind {
    /// Returns `true` for `HasOne`.
    pub const fn is_has_one(&self) -> bool {
        matches!(self, Self::HasOne)
    }

    /// Returns `true` for `HasMany`.
    pub const fn is_has_many(&self) -> bool {
        matches!(self, Self::HasMany)
    }
}

/// Definition of one attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDefinition {
    /// Declared value type (e.g. `"string"`), informational only.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,
}

/// Definition of one secondary key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyDefinition {}

/// Definition of one relationship.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipDefinition {
    /// Cardinality.
    #[serde(rename = "type")]
    pub kind: RelationshipKind,

    /// Related model type. `None` leaves the relationship polymorphic.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Name of the relationship on the related model that mirrors this one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inverse: Option<String>,
}

impl RelationshipDefinition {
    /// Creates a `hasOne` relationship to `model`.
    #[must_use]
    pub fn has_one(model: impl Into<String>) -> Self {
        Self {
            kind: RelationshipKind::HasOne,
            model: Some(model.into()),
            inverse: None,
        }
    }

    /// Creates a `hasMany` relationship to `model`.
    #[must_use]
    pub fn has_many(model: impl Into<String>) -> Self {
        Self {
            kind: RelationshipKind::HasMany,
            model: Some(model.into()),
            inverse: None,
        }
    }

    /// Sets the inverse relationship name.
    #[must_use]
    pub fn with_inverse(mut self, inverse: impl Into<String>) -> Self {
        self.inverse = Some(inverse.into());
        self
    }
}

/// Definition of one model type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDefinition {
    /// Attribute definitions by name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, AttributeDefinition>,

    /// Key definitions by name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub keys: BTreeMap<String, KeyDefinition>,

    /// Relationship definitions by name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub relationships: BTreeMap<String, RelationshipDefinition>,
}

impl ModelDefinition {
    /// Creates an empty model definition.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an attribute.
    #[must_use]
    pub fn attribute(mut self, name: impl Into<String>, value_type: impl Into<String>) -> Self {
        self.attributes.insert(
            name.into(),
            AttributeDefinition {
                value_type: Some(value_type.into()),
            },
        );
        self
    }

    /// Adds a secondary key.
    #[must_use]
    pub fn key(mut self, name: impl Into<String>) -> Self {
        self.keys.insert(name.into(), KeyDefinition::default());
        self
    }

    /// Adds a relationship.
    #[must_use]
    pub fn relationship(mut self, name: impl Into<String>, def: RelationshipDefinition) -> Self {
        self.relationships.insert(name.into(), def);
        self
    }
}

#[derive(Deserialize)]
struct SchemaDocument {
    #[serde(default)]
    models: BTreeMap<String, ModelDefinition>,
}

/// Registry of model types.
///
/// # Examples
///
/// ```
/// use recordcache::{ModelDefinition, Schema};
///
/// let schema = Schema::builder()
///     .model("article", ModelDefinition::new().attribute("title", "string"))
///     .build()
///     .unwrap();
///
/// assert!(schema.has_model("article"));
/// assert!(schema.model("comment").is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Schema {
    models: BTreeMap<String, ModelDefinition>,
}

impl Schema {
    /// Creates a schema from model definitions, checking relationship references.
    pub fn new(models: BTreeMap<String, ModelDefinition>) -> Result<Self, SchemaError> {
        let schema = Self { models };
        schema.check_relationships()?;
        Ok(schema)
    }

    /// Returns a builder.
    #[must_use]
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// Decodes a schema from `{ "models": { ... } }` JSON.
    pub fn from_json(s: &str) -> Result<Self, SchemaError> {
        let doc: SchemaDocument =
            serde_json::from_str(s).map_err(|e| SchemaError::Decode(e.to_string()))?;
        Self::new(doc.models)
    }

    /// Looks up a model definition.
    ///
    /// # Errors
    /// `ModelNotFound` if `model` is not registered.
    pub fn model(&self, model: &str) -> Result<&ModelDefinition, ValidationError> {
        self.models
            .get(model)
            .ok_or_else(|| ValidationError::model_not_found(model))
    }

    /// Returns true if `model` is registered.
    #[must_use]
    pub fn has_model(&self, model: &str) -> bool {
        self.models.contains_key(model)
    }

    /// Iterates over registered model names.
    pub fn model_names(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }

    /// Looks up a relationship definition, if both model and relationship exist.
    #[must_use]
    pub fn relationship(&self, model: &str, relationship: &str) -> Option<&RelationshipDefinition> {
        self.models.get(model)?.relationships.get(relationship)
    }

    /// Generates a fresh record id for `model`.
    ///
    /// Ids are random UUIDs; the model name is not encoded in them.
    pub fn generate_id(&self, model: &str) -> Result<String, ValidationError> {
        self.model(model)?;
        Ok(Uuid::new_v4().to_string())
    }

    fn check_relationships(&self) -> Result<(), SchemaError> {
        for (model, def) in &self.models {
            for (name, rel) in &def.relationships {
                let Some(related) = rel.model.as_deref() else { continue; };
                let Some(related_def) = self.models.get(related) else {
                    return Err(SchemaError::UnknownRelatedModel {
                        model: model.clone(),
                        relationship: name.clone(),
                        related: related.to_string(),
                    });
                };

                let Some(inverse) = rel.inverse.as_deref() else { continue; };
                let Some(inverse_def) = related_def.relationships.get(inverse) else {
                    return Err(SchemaError::MissingInverse {
                        model: model.clone(),
                        relationship: name.clone(),
                        related: related.to_string(),
                        inverse: inverse.to_string(),
                    });
                };

                let points_back = inverse_def.inverse.as_deref() == Some(name.as_str())
                    && inverse_def.model.as_deref().map_or(true, |m| m == model);
                if !points_back {
                    return Err(SchemaError::InverseMismatch {
                        model: model.clone(),
                        relationship: name.clone(),
                        related: related.to_string(),
                        inverse: inverse.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Builder for [`Schema`].
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    models: BTreeMap<String, ModelDefinition>,
}

impl SchemaBuilder {
    /// Registers a model.
    #[must_use]
    pub fn model(mut self, name: impl Into<String>, def: ModelDefinition) -> Self {
        self.models.insert(name.into(), def);
        self
    }

    /// Builds and checks the schema.
    pub fn build(self) -> Result<Schema, SchemaError> {
        Schema::new(self.models)
    }
}
