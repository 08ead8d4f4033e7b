//! Record-type schemas.
//!
//! A [`Schema`] is the ordered set of field descriptors of one record type.
//! It is built once through [`SchemaBuilder`] and shared read-only.
//!
//! # Foreign-key shadows
//!
//! Declaring a relation with [`SchemaBuilder::foreign_key`] also declares the
//! identifier attribute `<relation>_id`, which reads and writes the same
//! underlying value and uses the same external key. The shadow records the
//! relation it belongs to, so the field catalog can drop it without guessing
//! from attribute names.

use std::collections::HashMap;

use crate::error::SchemaError;
use crate::field::{FieldDescriptor, FieldKind, ForeignKey};

/// Suffix of the identifier attribute generated for each relation.
pub const SHADOW_SUFFIX: &str = "_id";

/// The field layout of a record type.
#[derive(Debug, Clone)]
pub struct Schema {
    name: String,
    fields: Vec<FieldDescriptor>,
}

impl Schema {
    /// Start defining a schema for the record type `name`.
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Name of the record type.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Field descriptors in declaration order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Attribute names in declaration order.
    pub fn attributes(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.attribute.as_str())
    }

    /// Descriptor of attribute `name`.
    pub fn descriptor_of(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.attribute == name)
    }

    /// The primary-key descriptor, if the schema has one.
    pub fn primary_key(&self) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.primary_key)
    }
}

/// Builder for [`Schema`].
#[derive(Debug)]
pub struct SchemaBuilder {
    name: String,
    fields: Vec<FieldDescriptor>,
}

impl SchemaBuilder {
    /// Add a field.
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// Add an auto-incrementing integer primary key named `attribute`.
    pub fn auto_primary_key(self, attribute: &str) -> Self {
        self.field(
            FieldDescriptor::new(attribute, FieldKind::Integer)
                .primary_key()
                .auto_increment(),
        )
    }

    /// Add a non-null relation `attribute` to `model`, plus its identifier shadow.
    pub fn foreign_key(self, attribute: &str, model: &str) -> Self {
        self.relation(FieldDescriptor::new(
            attribute,
            FieldKind::ForeignKey(ForeignKey::new(model)),
        ))
    }

    /// Add a relation field, plus its identifier shadow.
    ///
    /// The shadow copies the relation's external key, nullability and default.
    /// Descriptors that are not relations are added unchanged.
    pub fn relation(mut self, field: FieldDescriptor) -> Self {
        let model = match &field.kind {
            FieldKind::ForeignKey(fk) if fk.shadows.is_none() => Some(fk.model.clone()),
            _ => None,
        };
        let Some(model) = model else {
            return self.field(field);
        };

        let mut shadow = FieldDescriptor::new(
            format!("{}{}", field.attribute, SHADOW_SUFFIX),
            FieldKind::ForeignKey(ForeignKey::shadow_of(model, field.attribute.clone())),
        )
        .key(field.key.clone())
        .nullable(field.nullable);
        shadow.default.clone_from(&field.default);

        self.fields.push(field);
        self.fields.push(shadow);
        self
    }

    /// Validate and finish the schema.
    ///
    /// Attribute names must be unique, and so must external keys, except
    /// that a shadow shares its relation's key.
    pub fn build(self) -> Result<Schema, SchemaError> {
        let mut by_attribute: HashMap<&str, &FieldDescriptor> = HashMap::new();
        for field in &self.fields {
            if by_attribute.insert(&field.attribute, field).is_some() {
                return Err(SchemaError::DuplicateAttribute(field.attribute.clone()));
            }
        }

        for field in &self.fields {
            if let Some(relation) = field.shadows() {
                if !by_attribute
                    .get(relation)
                    .is_some_and(|r| r.is_foreign_key() && r.shadows().is_none())
                {
                    return Err(SchemaError::UnknownRelation {
                        attribute: field.attribute.clone(),
                        relation: relation.to_string(),
                    });
                }
            }
        }

        let mut by_key: HashMap<&str, &FieldDescriptor> = HashMap::new();
        for field in &self.fields {
            if let Some(existing) = by_key.get(field.key.as_str()) {
                let aliased = field.shadows() == Some(existing.attribute.as_str())
                    || existing.shadows() == Some(field.attribute.as_str());
                if !aliased {
                    return Err(SchemaError::DuplicateKey {
                        key: field.key.clone(),
                        attributes: (existing.attribute.clone(), field.attribute.clone()),
                    });
                }
                continue;
            }
            by_key.insert(&field.key, field);
        }

        tracing::debug!(
            model = %self.name,
            fields = self.fields.len(),
            "Built schema"
        );

        Ok(Schema {
            name: self.name,
            fields: self.fields,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declaration_order_kept() {
        let schema = Schema::builder("User")
            .auto_primary_key("id")
            .field(FieldDescriptor::new("name", FieldKind::Other))
            .field(FieldDescriptor::new("age", FieldKind::Integer))
            .build()
            .unwrap();
        assert_eq!(schema.attributes().collect::<Vec<_>>(), ["id", "name", "age"]);
        assert_eq!(schema.primary_key().unwrap().attribute, "id");
        assert!(schema.descriptor_of("age").is_some());
        assert!(schema.descriptor_of("missing").is_none());
    }

    #[test]
    fn test_foreign_key_adds_shadow() {
        let schema = Schema::builder("Pet")
            .foreign_key("owner", "User")
            .build()
            .unwrap();
        let shadow = schema.descriptor_of("owner_id").unwrap();
        assert_eq!(shadow.key, "owner");
        assert_eq!(shadow.shadows(), Some("owner"));
        assert!(schema.descriptor_of("owner").unwrap().shadows().is_none());
    }

    #[test]
    fn test_duplicate_attribute_rejected() {
        let err = Schema::builder("User")
            .field(FieldDescriptor::new("name", FieldKind::Other))
            .field(FieldDescriptor::new("name", FieldKind::Other))
            .build()
            .unwrap_err();
        assert_eq!(err, SchemaError::DuplicateAttribute("name".to_string()));
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let err = Schema::builder("User")
            .field(FieldDescriptor::new("name", FieldKind::Other))
            .field(FieldDescriptor::new("nickname", FieldKind::Other).key("name"))
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateKey { ref key, .. } if key == "name"));
    }

    #[test]
    fn test_dangling_shadow_rejected() {
        let err = Schema::builder("Pet")
            .field(FieldDescriptor::new(
                "owner_id",
                FieldKind::ForeignKey(ForeignKey::shadow_of("User", "owner")),
            ))
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::UnknownRelation { .. }));
    }
}
