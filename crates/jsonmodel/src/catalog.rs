//! Field catalog.
//!
//! Selects which fields of a schema take part in a conversion: protected
//! attributes, primary keys and foreign keys are filtered per call, and the
//! identifier shadow of a relation is dropped whenever the relation itself is
//! listed under the same external key.

use std::collections::HashMap;

use jsonmodel_core::{FieldDescriptor, Schema};

/// Which kinds of fields a catalog listing includes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogOptions {
    /// Include attributes starting with the protection marker.
    pub protected: bool,
    /// Include primary-key fields.
    pub primary_key: bool,
    /// Include storage-generated primary keys. Only meaningful together
    /// with `primary_key`.
    pub auto_increment: bool,
    /// Include foreign-key fields.
    pub foreign_keys: bool,
}

impl Default for CatalogOptions {
    fn default() -> Self {
        Self {
            protected: false,
            primary_key: true,
            auto_increment: true,
            foreign_keys: false,
        }
    }
}

impl CatalogOptions {
    pub fn protected(mut self, value: bool) -> Self {
        self.protected = value;
        self
    }

    pub fn primary_key(mut self, value: bool) -> Self {
        self.primary_key = value;
        self
    }

    pub fn auto_increment(mut self, value: bool) -> Self {
        self.auto_increment = value;
        self
    }

    pub fn foreign_keys(mut self, value: bool) -> Self {
        self.foreign_keys = value;
        self
    }

    fn admits(&self, field: &FieldDescriptor) -> bool {
        if !self.protected && field.is_protected() {
            return false;
        }
        if field.primary_key && (!self.primary_key || (field.auto_increment && !self.auto_increment))
        {
            return false;
        }
        self.foreign_keys || !field.is_foreign_key()
    }
}

/// List the fields of `schema` selected by `options`, in declaration order.
pub fn list_fields(schema: &Schema, options: CatalogOptions) -> Vec<&FieldDescriptor> {
    let admitted: Vec<&FieldDescriptor> = schema
        .fields()
        .iter()
        .filter(|field| options.admits(field))
        .collect();

    if !options.foreign_keys {
        return admitted;
    }

    let keys_by_relation: HashMap<&str, &str> = admitted
        .iter()
        .filter(|f| f.is_foreign_key() && f.shadows().is_none())
        .map(|f| (f.attribute.as_str(), f.key.as_str()))
        .collect();

    admitted
        .into_iter()
        .filter(|field| {
            field
                .shadows()
                .and_then(|relation| keys_by_relation.get(relation))
                .is_none_or(|key| *key != field.key)
        })
        .collect()
}

/// The catalog keyed by external key.
pub fn map_fields(schema: &Schema, options: CatalogOptions) -> HashMap<&str, &FieldDescriptor> {
    list_fields(schema, options)
        .into_iter()
        .map(|field| (field.key.as_str(), field))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonmodel_core::{FieldKind, ForeignKey};

    fn pets() -> Schema {
        Schema::builder("Pet")
            .auto_primary_key("id")
            .field(FieldDescriptor::new("name", FieldKind::Other))
            .field(FieldDescriptor::new("_notes", FieldKind::Other).nullable(true))
            .foreign_key("owner", "User")
            .build()
            .unwrap()
    }

    fn attributes(fields: &[&FieldDescriptor]) -> Vec<String> {
        fields.iter().map(|f| f.attribute.clone()).collect()
    }

    #[test]
    fn test_default_listing() {
        let schema = pets();
        let fields = list_fields(&schema, CatalogOptions::default());
        assert_eq!(attributes(&fields), ["id", "name"]);
    }

    #[test]
    fn test_protected_and_primary_key_flags() {
        let schema = pets();
        let fields = list_fields(
            &schema,
            CatalogOptions::default().protected(true).primary_key(false),
        );
        assert_eq!(attributes(&fields), ["name", "_notes"]);

        let fields = list_fields(&schema, CatalogOptions::default().auto_increment(false));
        assert_eq!(attributes(&fields), ["name"]);
    }

    #[test]
    fn test_shadow_foreign_key_deduplicated() {
        let schema = pets();
        let fields = list_fields(&schema, CatalogOptions::default().foreign_keys(true));
        assert_eq!(attributes(&fields), ["id", "name", "owner"]);

        let mapped = map_fields(&schema, CatalogOptions::default().foreign_keys(true));
        assert_eq!(mapped["owner"].attribute, "owner");
    }

    #[test]
    fn test_shadow_with_own_key_kept() {
        let mut shadow = FieldDescriptor::new(
            "owner_id",
            FieldKind::ForeignKey(ForeignKey::shadow_of("User", "owner")),
        );
        shadow.key = "ownerId".to_string();
        let schema = Schema::builder("Pet")
            .field(FieldDescriptor::new(
                "owner",
                FieldKind::ForeignKey(ForeignKey::new("User")),
            ))
            .field(shadow)
            .build()
            .unwrap();

        let fields = list_fields(&schema, CatalogOptions::default().foreign_keys(true));
        assert_eq!(attributes(&fields), ["owner", "owner_id"]);
    }
}
