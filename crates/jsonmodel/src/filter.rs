//! Key filtering.
//!
//! Deserialization: decides which catalog fields are read from the input
//! mapping, enforces required keys on full deserialization and, in strict
//! mode, rejects input keys that no field consumed.
//!
//! Serialization: [`Ignore`] drops fields by external key, attribute name or
//! field kind.

use std::collections::BTreeSet;

use jsonmodel_core::{Error, FieldContext, FieldDescriptor, FieldType, Schema};
use serde::Deserialize;
use serde_json::{Map, Value as JsonValue};

use crate::catalog::{self, CatalogOptions};
use crate::options::DeserializeOptions;

/// One input value selected for assignment.
#[derive(Debug, Clone, Copy)]
pub struct Selected<'a> {
    pub field: &'a FieldDescriptor,
    pub key: &'a str,
    pub value: &'a JsonValue,
}

/// Select the input values to assign to a record of `schema`.
///
/// With `patch` unset, a required field absent from `mapping` fails with
/// [`Error::MissingKey`]. In strict mode every key of `mapping` that was not
/// consumed, or that `allow`/`deny` rejects, is reported together in
/// [`Error::InvalidKeys`].
pub fn select<'a>(
    schema: &'a Schema,
    mapping: &'a Map<String, JsonValue>,
    options: &DeserializeOptions,
    patch: bool,
) -> Result<Vec<Selected<'a>>, Error> {
    let catalog_options = CatalogOptions::default()
        .protected(options.protected)
        .auto_increment(false)
        .foreign_keys(options.foreign_keys);

    let mut selected = Vec::new();
    let mut consumed: BTreeSet<&str> = BTreeSet::new();

    for field in catalog::list_fields(schema, catalog_options) {
        let key = field.key.as_str();
        if !options.admits_key(key) {
            continue;
        }
        consumed.insert(key);

        match mapping.get(key) {
            Some(value) => selected.push(Selected { field, key, value }),
            None if !patch && field.is_required() => {
                return Err(Error::MissingKey(FieldContext::new(schema.name(), field)));
            }
            None => {}
        }
    }

    if options.strict {
        let invalid: BTreeSet<String> = mapping
            .keys()
            .filter(|key| !options.admits_key(key) || !consumed.contains(key.as_str()))
            .cloned()
            .collect();
        if !invalid.is_empty() {
            tracing::debug!(model = schema.name(), keys = ?invalid, "Rejecting unknown keys");
            return Err(Error::InvalidKeys(invalid));
        }
    }

    Ok(selected)
}

/// One entry of an ignore list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreItem {
    /// External key or attribute name.
    Name(String),
    /// Every field of this kind.
    Type(FieldType),
}

impl From<&str> for IgnoreItem {
    fn from(name: &str) -> Self {
        IgnoreItem::Name(name.to_string())
    }
}

impl From<String> for IgnoreItem {
    fn from(name: String) -> Self {
        IgnoreItem::Name(name)
    }
}

impl From<FieldType> for IgnoreItem {
    fn from(field_type: FieldType) -> Self {
        IgnoreItem::Type(field_type)
    }
}

/// Fields left out of serialized output.
///
/// A field is ignored when its external key or attribute name is listed in
/// `names`, or its kind is listed in `types`.
///
/// ```
/// use jsonmodel::{FieldType, Ignore, IgnoreItem};
///
/// let ignore = Ignore::from([IgnoreItem::from("secret"), FieldType::Blob.into()]);
/// assert!(ignore.names.contains("secret"));
/// assert!(ignore.types.contains(&FieldType::Blob));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Ignore {
    pub names: BTreeSet<String>,
    pub types: BTreeSet<FieldType>,
}

impl Ignore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also ignore the field with this key or attribute name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.names.insert(name.into());
        self
    }

    /// Also ignore every field of this kind.
    pub fn field_type(mut self, field_type: FieldType) -> Self {
        self.types.insert(field_type);
        self
    }

    /// Whether `field` is ignored.
    pub fn matches(&self, field: &FieldDescriptor) -> bool {
        self.names.contains(&field.key)
            || self.names.contains(&field.attribute)
            || self.types.contains(&field.field_type())
    }

    fn push(&mut self, item: IgnoreItem) {
        match item {
            IgnoreItem::Name(name) => {
                self.names.insert(name);
            }
            IgnoreItem::Type(field_type) => {
                self.types.insert(field_type);
            }
        }
    }
}

impl From<&str> for Ignore {
    fn from(name: &str) -> Self {
        Self::new().name(name)
    }
}

impl From<String> for Ignore {
    fn from(name: String) -> Self {
        Self::new().name(name)
    }
}

impl From<FieldType> for Ignore {
    fn from(field_type: FieldType) -> Self {
        Self::new().field_type(field_type)
    }
}

impl FromIterator<IgnoreItem> for Ignore {
    fn from_iter<I: IntoIterator<Item = IgnoreItem>>(iter: I) -> Self {
        let mut ignore = Self::new();
        for item in iter {
            ignore.push(item);
        }
        ignore
    }
}

impl From<Vec<IgnoreItem>> for Ignore {
    fn from(items: Vec<IgnoreItem>) -> Self {
        items.into_iter().collect()
    }
}

impl<const N: usize> From<[IgnoreItem; N]> for Ignore {
    fn from(items: [IgnoreItem; N]) -> Self {
        items.into_iter().collect()
    }
}
