//! Record access.
//!
//! The conversion engine never owns records. It reaches them through two
//! traits: [`RecordType`] creates blank records of a schema, and [`Record`]
//! reads and writes attribute values on an instance. [`DynamicRecord`] is a
//! ready-made implementation whose values live in a hash map, for record
//! types whose schema is only known at runtime.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::field::{FieldDescriptor, FieldKind};
use crate::password::HashedPassword;
use crate::schema::Schema;
use crate::value::{RelatedRecord, Value};

/// A live record whose attributes are accessed by name.
pub trait Record {
    /// Schema of the record's type.
    fn schema(&self) -> &Schema;

    /// Raw stored value of `attribute`; null when unset.
    fn get(&self, attribute: &str) -> Value;

    /// Replace the raw stored value of `attribute`.
    fn set(&mut self, attribute: &str, value: Value);

    /// Descriptor of `attribute`.
    fn field(&self, attribute: &str) -> Result<&FieldDescriptor> {
        let schema = self.schema();
        schema
            .descriptor_of(attribute)
            .ok_or_else(|| Error::UnknownAttribute {
                model: schema.name().to_string(),
                attribute: attribute.to_string(),
            })
    }

    /// Read `attribute` through its field's read path.
    fn read(&self, attribute: &str) -> Result<Value> {
        self.field(attribute)?.load(&self.get(attribute))
    }

    /// Assign `attribute` through its field's write path.
    fn write(&mut self, attribute: &str, value: Value) -> Result<()> {
        let stored = self.field(attribute)?.store(value)?;
        self.set(attribute, stored);
        Ok(())
    }

    /// Read a password-hash attribute as a verifiable hash.
    ///
    /// Returns `None` while the attribute is null.
    fn password(&self, attribute: &str) -> Result<Option<HashedPassword>> {
        match &self.field(attribute)?.kind {
            FieldKind::PasswordHash(password) => Ok(password.load(&self.get(attribute))),
            _ => Err(Error::Password(format!(
                "{}.{} is not a password field",
                self.schema().name(),
                attribute
            ))),
        }
    }
}

/// Something that can produce blank records of one schema.
pub trait RecordType {
    type Record: Record;

    fn schema(&self) -> &Schema;

    /// A fresh record with every default applied.
    fn instantiate(&self) -> Self::Record;
}

impl RecordType for Arc<Schema> {
    type Record = DynamicRecord;

    fn schema(&self) -> &Schema {
        self
    }

    fn instantiate(&self) -> DynamicRecord {
        DynamicRecord::new(Arc::clone(self))
    }
}

/// A record whose values are stored in a map keyed by attribute name.
///
/// Identifier shadows of relations share their relation's slot: writing
/// `owner_id` replaces `owner`, and reading `owner_id` yields the referenced
/// record's primary key.
///
/// ```
/// use std::sync::Arc;
/// use jsonmodel_core::{DynamicRecord, FieldDescriptor, FieldKind, Record, Schema, Value};
///
/// let schema = Arc::new(
///     Schema::builder("User")
///         .field(FieldDescriptor::new("name", FieldKind::Other))
///         .build()
///         .unwrap(),
/// );
/// let mut user = DynamicRecord::new(schema);
/// user.set("name", Value::from("Alice"));
/// assert_eq!(user.get("name").as_str(), Some("Alice"));
/// ```
#[derive(Debug, Clone)]
pub struct DynamicRecord {
    schema: Arc<Schema>,
    values: HashMap<String, Value>,
}

impl DynamicRecord {
    /// A blank record with every default applied.
    pub fn new(schema: Arc<Schema>) -> Self {
        let values = schema
            .fields()
            .iter()
            .filter(|f| f.shadows().is_none())
            .filter_map(|f| f.default.clone().map(|d| (f.attribute.clone(), d)))
            .collect();
        Self { schema, values }
    }

    /// Whether `attribute` currently holds a value.
    pub fn has(&self, attribute: &str) -> bool {
        self.values.contains_key(self.slot(attribute))
    }

    /// Remove a value, returning it.
    pub fn remove(&mut self, attribute: &str) -> Option<Value> {
        let slot = self.slot(attribute).to_string();
        self.values.remove(&slot)
    }

    /// Value of the primary key, null when unset or when there is none.
    pub fn primary_key_value(&self) -> Value {
        self.schema
            .primary_key()
            .map_or(Value::Null, |pk| self.get(&pk.attribute))
    }

    /// A foreign-key reference to this record.
    pub fn to_related(&self) -> RelatedRecord {
        RelatedRecord::new(self.schema.name(), self.primary_key_value())
    }

    fn slot<'a>(&'a self, attribute: &'a str) -> &'a str {
        self.schema
            .descriptor_of(attribute)
            .and_then(FieldDescriptor::shadows)
            .unwrap_or(attribute)
    }
}

impl Record for DynamicRecord {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn get(&self, attribute: &str) -> Value {
        let value = self.values.get(self.slot(attribute)).cloned();
        let shadowed = self
            .schema
            .descriptor_of(attribute)
            .is_some_and(|f| f.shadows().is_some());
        match value {
            Some(Value::Related(related)) if shadowed => *related.primary_key,
            Some(value) => value,
            None => Value::Null,
        }
    }

    fn set(&mut self, attribute: &str, value: Value) {
        let slot = self.slot(attribute).to_string();
        self.values.insert(slot, value);
    }
}

impl PartialEq for DynamicRecord {
    fn eq(&self, other: &Self) -> bool {
        self.schema.name() == other.schema.name() && self.values == other.values
    }
}
