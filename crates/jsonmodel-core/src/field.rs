//! Field descriptors.
//!
//! A [`FieldDescriptor`] describes one attribute of a record schema: the
//! attribute name, the key used in external mappings, the field kind and
//! the null/default policy. Descriptors are immutable once a schema is
//! built and are shared by every record of that schema.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::enumeration::Enumeration;
use crate::error::Result;
use crate::password::PasswordField;
use crate::value::Value;

/// Attributes starting with this marker are protected and left out of the
/// field catalog unless explicitly requested.
pub const PROTECTED_MARKER: char = '_';

/// Closed set of field kinds, without parameters.
///
/// Used wherever a kind has to be named rather than described, e.g. in
/// serializer ignore lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Boolean,
    Integer,
    Float,
    Decimal,
    DateTime,
    Date,
    Time,
    Blob,
    Uuid,
    Ipv4Address,
    ForeignKey,
    Enumeration,
    PasswordHash,
    /// Text and any kind without dedicated conversion rules.
    Other,
}

impl FieldType {
    /// Name of the kind as used in diagnostics and configuration.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            FieldType::Boolean => "boolean",
            FieldType::Integer => "integer",
            FieldType::Float => "float",
            FieldType::Decimal => "decimal",
            FieldType::DateTime => "date_time",
            FieldType::Date => "date",
            FieldType::Time => "time",
            FieldType::Blob => "blob",
            FieldType::Uuid => "uuid",
            FieldType::Ipv4Address => "ipv4_address",
            FieldType::ForeignKey => "foreign_key",
            FieldType::Enumeration => "enumeration",
            FieldType::PasswordHash => "password_hash",
            FieldType::Other => "other",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters of a foreign-key field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    /// Name of the referenced model.
    pub model: String,
    /// For an autogenerated identifier attribute: the relation attribute it
    /// shadows. `None` on the relation itself.
    pub shadows: Option<String>,
}

impl ForeignKey {
    /// A relation to `model`.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            shadows: None,
        }
    }

    /// The identifier shadow of relation attribute `relation`.
    pub fn shadow_of(model: impl Into<String>, relation: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            shadows: Some(relation.into()),
        }
    }
}

/// Field kind together with its kind-specific parameters.
#[derive(Debug, Clone)]
pub enum FieldKind {
    Boolean,
    Integer,
    Float,
    Decimal,
    DateTime,
    Date,
    Time,
    Blob,
    Uuid,
    Ipv4Address,
    ForeignKey(ForeignKey),
    Enumeration(Enumeration),
    PasswordHash(PasswordField),
    Other,
}

impl FieldKind {
    /// The parameterless tag of this kind.
    #[must_use]
    pub const fn field_type(&self) -> FieldType {
        match self {
            FieldKind::Boolean => FieldType::Boolean,
            FieldKind::Integer => FieldType::Integer,
            FieldKind::Float => FieldType::Float,
            FieldKind::Decimal => FieldType::Decimal,
            FieldKind::DateTime => FieldType::DateTime,
            FieldKind::Date => FieldType::Date,
            FieldKind::Time => FieldType::Time,
            FieldKind::Blob => FieldType::Blob,
            FieldKind::Uuid => FieldType::Uuid,
            FieldKind::Ipv4Address => FieldType::Ipv4Address,
            FieldKind::ForeignKey(_) => FieldType::ForeignKey,
            FieldKind::Enumeration(_) => FieldType::Enumeration,
            FieldKind::PasswordHash(_) => FieldType::PasswordHash,
            FieldKind::Other => FieldType::Other,
        }
    }
}

/// Metadata about one record attribute.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    /// Attribute name on the record.
    pub attribute: String,
    /// Key used in external mappings (may differ from the attribute name).
    pub key: String,
    /// Field kind and its parameters.
    pub kind: FieldKind,
    /// Whether the field may hold null.
    pub nullable: bool,
    /// Value a fresh record starts with.
    pub default: Option<Value>,
    /// Whether this is the primary key.
    pub primary_key: bool,
    /// Whether the primary key is generated by the storage layer.
    pub auto_increment: bool,
}

impl FieldDescriptor {
    /// Create a descriptor whose external key equals the attribute name.
    ///
    /// Enumeration fields derive their nullability from their value set; for
    /// every other kind the field starts out non-nullable.
    pub fn new(attribute: impl Into<String>, kind: FieldKind) -> Self {
        let attribute = attribute.into();
        let nullable = match &kind {
            FieldKind::Enumeration(domain) => domain.nullable(),
            _ => false,
        };
        Self {
            key: attribute.clone(),
            attribute,
            kind,
            nullable,
            default: None,
            primary_key: false,
            auto_increment: false,
        }
    }

    /// Set the external key.
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Set the nullable flag.
    ///
    /// Ignored for enumeration fields, whose nullability is derived from the
    /// value set.
    pub fn nullable(mut self, value: bool) -> Self {
        if !matches!(self.kind, FieldKind::Enumeration(_)) {
            self.nullable = value;
        }
        self
    }

    /// Set the default value.
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Mark as primary key.
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Mark as storage-generated.
    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    /// The parameterless kind tag.
    #[must_use]
    pub const fn field_type(&self) -> FieldType {
        self.kind.field_type()
    }

    /// Whether the attribute carries the protection marker.
    #[must_use]
    pub fn is_protected(&self) -> bool {
        self.attribute.starts_with(PROTECTED_MARKER)
    }

    /// Whether this is a foreign-key field.
    #[must_use]
    pub const fn is_foreign_key(&self) -> bool {
        matches!(self.kind, FieldKind::ForeignKey(_))
    }

    /// The relation this field shadows, if it is an autogenerated identifier.
    #[must_use]
    pub fn shadows(&self) -> Option<&str> {
        match &self.kind {
            FieldKind::ForeignKey(fk) => fk.shadows.as_deref(),
            _ => None,
        }
    }

    /// Whether a key must be present when deserializing a new record.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.default.is_none() && !self.nullable
    }

    /// Maximum textual width for fixed-width storage, if the kind has one.
    #[must_use]
    pub fn max_length(&self) -> Option<usize> {
        match &self.kind {
            FieldKind::Enumeration(domain) => Some(domain.max_length()),
            _ => None,
        }
    }

    /// Write path: the value actually stored when `value` is assigned.
    ///
    /// Enumeration fields reject values outside their domain; password-hash
    /// fields hash plaintext input. Every other kind stores the value as is.
    pub fn store(&self, value: Value) -> Result<Value> {
        match &self.kind {
            FieldKind::Enumeration(domain) => domain.check(&value),
            FieldKind::PasswordHash(password) => password.store(value),
            _ => Ok(value),
        }
    }

    /// Read path: the value observed when the stored `value` is read back.
    pub fn load(&self, value: &Value) -> Result<Value> {
        match &self.kind {
            FieldKind::Enumeration(domain) => domain.check_stored(value),
            _ => Ok(value.clone()),
        }
    }
}
