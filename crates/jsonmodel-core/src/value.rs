//! Dynamic values exchanged between external mappings and records.

use std::fmt;
use std::net::Ipv4Addr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use uuid::Uuid;

/// A reference to another record, as held by a foreign-key attribute.
///
/// Foreign keys may hold either the raw identifier of the referenced record
/// (`Value::Int`, `Value::Text`, ...) or a resolved reference. Serialization
/// collapses a resolved reference to its primary key.
#[derive(Debug, Clone, PartialEq)]
pub struct RelatedRecord {
    /// Name of the referenced model.
    pub model: String,
    /// Primary key value of the referenced record.
    pub primary_key: Box<Value>,
}

impl RelatedRecord {
    /// Create a reference to a record of `model` identified by `primary_key`.
    pub fn new(model: impl Into<String>, primary_key: impl Into<Value>) -> Self {
        Self {
            model: model.into(),
            primary_key: Box::new(primary_key.into()),
        }
    }

    /// The referenced record's primary key.
    pub fn primary_key(&self) -> &Value {
        &self.primary_key
    }
}

/// A value stored on a record or read from an external mapping.
///
/// External (JSON) input only ever produces the loosely typed variants
/// (`Null`, `Bool`, `Int`, `Float`, `Text`, `Json`). The typed variants are
/// produced by inbound conversion or assigned directly by the host program.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// SQL/JSON null.
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    DateTime(NaiveDateTime),
    Date(NaiveDate),
    Time(NaiveTime),
    Uuid(Uuid),
    Ipv4(Ipv4Addr),
    /// A resolved foreign-key reference.
    Related(RelatedRecord),
    /// Nested structure (array or object) passed through untouched.
    Json(serde_json::Value),
}

impl Value {
    /// Lift an external JSON value.
    ///
    /// Integral numbers become `Int`, every other number becomes `Float`.
    /// Arrays and objects are kept as `Json`.
    pub fn from_json(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => n.as_f64().map_or(Value::Null, Value::Float),
            },
            serde_json::Value::String(s) => Value::Text(s),
            other @ (serde_json::Value::Array(_) | serde_json::Value::Object(_)) => {
                Value::Json(other)
            }
        }
    }

    /// Render this value as JSON without any field-specific conversion.
    ///
    /// Used for diagnostics; the serializer applies per-kind rules instead.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Value::Related(related) => related.primary_key.to_json(),
            Value::Json(json) => json.clone(),
            other => serde_json::Value::String(other.to_string()),
        }
    }

    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Short type name used in error messages.
    pub const fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Bytes(_) => "bytes",
            Value::DateTime(_) => "datetime",
            Value::Date(_) => "date",
            Value::Time(_) => "time",
            Value::Uuid(_) => "uuid",
            Value::Ipv4(_) => "ipv4",
            Value::Related(_) => "record",
            Value::Json(_) => "json",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{x:?}"),
            Value::Text(s) => write!(f, "{}", s),
            Value::Bytes(b) => write!(f, "<{} bytes>", b.len()),
            Value::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S%.f")),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::Time(t) => write!(f, "{}", t.format("%H:%M:%S%.f")),
            Value::Uuid(u) => write!(f, "{}", u),
            Value::Ipv4(ip) => write!(f, "{}", ip),
            Value::Related(r) => write!(f, "<{} {}>", r.model, r.primary_key),
            Value::Json(j) => write!(f, "{}", j),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::DateTime(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl From<NaiveTime> for Value {
    fn from(v: NaiveTime) -> Self {
        Value::Time(v)
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Value::Uuid(v)
    }
}

impl From<Ipv4Addr> for Value {
    fn from(v: Ipv4Addr) -> Self {
        Value::Ipv4(v)
    }
}

impl From<RelatedRecord> for Value {
    fn from(v: RelatedRecord) -> Self {
        Value::Related(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Value::from_json(v)
    }
}
