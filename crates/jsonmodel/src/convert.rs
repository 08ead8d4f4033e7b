//! Value conversion table.
//!
//! Every [`FieldType`] maps to one [`Converter`]: an inbound function that
//! coerces an external value into the field's typed value, and an outbound
//! function that renders a typed value as JSON. The table is a set of
//! `static` items selected by an exhaustive match, so a new field kind cannot
//! be added without deciding how it converts.
//!
//! Null handling sits in front of the table: inbound nulls are rejected for
//! non-nullable fields and passed through otherwise, outbound nulls are
//! always passed through.

use std::fmt;
use std::net::Ipv4Addr;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use jsonmodel_core::parse::{parse_date, parse_datetime, parse_time};
use jsonmodel_core::{Error, FieldDescriptor, FieldKind, FieldType, Value};
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// Why an inbound value could not be converted.
#[derive(Debug, Clone, PartialEq)]
pub enum ConversionError {
    /// Null supplied for a non-nullable field.
    NullViolation,
    /// The value cannot be coerced to the field's type.
    TypeMismatch(String),
    /// The value is outside an enumeration field's domain.
    InvalidEnumerationValue(Value),
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionError::NullViolation => write!(f, "null violation"),
            ConversionError::TypeMismatch(reason) => write!(f, "type mismatch: {}", reason),
            ConversionError::InvalidEnumerationValue(value) => {
                write!(f, "invalid enumeration value: \"{}\"", value)
            }
        }
    }
}

impl std::error::Error for ConversionError {}

fn mismatch(expected: &str, value: &Value) -> ConversionError {
    ConversionError::TypeMismatch(format!("expected {}, got {}", expected, value.type_name()))
}

/// Inbound conversion of a non-null external value.
pub type Inbound = fn(&Value, &FieldDescriptor) -> Result<Value, ConversionError>;

/// Outbound conversion of a non-null typed value.
pub type Outbound = fn(&Value, &FieldDescriptor) -> JsonValue;

/// The pair of conversion functions for one field kind.
#[derive(Clone, Copy)]
pub struct Converter {
    pub inbound: Inbound,
    pub outbound: Outbound,
}

impl fmt::Debug for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Converter").finish_non_exhaustive()
    }
}

static BOOLEAN: Converter = Converter {
    inbound: boolean_in,
    outbound: identity_out,
};
static INTEGER: Converter = Converter {
    inbound: integer_in,
    outbound: identity_out,
};
static FLOAT: Converter = Converter {
    inbound: float_in,
    outbound: float_out,
};
static DATETIME: Converter = Converter {
    inbound: datetime_in,
    outbound: identity_out,
};
static DATE: Converter = Converter {
    inbound: date_in,
    outbound: identity_out,
};
static TIME: Converter = Converter {
    inbound: time_in,
    outbound: identity_out,
};
static BLOB: Converter = Converter {
    inbound: blob_in,
    outbound: blob_out,
};
static UUID: Converter = Converter {
    inbound: uuid_in,
    outbound: identity_out,
};
static IPV4: Converter = Converter {
    inbound: ipv4_in,
    outbound: identity_out,
};
static FOREIGN_KEY: Converter = Converter {
    inbound: foreign_key_in,
    outbound: identity_out,
};
static ENUMERATION: Converter = Converter {
    inbound: enumeration_in,
    outbound: identity_out,
};
static PASSWORD_HASH: Converter = Converter {
    inbound: password_in,
    outbound: identity_out,
};
static OTHER: Converter = Converter {
    inbound: identity_in,
    outbound: identity_out,
};

/// The converter for `field_type`.
pub fn converter(field_type: FieldType) -> &'static Converter {
    match field_type {
        FieldType::Boolean => &BOOLEAN,
        FieldType::Integer => &INTEGER,
        FieldType::Float | FieldType::Decimal => &FLOAT,
        FieldType::DateTime => &DATETIME,
        FieldType::Date => &DATE,
        FieldType::Time => &TIME,
        FieldType::Blob => &BLOB,
        FieldType::Uuid => &UUID,
        FieldType::Ipv4Address => &IPV4,
        FieldType::ForeignKey => &FOREIGN_KEY,
        FieldType::Enumeration => &ENUMERATION,
        FieldType::PasswordHash => &PASSWORD_HASH,
        FieldType::Other => &OTHER,
    }
}

/// Convert an external value into the typed value for `field`.
pub fn to_typed(value: &Value, field: &FieldDescriptor) -> Result<Value, ConversionError> {
    if value.is_null() {
        if !field.nullable {
            return Err(ConversionError::NullViolation);
        }
        return Ok(Value::Null);
    }
    (converter(field.field_type()).inbound)(value, field)
}

/// Convert a typed value of `field` into JSON.
pub fn to_external(value: &Value, field: &FieldDescriptor) -> JsonValue {
    if value.is_null() {
        return JsonValue::Null;
    }
    (converter(field.field_type()).outbound)(value, field)
}

fn identity_in(value: &Value, _field: &FieldDescriptor) -> Result<Value, ConversionError> {
    Ok(value.clone())
}

fn identity_out(value: &Value, _field: &FieldDescriptor) -> JsonValue {
    value.to_json()
}

fn boolean_in(value: &Value, _field: &FieldDescriptor) -> Result<Value, ConversionError> {
    match value {
        Value::Bool(b) => Ok(Value::Bool(*b)),
        Value::Int(0) => Ok(Value::Bool(false)),
        Value::Int(1) => Ok(Value::Bool(true)),
        other => Err(mismatch("boolean or 0/1", other)),
    }
}

fn integer_in(value: &Value, _field: &FieldDescriptor) -> Result<Value, ConversionError> {
    match value {
        Value::Int(i) => Ok(Value::Int(*i)),
        Value::Bool(b) => Ok(Value::Int(i64::from(*b))),
        Value::Float(f) if f.is_finite() && f.abs() < 9.2e18 => Ok(Value::Int(f.trunc() as i64)),
        Value::Text(s) => s
            .trim()
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|e| ConversionError::TypeMismatch(format!("invalid integer {:?}: {}", s, e))),
        other => Err(mismatch("integer", other)),
    }
}

fn float_in(value: &Value, _field: &FieldDescriptor) -> Result<Value, ConversionError> {
    match value {
        Value::Float(f) => Ok(Value::Float(*f)),
        Value::Int(i) => Ok(Value::Float(*i as f64)),
        Value::Bool(b) => Ok(Value::Float(if *b { 1.0 } else { 0.0 })),
        Value::Text(s) => s
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|e| ConversionError::TypeMismatch(format!("invalid number {:?}: {}", s, e))),
        other => Err(mismatch("number", other)),
    }
}

fn float_out(value: &Value, _field: &FieldDescriptor) -> JsonValue {
    match value {
        Value::Int(i) => JsonValue::from(*i as f64),
        other => other.to_json(),
    }
}

fn datetime_in(value: &Value, _field: &FieldDescriptor) -> Result<Value, ConversionError> {
    match value {
        Value::DateTime(dt) => Ok(Value::DateTime(*dt)),
        Value::Text(s) => parse_datetime(s)
            .map(Value::DateTime)
            .map_err(|e| ConversionError::TypeMismatch(format!("invalid datetime {:?}: {}", s, e))),
        other => Err(mismatch("ISO-8601 datetime", other)),
    }
}

fn date_in(value: &Value, _field: &FieldDescriptor) -> Result<Value, ConversionError> {
    match value {
        Value::Date(d) => Ok(Value::Date(*d)),
        Value::DateTime(dt) => Ok(Value::Date(dt.date())),
        Value::Text(s) => parse_date(s)
            .map(Value::Date)
            .map_err(|e| ConversionError::TypeMismatch(format!("invalid date {:?}: {}", s, e))),
        other => Err(mismatch("ISO-8601 date", other)),
    }
}

fn time_in(value: &Value, _field: &FieldDescriptor) -> Result<Value, ConversionError> {
    match value {
        Value::Time(t) => Ok(Value::Time(*t)),
        Value::Text(s) => parse_time(s)
            .map(Value::Time)
            .map_err(|e| ConversionError::TypeMismatch(format!("invalid time {:?}: {}", s, e))),
        other => Err(mismatch("ISO-8601 time", other)),
    }
}

fn blob_in(value: &Value, _field: &FieldDescriptor) -> Result<Value, ConversionError> {
    match value {
        Value::Bytes(b) => Ok(Value::Bytes(b.clone())),
        Value::Text(s) => STANDARD
            .decode(s.as_bytes())
            .map(Value::Bytes)
            .map_err(|e| ConversionError::TypeMismatch(format!("invalid base64: {}", e))),
        Value::Json(JsonValue::Array(items)) => items
            .iter()
            .map(|item| item.as_u64().and_then(|b| u8::try_from(b).ok()))
            .collect::<Option<Vec<u8>>>()
            .map(Value::Bytes)
            .ok_or_else(|| mismatch("byte array", value)),
        other => Err(mismatch("base64 text", other)),
    }
}

fn blob_out(value: &Value, _field: &FieldDescriptor) -> JsonValue {
    match value {
        Value::Bytes(b) => JsonValue::String(STANDARD.encode(b)),
        other => other.to_json(),
    }
}

fn uuid_in(value: &Value, _field: &FieldDescriptor) -> Result<Value, ConversionError> {
    match value {
        Value::Uuid(u) => Ok(Value::Uuid(*u)),
        Value::Text(s) => Uuid::parse_str(s.trim())
            .map(Value::Uuid)
            .map_err(|e| ConversionError::TypeMismatch(format!("invalid uuid {:?}: {}", s, e))),
        other => Err(mismatch("uuid", other)),
    }
}

fn ipv4_in(value: &Value, _field: &FieldDescriptor) -> Result<Value, ConversionError> {
    match value {
        Value::Ipv4(ip) => Ok(Value::Ipv4(*ip)),
        Value::Text(s) => s
            .trim()
            .parse::<Ipv4Addr>()
            .map(Value::Ipv4)
            .map_err(|e| ConversionError::TypeMismatch(format!("invalid IPv4 address {:?}: {}", s, e))),
        other => Err(mismatch("IPv4 address", other)),
    }
}

fn foreign_key_in(value: &Value, field: &FieldDescriptor) -> Result<Value, ConversionError> {
    match value {
        Value::Related(related) => Ok(Value::Related(related.clone())),
        Value::Int(_) | Value::Text(_) => integer_in(value, field),
        other => Err(mismatch("record identifier", other)),
    }
}

fn enumeration_in(value: &Value, field: &FieldDescriptor) -> Result<Value, ConversionError> {
    let FieldKind::Enumeration(domain) = &field.kind else {
        return Ok(value.clone());
    };
    domain.check(value).map_err(|e| match e {
        Error::InvalidEnumerationValue(v) => ConversionError::InvalidEnumerationValue(v),
        other => ConversionError::TypeMismatch(other.to_string()),
    })
}

fn password_in(value: &Value, _field: &FieldDescriptor) -> Result<Value, ConversionError> {
    match value {
        Value::Text(s) => Ok(Value::Text(s.clone())),
        other => Err(mismatch("text", other)),
    }
}
