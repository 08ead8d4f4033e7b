//! Standalone value converters for hosts that bridge other data sources
//! (XML bindings, form data) onto records.
//!
//! Each function passes [`Value::Null`] through unchanged.

use jsonmodel_core::Value;
use jsonmodel_core::parse::parse_datetime;

use crate::convert::ConversionError;

/// Render a decimal as text.
pub fn dec2dom(value: &Value) -> Value {
    match value {
        Value::Null => Value::Null,
        Value::Text(s) => Value::Text(s.clone()),
        other => Value::Text(other.to_string()),
    }
}

/// Convert a decimal into a float for dictionary output.
pub fn dec2dict(value: &Value) -> Result<Value, ConversionError> {
    match value {
        Value::Null => Ok(Value::Null),
        Value::Float(f) => Ok(Value::Float(*f)),
        Value::Int(i) => Ok(Value::Float(*i as f64)),
        Value::Text(s) => s.trim().parse::<f64>().map(Value::Float).map_err(|e| {
            ConversionError::TypeMismatch(format!("invalid decimal {:?}: {}", s, e))
        }),
        other => Err(ConversionError::TypeMismatch(format!(
            "expected decimal, got {}",
            other.type_name()
        ))),
    }
}

/// Convert a decimal into the value stored on a record.
pub fn dec2orm(value: &Value) -> Result<Value, ConversionError> {
    dec2dict(value)
}

/// Reduce a datetime to its date.
pub fn date2orm(value: &Value) -> Result<Value, ConversionError> {
    match value {
        Value::Null => Ok(Value::Null),
        Value::DateTime(dt) => Ok(Value::Date(dt.date())),
        Value::Date(d) => Ok(Value::Date(*d)),
        other => Err(ConversionError::TypeMismatch(format!(
            "expected datetime, got {}",
            other.type_name()
        ))),
    }
}

/// Normalize a datetime through the ISO-8601 parser.
pub fn datetime2orm(value: &Value) -> Result<Value, ConversionError> {
    match value {
        Value::Null => Ok(Value::Null),
        Value::DateTime(dt) => Ok(Value::DateTime(*dt)),
        Value::Text(s) => parse_datetime(s).map(Value::DateTime).map_err(|e| {
            ConversionError::TypeMismatch(format!("invalid datetime {:?}: {}", s, e))
        }),
        other => Err(ConversionError::TypeMismatch(format!(
            "expected datetime, got {}",
            other.type_name()
        ))),
    }
}
