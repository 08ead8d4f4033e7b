//! Error types.
//!
//! [`Error`] is the closed set of failures the conversion engine reports to
//! its callers. None of them are retriable; each carries enough context to be
//! rendered as a diagnostic on its own (see [`Error::to_json`]).

use std::collections::BTreeSet;
use std::error::Error as StdError;
use std::fmt;

use serde_json::json;

use crate::field::{FieldDescriptor, FieldType};
use crate::value::Value;

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, Error>;

/// Where a field-level failure happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldContext {
    /// Name of the record type.
    pub model: String,
    /// Attribute name on the record.
    pub attribute: String,
    /// Kind of the field.
    pub field_type: FieldType,
    /// External key the value was read from.
    pub key: String,
}

impl FieldContext {
    pub fn new(model: impl Into<String>, field: &FieldDescriptor) -> Self {
        Self {
            model: model.into(),
            attribute: field.attribute.clone(),
            field_type: field.field_type(),
            key: field.key.clone(),
        }
    }

    fn to_json(&self) -> serde_json::Value {
        json!({
            "model": self.model,
            "attr": self.attribute,
            "field": self.field_type.as_str(),
            "key": self.key,
        })
    }
}

impl fmt::Display for FieldContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<{} {}> at <{}.{}>",
            self.field_type, self.key, self.model, self.attribute
        )
    }
}

/// Errors raised while converting between external mappings and records.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Null was supplied for a field that cannot hold it.
    FieldNotNullable(FieldContext),
    /// The value could not be coerced to the field's type.
    FieldValue {
        context: FieldContext,
        value: Value,
        reason: String,
    },
    /// A required key is absent from the input of a full deserialization.
    MissingKey(FieldContext),
    /// Strict mode: the input contained keys the schema does not accept.
    InvalidKeys(BTreeSet<String>),
    /// The value is outside an enumeration field's domain.
    InvalidEnumerationValue(Value),
    /// A plaintext password is below the minimum length.
    PasswordTooShort { length: usize, minimum: usize },
    /// The hashing primitive failed or was handed a non-text value.
    Password(String),
    /// The record type has no attribute of that name.
    UnknownAttribute { model: String, attribute: String },
}

impl Error {
    /// Stable machine-readable name of the error.
    pub const fn kind(&self) -> &'static str {
        match self {
            Error::FieldNotNullable(_) => "field_not_nullable",
            Error::FieldValue { .. } => "field_value",
            Error::MissingKey(_) => "missing_key",
            Error::InvalidKeys(_) => "invalid_keys",
            Error::InvalidEnumerationValue(_) => "invalid_enumeration_value",
            Error::PasswordTooShort { .. } => "password_too_short",
            Error::Password(_) => "password",
            Error::UnknownAttribute { .. } => "unknown_attribute",
        }
    }

    /// Field context, for the errors tied to a single field.
    pub fn context(&self) -> Option<&FieldContext> {
        match self {
            Error::FieldNotNullable(ctx) | Error::MissingKey(ctx) => Some(ctx),
            Error::FieldValue { context, .. } => Some(context),
            _ => None,
        }
    }

    /// JSON diagnostic suitable for an API error response.
    pub fn to_json(&self) -> serde_json::Value {
        let mut body = match self {
            Error::FieldNotNullable(ctx) | Error::MissingKey(ctx) => ctx.to_json(),
            Error::FieldValue {
                context,
                value,
                reason,
            } => {
                let mut body = context.to_json();
                body["value"] = json!(value.to_string());
                body["type"] = json!(value.type_name());
                body["reason"] = json!(reason);
                body
            }
            Error::InvalidKeys(keys) => json!({ "keys": keys }),
            Error::InvalidEnumerationValue(value) => json!({ "value": value.to_json() }),
            Error::PasswordTooShort { length, minimum } => {
                json!({ "length": length, "minimum": minimum })
            }
            Error::Password(msg) => json!({ "reason": msg }),
            Error::UnknownAttribute { model, attribute } => {
                json!({ "model": model, "attr": attribute })
            }
        };
        body["error"] = json!(self.kind());
        body["message"] = json!(self.to_string());
        body
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::FieldNotNullable(ctx) => write!(f, "{} must not be NULL", ctx),
            Error::FieldValue {
                context,
                value,
                reason,
            } => write!(
                f,
                "{} cannot store {}: {} ({})",
                context,
                value.type_name(),
                value,
                reason
            ),
            Error::MissingKey(ctx) => write!(f, "{} is missing from the input", ctx),
            Error::InvalidKeys(keys) => {
                let keys: Vec<&str> = keys.iter().map(String::as_str).collect();
                write!(f, "invalid keys: {}", keys.join(", "))
            }
            Error::InvalidEnumerationValue(value) => {
                write!(f, "invalid enumeration value: \"{}\"", value)
            }
            Error::PasswordTooShort { length, minimum } => write!(
                f,
                "password too short: {} characters, at least {} required",
                length, minimum
            ),
            Error::Password(msg) => write!(f, "password error: {}", msg),
            Error::UnknownAttribute { model, attribute } => {
                write!(f, "{} has no attribute {}", model, attribute)
            }
        }
    }
}

impl StdError for Error {}

/// Errors raised while defining a schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// Two fields share an attribute name.
    DuplicateAttribute(String),
    /// Two fields share an external key.
    DuplicateKey { key: String, attributes: (String, String) },
    /// A shadow foreign key names a relation that does not exist.
    UnknownRelation { attribute: String, relation: String },
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::DuplicateAttribute(name) => write!(f, "duplicate attribute: {}", name),
            SchemaError::DuplicateKey { key, attributes } => write!(
                f,
                "external key {} used by both {} and {}",
                key, attributes.0, attributes.1
            ),
            SchemaError::UnknownRelation {
                attribute,
                relation,
            } => write!(f, "{} shadows unknown relation {}", attribute, relation),
        }
    }
}

impl StdError for SchemaError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldKind;

    fn context() -> FieldContext {
        let field = FieldDescriptor::new("age", FieldKind::Integer).key("userAge");
        FieldContext::new("User", &field)
    }

    #[test]
    fn test_field_value_message() {
        let err = Error::FieldValue {
            context: context(),
            value: Value::from("abc"),
            reason: "not an integer".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "<integer userAge> at <User.age> cannot store text: abc (not an integer)"
        );
    }

    #[test]
    fn test_not_nullable_json() {
        let body = Error::FieldNotNullable(context()).to_json();
        assert_eq!(body["error"], "field_not_nullable");
        assert_eq!(body["attr"], "age");
        assert_eq!(body["key"], "userAge");
        assert_eq!(body["model"], "User");
    }

    #[test]
    fn test_invalid_keys_sorted() {
        let keys: BTreeSet<String> = ["zeta", "alpha"].iter().map(|s| s.to_string()).collect();
        let err = Error::InvalidKeys(keys);
        assert_eq!(err.to_string(), "invalid keys: alpha, zeta");
        assert_eq!(err.to_json()["keys"], json!(["alpha", "zeta"]));
    }

    #[test]
    fn test_password_too_short_message() {
        let err = Error::PasswordTooShort {
            length: 5,
            minimum: 8,
        };
        assert!(err.to_string().contains("5 characters"));
        assert!(err.context().is_none());
    }
}
