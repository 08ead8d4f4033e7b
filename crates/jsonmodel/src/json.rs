//! Deserialization, patching and serialization.
//!
//! All three walk the filtered field catalog once. Every selected value is
//! converted and passed through its field's write path (enumeration domain,
//! password hashing) before the first assignment, so any failure leaves the
//! target untouched.

use jsonmodel_core::{
    Error, FieldContext, FieldDescriptor, Record, RecordType, Result, Schema, Value,
};
use serde_json::{Map, Value as JsonValue};

use crate::catalog;
use crate::convert::{self, ConversionError};
use crate::filter;
use crate::options::{DeserializeOptions, SerializeOptions};

/// Build a new record of `record_type` from `mapping`.
#[tracing::instrument(
    level = "debug",
    skip(record_type, mapping, options),
    fields(model = record_type.schema().name())
)]
pub fn deserialize<T: RecordType>(
    record_type: &T,
    mapping: &Map<String, JsonValue>,
    options: &DeserializeOptions,
) -> Result<T::Record> {
    let mut record = record_type.instantiate();
    apply(&mut record, mapping, options, false)?;
    Ok(record)
}

/// Update `record` in place from `mapping`.
///
/// Keys absent from `mapping` leave their attribute unchanged.
#[tracing::instrument(
    level = "debug",
    skip(record, mapping, options),
    fields(model = record.schema().name())
)]
pub fn patch<R: Record>(
    record: &mut R,
    mapping: &Map<String, JsonValue>,
    options: &DeserializeOptions,
) -> Result<()> {
    apply(record, mapping, options, true)
}

/// Render `record` as a JSON object keyed by external key.
#[tracing::instrument(
    level = "debug",
    skip(record, options),
    fields(model = record.schema().name())
)]
pub fn serialize<R: Record>(
    record: &R,
    options: &SerializeOptions,
) -> Result<Map<String, JsonValue>> {
    let schema = record.schema();
    let mut output = Map::new();

    for field in catalog::list_fields(schema, options.catalog()) {
        if options.ignore.matches(field) {
            continue;
        }

        let value = record.read(&field.attribute)?;
        if value.is_null() && !options.include_nulls {
            continue;
        }

        output.insert(field.key.clone(), convert::to_external(&value, field));
    }

    tracing::debug!(keys = output.len(), "Serialized record");
    Ok(output)
}

fn apply<R: Record>(
    record: &mut R,
    mapping: &Map<String, JsonValue>,
    options: &DeserializeOptions,
    patch: bool,
) -> Result<()> {
    let schema = record.schema();
    let mut assignments = Vec::new();

    for selected in filter::select(schema, mapping, options, patch)? {
        let value = Value::from_json(selected.value.clone());
        let typed = convert::to_typed(&value, selected.field)
            .map_err(|e| field_error(schema, selected.field, value, e))?;
        tracing::trace!(
            attribute = %selected.field.attribute,
            key = selected.key,
            field_type = %selected.field.field_type(),
            "Converted field"
        );
        let stored = selected.field.store(typed)?;
        assignments.push((selected.field.attribute.clone(), stored));
    }

    let assigned = assignments.len();
    for (attribute, value) in assignments {
        record.set(&attribute, value);
    }

    tracing::debug!(assigned, patch, "Applied mapping");
    Ok(())
}

fn field_error(
    schema: &Schema,
    field: &FieldDescriptor,
    value: Value,
    error: ConversionError,
) -> Error {
    match error {
        ConversionError::NullViolation => {
            Error::FieldNotNullable(FieldContext::new(schema.name(), field))
        }
        ConversionError::TypeMismatch(reason) => Error::FieldValue {
            context: FieldContext::new(schema.name(), field),
            value,
            reason,
        },
        ConversionError::InvalidEnumerationValue(value) => Error::InvalidEnumerationValue(value),
    }
}

/// JSON conversion methods on records.
pub trait JsonModel: Record + Sized {
    /// See [`serialize`].
    fn to_json(&self, options: &SerializeOptions) -> Result<Map<String, JsonValue>> {
        serialize(self, options)
    }

    /// See [`patch`].
    fn patch_json(
        &mut self,
        mapping: &Map<String, JsonValue>,
        options: &DeserializeOptions,
    ) -> Result<()> {
        patch(self, mapping, options)
    }
}

impl<R: Record> JsonModel for R {}

/// JSON construction on record types.
pub trait FromJson: RecordType + Sized {
    /// See [`deserialize`].
    fn from_json(
        &self,
        mapping: &Map<String, JsonValue>,
        options: &DeserializeOptions,
    ) -> Result<Self::Record> {
        deserialize(self, mapping, options)
    }
}

impl<T: RecordType> FromJson for T {}
