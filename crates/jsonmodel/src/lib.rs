//! Typed record to JSON mapping.
//!
//! `jsonmodel` is the **facade crate** of the workspace. It converts between
//! JSON objects and records described by a [`Schema`], coercing every value
//! through its field's type and filtering keys per call.
//!
//! # Role In The Architecture
//!
//! - **Catalog** (`catalog`): which fields of a schema take part in a call.
//! - **Converters** (`convert`): one inbound and one outbound function per
//!   field kind.
//! - **Filtering** (`filter`): allow/deny lists, strict unknown-key
//!   rejection, required keys, and the serialization ignore list.
//! - **Entry points** (`json`): [`deserialize`], [`patch`] and
//!   [`serialize`], plus the [`JsonModel`] and [`FromJson`] extension traits.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use jsonmodel::prelude::*;
//! use serde_json::json;
//!
//! let users = Arc::new(
//!     Schema::builder("User")
//!         .auto_primary_key("id")
//!         .field(FieldDescriptor::new("name", FieldKind::Other))
//!         .field(FieldDescriptor::new("age", FieldKind::Integer).nullable(true))
//!         .build()
//!         .unwrap(),
//! );
//!
//! let input = json!({"name": "Alice", "age": "31"});
//! let user = users
//!     .from_json(input.as_object().unwrap(), &DeserializeOptions::default())
//!     .unwrap();
//!
//! let output = user.to_json(&SerializeOptions::default().primary_key(false)).unwrap();
//! assert_eq!(output["age"], json!(31));
//! ```

pub mod catalog;
pub mod convert;
pub mod converters;
pub mod filter;
pub mod json;
pub mod options;

pub use jsonmodel_core::*;

pub use catalog::{CatalogOptions, list_fields, map_fields};
pub use convert::{ConversionError, Converter, converter, to_external, to_typed};
pub use filter::{Ignore, IgnoreItem};
pub use json::{FromJson, JsonModel, deserialize, patch, serialize};
pub use options::{DeserializeOptions, SerializeOptions};

/// Everything needed to declare schemas and convert records.
pub mod prelude {
    pub use crate::{
        DeserializeOptions, DynamicRecord, Enumeration, Error, FieldDescriptor, FieldKind,
        FieldType, ForeignKey, FromJson, Ignore, IgnoreItem, JsonModel, PasswordField, Record,
        RecordType, Schema, SerializeOptions, Value, deserialize, patch, serialize,
    };
}
