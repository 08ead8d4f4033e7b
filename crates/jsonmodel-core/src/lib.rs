//! Core types and traits for jsonmodel.
//!
//! `jsonmodel-core` is the **contract layer** of the workspace. It defines
//! what a record type looks like to the conversion engine, without doing any
//! conversion itself.
//!
//! # Role In The Architecture
//!
//! - **Schema**: `Schema` and `FieldDescriptor` describe the attributes of a
//!   record type: their kind, external key, nullability and default.
//! - **Records**: `Record` and `RecordType` are the seams through which the
//!   engine reads, writes and creates records. `DynamicRecord` implements
//!   them for schemas defined at runtime.
//! - **Values**: `Value` carries data between external mappings and records.
//! - **Special fields**: `Enumeration` (a fixed value domain) and
//!   `PasswordField` (transparent hashing) hook into the write and read paths
//!   of a field.
//! - **Errors**: `Error` is the closed error taxonomy surfaced to callers.
//!
//! Most applications should use the `jsonmodel` crate, which re-exports this
//! one and adds `deserialize`, `patch` and `serialize`.
//!
//! # Features
//!
//! - `argon2` (default): `Argon2Hasher` and `PasswordField::argon2`. Without
//!   it, password fields need a caller-supplied `Hasher`.

pub mod enumeration;
pub mod error;
pub mod field;
pub mod parse;
pub mod password;
pub mod record;
pub mod schema;
pub mod value;

pub use enumeration::{EnumMember, EnumValue, Enumeration};
pub use error::{Error, FieldContext, Result, SchemaError};
pub use field::{FieldDescriptor, FieldKind, FieldType, ForeignKey, PROTECTED_MARKER};
#[cfg(feature = "argon2")]
pub use password::Argon2Hasher;
pub use password::{HashedPassword, Hasher, MIN_PASSWORD_LENGTH, PasswordField};
pub use record::{DynamicRecord, Record, RecordType};
pub use schema::{SHADOW_SUFFIX, Schema, SchemaBuilder};
pub use value::{RelatedRecord, Value};
