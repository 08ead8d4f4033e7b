//! Per-call options for deserialization and serialization.
//!
//! Both option structs implement `serde::Deserialize` with every field
//! defaulted, so hosts can keep them in configuration files:
//!
//! ```
//! use jsonmodel::{DeserializeOptions, SerializeOptions};
//!
//! let options: DeserializeOptions =
//!     serde_json::from_str(r#"{"deny": ["role"], "foreign_keys": true}"#).unwrap();
//! assert!(options.strict);
//!
//! let options: SerializeOptions =
//!     serde_json::from_str(r#"{"include_nulls": false, "ignore": {"types": ["password_hash"]}}"#)
//!         .unwrap();
//! assert!(options.primary_key);
//! ```

use std::collections::BTreeSet;

use serde::Deserialize;

use crate::catalog::CatalogOptions;
use crate::filter::Ignore;

/// Options for [`deserialize`](crate::deserialize) and [`patch`](crate::patch).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DeserializeOptions {
    /// Only these external keys are read. Empty means no restriction.
    pub allow: BTreeSet<String>,
    /// These external keys are never read.
    pub deny: BTreeSet<String>,
    /// Read foreign-key fields.
    pub foreign_keys: bool,
    /// Read protected attributes.
    pub protected: bool,
    /// Reject input keys that no field consumes.
    pub strict: bool,
}

impl Default for DeserializeOptions {
    fn default() -> Self {
        Self {
            allow: BTreeSet::new(),
            deny: BTreeSet::new(),
            foreign_keys: false,
            protected: false,
            strict: true,
        }
    }
}

impl DeserializeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict reading to `keys`.
    pub fn allow<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allow.extend(keys.into_iter().map(Into::into));
        self
    }

    /// Never read `keys`.
    pub fn deny<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.deny.extend(keys.into_iter().map(Into::into));
        self
    }

    pub fn foreign_keys(mut self, value: bool) -> Self {
        self.foreign_keys = value;
        self
    }

    pub fn protected(mut self, value: bool) -> Self {
        self.protected = value;
        self
    }

    pub fn strict(mut self, value: bool) -> Self {
        self.strict = value;
        self
    }

    /// Whether `key` passes the allow and deny lists.
    pub fn admits_key(&self, key: &str) -> bool {
        (self.allow.is_empty() || self.allow.contains(key)) && !self.deny.contains(key)
    }
}

/// Options for [`serialize`](crate::serialize).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SerializeOptions {
    /// Fields left out of the output.
    pub ignore: Ignore,
    /// Emit null values; when unset, null fields are omitted.
    pub include_nulls: bool,
    /// Emit protected attributes.
    pub protected: bool,
    /// Emit the primary key.
    pub primary_key: bool,
    /// Emit foreign-key fields.
    pub foreign_keys: bool,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            ignore: Ignore::default(),
            include_nulls: true,
            protected: false,
            primary_key: true,
            foreign_keys: false,
        }
    }
}

impl SerializeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ignore the fields described by `ignore`, in addition to any already set.
    pub fn ignore(mut self, ignore: impl Into<Ignore>) -> Self {
        let ignore = ignore.into();
        self.ignore.names.extend(ignore.names);
        self.ignore.types.extend(ignore.types);
        self
    }

    pub fn include_nulls(mut self, value: bool) -> Self {
        self.include_nulls = value;
        self
    }

    pub fn protected(mut self, value: bool) -> Self {
        self.protected = value;
        self
    }

    pub fn primary_key(mut self, value: bool) -> Self {
        self.primary_key = value;
        self
    }

    pub fn foreign_keys(mut self, value: bool) -> Self {
        self.foreign_keys = value;
        self
    }

    pub(crate) fn catalog(&self) -> CatalogOptions {
        CatalogOptions::default()
            .protected(self.protected)
            .primary_key(self.primary_key)
            .foreign_keys(self.foreign_keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonmodel_core::FieldType;

    #[test]
    fn test_deserialize_defaults() {
        let options = DeserializeOptions::default();
        assert!(options.strict);
        assert!(!options.foreign_keys);
        assert!(options.admits_key("anything"));
    }

    #[test]
    fn test_admits_key() {
        let options = DeserializeOptions::new().allow(["a", "b"]).deny(["b"]);
        assert!(options.admits_key("a"));
        assert!(!options.admits_key("b"));
        assert!(!options.admits_key("c"));
    }

    #[test]
    fn test_serialize_ignore_accumulates() {
        let options = SerializeOptions::new()
            .ignore("secret")
            .ignore(FieldType::Blob);
        assert!(options.ignore.names.contains("secret"));
        assert!(options.ignore.types.contains(&FieldType::Blob));
    }

    #[test]
    fn test_options_from_config() {
        let options: DeserializeOptions =
            serde_json::from_str(r#"{"allow": ["name"], "strict": false}"#).unwrap();
        assert_eq!(options, DeserializeOptions::new().allow(["name"]).strict(false));

        let options: SerializeOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, SerializeOptions::default());
    }
}
