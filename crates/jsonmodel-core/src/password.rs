//! Password-hash fields.
//!
//! Assigning to a password-hash field stores a one-way hash of the given
//! plaintext. Reading it back yields a [`HashedPassword`] that can check a
//! candidate plaintext without ever exposing the original.
//!
//! Telling plaintext from an existing hash is a heuristic: a value that is
//! structurally a hash string is stored as is, so re-saving a record does not
//! hash its hash again. A plaintext that happens to look exactly like a hash
//! is stored unhashed as well.

use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::value::Value;

/// Plaintext passwords shorter than this are rejected.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// The hashing primitive behind a password-hash field.
pub trait Hasher: fmt::Debug + Send + Sync {
    /// Hash `plaintext` into a self-describing hash string.
    fn hash(&self, plaintext: &str) -> Result<String>;

    /// Check `plaintext` against `hash`.
    ///
    /// Malformed hashes verify as `false`.
    fn verify(&self, hash: &str, plaintext: &str) -> bool;

    /// Cheap structural check whether `value` is already a hash string.
    fn looks_like_hash(&self, value: &str) -> bool;
}

/// Parameters of a password-hash field.
#[derive(Debug, Clone)]
pub struct PasswordField {
    hasher: Arc<dyn Hasher>,
    min_length: usize,
}

impl PasswordField {
    /// A password field backed by `hasher`.
    pub fn new(hasher: Arc<dyn Hasher>) -> Self {
        Self {
            hasher,
            min_length: MIN_PASSWORD_LENGTH,
        }
    }

    /// A password field backed by Argon2id.
    #[cfg(feature = "argon2")]
    pub fn argon2() -> Self {
        Self::new(Arc::new(argon2_hasher::Argon2Hasher::default()))
    }

    /// Override the minimum plaintext length.
    pub fn min_length(mut self, min_length: usize) -> Self {
        self.min_length = min_length;
        self
    }

    pub fn hasher(&self) -> &Arc<dyn Hasher> {
        &self.hasher
    }

    /// Write path: hash plaintext, keep existing hashes.
    pub fn store(&self, value: Value) -> Result<Value> {
        let text = match value {
            Value::Null => return Ok(Value::Null),
            Value::Text(text) => text,
            other => {
                return Err(Error::Password(format!(
                    "expected text, got {}",
                    other.type_name()
                )));
            }
        };

        if self.hasher.looks_like_hash(&text) {
            return Ok(Value::Text(text));
        }

        let length = text.chars().count();
        if length < self.min_length {
            return Err(Error::PasswordTooShort {
                length,
                minimum: self.min_length,
            });
        }

        tracing::trace!(length, "Hashing plaintext password");
        self.hasher.hash(&text).map(Value::Text)
    }

    /// Read path: wrap a stored hash.
    pub fn load(&self, value: &Value) -> Option<HashedPassword> {
        value.as_str().map(|hash| HashedPassword {
            hash: hash.to_string(),
            hasher: Arc::clone(&self.hasher),
        })
    }
}

/// A stored password hash.
#[derive(Clone)]
pub struct HashedPassword {
    hash: String,
    hasher: Arc<dyn Hasher>,
}

impl HashedPassword {
    /// Check a candidate plaintext against this hash.
    pub fn verify(&self, plaintext: &str) -> bool {
        self.hasher.verify(&self.hash, plaintext)
    }

    pub fn as_str(&self) -> &str {
        &self.hash
    }
}

impl fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("HashedPassword").field(&self.hash).finish()
    }
}

impl fmt::Display for HashedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hash)
    }
}

impl PartialEq<str> for HashedPassword {
    fn eq(&self, other: &str) -> bool {
        self.hash == other
    }
}

#[cfg(feature = "argon2")]
pub use argon2_hasher::Argon2Hasher;

#[cfg(feature = "argon2")]
mod argon2_hasher {
    use std::sync::OnceLock;

    use argon2::{
        Argon2,
        password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    };
    use rand::rngs::OsRng;
    use regex::Regex;

    use super::Hasher;
    use crate::error::{Error, Result};

    /// PHC string layout of an Argon2 hash.
    const PHC_PATTERN: &str =
        r"^\$argon2(id|i|d)\$v=\d+\$m=\d+,t=\d+,p=\d+\$[A-Za-z0-9+/]+\$[A-Za-z0-9+/]+$";

    fn phc_regex() -> Option<&'static Regex> {
        static PHC: OnceLock<Option<Regex>> = OnceLock::new();
        PHC.get_or_init(|| match Regex::new(PHC_PATTERN) {
            Ok(regex) => Some(regex),
            Err(e) => {
                tracing::warn!(error = %e, "Invalid PHC pattern, hash detection disabled");
                None
            }
        })
        .as_ref()
    }

    /// Argon2id hashing with default parameters and PHC-formatted output.
    #[derive(Debug, Default, Clone)]
    pub struct Argon2Hasher {
        argon2: Argon2<'static>,
    }

    impl Hasher for Argon2Hasher {
        fn hash(&self, plaintext: &str) -> Result<String> {
            let salt = SaltString::generate(&mut OsRng);
            self.argon2
                .hash_password(plaintext.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(|e| Error::Password(format!("failed to hash password: {e}")))
        }

        fn verify(&self, hash: &str, plaintext: &str) -> bool {
            PasswordHash::new(hash).is_ok_and(|parsed| {
                self.argon2
                    .verify_password(plaintext.as_bytes(), &parsed)
                    .is_ok()
            })
        }

        fn looks_like_hash(&self, value: &str) -> bool {
            phc_regex().is_some_and(|regex| regex.is_match(value))
                && PasswordHash::new(value).is_ok()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Reversible stand-in for a real hashing primitive.
    #[derive(Debug)]
    struct PrefixHasher;

    impl Hasher for PrefixHasher {
        fn hash(&self, plaintext: &str) -> Result<String> {
            Ok(format!("hashed:{}", plaintext.len()))
        }

        fn verify(&self, hash: &str, plaintext: &str) -> bool {
            hash == format!("hashed:{}", plaintext.len())
        }

        fn looks_like_hash(&self, value: &str) -> bool {
            value.starts_with("hashed:")
        }
    }

    fn field() -> PasswordField {
        PasswordField::new(Arc::new(PrefixHasher))
    }

    #[test]
    fn test_short_password_rejected() {
        let err = field().store("short".into()).unwrap_err();
        assert!(matches!(
            err,
            Error::PasswordTooShort {
                length: 5,
                minimum: 8
            }
        ));
    }

    #[test]
    fn test_plaintext_is_hashed() {
        let stored = field().store("longenough".into()).unwrap();
        assert_eq!(stored, Value::from("hashed:10"));
    }

    #[test]
    fn test_existing_hash_kept() {
        let stored = field().store("hashed:3".into()).unwrap();
        assert_eq!(stored, Value::from("hashed:3"));
    }

    #[test]
    fn test_null_passes() {
        assert_eq!(field().store(Value::Null).unwrap(), Value::Null);
        assert!(field().load(&Value::Null).is_none());
    }

    #[test]
    fn test_non_text_rejected() {
        assert!(matches!(
            field().store(Value::Int(12_345_678)),
            Err(Error::Password(_))
        ));
    }

    #[test]
    fn test_custom_min_length() {
        let field = field().min_length(3);
        assert!(field.store("abcd".into()).is_ok());
    }

    #[cfg(feature = "argon2")]
    #[test]
    fn test_argon2_round_trip() {
        let field = PasswordField::argon2();
        let stored = field.store("longenough".into()).unwrap();
        let hash = stored.as_str().unwrap().to_string();
        assert_ne!(hash, "longenough");
        assert!(hash.starts_with("$argon2"));
        assert!(field.hasher().looks_like_hash(&hash));

        let hashed = field.load(&stored).unwrap();
        assert!(hashed.verify("longenough"));
        assert!(!hashed.verify("wrong"));

        // Re-storing the hash must not hash it again.
        assert_eq!(field.store(stored.clone()).unwrap(), stored);
    }

    #[cfg(feature = "argon2")]
    #[test]
    fn test_argon2_rejects_plain_text_as_hash() {
        let hasher = Argon2Hasher::default();
        assert!(!hasher.looks_like_hash("longenough"));
        assert!(!hasher.looks_like_hash("$argon2id$garbage"));
        assert!(!hasher.verify("not-a-hash", "anything"));
    }
}
