//! Constrained enumeration fields.
//!
//! An [`Enumeration`] is the legal domain of an enumeration field: a fixed
//! set of scalar values, each optionally paired with a named-constant label.
//! The field's nullability and its maximum textual width are derived from
//! that set once, when the domain is built.

use crate::error::{Error, Result};
use crate::value::Value;

/// A Rust enum whose variants are named constants of an enumeration field.
///
/// ```
/// use jsonmodel_core::{EnumValue, Enumeration, Value};
///
/// #[derive(Clone, Copy)]
/// enum Color { Red, Green }
///
/// impl EnumValue for Color {
///     const VARIANTS: &'static [Self] = &[Color::Red, Color::Green];
///
///     fn name(&self) -> &'static str {
///         match self { Color::Red => "RED", Color::Green => "GREEN" }
///     }
///
///     fn value(&self) -> Value {
///         match self { Color::Red => "red".into(), Color::Green => "green".into() }
///     }
/// }
///
/// let domain = Enumeration::of::<Color>();
/// assert_eq!(domain.max_length(), 5);
/// ```
pub trait EnumValue: Sized + 'static {
    /// Every variant, in declaration order.
    const VARIANTS: &'static [Self];

    /// Label of the constant.
    fn name(&self) -> &'static str;

    /// Underlying value stored for the constant.
    fn value(&self) -> Value;
}

/// One member of an enumeration domain.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumMember {
    pub label: Option<String>,
    pub value: Value,
}

/// The legal value set of an enumeration field.
#[derive(Debug, Clone, PartialEq)]
pub struct Enumeration {
    members: Vec<EnumMember>,
    nullable: bool,
    max_length: usize,
}

impl Enumeration {
    /// Build a domain from raw values.
    pub fn new<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::from_members(values.into_iter().map(|value| EnumMember {
            label: None,
            value: value.into(),
        }))
    }

    /// Build a domain from `(label, value)` pairs.
    pub fn labeled<I, L, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (L, V)>,
        L: Into<String>,
        V: Into<Value>,
    {
        Self::from_members(pairs.into_iter().map(|(label, value)| EnumMember {
            label: Some(label.into()),
            value: value.into(),
        }))
    }

    /// Build a domain from the variants of a Rust enum.
    pub fn of<E: EnumValue>() -> Self {
        Self::labeled(E::VARIANTS.iter().map(|v| (v.name(), v.value())))
    }

    fn from_members(members: impl Iterator<Item = EnumMember>) -> Self {
        let mut unique: Vec<EnumMember> = Vec::new();
        for member in members {
            if !unique.iter().any(|m| same_member(&m.value, &member.value)) {
                unique.push(member);
            }
        }

        let nullable = unique.iter().any(|m| m.value.is_null());
        let max_length = unique
            .iter()
            .filter(|m| !m.value.is_null())
            .map(|m| m.value.to_string().chars().count())
            .max()
            .unwrap_or(0);

        Self {
            members: unique,
            nullable,
            max_length,
        }
    }

    /// Whether null is a member of the domain.
    #[must_use]
    pub const fn nullable(&self) -> bool {
        self.nullable
    }

    /// Length of the longest textual rendering among non-null members.
    #[must_use]
    pub const fn max_length(&self) -> usize {
        self.max_length
    }

    pub fn members(&self) -> &[EnumMember] {
        &self.members
    }

    /// Whether `value` is a member value.
    pub fn contains(&self, value: &Value) -> bool {
        self.member(value).is_some()
    }

    /// Resolve `value` to the member value it equals.
    ///
    /// Integers and floats compare by numeric value, so `1` resolves to a
    /// `1.0` member and is stored as the member. Labels are not accepted as
    /// input. Anything outside the value set fails with
    /// [`Error::InvalidEnumerationValue`].
    pub fn check(&self, value: &Value) -> Result<Value> {
        self.member(value)
            .cloned()
            .ok_or_else(|| Error::InvalidEnumerationValue(value.clone()))
    }

    fn member(&self, value: &Value) -> Option<&Value> {
        self.members
            .iter()
            .map(|m| &m.value)
            .find(|member| same_member(member, value))
    }

    /// Resolve a value read back from storage.
    ///
    /// An unset (null) attribute reads as null; every other stored value must
    /// still be a member.
    pub fn check_stored(&self, value: &Value) -> Result<Value> {
        if value.is_null() {
            return Ok(Value::Null);
        }
        self.check(value)
    }
}

#[allow(clippy::float_cmp)]
fn same_member(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Int(i), Value::Float(f)) | (Value::Float(f), Value::Int(i)) => *i as f64 == *f,
        _ => a == b,
    }
}
