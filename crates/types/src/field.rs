//! Typed field descriptors for structured form values.
//!
//! A [`FieldRef`] couples a field name with accessor functions on the owning
//! value type. Form shapes expose their fields as associated constants, so a
//! binding can only ever name a field that exists on the declared shape; a
//! misspelled name fails to compile instead of surfacing at runtime.

use std::fmt;

/// Named accessor pair for one field of a form value `S` holding a `T`.
pub struct FieldRef<S, T> {
    name: &'static str,
    get: fn(&S) -> &T,
    set: fn(&mut S, T),
}

impl<S, T> FieldRef<S, T> {
    pub const fn new(name: &'static str, get: fn(&S) -> &T, set: fn(&mut S, T)) -> Self {
        Self { name, get, set }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn get<'a>(&self, source: &'a S) -> &'a T {
        (self.get)(source)
    }

    pub fn set(&self, target: &mut S, value: T) {
        (self.set)(target, value)
    }
}

impl<S, T> Clone for FieldRef<S, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S, T> Copy for FieldRef<S, T> {}

impl<S, T> fmt::Debug for FieldRef<S, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldRef").field("name", &self.name).finish()
    }
}

/// Validation rules attached to a field when it is registered with a form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldRules {
    /// Whether an empty value fails validation.
    pub required: bool,
    /// Message reported for an empty required value; the form default is used when absent.
    pub message: Option<String>,
}

impl FieldRules {
    pub fn optional() -> Self {
        Self::default()
    }

    pub fn required() -> Self {
        Self {
            required: true,
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Emptiness check used by required-field validation.
pub trait IsEmptyValue {
    fn is_empty_value(&self) -> bool;
}

impl<T> IsEmptyValue for Option<T> {
    fn is_empty_value(&self) -> bool {
        self.is_none()
    }
}

impl<T> IsEmptyValue for Vec<T> {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl IsEmptyValue for String {
    fn is_empty_value(&self) -> bool {
        self.trim().is_empty()
    }
}
