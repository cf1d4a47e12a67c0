use dispatch_types::{FieldRef, FieldRules, IsEmptyValue};

/// Capability interface over a structured form value `S`.
///
/// Field names come from [`FieldRef`] constants declared on `S`, so naming a
/// field the shape does not have is a compile error rather than a runtime
/// condition.
pub trait FormControl<S> {
    /// Register `field` with validation `rules`. Re-registering replaces the rules.
    fn register<T>(&mut self, field: FieldRef<S, T>, rules: FieldRules)
    where
        T: IsEmptyValue + 'static;

    fn read<'a, T>(&'a self, field: &FieldRef<S, T>) -> &'a T;

    /// Write through to the managed value and re-derive the field's error.
    fn write<T>(&mut self, field: &FieldRef<S, T>, value: T);

    /// Error currently displayed for `name`, if any.
    fn error(&self, name: &str) -> Option<&str>;

    /// Replace the message reported when `name` fails its rules; `None` restores the default.
    fn set_message(&mut self, name: &'static str, message: Option<String>);

    /// Re-derive every registered field and return the names that fail.
    fn validate_all(&mut self) -> Vec<&'static str>;

    fn mark_submitted(&mut self);

    fn is_submitted(&self) -> bool;

    fn is_required(&self, name: &str) -> bool;
}
