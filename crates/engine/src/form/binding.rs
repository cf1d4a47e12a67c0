use dispatch_types::{FieldRef, FieldRules, IsEmptyValue};

use super::control::FormControl;
use crate::selection::{SelectionSlot, SelectionValue};

/// A field of form value `S` registered with a [`FormControl`].
///
/// The same binding type serves single-select (`Option<T>`), multi-select
/// (`Vec<T>`), and plain text fields.
pub struct FieldBinding<S, T> {
    field: FieldRef<S, T>,
}

impl<S, T> Clone for FieldBinding<S, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S, T> Copy for FieldBinding<S, T> {}

impl<S, T> std::fmt::Debug for FieldBinding<S, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldBinding").field("field", &self.field.name()).finish()
    }
}

impl<S, T> FieldBinding<S, T> {
    /// Register `field` on `control` and return the binding.
    pub fn bind<C>(control: &mut C, field: FieldRef<S, T>, rules: FieldRules) -> Self
    where
        C: FormControl<S>,
        T: IsEmptyValue + 'static,
    {
        control.register(field, rules);
        Self { field }
    }

    pub fn name(&self) -> &'static str {
        self.field.name()
    }

    pub fn field(&self) -> FieldRef<S, T> {
        self.field
    }

    pub fn value<'a, C>(&self, control: &'a C) -> &'a T
    where
        C: FormControl<S>,
    {
        control.read(&self.field)
    }

    /// Write a changed value and return the error now displayed for the field.
    pub fn on_change<'a, C>(&self, control: &'a mut C, value: T) -> Option<&'a str>
    where
        C: FormControl<S>,
    {
        control.write(&self.field, value);
        control.error(self.field.name())
    }

    pub fn error<'a, C>(&self, control: &'a C) -> Option<&'a str>
    where
        C: FormControl<S>,
    {
        control.error(self.field.name())
    }

    pub fn is_required<C>(&self, control: &C) -> bool
    where
        C: FormControl<S>,
    {
        control.is_required(self.field.name())
    }

    /// Current value viewed as a selection of either cardinality.
    pub fn selection<V, C>(&self, control: &C) -> SelectionValue<V>
    where
        C: FormControl<S>,
        T: SelectionSlot<V>,
    {
        self.value(control).to_selection()
    }

    /// Commit a value emitted by a selection field.
    pub fn commit_selection<'a, V, C>(&self, control: &'a mut C, value: SelectionValue<V>) -> Option<&'a str>
    where
        C: FormControl<S>,
        T: SelectionSlot<V>,
    {
        self.on_change(control, T::from_selection(value))
    }
}
