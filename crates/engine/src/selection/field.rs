//! Generic selection field with single and multiple cardinality.
//!
//! The field never owns the committed selection. Callers pass the current
//! value in and receive the next value back from [`SelectionField::pick`];
//! the only state kept here is whether the option list is open.

use serde::Serialize;

use super::{
    identity::{OptionAdapter, Presentation},
    reconcile::reconcile,
};

/// How many values the field commits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Cardinality {
    One,
    Many,
}

/// A committed selection of either cardinality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionValue<T> {
    One(Option<T>),
    Many(Vec<T>),
}

impl<T> SelectionValue<T> {
    pub fn cardinality(&self) -> Cardinality {
        match self {
            Self::One(_) => Cardinality::One,
            Self::Many(_) => Cardinality::Many,
        }
    }

    pub fn as_slice(&self) -> &[T] {
        match self {
            Self::One(Some(value)) => std::slice::from_ref(value),
            Self::One(None) => &[],
            Self::Many(values) => values,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }

    pub fn into_single(self) -> Option<T> {
        match self {
            Self::One(value) => value,
            Self::Many(values) => values.into_iter().next(),
        }
    }

    pub fn into_many(self) -> Vec<T> {
        match self {
            Self::One(value) => value.into_iter().collect(),
            Self::Many(values) => values,
        }
    }
}

/// Form slot that can hold a selection: `Option<T>` for single, `Vec<T>` for multi.
pub trait SelectionSlot<T>: Sized {
    const CARDINALITY: Cardinality;

    fn to_selection(&self) -> SelectionValue<T>;

    fn from_selection(value: SelectionValue<T>) -> Self;
}

impl<T: Clone> SelectionSlot<T> for Option<T> {
    const CARDINALITY: Cardinality = Cardinality::One;

    fn to_selection(&self) -> SelectionValue<T> {
        SelectionValue::One(self.clone())
    }

    fn from_selection(value: SelectionValue<T>) -> Self {
        value.into_single()
    }
}

impl<T: Clone> SelectionSlot<T> for Vec<T> {
    const CARDINALITY: Cardinality = Cardinality::Many;

    fn to_selection(&self) -> SelectionValue<T> {
        SelectionValue::Many(self.clone())
    }

    fn from_selection(value: SelectionValue<T>) -> Self {
        value.into_many()
    }
}

/// One browsable row in the option list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionRow {
    pub presentation: Presentation,
    pub selected: bool,
}

/// Render-ready snapshot of a selection field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldView {
    pub cardinality: Cardinality,
    /// Caption for the closed field. Empty when a single value does not resolve.
    pub button_label: String,
    /// Labels of resolvable selected entries, in selection order.
    pub selected_labels: Vec<String>,
    /// Count of selected values with no matching option.
    pub invalid_count: usize,
    /// `"+N Invalid Values"` when `invalid_count > 0`.
    pub invalid_indicator: Option<String>,
    pub options: Vec<OptionRow>,
    pub error: Option<String>,
    /// Advisory marker for a required field that is currently empty.
    pub required_hint: bool,
    pub open: bool,
    pub disabled: bool,
}

/// Selection field over option records `O` described by adapter `A`.
#[derive(Debug)]
pub struct SelectionField<A> {
    adapter: A,
    cardinality: Cardinality,
    placeholder: String,
    invalid_label: String,
    open: bool,
}

impl<A> SelectionField<A> {
    pub fn single(adapter: A) -> Self {
        Self::new(adapter, Cardinality::One)
    }

    pub fn multiple(adapter: A) -> Self {
        Self::new(adapter, Cardinality::Many)
    }

    pub fn new(adapter: A, cardinality: Cardinality) -> Self {
        Self {
            adapter,
            cardinality,
            placeholder: String::new(),
            invalid_label: "Invalid Values".to_string(),
            open: false,
        }
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn with_invalid_label(mut self, label: impl Into<String>) -> Self {
        self.invalid_label = label.into();
        self
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    pub fn cardinality(&self) -> Cardinality {
        self.cardinality
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Apply a user pick and return the next committed value.
    ///
    /// Single: the option replaces the value and the list closes.
    /// Multi: the option's key is toggled; an existing key is removed, a new
    /// one appended, and the list stays open.
    pub fn pick<O>(&mut self, current: &SelectionValue<A::Value>, option: &O) -> SelectionValue<A::Value>
    where
        A: OptionAdapter<O>,
    {
        let picked = self.adapter.to_value(option);
        match self.cardinality {
            Cardinality::One => {
                self.open = false;
                SelectionValue::One(Some(picked))
            }
            Cardinality::Many => {
                let key = self.adapter.value_key(&picked);
                let mut values = current.as_slice().to_vec();
                let before = values.len();
                values.retain(|value| self.adapter.value_key(value) != key);
                if values.len() == before {
                    values.push(picked);
                }
                SelectionValue::Many(values)
            }
        }
    }

    /// Remove the entry with `key`, as when dismissing a selected chip.
    pub fn remove<O>(&self, current: &SelectionValue<A::Value>, key: &A::Key) -> SelectionValue<A::Value>
    where
        A: OptionAdapter<O>,
    {
        match current {
            SelectionValue::One(Some(value)) if &self.adapter.value_key(value) == key => SelectionValue::One(None),
            SelectionValue::One(value) => SelectionValue::One(value.clone()),
            SelectionValue::Many(values) => SelectionValue::Many(
                values
                    .iter()
                    .filter(|value| &self.adapter.value_key(value) != key)
                    .cloned()
                    .collect(),
            ),
        }
    }

    /// Build the render snapshot for `current` against `options`.
    ///
    /// An unmatched single value renders a blank caption with
    /// `invalid_count == 1`, the same indicator multi-select uses; the raw
    /// value itself is left untouched.
    pub fn view<O>(&self, options: &[O], current: &SelectionValue<A::Value>, error: Option<&str>, required: bool) -> FieldView
    where
        A: OptionAdapter<O>,
    {
        let selected_keys: Vec<A::Key> = current.as_slice().iter().map(|value| self.adapter.value_key(value)).collect();
        let rows = options
            .iter()
            .map(|option| OptionRow {
                presentation: self.adapter.option_display(option),
                selected: selected_keys.contains(&self.adapter.option_key(option)),
            })
            .collect();

        let reconciliation = reconcile(Some(current.as_slice()), options, &self.adapter);
        let invalid_count = reconciliation.invalid.len();
        let selected_labels: Vec<String> = match self.cardinality {
            Cardinality::Many => reconciliation.valid.iter().map(|presentation| presentation.label.clone()).collect(),
            Cardinality::One => current
                .as_slice()
                .first()
                .and_then(|value| {
                    let key = self.adapter.value_key(value);
                    options.iter().find(|option| self.adapter.option_key(option) == key)
                })
                .map(|option| vec![self.adapter.option_display(option).label])
                .unwrap_or_default(),
        };

        let button_label = if current.is_empty() {
            self.placeholder.clone()
        } else {
            selected_labels.join(", ")
        };

        FieldView {
            cardinality: self.cardinality,
            button_label,
            selected_labels,
            invalid_count,
            invalid_indicator: reconciliation.invalid_indicator(&self.invalid_label),
            options: rows,
            error: error.map(str::to_string),
            required_hint: required && current.is_empty(),
            open: self.open,
            disabled: false,
        }
    }
}
