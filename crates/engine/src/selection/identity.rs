use std::{fmt, hash::Hash};

use serde::Serialize;

/// Rendered form of an option or a selected entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Presentation {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Presentation {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Projections a selection field needs from its option records.
///
/// Selections are stored as [`Value`](OptionAdapter::Value), never as the
/// option record itself, and all equality goes through
/// [`Key`](OptionAdapter::Key). `value_key` must be pure and stable: equal
/// logical values produce equal keys and unequal values never collide.
pub trait OptionAdapter<O> {
    type Value: Clone;
    type Key: Eq + Hash + Clone + fmt::Debug;

    fn to_value(&self, option: &O) -> Self::Value;

    fn value_key(&self, value: &Self::Value) -> Self::Key;

    fn option_display(&self, option: &O) -> Presentation;

    /// Display for entries that are already chosen. Multi-select fields use
    /// this for the denser chip/button rendering.
    fn selected_option_display(&self, option: &O) -> Presentation {
        self.option_display(option)
    }

    fn option_key(&self, option: &O) -> Self::Key {
        self.value_key(&self.to_value(option))
    }
}

type Projection<A, B> = Box<dyn Fn(&A) -> B + Send + Sync>;

/// Closure-backed [`OptionAdapter`] for ad hoc catalogs.
pub struct FnAdapter<O, V, K> {
    to_value: Projection<O, V>,
    value_key: Projection<V, K>,
    display: Projection<O, Presentation>,
    selected_display: Option<Projection<O, Presentation>>,
}

impl<O, V, K> FnAdapter<O, V, K> {
    pub fn new(
        to_value: impl Fn(&O) -> V + Send + Sync + 'static,
        value_key: impl Fn(&V) -> K + Send + Sync + 'static,
        display: impl Fn(&O) -> Presentation + Send + Sync + 'static,
    ) -> Self {
        Self {
            to_value: Box::new(to_value),
            value_key: Box::new(value_key),
            display: Box::new(display),
            selected_display: None,
        }
    }

    pub fn with_selected_display(mut self, display: impl Fn(&O) -> Presentation + Send + Sync + 'static) -> Self {
        self.selected_display = Some(Box::new(display));
        self
    }
}

impl<O, V, K> fmt::Debug for FnAdapter<O, V, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnAdapter")
            .field("selected_display", &self.selected_display.is_some())
            .finish()
    }
}

impl<O, V, K> OptionAdapter<O> for FnAdapter<O, V, K>
where
    V: Clone,
    K: Eq + Hash + Clone + fmt::Debug,
{
    type Value = V;
    type Key = K;

    fn to_value(&self, option: &O) -> V {
        (self.to_value)(option)
    }

    fn value_key(&self, value: &V) -> K {
        (self.value_key)(value)
    }

    fn option_display(&self, option: &O) -> Presentation {
        (self.display)(option)
    }

    fn selected_option_display(&self, option: &O) -> Presentation {
        match &self.selected_display {
            Some(display) => display(option),
            None => (self.display)(option),
        }
    }
}
