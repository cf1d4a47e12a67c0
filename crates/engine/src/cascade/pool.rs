use std::fmt;

use dispatch_types::FieldRef;
use serde::Serialize;
use tracing::debug;

use super::graph::CascadeEdge;
use crate::{
    form::{FieldBinding, FormControl},
    selection::{OptionAdapter, contains_key, dedupe_by_key},
};

/// Lifecycle of a dependent field's pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PoolState {
    /// No upstream value yet, or the catalog has not arrived; pool is empty.
    Unset,
    /// Pool filtered by the upstream value; the pick has not been confirmed.
    Filtered,
    /// Current pick confirmed in the pool, or a default was just elected.
    Reconciled,
}

/// Result of one re-evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeOutcome {
    /// Upstream has no value.
    Unset,
    /// Catalog not loaded; the held value is left as-is until it can be checked.
    Pending,
    /// Current pick is still in the pool.
    Kept,
    /// Current pick was missing or absent from the pool; the first pool entry was written.
    Elected,
    /// Pool is empty and the previously held value was cleared.
    Cleared,
    /// Pool is empty and nothing was held.
    Empty,
}

/// Dependent single-select field whose pool is the full catalog filtered by
/// the upstream value.
///
/// Default election picks the first pool entry in catalog order. This is a
/// plain, deterministic rule; it does not rank by any business key.
pub struct DependentPool<S, U, O, A>
where
    A: OptionAdapter<O>,
{
    upstream: FieldRef<S, Option<U>>,
    binding: FieldBinding<S, Option<A::Value>>,
    adapter: A,
    matches: fn(&O, &U) -> bool,
    catalog: Vec<O>,
    loaded: bool,
    pool: Vec<O>,
    state: PoolState,
    empty_message: Option<String>,
}

impl<S, U, O, A> fmt::Debug for DependentPool<S, U, O, A>
where
    A: OptionAdapter<O>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DependentPool")
            .field("upstream", &self.upstream.name())
            .field("downstream", &self.binding.name())
            .field("catalog_len", &self.catalog.len())
            .field("pool_len", &self.pool.len())
            .field("loaded", &self.loaded)
            .field("state", &self.state)
            .finish()
    }
}

impl<S, U, O, A> DependentPool<S, U, O, A>
where
    A: OptionAdapter<O>,
{
    pub fn new(upstream: FieldRef<S, Option<U>>, binding: FieldBinding<S, Option<A::Value>>, adapter: A, matches: fn(&O, &U) -> bool) -> Self {
        Self {
            upstream,
            binding,
            adapter,
            matches,
            catalog: Vec::new(),
            loaded: false,
            pool: Vec::new(),
            state: PoolState::Unset,
            empty_message: None,
        }
    }

    /// Message reported for the downstream field while its pool is empty.
    pub fn with_empty_message(mut self, message: impl Into<String>) -> Self {
        self.empty_message = Some(message.into());
        self
    }

    /// Replace the full catalog. Duplicate keys keep their first occurrence.
    ///
    /// The pool is not recomputed here; callers re-run the edge afterwards.
    pub fn set_catalog(&mut self, catalog: Vec<O>) {
        self.catalog = dedupe_by_key(catalog, &self.adapter);
        self.loaded = true;
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn catalog(&self) -> &[O] {
        &self.catalog
    }

    pub fn pool(&self) -> &[O] {
        &self.pool
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    pub fn binding(&self) -> FieldBinding<S, Option<A::Value>> {
        self.binding
    }

    pub fn find(&self, key: &A::Key) -> Option<&O> {
        self.pool.iter().find(|option| &self.adapter.option_key(option) == key)
    }
}

impl<S, C, U, O, A> CascadeEdge<S, C> for DependentPool<S, U, O, A>
where
    C: FormControl<S>,
    U: Clone,
    O: Clone,
    A: OptionAdapter<O>,
{
    fn upstream(&self) -> &'static str {
        self.upstream.name()
    }

    fn downstream(&self) -> &'static str {
        self.binding.name()
    }

    fn state(&self) -> PoolState {
        self.state
    }

    fn reevaluate(&mut self, control: &mut C) -> EdgeOutcome {
        let name = self.binding.name();
        let current = self.binding.value(control).clone();

        let Some(upstream) = control.read(&self.upstream).clone() else {
            self.pool.clear();
            self.state = PoolState::Unset;
            control.set_message(name, None);
            if current.is_some() {
                self.binding.on_change(control, None);
            }
            return EdgeOutcome::Unset;
        };

        if !self.loaded {
            self.pool.clear();
            self.state = PoolState::Unset;
            return EdgeOutcome::Pending;
        }

        self.pool = self
            .catalog
            .iter()
            .filter(|option| (self.matches)(option, &upstream))
            .cloned()
            .collect();
        self.state = PoolState::Filtered;

        if self.pool.is_empty() {
            control.set_message(name, self.empty_message.clone());
            if current.is_some() {
                debug!(field = name, "pool empty; clearing held value");
                self.binding.on_change(control, None);
                return EdgeOutcome::Cleared;
            }
            return EdgeOutcome::Empty;
        }
        control.set_message(name, None);

        if let Some(current) = &current
            && contains_key(&self.pool, &self.adapter, &self.adapter.value_key(current))
        {
            self.state = PoolState::Reconciled;
            return EdgeOutcome::Kept;
        }

        let elected = self.adapter.to_value(&self.pool[0]);
        debug!(
            field = name,
            key = ?self.adapter.value_key(&elected),
            pool_len = self.pool.len(),
            "elected default for dependent field"
        );
        self.binding.on_change(control, Some(elected));
        self.state = PoolState::Reconciled;
        EdgeOutcome::Elected
    }
}
