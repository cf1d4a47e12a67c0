use dispatch_types::{AudienceList, RecordId};
use indexmap::IndexMap;
use tracing::debug;

use super::picker::{PickerSession, SearchRequest};

/// Records that carry a stable identity.
pub trait Identified {
    fn id(&self) -> RecordId;
}

impl Identified for AudienceList {
    fn id(&self) -> RecordId {
        self.id
    }
}

/// Locally accumulated multi-value selection of records.
///
/// Entries are keyed by identity and keep insertion order. An entry seeded
/// from an identifier whose record is unknown is kept (and submitted) with no
/// record attached, so the identifier list and the displayed records are two
/// projections of the same map and cannot drift apart.
#[derive(Debug, Clone)]
pub struct ListAccumulator<R> {
    entries: IndexMap<RecordId, Option<R>>,
    picker: Option<PickerSession<R>>,
    sessions_opened: u64,
}

impl<R> Default for ListAccumulator<R> {
    fn default() -> Self {
        Self {
            entries: IndexMap::new(),
            picker: None,
            sessions_opened: 0,
        }
    }
}

impl<R: Identified> ListAccumulator<R> {
    /// Seed from the parent form's initial identifiers, attaching any known records.
    ///
    /// Seeding happens only here; nothing re-seeds a live accumulator. A
    /// repeated identifier collapses onto its first position.
    pub fn seeded(initial: &[RecordId], known: impl IntoIterator<Item = R>) -> Self {
        let mut known: IndexMap<RecordId, R> = known.into_iter().map(|record| (record.id(), record)).collect();
        let mut entries = IndexMap::with_capacity(initial.len());
        for id in initial {
            entries.entry(*id).or_insert_with(|| known.shift_remove(id));
        }
        if entries.len() < initial.len() {
            debug!(supplied = initial.len(), kept = entries.len(), "collapsed repeated list identifiers");
        }
        Self {
            entries,
            ..Self::default()
        }
    }

    /// Merge a confirmed pick by identity, close the dialog, and return the identifiers.
    ///
    /// A new identity is appended; an existing one is replaced in place.
    pub fn commit_pick(&mut self, record: R) -> Vec<RecordId> {
        let id = record.id();
        let replaced = self.entries.insert(id, Some(record)).is_some();
        debug!(%id, replaced, total = self.entries.len(), "list pick committed");
        self.picker = None;
        self.identifiers()
    }

    /// Remove one entry and return the identifiers.
    pub fn remove(&mut self, id: RecordId) -> Vec<RecordId> {
        self.entries.shift_remove(&id);
        self.identifiers()
    }

    pub fn identifiers(&self) -> Vec<RecordId> {
        self.entries.keys().copied().collect()
    }

    /// Records available for display, in selection order.
    pub fn records(&self) -> Vec<&R> {
        self.entries.values().flatten().collect()
    }

    pub fn contains(&self, id: RecordId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Open the pick dialog and return the initial (empty-query) search.
    pub fn open_picker(&mut self, page_size: usize) -> SearchRequest {
        self.sessions_opened += 1;
        let mut picker = PickerSession::new(self.sessions_opened, page_size);
        let request = picker.refresh();
        self.picker = Some(picker);
        request
    }

    /// Close the dialog; in-flight searches for it are discarded on arrival.
    pub fn close_picker(&mut self) {
        self.picker = None;
    }

    pub fn is_picker_open(&self) -> bool {
        self.picker.is_some()
    }

    pub fn picker(&self) -> Option<&PickerSession<R>> {
        self.picker.as_ref()
    }

    pub fn picker_mut(&mut self) -> Option<&mut PickerSession<R>> {
        self.picker.as_mut()
    }

    /// Route search results to the open dialog. Returns `false` when the
    /// dialog has closed or the response is stale.
    pub fn apply_search(&mut self, request: &SearchRequest, outcome: anyhow::Result<dispatch_types::Page<R>>) -> bool {
        match self.picker.as_mut() {
            Some(picker) => picker.apply_results(request, outcome),
            None => {
                debug!(session = request.session, "search finished after picker closed");
                false
            }
        }
    }
}
