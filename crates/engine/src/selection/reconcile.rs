use std::collections::HashSet;

use super::identity::{OptionAdapter, Presentation};

/// Partition of a selection into entries that resolve against the catalog
/// and entries that no longer do.
///
/// Recomputed on every render; the catalog can change independently of the
/// selection, so the result is never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation<V> {
    /// Rich presentation for resolvable entries, in selection order.
    pub valid: Vec<Presentation>,
    /// Raw values with no matching option. They are still retained and submitted.
    pub invalid: Vec<V>,
}

impl<V> Reconciliation<V> {
    pub fn is_empty(&self) -> bool {
        self.valid.is_empty() && self.invalid.is_empty()
    }

    /// `"+N <label>"` when orphaned entries exist.
    pub fn invalid_indicator(&self, label: &str) -> Option<String> {
        if self.invalid.is_empty() {
            None
        } else {
            Some(format!("+{} {}", self.invalid.len(), label))
        }
    }

    /// Button caption: resolvable labels followed by the invalid indicator.
    pub fn caption(&self, invalid_label: &str) -> String {
        let mut parts: Vec<String> = self.valid.iter().map(|presentation| presentation.label.clone()).collect();
        if let Some(indicator) = self.invalid_indicator(invalid_label) {
            parts.push(indicator);
        }
        parts.join(", ")
    }
}

/// Classify each selected value as valid or invalid against `catalog`.
///
/// A value is valid iff some option yields the same key. `None` and an empty
/// selection both produce an empty partition.
pub fn reconcile<O, A>(selection: Option<&[A::Value]>, catalog: &[O], adapter: &A) -> Reconciliation<A::Value>
where
    A: OptionAdapter<O>,
{
    let mut reconciliation = Reconciliation {
        valid: Vec::new(),
        invalid: Vec::new(),
    };
    for value in selection.unwrap_or_default() {
        let key = adapter.value_key(value);
        match catalog.iter().find(|option| adapter.option_key(option) == key) {
            Some(option) => reconciliation.valid.push(adapter.selected_option_display(option)),
            None => reconciliation.invalid.push(value.clone()),
        }
    }
    reconciliation
}

/// Whether any option in `catalog` has `key`.
pub fn contains_key<O, A>(catalog: &[O], adapter: &A, key: &A::Key) -> bool
where
    A: OptionAdapter<O>,
{
    catalog.iter().any(|option| &adapter.option_key(option) == key)
}

/// Drop options whose key already appeared earlier in the catalog.
pub fn dedupe_by_key<O, A>(catalog: Vec<O>, adapter: &A) -> Vec<O>
where
    A: OptionAdapter<O>,
{
    let mut seen = HashSet::new();
    catalog
        .into_iter()
        .filter(|option| seen.insert(adapter.option_key(option)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::FnAdapter;

    #[derive(Debug, Clone)]
    struct Row {
        id: u64,
        name: &'static str,
    }

    fn adapter() -> FnAdapter<Row, u64, u64> {
        FnAdapter::new(|row: &Row| row.id, |id: &u64| *id, |row: &Row| Presentation::new(row.name))
    }

    fn catalog() -> Vec<Row> {
        vec![Row { id: 1, name: "A" }, Row { id: 2, name: "B" }]
    }

    #[test]
    fn partitions_selection_into_valid_and_invalid() {
        let result = reconcile(Some(&[1, 3][..]), &catalog(), &adapter());
        assert_eq!(result.valid, vec![Presentation::new("A")]);
        assert_eq!(result.invalid, vec![3]);
        assert_eq!(result.caption("Invalid Values"), "A, +1 Invalid Values");
    }

    #[test]
    fn absent_and_empty_selection_are_equivalent() {
        let absent = reconcile(None, &catalog(), &adapter());
        let empty = reconcile(Some(&[][..]), &catalog(), &adapter());
        assert!(absent.is_empty());
        assert_eq!(absent, empty);
        assert_eq!(absent.caption("Invalid Values"), "");
    }

    #[test]
    fn matches_by_key_not_by_record_identity() {
        let refreshed = vec![Row { id: 2, name: "B (renamed)" }];
        let result = reconcile(Some(&[2][..]), &refreshed, &adapter());
        assert_eq!(result.valid[0].label, "B (renamed)");
        assert!(result.invalid.is_empty());
    }

    #[test]
    fn every_value_lands_in_exactly_one_partition() {
        let selection = [1, 2, 3, 4, 1];
        let result = reconcile(Some(&selection[..]), &catalog(), &adapter());
        assert_eq!(result.valid.len() + result.invalid.len(), selection.len());
        assert_eq!(result.invalid, vec![3, 4]);
    }

    #[test]
    fn selected_display_is_used_for_chosen_entries() {
        let adapter = adapter().with_selected_display(|row: &Row| Presentation::new(format!("#{}", row.id)));
        let result = reconcile(Some(&[2][..]), &catalog(), &adapter);
        assert_eq!(result.valid, vec![Presentation::new("#2")]);
    }

    #[test]
    fn dedupe_keeps_first_option_per_key() {
        let rows = vec![Row { id: 1, name: "A" }, Row { id: 1, name: "A2" }, Row { id: 2, name: "B" }];
        let deduped = dedupe_by_key(rows, &adapter());
        assert_eq!(deduped.iter().map(|row| row.name).collect::<Vec<_>>(), vec!["A", "B"]);
        assert!(contains_key(&deduped, &adapter(), &2));
        assert!(!contains_key(&deduped, &adapter(), &9));
    }
}
