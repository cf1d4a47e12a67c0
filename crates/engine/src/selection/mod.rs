//! Selection primitives shared by every picker in the campaign form.
//!
//! Modules:
//! - `identity`: caller-supplied projections from option records to values, keys, and display
//! - `reconcile`: key-based matching of stored selections against a catalog
//! - `field`: single/multi selection field rules and rendered view

mod field;
mod identity;
mod reconcile;

pub use field::{Cardinality, FieldView, OptionRow, SelectionField, SelectionSlot, SelectionValue};
pub use identity::{FnAdapter, OptionAdapter, Presentation};
pub use reconcile::{Reconciliation, contains_key, dedupe_by_key, reconcile};
