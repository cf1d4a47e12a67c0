//! Multi-value selection built from repeated search-and-pick rounds.
//!
//! The list pickers browse catalogs that can hold thousands of records, so
//! instead of a static option list they open a paged search dialog
//! ([`PickerSession`]) and merge one confirmed pick at a time into a
//! [`ListAccumulator`].

mod list;
mod picker;

pub use list::{Identified, ListAccumulator};
pub use picker::{PickerSession, SearchRequest};
