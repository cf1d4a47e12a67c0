//! Form binding bridge.
//!
//! A [`FormControl`] is the capability a form-state manager offers to the
//! selection fields: register a named field with rules, read and write its
//! value, and report its current error. [`FormStore`] is the in-memory
//! implementation used by the campaign form; [`FieldBinding`] wires a single
//! field into any control.

mod binding;
mod control;
mod store;

pub use binding::FieldBinding;
pub use control::FormControl;
pub use store::FormStore;
