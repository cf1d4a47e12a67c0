//! Errors that cross the form boundary.
//!
//! Catalog fetch and reconciliation problems are absorbed inside the form;
//! only submit outcomes are reported to callers.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SubmitError {
    /// Required fields are empty. Nothing was sent to the store.
    #[error("form has invalid fields: {}", fields.join(", "))]
    Invalid { fields: Vec<&'static str> },

    /// The backing service refused the create or update. Field state is kept
    /// so the user can resubmit.
    #[error("campaign was rejected by the backing service: {0}")]
    Rejected(#[source] anyhow::Error),

    /// The session was torn down before the submit could run.
    #[error("form session is no longer mounted")]
    Unmounted,
}

impl SubmitError {
    pub fn invalid_fields(&self) -> &[&'static str] {
        match self {
            Self::Invalid { fields } => fields,
            _ => &[],
        }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }
}
