//! # Dispatch Engine
//!
//! The engine holds the selection logic behind the campaign form: matching
//! stored identifiers against option catalogs, single and multi selection
//! fields, the bridge into a form-state manager, cascading dependent fields,
//! and the search-backed list accumulator.
//!
//! ## Usage
//!
//! ```rust
//! use dispatch_engine::{CampaignForm, ListField};
//! use dispatch_types::{AudienceList, Channel, Provider, RecordId};
//! use dispatch_util::FormConfig;
//!
//! let mut form = CampaignForm::new(None, &[], FormConfig::default())?;
//! form.apply_providers(vec![Provider { id: RecordId(9), name: "Twilio".into(), group: Channel::Sms }]);
//! form.pick_channel(Channel::Sms);
//! assert_eq!(form.draft().provider_id, Some(RecordId(9)));
//!
//! form.open_list_picker(ListField::Lists);
//! form.commit_list_pick(ListField::Lists, AudienceList { id: RecordId(4), name: "VIP".into(), size: None });
//! assert_eq!(form.draft().lists, vec![RecordId(4)]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! - **`selection`**: option adapters, reconciliation, and the selection field
//! - **`form`**: the `FormControl` capability, `FormStore`, and field bindings
//! - **`cascade`**: dependency graph and the dependent-pool re-evaluation rule
//! - **`accumulator`**: list accumulator and picker session state
//! - **`collaborators`**: async contracts for search, catalogs, and persistence
//! - **`campaign`** / **`session`**: the composed form and its mounted lifetime

pub mod accumulator;
pub mod campaign;
pub mod cascade;
pub mod collaborators;
pub mod error;
pub mod form;
pub mod memory;
pub mod selection;
pub mod session;

pub use accumulator::{Identified, ListAccumulator, PickerSession, SearchRequest};
pub use campaign::{
    CampaignForm, CatalogKind, CatalogWarning, ChannelAdapter, ListAdapter, ListField, ListSummary, ProviderAdapter, Submission,
    SubmitTarget, SubscriptionAdapter, TagAdapter,
};
pub use cascade::{CascadeCoordinator, CascadeEdge, CascadeError, CascadeGraph, DependentPool, EdgeOutcome, PoolState};
pub use collaborators::{CampaignStore, CatalogSource, RecordSearch};
pub use error::SubmitError;
pub use form::{FieldBinding, FormControl, FormStore};
pub use memory::InMemoryBackend;
pub use selection::{
    Cardinality, FieldView, FnAdapter, OptionAdapter, OptionRow, Presentation, Reconciliation, SelectionField, SelectionSlot,
    SelectionValue, reconcile,
};
pub use session::FormSession;
