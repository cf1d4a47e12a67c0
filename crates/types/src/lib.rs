//! Shared type definitions for the Dispatch campaign toolkit.
//!
//! The records here are deliberately transport-agnostic: the engine only
//! relies on their identity (`RecordId`) and the channel grouping used by
//! the cascading provider/subscription fields.

pub mod campaign;
pub mod catalog;
pub mod field;
pub mod search;

pub use campaign::{Campaign, CampaignDraft, CampaignPayload};
pub use catalog::{AudienceList, Channel, ParseChannelError, Provider, RecordId, SubscriptionGroup};
pub use field::{FieldRef, FieldRules, IsEmptyValue};
pub use search::{Page, Scope, SearchParams};
