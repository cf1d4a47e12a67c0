//! Contracts for the remote data-access layer.
//!
//! The core never talks to a transport directly. Pools, pickers, and submit
//! go through these traits so any backend (HTTP client, fixture, test double)
//! can be substituted.

use anyhow::Result;
use dispatch_types::{Campaign, CampaignPayload, Page, RecordId, Scope, SearchParams};

/// Paged, query-filterable search. An empty `q` must be accepted.
#[async_trait::async_trait]
pub trait RecordSearch<R: Send>: Send + Sync {
    async fn search(&self, scope: &Scope, params: &SearchParams) -> Result<Page<R>>;
}

/// Unpaged full-catalog fetch used for dependent pools.
#[async_trait::async_trait]
pub trait CatalogSource<R: Send>: Send + Sync {
    async fn list_all(&self, scope: &Scope) -> Result<Vec<R>>;
}

/// Persistence of the composed campaign. Called only on explicit submit.
#[async_trait::async_trait]
pub trait CampaignStore: Send + Sync {
    async fn create(&self, scope: &Scope, payload: &CampaignPayload) -> Result<Campaign>;

    async fn update(&self, scope: &Scope, id: RecordId, payload: &CampaignPayload) -> Result<Campaign>;
}
