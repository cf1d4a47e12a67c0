//! In-memory collaborators backed by plain vectors.
//!
//! Used by the CLI fixture runner and by tests. Searches match `q` as a
//! case-insensitive substring of the record name.

use std::sync::{
    Mutex, PoisonError,
    atomic::{AtomicBool, AtomicU64, Ordering},
};

use anyhow::{Result, anyhow, bail};
use chrono::Utc;
use dispatch_types::{AudienceList, Campaign, CampaignPayload, Page, Provider, RecordId, Scope, SearchParams, SubscriptionGroup};
use indexmap::IndexMap;
use tracing::debug;

use crate::collaborators::{CampaignStore, CatalogSource, RecordSearch};

#[derive(Debug)]
pub struct InMemoryBackend {
    providers: Vec<Provider>,
    subscriptions: Vec<SubscriptionGroup>,
    lists: Vec<AudienceList>,
    campaigns: Mutex<IndexMap<RecordId, Campaign>>,
    next_id: AtomicU64,
    failing: AtomicBool,
}

impl InMemoryBackend {
    pub fn new(providers: Vec<Provider>, subscriptions: Vec<SubscriptionGroup>, lists: Vec<AudienceList>) -> Self {
        Self {
            providers,
            subscriptions,
            lists,
            campaigns: Mutex::new(IndexMap::new()),
            next_id: AtomicU64::new(1),
            failing: AtomicBool::new(false),
        }
    }

    /// Register an existing campaign so it can be updated.
    pub fn with_campaign(self, campaign: Campaign) -> Self {
        self.next_id.fetch_max(campaign.id.0 + 1, Ordering::SeqCst);
        self.campaigns_guard().insert(campaign.id, campaign);
        self
    }

    /// Make every subsequent call fail, as an unreachable service would.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn campaign(&self, id: RecordId) -> Option<Campaign> {
        self.campaigns_guard().get(&id).cloned()
    }

    pub fn campaign_count(&self) -> usize {
        self.campaigns_guard().len()
    }

    /// Lists whose identifiers appear in `ids`, in catalog order.
    pub fn lists_by_id(&self, ids: &[RecordId]) -> Vec<AudienceList> {
        self.lists.iter().filter(|list| ids.contains(&list.id)).cloned().collect()
    }

    fn campaigns_guard(&self) -> std::sync::MutexGuard<'_, IndexMap<RecordId, Campaign>> {
        self.campaigns.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_available(&self, scope: &Scope) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            bail!("backend unavailable for scope '{scope}'");
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl RecordSearch<AudienceList> for InMemoryBackend {
    async fn search(&self, scope: &Scope, params: &SearchParams) -> Result<Page<AudienceList>> {
        self.check_available(scope)?;
        let needle = params.q.trim().to_lowercase();
        let matching: Vec<&AudienceList> = self
            .lists
            .iter()
            .filter(|list| needle.is_empty() || list.name.to_lowercase().contains(&needle))
            .collect();
        let page_size = params.page_size.max(1);
        let results = matching
            .iter()
            .skip(params.page.saturating_mul(page_size))
            .take(page_size)
            .map(|list| (*list).clone())
            .collect();
        debug!(%scope, q = %params.q, page = params.page, total = matching.len(), "searched lists");
        Ok(Page {
            results,
            page: params.page,
            total: Some(matching.len()),
        })
    }
}

#[async_trait::async_trait]
impl CatalogSource<Provider> for InMemoryBackend {
    async fn list_all(&self, scope: &Scope) -> Result<Vec<Provider>> {
        self.check_available(scope)?;
        Ok(self.providers.clone())
    }
}

#[async_trait::async_trait]
impl CatalogSource<SubscriptionGroup> for InMemoryBackend {
    async fn list_all(&self, scope: &Scope) -> Result<Vec<SubscriptionGroup>> {
        self.check_available(scope)?;
        Ok(self.subscriptions.clone())
    }
}

#[async_trait::async_trait]
impl CatalogSource<AudienceList> for InMemoryBackend {
    async fn list_all(&self, scope: &Scope) -> Result<Vec<AudienceList>> {
        self.check_available(scope)?;
        Ok(self.lists.clone())
    }
}

fn stored_campaign(id: RecordId, payload: &CampaignPayload, created_at: Option<chrono::DateTime<Utc>>) -> Result<Campaign> {
    let channel = payload.channel.ok_or_else(|| anyhow!("campaign requires a channel"))?;
    if payload.name.is_empty() {
        bail!("campaign requires a name");
    }
    let now = Utc::now();
    Ok(Campaign {
        id,
        name: payload.name.clone(),
        lists: payload.lists.clone(),
        exclusion_lists: payload.exclusion_lists.clone(),
        tags: payload.tags.clone(),
        channel,
        provider_id: payload.provider_id,
        subscription_id: payload.subscription_id,
        created_at: created_at.or(Some(now)),
        updated_at: Some(now),
    })
}

#[async_trait::async_trait]
impl CampaignStore for InMemoryBackend {
    async fn create(&self, scope: &Scope, payload: &CampaignPayload) -> Result<Campaign> {
        self.check_available(scope)?;
        let id = RecordId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let campaign = stored_campaign(id, payload, None)?;
        self.campaigns_guard().insert(id, campaign.clone());
        debug!(%scope, %id, "created campaign");
        Ok(campaign)
    }

    async fn update(&self, scope: &Scope, id: RecordId, payload: &CampaignPayload) -> Result<Campaign> {
        self.check_available(scope)?;
        let mut campaigns = self.campaigns_guard();
        let existing = campaigns.get(&id).ok_or_else(|| anyhow!("campaign {id} not found"))?;
        let campaign = stored_campaign(id, payload, existing.created_at)?;
        campaigns.insert(id, campaign.clone());
        debug!(%scope, %id, "updated campaign");
        Ok(campaign)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dispatch_types::Channel;

    fn backend() -> InMemoryBackend {
        let lists = ["VIP", "Newsletter", "vip-2024", "Churned"]
            .iter()
            .enumerate()
            .map(|(index, name)| AudienceList {
                id: RecordId(index as u64 + 1),
                name: name.to_string(),
                size: None,
            })
            .collect();
        InMemoryBackend::new(Vec::new(), Vec::new(), lists)
    }

    fn payload() -> CampaignPayload {
        CampaignPayload {
            name: "Launch".into(),
            lists: vec![RecordId(1)],
            exclusion_lists: Vec::new(),
            tags: Vec::new(),
            channel: Some(Channel::Email),
            provider_id: None,
            subscription_id: None,
        }
    }

    #[tokio::test]
    async fn search_matches_case_insensitively_and_pages() {
        let backend = backend();
        let scope = Scope::new("acme");
        let page = backend.search(&scope, &SearchParams::new("VIP", 0, 1)).await.unwrap();
        assert_eq!(page.total, Some(2));
        assert_eq!(page.results.len(), 1);
        assert_eq!(page.results[0].name, "VIP");

        let second = backend.search(&scope, &SearchParams::new("vip", 1, 1)).await.unwrap();
        assert_eq!(second.results[0].name, "vip-2024");

        let all = backend.search(&scope, &SearchParams::new("", 0, 10)).await.unwrap();
        assert_eq!(all.results.len(), 4);
    }

    #[tokio::test]
    async fn failing_switch_rejects_calls() {
        let backend = backend();
        backend.set_failing(true);
        let scope = Scope::new("acme");
        assert!(backend.search(&scope, &SearchParams::new("", 0, 10)).await.is_err());
        assert!(CatalogSource::<Provider>::list_all(&backend, &scope).await.is_err());
    }

    #[tokio::test]
    async fn create_then_update_keeps_creation_time() {
        let backend = backend();
        let scope = Scope::new("acme");
        let created = backend.create(&scope, &payload()).await.unwrap();
        assert_eq!(created.id, RecordId(1));

        let mut changed = payload();
        changed.name = "Relaunch".into();
        let updated = backend.update(&scope, created.id, &changed).await.unwrap();
        assert_eq!(updated.name, "Relaunch");
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(backend.campaign_count(), 1);
    }

    #[tokio::test]
    async fn update_of_unknown_campaign_fails() {
        let backend = backend();
        let error = backend.update(&Scope::new("acme"), RecordId(99), &payload()).await.unwrap_err();
        assert!(error.to_string().contains("not found"));
    }
}
