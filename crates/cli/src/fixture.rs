//! Scripted form sessions.
//!
//! A fixture describes the backing catalogs, an optional campaign to edit,
//! and a list of user actions. Replaying it drives a [`FormSession`] over the
//! in-memory backend and reports the resulting field views.

use std::{fs, path::Path, sync::Arc};

use anyhow::{Context, Result};
use dispatch_engine::{
    CampaignForm, CatalogWarning, FieldView, FormSession, InMemoryBackend, ListField, ListSummary, SubmitError,
};
use dispatch_types::{AudienceList, Campaign, CampaignPayload, Channel, Provider, RecordId, Scope, SubscriptionGroup};
use dispatch_util::FormConfig;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub providers: Vec<Provider>,
    #[serde(default)]
    pub subscriptions: Vec<SubscriptionGroup>,
    #[serde(default)]
    pub lists: Vec<AudienceList>,
    /// Campaign to edit; a new campaign is created when absent.
    #[serde(default)]
    pub campaign: Option<Campaign>,
    /// Simulate an unreachable backend for the catalog fetches at mount.
    #[serde(default)]
    pub unavailable: bool,
    #[serde(default)]
    pub actions: Vec<Action>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    SetName { name: String },
    Channel { channel: Channel },
    Provider { id: RecordId },
    Subscription { id: RecordId },
    Tag { tag: String },
    /// Search lists with `query` and commit the result at `row` (default 0).
    AddList {
        #[serde(default)]
        query: String,
        #[serde(default)]
        row: usize,
    },
    AddExclusion {
        #[serde(default)]
        query: String,
        #[serde(default)]
        row: usize,
    },
    RemoveList { id: RecordId },
    RemoveExclusion { id: RecordId },
    Submit,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubmitReport {
    Saved { campaign: Campaign },
    Invalid { fields: Vec<&'static str> },
    Rejected { message: String },
}

impl From<Result<Campaign, SubmitError>> for SubmitReport {
    fn from(outcome: Result<Campaign, SubmitError>) -> Self {
        match outcome {
            Ok(campaign) => Self::Saved { campaign },
            Err(SubmitError::Invalid { fields }) => Self::Invalid { fields },
            Err(error) => Self::Rejected {
                message: error.to_string(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Report {
    pub channel: FieldView,
    pub provider: FieldView,
    pub subscription: FieldView,
    pub tags: FieldView,
    pub lists: ListSummary,
    pub exclusions: ListSummary,
    pub warnings: Vec<CatalogWarning>,
    pub payload: CampaignPayload,
    pub submits: Vec<SubmitReport>,
}

pub fn load_fixture(path: &Path) -> Result<Fixture> {
    let content = fs::read_to_string(path).with_context(|| format!("Failed to read fixture: {}", path.display()))?;
    serde_yaml::from_str(&content).with_context(|| format!("Failed to parse fixture: {}", path.display()))
}

pub async fn replay(fixture: Fixture, scope: Scope, config: FormConfig) -> Result<Report> {
    let mut backend = InMemoryBackend::new(fixture.providers, fixture.subscriptions, fixture.lists);
    if let Some(campaign) = fixture.campaign.clone() {
        backend = backend.with_campaign(campaign);
    }
    let backend = Arc::new(backend);
    let known_lists = match &fixture.campaign {
        Some(campaign) => {
            let mut ids = campaign.lists.clone();
            ids.extend(&campaign.exclusion_lists);
            backend.lists_by_id(&ids)
        }
        None => Vec::new(),
    };

    let form = CampaignForm::new(fixture.campaign.as_ref(), &known_lists, config)?;
    let session = FormSession::mount(form, scope);

    backend.set_failing(fixture.unavailable);
    for handle in session.load_catalogs(backend.clone(), backend.clone()) {
        handle.await.context("catalog task panicked")?;
    }
    backend.set_failing(false);

    let mut submits = Vec::new();
    for (index, action) in fixture.actions.into_iter().enumerate() {
        debug!(index, action = ?action, "replaying action");
        match action {
            Action::SetName { name } => {
                with_form(&session, |form| {
                    form.set_name(name);
                })?;
            }
            Action::Channel { channel } => {
                with_form(&session, |form| {
                    form.pick_channel(channel);
                })?;
            }
            Action::Provider { id } => {
                if !with_form(&session, |form| form.pick_provider(id))? {
                    info!(%id, "provider not available for the current channel");
                }
            }
            Action::Subscription { id } => {
                if !with_form(&session, |form| form.pick_subscription(id))? {
                    info!(%id, "subscription group not available for the current channel");
                }
            }
            Action::Tag { tag } => {
                with_form(&session, |form| {
                    form.create_tag(&tag);
                })?;
            }
            Action::AddList { query, row } => add_from_search(&session, &backend, ListField::Lists, query, row).await?,
            Action::AddExclusion { query, row } => {
                add_from_search(&session, &backend, ListField::Exclusions, query, row).await?
            }
            Action::RemoveList { id } => {
                with_form(&session, |form| {
                    form.remove_list(ListField::Lists, id);
                })?;
            }
            Action::RemoveExclusion { id } => {
                with_form(&session, |form| {
                    form.remove_list(ListField::Exclusions, id);
                })?;
            }
            Action::Submit => submits.push(SubmitReport::from(session.submit(backend.as_ref()).await)),
        }
    }

    with_form(&session, |form| Report {
        channel: form.channel_view(),
        provider: form.provider_view(),
        subscription: form.subscription_view(),
        tags: form.tags_view(),
        lists: form.lists_summary(ListField::Lists),
        exclusions: form.lists_summary(ListField::Exclusions),
        warnings: form.warnings().to_vec(),
        payload: form.payload(),
        submits,
    })
}

fn with_form<T>(session: &FormSession, f: impl FnOnce(&mut CampaignForm) -> T) -> Result<T> {
    session.with_form(f).context("form session is no longer mounted")
}

async fn add_from_search(session: &FormSession, backend: &Arc<InMemoryBackend>, field: ListField, query: String, row: usize) -> Result<()> {
    let request = with_form(session, |form| {
        form.open_list_picker(field);
        form.list_picker_mut(field).map(|picker| picker.set_query(query))
    })?
    .context("list picker did not open")?;
    let handle = session
        .spawn_list_search(field, request, backend.clone())
        .context("form session is no longer mounted")?;
    handle.await.context("search task panicked")?;

    let committed = with_form(session, |form| form.commit_list_row(field, row))?;
    if committed.is_none() {
        info!(?field, row, "no search result at row; closing picker");
        with_form(session, |form| form.close_list_picker(field))?;
    }
    Ok(())
}
