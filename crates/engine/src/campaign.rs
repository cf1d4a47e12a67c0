//! The campaign form: every selection primitive composed over one draft.
//!
//! `CampaignForm` is synchronous and owns all field state. Network work is
//! driven from outside (see [`crate::session`]) and its results are fed back
//! through `apply_*` / `record_catalog_failure`, so every transition happens
//! as one discrete event.

use std::fmt;

use dispatch_types::{
    AudienceList, Campaign, CampaignDraft, CampaignPayload, Channel, FieldRules, Page, Provider, RecordId, Scope, SubscriptionGroup,
};
use dispatch_util::FormConfig;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    accumulator::{ListAccumulator, PickerSession, SearchRequest},
    cascade::{CascadeCoordinator, CascadeEdge, CascadeGraph, DependentPool, EdgeOutcome},
    collaborators::CampaignStore,
    error::SubmitError,
    form::{FieldBinding, FormControl, FormStore},
    selection::{FieldView, OptionAdapter, Presentation, SelectionField, reconcile},
};

#[derive(Debug, Clone, Copy, Default)]
pub struct ChannelAdapter;

impl OptionAdapter<Channel> for ChannelAdapter {
    type Value = Channel;
    type Key = Channel;

    fn to_value(&self, option: &Channel) -> Channel {
        *option
    }

    fn value_key(&self, value: &Channel) -> Channel {
        *value
    }

    fn option_display(&self, option: &Channel) -> Presentation {
        Presentation::new(option.label())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ProviderAdapter;

impl OptionAdapter<Provider> for ProviderAdapter {
    type Value = RecordId;
    type Key = RecordId;

    fn to_value(&self, option: &Provider) -> RecordId {
        option.id
    }

    fn value_key(&self, value: &RecordId) -> RecordId {
        *value
    }

    fn option_display(&self, option: &Provider) -> Presentation {
        Presentation::new(option.name.clone()).with_detail(option.group.label())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SubscriptionAdapter;

impl OptionAdapter<SubscriptionGroup> for SubscriptionAdapter {
    type Value = RecordId;
    type Key = RecordId;

    fn to_value(&self, option: &SubscriptionGroup) -> RecordId {
        option.id
    }

    fn value_key(&self, value: &RecordId) -> RecordId {
        *value
    }

    fn option_display(&self, option: &SubscriptionGroup) -> Presentation {
        Presentation::new(option.name.clone())
    }
}

/// Audience lists: browsable rows show the size, chosen entries only the name.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListAdapter;

impl OptionAdapter<AudienceList> for ListAdapter {
    type Value = RecordId;
    type Key = RecordId;

    fn to_value(&self, option: &AudienceList) -> RecordId {
        option.id
    }

    fn value_key(&self, value: &RecordId) -> RecordId {
        *value
    }

    fn option_display(&self, option: &AudienceList) -> Presentation {
        let presentation = Presentation::new(option.name.clone());
        match option.size {
            Some(size) => presentation.with_detail(format!("{size} contacts")),
            None => presentation,
        }
    }

    fn selected_option_display(&self, option: &AudienceList) -> Presentation {
        Presentation::new(option.name.clone())
    }
}

/// Tags are free-form strings; the tag itself is the key.
#[derive(Debug, Clone, Copy, Default)]
pub struct TagAdapter;

impl OptionAdapter<String> for TagAdapter {
    type Value = String;
    type Key = String;

    fn to_value(&self, option: &String) -> String {
        option.clone()
    }

    fn value_key(&self, value: &String) -> String {
        value.clone()
    }

    fn option_display(&self, option: &String) -> Presentation {
        Presentation::new(option.clone())
    }
}

type ProviderPool = DependentPool<CampaignDraft, Channel, Provider, ProviderAdapter>;
type SubscriptionPool = DependentPool<CampaignDraft, Channel, SubscriptionGroup, SubscriptionAdapter>;
type DraftEdge<'a> = &'a mut dyn CascadeEdge<CampaignDraft, FormStore<CampaignDraft>>;

fn provider_matches(provider: &Provider, channel: &Channel) -> bool {
    provider.group == *channel
}

fn subscription_matches(group: &SubscriptionGroup, channel: &Channel) -> bool {
    group.channel == *channel
}

/// Which accumulated list field an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListField {
    Lists,
    Exclusions,
}

/// Full catalogs fetched once at mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogKind {
    Providers,
    Subscriptions,
}

impl fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Providers => f.write_str("providers"),
            Self::Subscriptions => f.write_str("subscriptions"),
        }
    }
}

/// Non-blocking notice that a catalog could not be fetched.
///
/// The affected pool stays empty and the form remains editable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogWarning {
    pub catalog: CatalogKind,
    pub message: String,
}

/// Render snapshot of an accumulated list field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListSummary {
    pub identifiers: Vec<RecordId>,
    pub labels: Vec<String>,
    pub invalid_count: usize,
    pub caption: String,
    pub error: Option<String>,
    pub picker_open: bool,
}

/// Whether a submit creates a campaign or updates the one being edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitTarget {
    Create,
    Update(RecordId),
}

/// A validated payload ready to hand to a [`CampaignStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub target: SubmitTarget,
    pub payload: CampaignPayload,
}

impl Submission {
    pub async fn send(&self, store: &dyn CampaignStore, scope: &Scope) -> anyhow::Result<Campaign> {
        match self.target {
            SubmitTarget::Create => store.create(scope, &self.payload).await,
            SubmitTarget::Update(id) => store.update(scope, id, &self.payload).await,
        }
    }
}

pub struct CampaignForm {
    config: FormConfig,
    store: FormStore<CampaignDraft>,
    editing: Option<RecordId>,
    name: FieldBinding<CampaignDraft, String>,
    channel: FieldBinding<CampaignDraft, Option<Channel>>,
    channel_field: SelectionField<ChannelAdapter>,
    tags: FieldBinding<CampaignDraft, Vec<String>>,
    tags_field: SelectionField<TagAdapter>,
    tag_options: Vec<String>,
    providers: ProviderPool,
    provider_field: SelectionField<ProviderAdapter>,
    subscriptions: SubscriptionPool,
    subscription_field: SelectionField<SubscriptionAdapter>,
    coordinator: CascadeCoordinator,
    lists: FieldBinding<CampaignDraft, Vec<RecordId>>,
    list_records: ListAccumulator<AudienceList>,
    exclusions: FieldBinding<CampaignDraft, Vec<RecordId>>,
    exclusion_records: ListAccumulator<AudienceList>,
    warnings: Vec<CatalogWarning>,
}

impl fmt::Debug for CampaignForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CampaignForm")
            .field("editing", &self.editing)
            .field("draft", self.store.value())
            .field("providers", &self.providers)
            .field("subscriptions", &self.subscriptions)
            .field("warnings", &self.warnings)
            .finish()
    }
}

impl CampaignForm {
    /// Build a form seeded from `existing` (edit mode) or empty (create mode).
    ///
    /// `known_lists` supplies display records for list identifiers already on
    /// the campaign; identifiers without a record are kept and shown as invalid.
    pub fn new(existing: Option<&Campaign>, known_lists: &[AudienceList], config: FormConfig) -> Result<Self, crate::cascade::CascadeError> {
        let mut draft = existing.map(CampaignDraft::from_campaign).unwrap_or_default();
        let list_records = ListAccumulator::seeded(&draft.lists, known_lists.iter().cloned());
        let exclusion_records = ListAccumulator::seeded(&draft.exclusion_lists, known_lists.iter().cloned());
        draft.lists = list_records.identifiers();
        draft.exclusion_lists = exclusion_records.identifiers();
        let tag_options = draft.tags.clone();

        let mut store = FormStore::new(draft, config.required_message.clone());
        let name = FieldBinding::bind(&mut store, CampaignDraft::NAME, FieldRules::required());
        let lists = FieldBinding::bind(&mut store, CampaignDraft::LISTS, FieldRules::required());
        let exclusions = FieldBinding::bind(&mut store, CampaignDraft::EXCLUSION_LISTS, FieldRules::optional());
        let tags = FieldBinding::bind(&mut store, CampaignDraft::TAGS, FieldRules::optional());
        let channel = FieldBinding::bind(&mut store, CampaignDraft::CHANNEL, FieldRules::required());
        let provider = FieldBinding::bind(&mut store, CampaignDraft::PROVIDER_ID, FieldRules::required());
        let subscription = FieldBinding::bind(&mut store, CampaignDraft::SUBSCRIPTION_ID, FieldRules::optional());

        let graph = CascadeGraph::new(&[
            (CampaignDraft::CHANNEL.name(), CampaignDraft::PROVIDER_ID.name()),
            (CampaignDraft::CHANNEL.name(), CampaignDraft::SUBSCRIPTION_ID.name()),
        ])?;

        let mut form = Self {
            store,
            editing: existing.map(|campaign| campaign.id),
            name,
            channel,
            channel_field: SelectionField::single(ChannelAdapter).with_placeholder("Select a channel"),
            tags,
            tags_field: SelectionField::multiple(TagAdapter).with_invalid_label(config.invalid_values_label.clone()),
            tag_options,
            providers: DependentPool::new(CampaignDraft::CHANNEL, provider, ProviderAdapter, provider_matches)
                .with_empty_message(config.empty_pool_message.clone()),
            provider_field: SelectionField::single(ProviderAdapter)
                .with_placeholder("Select a provider")
                .with_invalid_label(config.invalid_values_label.clone()),
            subscriptions: DependentPool::new(CampaignDraft::CHANNEL, subscription, SubscriptionAdapter, subscription_matches),
            subscription_field: SelectionField::single(SubscriptionAdapter)
                .with_placeholder("Select a subscription group")
                .with_invalid_label(config.invalid_values_label.clone()),
            coordinator: CascadeCoordinator::new(graph),
            lists,
            list_records,
            exclusions,
            exclusion_records,
            warnings: Vec::new(),
            config,
        };
        form.settle();
        debug!(editing = ?form.editing, "campaign form mounted");
        Ok(form)
    }

    pub fn config(&self) -> &FormConfig {
        &self.config
    }

    pub fn draft(&self) -> &CampaignDraft {
        self.store.value()
    }

    pub fn control(&self) -> &FormStore<CampaignDraft> {
        &self.store
    }

    /// Identifier of the campaign being edited, once one exists.
    pub fn editing(&self) -> Option<RecordId> {
        self.editing
    }

    pub fn warnings(&self) -> &[CatalogWarning] {
        &self.warnings
    }

    pub fn payload(&self) -> CampaignPayload {
        self.store.value().to_payload()
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> Option<&str> {
        self.name.on_change(&mut self.store, name.into())
    }

    /// Commit a channel and re-run every dependent field.
    pub fn pick_channel(&mut self, channel: Channel) -> Vec<(&'static str, EdgeOutcome)> {
        let current = self.channel.selection::<Channel, _>(&self.store);
        let next = self.channel_field.pick(&current, &channel);
        self.channel.commit_selection(&mut self.store, next);
        self.propagate(CampaignDraft::CHANNEL.name())
    }

    /// Commit a provider from the current pool. Returns `false` when `id` is not in it.
    pub fn pick_provider(&mut self, id: RecordId) -> bool {
        let Some(option) = self.providers.find(&id).cloned() else {
            debug!(%id, "provider not in current pool");
            return false;
        };
        let binding = self.providers.binding();
        let current = binding.selection::<RecordId, _>(&self.store);
        let next = self.provider_field.pick(&current, &option);
        binding.commit_selection(&mut self.store, next);
        true
    }

    /// Commit a subscription group from the current pool. Returns `false` when `id` is not in it.
    pub fn pick_subscription(&mut self, id: RecordId) -> bool {
        let Some(option) = self.subscriptions.find(&id).cloned() else {
            debug!(%id, "subscription group not in current pool");
            return false;
        };
        let binding = self.subscriptions.binding();
        let current = binding.selection::<RecordId, _>(&self.store);
        let next = self.subscription_field.pick(&current, &option);
        binding.commit_selection(&mut self.store, next);
        true
    }

    /// Subscription groups are optional and can be cleared.
    pub fn clear_subscription(&mut self) {
        let binding = self.subscriptions.binding();
        let current = binding.selection::<RecordId, _>(&self.store);
        let Some(id) = current.as_slice().first().copied() else {
            return;
        };
        let next = self.subscription_field.remove::<SubscriptionGroup>(&current, &id);
        binding.commit_selection(&mut self.store, next);
    }

    /// Toggle a known tag. Returns `false` for a tag that is not an option.
    pub fn toggle_tag(&mut self, tag: &str) -> bool {
        let Some(option) = self.tag_options.iter().find(|option| option.as_str() == tag).cloned() else {
            return false;
        };
        let current = self.tags.selection::<String, _>(&self.store);
        let next = self.tags_field.pick(&current, &option);
        self.tags.commit_selection(&mut self.store, next);
        true
    }

    /// Add a new tag option and select it. Blank input is ignored.
    pub fn create_tag(&mut self, tag: &str) -> bool {
        let tag = tag.trim();
        if tag.is_empty() {
            return false;
        }
        if !self.tag_options.iter().any(|option| option == tag) {
            self.tag_options.push(tag.to_string());
        }
        if self.store.value().tags.iter().any(|selected| selected == tag) {
            return true;
        }
        self.toggle_tag(tag)
    }

    /// Replace the provider catalog and reconcile the provider field against it.
    pub fn apply_providers(&mut self, providers: Vec<Provider>) -> Vec<(&'static str, EdgeOutcome)> {
        info!(item_count = providers.len(), "provider catalog loaded");
        self.providers.set_catalog(providers);
        self.refresh(CampaignDraft::PROVIDER_ID.name())
    }

    /// Replace the subscription catalog and reconcile the subscription field against it.
    pub fn apply_subscriptions(&mut self, groups: Vec<SubscriptionGroup>) -> Vec<(&'static str, EdgeOutcome)> {
        info!(item_count = groups.len(), "subscription catalog loaded");
        self.subscriptions.set_catalog(groups);
        self.refresh(CampaignDraft::SUBSCRIPTION_ID.name())
    }

    /// Absorb a failed catalog fetch. The pool stays empty; nothing is thrown.
    pub fn record_catalog_failure(&mut self, catalog: CatalogKind, error: &anyhow::Error) {
        warn!(%catalog, error = %error, "catalog fetch failed; pool left empty");
        self.warnings.push(CatalogWarning {
            catalog,
            message: format!("Could not load {catalog}: {error}"),
        });
    }

    pub fn is_catalog_loaded(&self, catalog: CatalogKind) -> bool {
        match catalog {
            CatalogKind::Providers => self.providers.is_loaded(),
            CatalogKind::Subscriptions => self.subscriptions.is_loaded(),
        }
    }

    pub fn provider_pool(&self) -> &[Provider] {
        self.providers.pool()
    }

    pub fn subscription_pool(&self) -> &[SubscriptionGroup] {
        self.subscriptions.pool()
    }

    fn propagate(&mut self, changed: &str) -> Vec<(&'static str, EdgeOutcome)> {
        let mut edges: [DraftEdge<'_>; 2] = [&mut self.providers, &mut self.subscriptions];
        self.coordinator.propagate(changed, &mut edges, &mut self.store)
    }

    fn refresh(&mut self, field: &'static str) -> Vec<(&'static str, EdgeOutcome)> {
        let mut edges: [DraftEdge<'_>; 2] = [&mut self.providers, &mut self.subscriptions];
        self.coordinator.refresh(field, &mut edges, &mut self.store)
    }

    fn settle(&mut self) -> Vec<(&'static str, EdgeOutcome)> {
        let mut edges: [DraftEdge<'_>; 2] = [&mut self.providers, &mut self.subscriptions];
        self.coordinator.settle(&mut edges, &mut self.store)
    }

    fn list_binding(&self, field: ListField) -> FieldBinding<CampaignDraft, Vec<RecordId>> {
        match field {
            ListField::Lists => self.lists,
            ListField::Exclusions => self.exclusions,
        }
    }

    fn accumulator(&self, field: ListField) -> &ListAccumulator<AudienceList> {
        match field {
            ListField::Lists => &self.list_records,
            ListField::Exclusions => &self.exclusion_records,
        }
    }

    fn accumulator_mut(&mut self, field: ListField) -> &mut ListAccumulator<AudienceList> {
        match field {
            ListField::Lists => &mut self.list_records,
            ListField::Exclusions => &mut self.exclusion_records,
        }
    }

    /// Open the pick dialog for `field` and return its first search.
    pub fn open_list_picker(&mut self, field: ListField) -> SearchRequest {
        let page_size = self.config.search_page_size;
        self.accumulator_mut(field).open_picker(page_size)
    }

    pub fn close_list_picker(&mut self, field: ListField) {
        self.accumulator_mut(field).close_picker();
    }

    pub fn list_picker(&self, field: ListField) -> Option<&PickerSession<AudienceList>> {
        self.accumulator(field).picker()
    }

    pub fn list_picker_mut(&mut self, field: ListField) -> Option<&mut PickerSession<AudienceList>> {
        self.accumulator_mut(field).picker_mut()
    }

    /// Route a finished search to the dialog for `field`. Returns `false` if it was discarded.
    pub fn apply_list_search(&mut self, field: ListField, request: &SearchRequest, outcome: anyhow::Result<Page<AudienceList>>) -> bool {
        self.accumulator_mut(field).apply_search(request, outcome)
    }

    /// Merge a confirmed pick and write the identifiers through to the form.
    pub fn commit_list_pick(&mut self, field: ListField, record: AudienceList) -> Vec<RecordId> {
        let identifiers = self.accumulator_mut(field).commit_pick(record);
        let binding = self.list_binding(field);
        binding.on_change(&mut self.store, identifiers.clone());
        identifiers
    }

    /// Commit the row at `index` of the open dialog's current page.
    pub fn commit_list_row(&mut self, field: ListField, index: usize) -> Option<Vec<RecordId>> {
        let record = self.list_picker(field)?.row(index)?.clone();
        Some(self.commit_list_pick(field, record))
    }

    pub fn remove_list(&mut self, field: ListField, id: RecordId) -> Vec<RecordId> {
        let identifiers = self.accumulator_mut(field).remove(id);
        let binding = self.list_binding(field);
        binding.on_change(&mut self.store, identifiers.clone());
        identifiers
    }

    pub fn channel_view(&self) -> FieldView {
        let current = self.channel.selection::<Channel, _>(&self.store);
        self.channel_field.view(
            &Channel::ALL,
            &current,
            self.channel.error(&self.store),
            self.channel.is_required(&self.store),
        )
    }

    pub fn provider_view(&self) -> FieldView {
        let binding = self.providers.binding();
        let current = binding.selection::<RecordId, _>(&self.store);
        let mut view = self.provider_field.view(
            self.providers.pool(),
            &current,
            binding.error(&self.store),
            binding.is_required(&self.store),
        );
        view.disabled = self.providers.pool().is_empty();
        view
    }

    pub fn subscription_view(&self) -> FieldView {
        let binding = self.subscriptions.binding();
        let current = binding.selection::<RecordId, _>(&self.store);
        let mut view = self.subscription_field.view(
            self.subscriptions.pool(),
            &current,
            binding.error(&self.store),
            binding.is_required(&self.store),
        );
        view.disabled = self.subscriptions.pool().is_empty();
        view
    }

    pub fn tags_view(&self) -> FieldView {
        let current = self.tags.selection::<String, _>(&self.store);
        self.tags_field.view(
            &self.tag_options,
            &current,
            self.tags.error(&self.store),
            self.tags.is_required(&self.store),
        )
    }

    /// Identifiers come from the form value; labels from records the accumulator knows.
    pub fn lists_summary(&self, field: ListField) -> ListSummary {
        let binding = self.list_binding(field);
        let accumulator = self.accumulator(field);
        let identifiers = binding.value(&self.store).clone();
        let known: Vec<AudienceList> = accumulator.records().into_iter().cloned().collect();
        let reconciliation = reconcile(Some(identifiers.as_slice()), &known, &ListAdapter);
        ListSummary {
            labels: reconciliation.valid.iter().map(|presentation| presentation.label.clone()).collect(),
            invalid_count: reconciliation.invalid.len(),
            caption: reconciliation.caption(&self.config.invalid_values_label),
            error: binding.error(&self.store).map(str::to_string),
            picker_open: accumulator.is_picker_open(),
            identifiers,
        }
    }

    /// Mark the form submitted and validate it.
    ///
    /// From here on, field errors are displayed. Invalid forms never reach
    /// the store.
    pub fn prepare_submission(&mut self) -> Result<Submission, SubmitError> {
        self.store.mark_submitted();
        let fields = self.store.validate_all();
        if !fields.is_empty() {
            info!(fields = ?fields, "submit blocked by validation");
            return Err(SubmitError::Invalid { fields });
        }
        let target = match self.editing {
            Some(id) => SubmitTarget::Update(id),
            None => SubmitTarget::Create,
        };
        Ok(Submission {
            target,
            payload: self.payload(),
        })
    }

    /// Record the store's answer. Field state is left untouched on failure.
    pub fn finish_submission(&mut self, outcome: anyhow::Result<Campaign>) -> Result<Campaign, SubmitError> {
        match outcome {
            Ok(campaign) => {
                info!(id = %campaign.id, updated = self.editing.is_some(), "campaign saved");
                self.editing = Some(campaign.id);
                Ok(campaign)
            }
            Err(error) => {
                warn!(error = %error, "campaign save rejected");
                Err(SubmitError::Rejected(error))
            }
        }
    }

    pub async fn submit(&mut self, store: &dyn CampaignStore, scope: &Scope) -> Result<Campaign, SubmitError> {
        let submission = self.prepare_submission()?;
        let outcome = submission.send(store, scope).await;
        self.finish_submission(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryBackend;

    fn provider(id: u64, group: Channel) -> Provider {
        Provider {
            id: RecordId(id),
            name: format!("provider-{id}"),
            group,
        }
    }

    fn group(id: u64, channel: Channel) -> SubscriptionGroup {
        SubscriptionGroup {
            id: RecordId(id),
            name: format!("group-{id}"),
            channel,
        }
    }

    fn list(id: u64, name: &str) -> AudienceList {
        AudienceList {
            id: RecordId(id),
            name: name.to_string(),
            size: Some(100),
        }
    }

    fn existing() -> Campaign {
        Campaign {
            id: RecordId(7),
            name: "Spring".into(),
            lists: vec![RecordId(1), RecordId(3)],
            exclusion_lists: Vec::new(),
            tags: vec!["seasonal".into()],
            channel: Channel::Email,
            provider_id: Some(RecordId(5)),
            subscription_id: Some(RecordId(20)),
            created_at: None,
            updated_at: None,
        }
    }

    fn loaded(form: &mut CampaignForm) {
        form.apply_providers(vec![
            provider(5, Channel::Email),
            provider(6, Channel::Email),
            provider(9, Channel::Sms),
        ]);
        form.apply_subscriptions(vec![group(20, Channel::Email), group(21, Channel::Sms)]);
    }

    fn create_form() -> CampaignForm {
        CampaignForm::new(None, &[], FormConfig::default()).unwrap()
    }

    #[test]
    fn orphaned_lists_show_invalid_indicator() {
        let form = CampaignForm::new(Some(&existing()), &[list(1, "A"), list(2, "B")], FormConfig::default()).unwrap();
        let summary = form.lists_summary(ListField::Lists);
        assert_eq!(summary.labels, vec!["A"]);
        assert_eq!(summary.invalid_count, 1);
        assert_eq!(summary.caption, "A, +1 Invalid Values");
        assert_eq!(form.payload().lists, vec![RecordId(1), RecordId(3)]);
    }

    #[test]
    fn repeated_saved_lists_collapse_to_one_entry() {
        let mut campaign = existing();
        campaign.lists = vec![RecordId(1), RecordId(1)];
        campaign.exclusion_lists = vec![RecordId(2), RecordId(2)];
        let form = CampaignForm::new(Some(&campaign), &[list(1, "VIP"), list(2, "Churned")], FormConfig::default()).unwrap();

        assert_eq!(form.draft().lists, vec![RecordId(1)]);
        let summary = form.lists_summary(ListField::Lists);
        assert_eq!(summary.labels, vec!["VIP"]);
        assert_eq!(summary.invalid_count, 0);
        assert_eq!(summary.caption, "VIP");
        let exclusions = form.lists_summary(ListField::Exclusions);
        assert_eq!(exclusions.labels, vec!["Churned"]);
        assert_eq!(exclusions.identifiers, vec![RecordId(2)]);

        let payload = form.payload();
        assert_eq!(payload.lists, vec![RecordId(1)]);
        assert_eq!(payload.exclusion_lists, vec![RecordId(2)]);
    }

    #[test]
    fn list_edits_survive_later_form_changes() {
        let mut form = CampaignForm::new(Some(&existing()), &[list(1, "A")], FormConfig::default()).unwrap();
        loaded(&mut form);
        form.commit_list_pick(ListField::Lists, list(4, "D"));
        form.remove_list(ListField::Lists, RecordId(1));
        form.set_name("Renamed");
        form.pick_channel(Channel::Sms);

        assert_eq!(form.draft().lists, vec![RecordId(3), RecordId(4)]);
        assert_eq!(form.lists_summary(ListField::Lists).identifiers, vec![RecordId(3), RecordId(4)]);
        assert_eq!(form.payload().lists, vec![RecordId(3), RecordId(4)]);
    }

    #[test]
    fn channel_change_moves_provider_into_new_pool() {
        let mut form = CampaignForm::new(Some(&existing()), &[], FormConfig::default()).unwrap();
        loaded(&mut form);
        assert_eq!(form.draft().provider_id, Some(RecordId(5)));

        let outcomes = form.pick_channel(Channel::Sms);
        assert_eq!(
            outcomes,
            vec![("provider_id", EdgeOutcome::Elected), ("subscription_id", EdgeOutcome::Elected)]
        );
        assert_eq!(form.draft().provider_id, Some(RecordId(9)));
        assert_eq!(form.draft().subscription_id, Some(RecordId(21)));
        assert_eq!(form.provider_view().button_label, "provider-9");
    }

    #[test]
    fn edit_mode_keeps_seeded_picks_until_catalogs_arrive() {
        let mut form = CampaignForm::new(Some(&existing()), &[], FormConfig::default()).unwrap();
        assert_eq!(form.draft().provider_id, Some(RecordId(5)));
        assert!(form.provider_view().disabled);

        loaded(&mut form);
        assert_eq!(form.draft().provider_id, Some(RecordId(5)));
        assert_eq!(form.draft().subscription_id, Some(RecordId(20)));
        assert!(!form.provider_view().disabled);
    }

    #[test]
    fn empty_pool_error_appears_only_after_submit() {
        let mut form = create_form();
        loaded(&mut form);
        form.set_name("Launch");
        form.pick_channel(Channel::Push);

        assert_eq!(form.draft().provider_id, None);
        assert_eq!(form.provider_view().error, None);
        assert!(form.provider_view().required_hint);

        let error = form.prepare_submission().unwrap_err();
        assert!(error.invalid_fields().contains(&"provider_id"));
        assert_eq!(
            form.provider_view().error.as_deref(),
            Some("No options available for the selected channel")
        );
    }

    #[test]
    fn repeated_list_pick_replaces_entry() {
        let mut form = create_form();
        form.open_list_picker(ListField::Lists);
        form.commit_list_pick(ListField::Lists, list(4, "VIP"));
        form.open_list_picker(ListField::Lists);
        let ids = form.commit_list_pick(ListField::Lists, list(4, "VIP2"));

        assert_eq!(ids, vec![RecordId(4)]);
        let summary = form.lists_summary(ListField::Lists);
        assert_eq!(summary.labels, vec!["VIP2"]);
        assert!(!summary.picker_open);
        assert_eq!(form.draft().lists, vec![RecordId(4)]);
    }

    #[test]
    fn committing_a_search_row_uses_the_current_page() {
        let mut form = create_form();
        let request = form.open_list_picker(ListField::Exclusions);
        assert_eq!(request.params.page_size, 25);
        let page = Page {
            results: vec![list(11, "Bounced"), list(12, "Unsubscribed")],
            page: 0,
            total: Some(2),
        };
        assert!(form.apply_list_search(ListField::Exclusions, &request, Ok(page)));
        assert_eq!(form.commit_list_row(ListField::Exclusions, 1), Some(vec![RecordId(12)]));
        assert_eq!(form.draft().exclusion_lists, vec![RecordId(12)]);
        assert!(form.draft().lists.is_empty());
    }

    #[test]
    fn tags_toggle_and_create() {
        let mut form = CampaignForm::new(Some(&existing()), &[], FormConfig::default()).unwrap();
        assert!(form.create_tag(" holiday "));
        assert_eq!(form.draft().tags, vec!["seasonal", "holiday"]);
        assert!(form.toggle_tag("seasonal"));
        assert_eq!(form.draft().tags, vec!["holiday"]);
        assert!(!form.toggle_tag("unknown"));
        assert!(!form.create_tag("   "));
        assert_eq!(form.tags_view().options.len(), 2);
    }

    #[test]
    fn unresolved_single_value_renders_blank_with_invalid_count() {
        let form = CampaignForm::new(Some(&existing()), &[], FormConfig::default()).unwrap();
        let view = form.provider_view();
        assert_eq!(view.button_label, "");
        assert_eq!(view.invalid_count, 1);
        assert_eq!(view.invalid_indicator.as_deref(), Some("+1 Invalid Values"));
        assert_eq!(form.payload().provider_id, Some(RecordId(5)));
    }

    #[test]
    fn picks_outside_the_pool_are_refused() {
        let mut form = CampaignForm::new(Some(&existing()), &[], FormConfig::default()).unwrap();
        loaded(&mut form);
        assert!(!form.pick_provider(RecordId(9)));
        assert!(form.pick_provider(RecordId(6)));
        assert_eq!(form.draft().provider_id, Some(RecordId(6)));

        form.clear_subscription();
        assert_eq!(form.draft().subscription_id, None);
        assert!(form.pick_subscription(RecordId(20)));
        assert_eq!(form.subscription_view().button_label, "group-20");
    }

    #[test]
    fn catalog_failure_is_a_warning_not_an_error() {
        let mut form = create_form();
        form.record_catalog_failure(CatalogKind::Providers, &anyhow::anyhow!("timeout"));
        assert_eq!(form.warnings().len(), 1);
        assert_eq!(form.warnings()[0].catalog, CatalogKind::Providers);
        assert!(!form.is_catalog_loaded(CatalogKind::Providers));

        form.pick_channel(Channel::Email);
        assert!(form.provider_pool().is_empty());
        assert!(form.provider_view().disabled);
    }

    #[tokio::test]
    async fn invalid_submit_never_reaches_the_store() {
        let backend = InMemoryBackend::new(Vec::new(), Vec::new(), Vec::new());
        let mut form = create_form();
        let error = form.submit(&backend, &Scope::new("acme")).await.unwrap_err();
        assert_eq!(error.invalid_fields(), &["name", "lists", "channel", "provider_id"]);
        assert_eq!(backend.campaign_count(), 0);
        assert_eq!(form.channel_view().error.as_deref(), Some("This field is required"));
    }

    #[tokio::test]
    async fn create_then_update() {
        let backend = InMemoryBackend::new(Vec::new(), Vec::new(), Vec::new());
        let scope = Scope::new("acme");
        let mut form = create_form();
        loaded(&mut form);
        form.set_name("Launch");
        form.pick_channel(Channel::Email);
        form.commit_list_pick(ListField::Lists, list(1, "A"));

        let created = form.submit(&backend, &scope).await.unwrap();
        assert_eq!(created.provider_id, Some(RecordId(5)));
        assert_eq!(form.editing(), Some(created.id));

        form.set_name("Relaunch");
        let updated = form.submit(&backend, &scope).await.unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(backend.campaign_count(), 1);
    }

    #[tokio::test]
    async fn rejected_submit_keeps_field_state() {
        let backend = InMemoryBackend::new(Vec::new(), Vec::new(), Vec::new());
        backend.set_failing(true);
        let mut form = CampaignForm::new(Some(&existing()), &[], FormConfig::default()).unwrap();
        let before = form.draft().clone();

        let error = form.submit(&backend, &Scope::new("acme")).await.unwrap_err();
        assert!(error.is_rejected());
        assert_eq!(form.draft(), &before);

        backend.set_failing(false);
        let error = form.submit(&backend, &Scope::new("acme")).await.unwrap_err();
        assert!(error.is_rejected(), "campaign 7 is unknown to this backend");
    }
}
