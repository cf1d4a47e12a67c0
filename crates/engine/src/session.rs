//! Mounted lifetime of a [`CampaignForm`] and the async work around it.
//!
//! The session is the only strong owner of the form. Background tasks hold a
//! [`Weak`] handle and apply their results only if the upgrade succeeds, so a
//! fetch or search that completes after [`FormSession::unmount`] is a no-op.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use dispatch_types::{AudienceList, Campaign, Provider, Scope, SubscriptionGroup};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::{
    accumulator::SearchRequest,
    campaign::{CampaignForm, CatalogKind, ListField},
    collaborators::{CampaignStore, CatalogSource, RecordSearch},
    error::SubmitError,
};

type SharedForm = Arc<Mutex<CampaignForm>>;

fn lock(form: &Mutex<CampaignForm>) -> MutexGuard<'_, CampaignForm> {
    form.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug)]
pub struct FormSession {
    form: Option<SharedForm>,
    scope: Scope,
}

impl FormSession {
    pub fn mount(form: CampaignForm, scope: Scope) -> Self {
        info!(%scope, editing = ?form.editing(), "form session mounted");
        Self {
            form: Some(Arc::new(Mutex::new(form))),
            scope,
        }
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn is_mounted(&self) -> bool {
        self.form.is_some()
    }

    /// Release the form. In-flight tasks will find nothing to update.
    pub fn unmount(&mut self) {
        if self.form.take().is_some() {
            info!(scope = %self.scope, "form session unmounted");
        }
    }

    /// Run `f` against the mounted form. Returns `None` after unmount.
    pub fn with_form<T>(&self, f: impl FnOnce(&mut CampaignForm) -> T) -> Option<T> {
        let form = self.form.as_ref()?;
        Some(f(&mut lock(form)))
    }

    /// Fetch both dependent catalogs once. Each task resolves to whether its
    /// result was applied.
    pub fn load_catalogs(
        &self,
        providers: Arc<dyn CatalogSource<Provider>>,
        subscriptions: Arc<dyn CatalogSource<SubscriptionGroup>>,
    ) -> Vec<JoinHandle<bool>> {
        let Some(form) = &self.form else {
            return Vec::new();
        };
        vec![
            spawn_catalog(form, self.scope.clone(), CatalogKind::Providers, providers, |form, items| {
                form.apply_providers(items);
            }),
            spawn_catalog(form, self.scope.clone(), CatalogKind::Subscriptions, subscriptions, |form, groups| {
                form.apply_subscriptions(groups);
            }),
        ]
    }

    /// Issue `request` for the list dialog of `field`. Returns `None` after unmount.
    ///
    /// No cancellation reaches `source`; a result for a closed dialog or an
    /// unmounted form is dropped on arrival.
    pub fn spawn_list_search(
        &self,
        field: ListField,
        request: SearchRequest,
        source: Arc<dyn RecordSearch<AudienceList>>,
    ) -> Option<JoinHandle<bool>> {
        let weak = Arc::downgrade(self.form.as_ref()?);
        let scope = self.scope.clone();
        Some(tokio::spawn(async move {
            let outcome = source.search(&scope, &request.params).await;
            let Some(form) = weak.upgrade() else {
                debug!(?field, generation = request.generation, "search finished after unmount");
                return false;
            };
            let applied = lock(&form).apply_list_search(field, &request, outcome);
            applied
        }))
    }

    /// Validate and persist. The form is not locked while the store call runs.
    pub async fn submit(&self, store: &dyn CampaignStore) -> Result<Campaign, SubmitError> {
        let form = self.form.as_ref().ok_or(SubmitError::Unmounted)?;
        let submission = lock(form).prepare_submission()?;
        let outcome = submission.send(store, &self.scope).await;
        lock(form).finish_submission(outcome)
    }
}

fn spawn_catalog<R, F>(form: &SharedForm, scope: Scope, kind: CatalogKind, source: Arc<dyn CatalogSource<R>>, apply: F) -> JoinHandle<bool>
where
    R: Send + 'static,
    F: FnOnce(&mut CampaignForm, Vec<R>) + Send + 'static,
{
    let weak: Weak<Mutex<CampaignForm>> = Arc::downgrade(form);
    tokio::spawn(async move {
        debug!(%kind, %scope, "fetching catalog");
        let outcome = source.list_all(&scope).await;
        let Some(form) = weak.upgrade() else {
            debug!(%kind, "catalog arrived after unmount; dropping");
            return false;
        };
        let mut form = lock(&form);
        match outcome {
            Ok(items) => apply(&mut form, items),
            Err(error) => form.record_catalog_failure(kind, &error),
        }
        true
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryBackend;
    use dispatch_types::{Channel, Page, RecordId, SearchParams};
    use dispatch_util::FormConfig;
    use tokio::sync::Notify;

    struct Gated<R> {
        gate: Arc<Notify>,
        items: Vec<R>,
    }

    #[async_trait::async_trait]
    impl<R: Clone + Send + Sync> CatalogSource<R> for Gated<R> {
        async fn list_all(&self, _scope: &Scope) -> anyhow::Result<Vec<R>> {
            self.gate.notified().await;
            Ok(self.items.clone())
        }
    }

    #[async_trait::async_trait]
    impl RecordSearch<AudienceList> for Gated<AudienceList> {
        async fn search(&self, _scope: &Scope, params: &SearchParams) -> anyhow::Result<Page<AudienceList>> {
            self.gate.notified().await;
            Ok(Page {
                results: self.items.clone(),
                page: params.page,
                total: Some(self.items.len()),
            })
        }
    }

    fn backend() -> Arc<InMemoryBackend> {
        Arc::new(InMemoryBackend::new(
            vec![Provider {
                id: RecordId(5),
                name: "Postmark".into(),
                group: Channel::Email,
            }],
            vec![SubscriptionGroup {
                id: RecordId(20),
                name: "Newsletter".into(),
                channel: Channel::Email,
            }],
            vec![AudienceList {
                id: RecordId(1),
                name: "VIP".into(),
                size: None,
            }],
        ))
    }

    fn session() -> FormSession {
        let form = CampaignForm::new(None, &[], FormConfig::default()).unwrap();
        FormSession::mount(form, Scope::new("acme"))
    }

    #[tokio::test]
    async fn catalogs_load_and_elect_defaults() {
        let session = session();
        session.with_form(|form| form.pick_channel(Channel::Email));
        let backend = backend();
        for handle in session.load_catalogs(backend.clone(), backend.clone()) {
            assert!(handle.await.unwrap());
        }
        let draft = session.with_form(|form| form.draft().clone()).unwrap();
        assert_eq!(draft.provider_id, Some(RecordId(5)));
        assert_eq!(draft.subscription_id, Some(RecordId(20)));
    }

    #[tokio::test]
    async fn failed_fetches_become_warnings() {
        let session = session();
        let backend = backend();
        backend.set_failing(true);
        for handle in session.load_catalogs(backend.clone(), backend.clone()) {
            assert!(handle.await.unwrap());
        }
        let warnings = session.with_form(|form| form.warnings().len()).unwrap();
        assert_eq!(warnings, 2);
    }

    #[tokio::test]
    async fn late_catalog_after_unmount_is_dropped() {
        let mut session = session();
        let (provider_gate, subscription_gate) = (Arc::new(Notify::new()), Arc::new(Notify::new()));
        let providers = Arc::new(Gated {
            gate: provider_gate.clone(),
            items: vec![Provider {
                id: RecordId(5),
                name: "Postmark".into(),
                group: Channel::Email,
            }],
        });
        let subscriptions: Arc<Gated<SubscriptionGroup>> = Arc::new(Gated {
            gate: subscription_gate.clone(),
            items: Vec::new(),
        });
        let handles = session.load_catalogs(providers, subscriptions);

        session.unmount();
        provider_gate.notify_one();
        subscription_gate.notify_one();
        for handle in handles {
            assert!(!handle.await.unwrap());
        }
        assert!(session.with_form(|_| ()).is_none());
    }

    #[tokio::test]
    async fn search_for_a_closed_dialog_is_discarded() {
        let session = session();
        let gate = Arc::new(Notify::new());
        let source = Arc::new(Gated {
            gate: gate.clone(),
            items: vec![AudienceList {
                id: RecordId(1),
                name: "VIP".into(),
                size: None,
            }],
        });

        let request = session.with_form(|form| form.open_list_picker(ListField::Lists)).unwrap();
        let handle = session.spawn_list_search(ListField::Lists, request, source.clone()).unwrap();
        session.with_form(|form| form.close_list_picker(ListField::Lists));
        gate.notify_one();
        assert!(!handle.await.unwrap());

        let request = session.with_form(|form| form.open_list_picker(ListField::Lists)).unwrap();
        let handle = session.spawn_list_search(ListField::Lists, request, source).unwrap();
        gate.notify_one();
        assert!(handle.await.unwrap());
        let rows = session
            .with_form(|form| form.list_picker(ListField::Lists).map(|picker| picker.results().results.len()))
            .flatten();
        assert_eq!(rows, Some(1));
    }

    #[tokio::test]
    async fn submit_after_unmount_is_refused() {
        let mut session = session();
        session.unmount();
        let backend = backend();
        let error = session.submit(backend.as_ref()).await.unwrap_err();
        assert!(matches!(error, SubmitError::Unmounted));
    }

    #[tokio::test]
    async fn submit_persists_through_the_store() {
        let session = session();
        let backend = backend();
        for handle in session.load_catalogs(backend.clone(), backend.clone()) {
            handle.await.unwrap();
        }
        session.with_form(|form| {
            form.set_name("Launch");
            form.pick_channel(Channel::Email);
            form.commit_list_pick(
                ListField::Lists,
                AudienceList {
                    id: RecordId(1),
                    name: "VIP".into(),
                    size: None,
                },
            );
        });
        let campaign = session.submit(backend.as_ref()).await.unwrap();
        assert_eq!(campaign.provider_id, Some(RecordId(5)));
        assert_eq!(session.with_form(|form| form.editing()).flatten(), Some(campaign.id));
    }
}
