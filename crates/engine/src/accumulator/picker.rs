use dispatch_types::{Page, Scope, SearchParams};
use tracing::{debug, warn};

use crate::collaborators::RecordSearch;

/// A search call the picker wants issued.
///
/// Requests carry the session and generation they were created for so a late
/// response can be recognised and dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub session: u64,
    pub generation: u64,
    pub params: SearchParams,
}

/// State of one open pick dialog: query, page, and the latest results.
///
/// Every query or page change produces a fresh request; nothing is cached.
/// Debouncing keystrokes is left to whatever drives the dialog.
#[derive(Debug, Clone)]
pub struct PickerSession<R> {
    session: u64,
    generation: u64,
    query: String,
    page: usize,
    page_size: usize,
    results: Page<R>,
    loading: bool,
}

impl<R> PickerSession<R> {
    pub fn new(session: u64, page_size: usize) -> Self {
        Self {
            session,
            generation: 0,
            query: String::new(),
            page: 0,
            page_size: page_size.max(1),
            results: Page::empty(0),
            loading: false,
        }
    }

    pub fn session(&self) -> u64 {
        self.session
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn results(&self) -> &Page<R> {
        &self.results
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Change the query. Paging restarts at the first page.
    pub fn set_query(&mut self, query: impl Into<String>) -> SearchRequest {
        self.query = query.into();
        self.page = 0;
        self.next_request()
    }

    pub fn set_page(&mut self, page: usize) -> SearchRequest {
        self.page = page;
        self.next_request()
    }

    /// Re-issue the current query and page.
    pub fn refresh(&mut self) -> SearchRequest {
        self.next_request()
    }

    fn next_request(&mut self) -> SearchRequest {
        self.generation += 1;
        self.loading = true;
        SearchRequest {
            session: self.session,
            generation: self.generation,
            params: SearchParams::new(self.query.clone(), self.page, self.page_size),
        }
    }

    /// Apply a completed search. Returns `false` when the response is stale.
    ///
    /// A failed search leaves the dialog with an empty page rather than an error.
    pub fn apply_results(&mut self, request: &SearchRequest, outcome: anyhow::Result<Page<R>>) -> bool {
        if request.session != self.session || request.generation != self.generation {
            debug!(
                session = request.session,
                generation = request.generation,
                current = self.generation,
                "dropping stale search results"
            );
            return false;
        }
        self.loading = false;
        self.results = match outcome {
            Ok(page) => page,
            Err(error) => {
                warn!(query = %request.params.q, page = request.params.page, error = %error, "list search failed");
                Page::empty(request.params.page)
            }
        };
        true
    }

    /// Row at `index` on the current page.
    pub fn row(&self, index: usize) -> Option<&R> {
        self.results.results.get(index)
    }

    /// Issue the latest request through `source` and apply the response.
    pub async fn search_with<Src>(&mut self, source: &Src, scope: &Scope) -> bool
    where
        Src: RecordSearch<R> + ?Sized,
        R: Send,
    {
        let request = self.refresh();
        let outcome = source.search(scope, &request.params).await;
        self.apply_results(&request, outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryBackend;
    use anyhow::anyhow;
    use dispatch_types::{AudienceList, RecordId};

    fn page(rows: &[&'static str]) -> Page<&'static str> {
        Page {
            results: rows.to_vec(),
            page: 0,
            total: Some(rows.len()),
        }
    }

    #[test]
    fn each_change_issues_a_fresh_request() {
        let mut picker: PickerSession<&str> = PickerSession::new(1, 10);
        let first = picker.set_query("vi");
        let second = picker.set_query("vip");
        let third = picker.set_page(2);
        assert_eq!(first.generation + 1, second.generation);
        assert_eq!(second.params, SearchParams::new("vip", 0, 10));
        assert_eq!(third.params, SearchParams::new("vip", 2, 10));
    }

    #[test]
    fn late_responses_for_superseded_requests_are_dropped() {
        let mut picker: PickerSession<&str> = PickerSession::new(1, 10);
        let stale = picker.set_query("v");
        let latest = picker.set_query("vip");

        assert!(picker.apply_results(&latest, Ok(page(&["VIP"]))));
        assert!(!picker.apply_results(&stale, Ok(page(&["V1", "V2"]))));
        assert_eq!(picker.results().results, vec!["VIP"]);
        assert!(!picker.is_loading());
    }

    #[test]
    fn failures_degrade_to_an_empty_page() {
        let mut picker: PickerSession<&str> = PickerSession::new(1, 10);
        let request = picker.set_page(3);
        assert!(picker.apply_results(&request, Err(anyhow!("timeout"))));
        assert!(picker.results().results.is_empty());
        assert_eq!(picker.results().page, 3);
    }

    #[test]
    fn requests_from_another_session_are_rejected() {
        let mut old: PickerSession<&str> = PickerSession::new(1, 10);
        let mut current: PickerSession<&str> = PickerSession::new(2, 10);
        let foreign = old.set_query("a");
        current.set_query("a");
        assert!(!current.apply_results(&foreign, Ok(page(&["A"]))));
    }

    #[tokio::test]
    async fn search_with_issues_and_applies_the_current_query() {
        let lists = ["VIP", "Churned"]
            .iter()
            .enumerate()
            .map(|(index, name)| AudienceList {
                id: RecordId(index as u64 + 1),
                name: name.to_string(),
                size: None,
            })
            .collect();
        let backend = InMemoryBackend::new(Vec::new(), Vec::new(), lists);
        let mut picker: PickerSession<AudienceList> = PickerSession::new(1, 10);
        picker.set_query("vi");

        assert!(picker.search_with(&backend, &Scope::new("acme")).await);
        assert_eq!(picker.results().total, Some(1));
        assert_eq!(picker.row(0).map(|list| list.id), Some(RecordId(1)));
        assert!(picker.row(1).is_none());
    }
}
