//! Search session: the state the presentation layer renders from.

use bookscout_core::models::{Book, Pagination, WILDCARD_QUERY};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::Result;
use crate::fallback::{BookSource, FetchOutcome};

pub const DEFAULT_PAGE_SIZE: u32 = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Loading,
    Success,
    Failure,
}

/// Snapshot read by the presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct SessionState {
    pub phase: Phase,
    pub query: String,
    pub books: Vec<Book>,
    pub loading: bool,
    pub error: Option<String>,
    /// Results come from the built-in sample catalog.
    pub offline: bool,
    pub pagination: Pagination,
    pub updated_at: Option<DateTime<Utc>>,
}

impl SessionState {
    fn idle(page_size: u32) -> Self {
        Self {
            phase: Phase::Idle,
            query: WILDCARD_QUERY.to_string(),
            books: Vec::new(),
            loading: false,
            error: None,
            offline: false,
            pagination: Pagination::new(1, 0, page_size),
            updated_at: None,
        }
    }
}

/// Handle for one issued request. Only the most recently issued ticket may
/// update the state; older ones are discarded when they settle.
#[derive(Debug)]
#[must_use]
pub struct Ticket {
    seq: u64,
    pub query: String,
    pub page: u32,
}

/// `Idle → Loading → {Success, Failure}`, re-entering `Loading` on every fetch.
pub struct SearchSession<S> {
    source: S,
    page_size: u32,
    issued: u64,
    state: SessionState,
}

impl<S: BookSource> SearchSession<S> {
    pub fn new(source: S) -> Self {
        Self::with_page_size(source, DEFAULT_PAGE_SIZE)
    }

    pub fn with_page_size(source: S, page_size: u32) -> Self {
        Self {
            source,
            page_size,
            issued: 0,
            state: SessionState::idle(page_size),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Enter `Loading` for `query`/`page` and reserve a ticket.
    pub fn begin(&mut self, query: &str, page: u32) -> Ticket {
        self.issued += 1;
        self.state.phase = Phase::Loading;
        self.state.loading = true;
        self.state.error = None;
        self.state.query = query.to_string();
        Ticket {
            seq: self.issued,
            query: query.to_string(),
            page,
        }
    }

    /// Apply the result of `ticket`'s request. Returns `false` when a newer
    /// request has been issued since, in which case the state is untouched.
    pub fn settle(&mut self, ticket: Ticket, result: Result<FetchOutcome>) -> bool {
        if ticket.seq != self.issued {
            tracing::info!(
                seq = ticket.seq,
                latest = self.issued,
                query = %ticket.query,
                "discarding stale search result"
            );
            return false;
        }

        match result {
            Ok(outcome) => {
                let page = outcome.page.page();
                let total = outcome.page.total_results();
                self.state.phase = Phase::Success;
                self.state.offline = outcome.offline;
                self.state.books = outcome.page.into_books();
                self.state.pagination = Pagination::new(page, total, self.page_size);
            }
            Err(e) => {
                self.state.phase = Phase::Failure;
                self.state.error = Some(e.to_string());
                self.state.books.clear();
                self.state.offline = false;
            }
        }
        self.state.loading = false;
        self.state.updated_at = Some(Utc::now());
        true
    }

    /// Run a search and update the state with its result.
    pub async fn fetch(&mut self, query: &str, page: u32) -> &SessionState {
        let ticket = self.begin(query, page);
        let result = self.source.fetch(query, page, self.page_size).await;
        self.settle(ticket, result);
        &self.state
    }

    /// Re-run the current kind of search at `page`. Bounds are the caller's concern.
    pub async fn go_to_page(&mut self, page: u32, query: &str) -> &SessionState {
        self.fetch(query, page).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use bookscout_core::models::SearchPage;
    use bookscout_core::sample::sample_page;

    use super::*;
    use crate::error::CatalogError;
    use crate::fallback::FallbackGateway;
    use crate::gateway::CatalogGateway;

    /// Records requests; fails when the query is `"boom"`.
    #[derive(Default)]
    struct ScriptedSource {
        calls: Mutex<Vec<(String, u32, u32)>>,
    }

    #[async_trait]
    impl BookSource for ScriptedSource {
        async fn fetch(&self, query: &str, page: u32, limit: u32) -> Result<FetchOutcome> {
            self.calls
                .lock()
                .unwrap()
                .push((query.to_string(), page, limit));
            if query == "boom" {
                return Err(CatalogError::Parse("fallback exploded".to_string()));
            }
            let books = vec![Book::new(format!("/works/OL{page}W"), query)];
            Ok(FetchOutcome::online(SearchPage::new(books, 60, page, limit, 0)))
        }
    }

    struct DownGateway;

    #[async_trait]
    impl CatalogGateway for DownGateway {
        async fn search(&self, _: &str, _: u32, _: u32) -> Result<SearchPage> {
            Err(CatalogError::Timeout)
        }
    }

    #[test]
    fn starts_idle() {
        let session = SearchSession::new(ScriptedSource::default());
        let state = session.state();
        assert_eq!(state.phase, Phase::Idle);
        assert!(!state.loading);
        assert!(state.books.is_empty());
        assert_eq!(state.pagination.limit, 25);
    }

    #[tokio::test]
    async fn fetch_success_updates_state() {
        let mut session = SearchSession::new(ScriptedSource::default());
        let state = session.fetch("dune", 2).await;
        assert_eq!(state.phase, Phase::Success);
        assert!(!state.loading);
        assert!(state.error.is_none());
        assert!(!state.offline);
        assert_eq!(state.books.len(), 1);
        assert_eq!(state.pagination, Pagination::new(2, 60, 25));
        assert!(state.updated_at.is_some());

        let calls = session.source().calls.lock().unwrap().clone();
        assert_eq!(calls, vec![("dune".to_string(), 2, 25)]);
    }

    #[tokio::test]
    async fn failure_clears_books_and_stops_loading() {
        let mut session = SearchSession::new(ScriptedSource::default());
        session.fetch("dune", 1).await;
        let state = session.go_to_page(2, "boom").await;
        assert_eq!(state.phase, Phase::Failure);
        assert!(!state.loading);
        assert!(state.books.is_empty());
        assert!(state.error.as_deref().unwrap().contains("fallback exploded"));

        let state = session.fetch("dune", 1).await;
        assert_eq!(state.phase, Phase::Success);
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn go_to_page_does_not_validate_bounds() {
        let mut session = SearchSession::new(ScriptedSource::default());
        let state = session.go_to_page(99, "dune").await;
        assert!(!state.loading);
        assert_eq!(state.pagination.page, 99);
    }

    #[test]
    fn begin_enters_loading_and_clears_error() {
        let mut session = SearchSession::new(ScriptedSource::default());
        let t = session.begin("boom", 1);
        assert!(session.settle(t, Err(CatalogError::RateLimited)));
        assert!(session.state().error.is_some());

        let _t = session.begin("dune", 1);
        assert_eq!(session.state().phase, Phase::Loading);
        assert!(session.state().loading);
        assert!(session.state().error.is_none());
    }

    #[test]
    fn stale_result_is_discarded() {
        let mut session = SearchSession::new(ScriptedSource::default());
        let slow = session.begin("tolkien", 1);
        let fast = session.begin("orwell", 1);

        let orwell = FetchOutcome::offline(sample_page("orwell"));
        assert!(session.settle(fast, Ok(orwell)));
        assert_eq!(session.state().books[0].title, "1984");

        let tolkien = FetchOutcome::offline(sample_page("tolkien"));
        assert!(!session.settle(slow, Ok(tolkien)));
        assert_eq!(session.state().books[0].title, "1984");
        assert!(!session.state().loading);
    }

    #[test]
    fn stale_settle_keeps_loading_for_pending_latest() {
        let mut session = SearchSession::new(ScriptedSource::default());
        let first = session.begin("a", 1);
        let second = session.begin("b", 1);
        assert!(!session.settle(first, Err(CatalogError::Timeout)));
        assert!(session.state().loading);
        assert!(session.state().error.is_none());
        assert!(session.settle(second, Ok(FetchOutcome::online(sample_page("*")))));
        assert!(!session.state().loading);
    }

    #[tokio::test]
    async fn outage_end_to_end() {
        let mut session = SearchSession::new(FallbackGateway::new(DownGateway));
        let state = session.fetch("1984", 1).await;
        assert_eq!(state.phase, Phase::Success);
        assert!(state.offline);
        assert_eq!(state.books.len(), 1);
        assert_eq!(state.books[0].title, "1984");
        assert_eq!(state.pagination.total_results, 1);

        let state = session.fetch(WILDCARD_QUERY, 1).await;
        assert_eq!(state.pagination.total_results, 8);
        assert!(state.error.is_none());
    }
}
