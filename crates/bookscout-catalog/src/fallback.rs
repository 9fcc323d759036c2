use async_trait::async_trait;
use bookscout_core::models::SearchPage;
use bookscout_core::sample::sample_page;
use serde::Serialize;

use crate::error::Result;
use crate::gateway::CatalogGateway;

/// Result of a fetch, tagged with whether it came from the built-in sample catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FetchOutcome {
    pub page: SearchPage,
    pub offline: bool,
}

impl FetchOutcome {
    pub fn online(page: SearchPage) -> Self {
        Self {
            page,
            offline: false,
        }
    }

    pub fn offline(page: SearchPage) -> Self {
        Self {
            page,
            offline: true,
        }
    }
}

/// Where a search session gets its results from.
#[async_trait]
pub trait BookSource: Send + Sync {
    async fn fetch(&self, query: &str, page: u32, limit: u32) -> Result<FetchOutcome>;
}

/// Wraps a gateway and serves the sample catalog whenever it fails.
pub struct FallbackGateway<G> {
    inner: G,
}

impl<G: CatalogGateway> FallbackGateway<G> {
    pub fn new(inner: G) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &G {
        &self.inner
    }

    /// Never fails: upstream errors are logged and replaced by sample data
    /// filtered by `query`. The sample set is not paginated.
    pub async fn search(&self, query: &str, page: u32, limit: u32) -> FetchOutcome {
        match self.inner.search(query, page, limit).await {
            Ok(page) => FetchOutcome::online(page),
            Err(e) => {
                tracing::warn!(query, "catalog unavailable ({e}), serving sample data");
                FetchOutcome::offline(sample_page(query))
            }
        }
    }
}

#[async_trait]
impl<G: CatalogGateway> BookSource for FallbackGateway<G> {
    async fn fetch(&self, query: &str, page: u32, limit: u32) -> Result<FetchOutcome> {
        Ok(self.search(query, page, limit).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CatalogError;
    use bookscout_core::models::Book;

    struct DownGateway;

    #[async_trait]
    impl CatalogGateway for DownGateway {
        async fn search(&self, _query: &str, _page: u32, _limit: u32) -> Result<SearchPage> {
            Err(CatalogError::ServiceUnavailable)
        }
    }

    struct UpGateway;

    #[async_trait]
    impl CatalogGateway for UpGateway {
        async fn search(&self, query: &str, page: u32, limit: u32) -> Result<SearchPage> {
            let books = vec![Book::new("/works/OL1W", query)];
            Ok(SearchPage::new(books, 1000, page, limit, 0))
        }
    }

    #[tokio::test]
    async fn upstream_success_is_online() {
        let gw = FallbackGateway::new(UpGateway);
        let out = gw.search("Dom Casmurro", 3, 25).await;
        assert!(!out.offline);
        assert_eq!(out.page.total_results(), 1000);
        assert_eq!(out.page.page(), 3);
    }

    #[tokio::test]
    async fn wildcard_outage_returns_full_sample() {
        let gw = FallbackGateway::new(DownGateway);
        let out = gw.search("*", 4, 25).await;
        assert!(out.offline);
        assert_eq!(out.page.total_results(), 8);
        assert_eq!(out.page.books().len(), 8);
        assert_eq!(out.page.page(), 1);
    }

    #[tokio::test]
    async fn query_outage_filters_sample() {
        let gw = FallbackGateway::new(DownGateway);
        let out = gw.search("1984", 1, 25).await;
        assert!(out.offline);
        assert_eq!(out.page.total_results(), 1);
        assert_eq!(out.page.books()[0].title, "1984");

        let out = gw.search("josé", 1, 25).await;
        assert!(out.page.books().is_empty());
        let out = gw.search("JORGE", 1, 25).await;
        assert_eq!(out.page.books()[0].title, "Capitães da Areia");
    }

    #[tokio::test]
    async fn book_source_never_errors() {
        let gw = FallbackGateway::new(DownGateway);
        let out = gw.fetch("no such book", 1, 25).await.unwrap();
        assert!(out.offline);
        assert_eq!(out.page.total_results(), 0);
    }

    #[tokio::test]
    async fn inner_gateway_bypasses_fallback() {
        let gw = FallbackGateway::new(DownGateway);
        let err = gw.inner().search("1984", 1, 25).await.unwrap_err();
        assert!(matches!(err, CatalogError::ServiceUnavailable));
    }
}
