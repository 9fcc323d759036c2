use std::time::Duration;

use async_trait::async_trait;
use bookscout_core::config::CatalogConfig;
use bookscout_core::models::{Book, SearchPage, WILDCARD_QUERY, is_wildcard};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CatalogError, Result};
use crate::http::RetryingClient;

/// Fields requested from `/search.json`, matching the `Book` shape.
pub const SEARCH_FIELDS: &str = "title,author_name,cover_i,first_publish_year,key,number_of_pages_median,publisher,edition_count,subject,language";

/// A remote catalog that can be searched page by page.
#[async_trait]
pub trait CatalogGateway: Send + Sync {
    /// Search `query` (or the `*` wildcard) for the 1-based `page` of `limit` records.
    async fn search(&self, query: &str, page: u32, limit: u32) -> Result<SearchPage>;
}

// ─── Wire format ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    docs: Vec<SearchDoc>,
    num_found: Option<u64>,
    /// Older spelling, still sent alongside `num_found`.
    #[serde(rename = "numFound")]
    num_found_legacy: Option<u64>,
    #[serde(default)]
    start: u64,
}

impl SearchResponse {
    fn total(&self) -> u64 {
        self.num_found.or(self.num_found_legacy).unwrap_or(0)
    }
}

#[derive(Debug, Deserialize)]
struct SearchDoc {
    #[serde(default)]
    key: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    author_name: Vec<String>,
    first_publish_year: Option<i32>,
    cover_i: Option<i64>,
    number_of_pages_median: Option<u32>,
    #[serde(default)]
    publisher: Vec<String>,
    #[serde(default)]
    edition_count: u32,
    #[serde(default)]
    subject: Vec<String>,
    #[serde(default)]
    language: Vec<String>,
}

impl From<SearchDoc> for Book {
    fn from(doc: SearchDoc) -> Self {
        Book {
            key: doc.key,
            title: doc.title,
            authors: doc.author_name,
            first_publish_year: doc.first_publish_year,
            cover_id: doc.cover_i,
            median_pages: doc.number_of_pages_median,
            publishers: doc.publisher,
            edition_count: doc.edition_count,
            subjects: doc.subject,
            languages: doc.language,
        }
    }
}

/// Normalized `/works/{id}.json` record.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WorkDetails {
    pub key: String,
    pub title: String,
    pub description: Option<String>,
    pub subjects: Vec<String>,
    pub first_publish_date: Option<String>,
}

impl WorkDetails {
    pub fn from_json(v: &Value) -> Self {
        let description = v.get("description").and_then(|d| {
            d.as_str()
                .or_else(|| d.get("value").and_then(Value::as_str))
                .map(ToOwned::to_owned)
        });

        let subjects = v
            .get("subjects")
            .and_then(Value::as_array)
            .map(|arr| {
                arr.iter()
                    .filter_map(Value::as_str)
                    .map(ToOwned::to_owned)
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        Self {
            key: v
                .get("key")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            title: v
                .get("title")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            description,
            subjects,
            first_publish_date: v
                .get("first_publish_date")
                .and_then(Value::as_str)
                .map(ToOwned::to_owned),
        }
    }
}

// ─── OpenLibraryGateway ───────────────────────────────────────────────────────

pub struct OpenLibraryGateway {
    client: RetryingClient,
    base_url: Url,
}

impl OpenLibraryGateway {
    pub fn from_config(config: &CatalogConfig) -> Result<Self> {
        Self::with_params(
            &config.base_url,
            Duration::from_secs(config.timeout_secs),
            config.max_retries,
            Duration::from_millis(config.backoff_base_ms),
            &config.user_agent,
        )
    }

    pub fn with_params(
        base_url: &str,
        timeout: Duration,
        max_retries: u32,
        backoff_base: Duration,
        user_agent: &str,
    ) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| CatalogError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(CatalogError::InvalidUrl(base_url.to_string()));
        }
        Ok(Self {
            client: RetryingClient::new(timeout, max_retries, backoff_base, user_agent)?,
            base_url,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segs = url
                .path_segments_mut()
                .map_err(|_| CatalogError::InvalidUrl(self.base_url.to_string()))?;
            segs.pop_if_empty();
            segs.extend(segments);
        }
        Ok(url)
    }

    pub fn search_url(&self, query: &str, page: u32, limit: u32) -> Result<Url> {
        let q = if is_wildcard(query) {
            WILDCARD_QUERY
        } else {
            query.trim()
        };
        let mut url = self.endpoint(&["search.json"])?;
        url.query_pairs_mut()
            .append_pair("q", q)
            .append_pair("page", &page.max(1).to_string())
            .append_pair("limit", &limit.to_string())
            .append_pair("fields", SEARCH_FIELDS);
        Ok(url)
    }

    /// Fetch the work record for `key` (`/works/OL1W` or bare `OL1W`).
    pub async fn work_details(&self, key: &str) -> Result<WorkDetails> {
        let id = key.trim().trim_start_matches("/works/");
        if id.is_empty() || id.contains('/') {
            return Err(CatalogError::RequestFailed(format!("invalid work key '{key}'")));
        }
        let url = self.endpoint(&["works", &format!("{id}.json")])?;
        let json: Value = self.client.get_json(&url).await?;
        Ok(WorkDetails::from_json(&json))
    }
}

#[async_trait]
impl CatalogGateway for OpenLibraryGateway {
    async fn search(&self, query: &str, page: u32, limit: u32) -> Result<SearchPage> {
        let url = self.search_url(query, page, limit)?;
        let resp: SearchResponse = self.client.get_json(&url).await?;
        let total = resp.total();
        let books = resp.docs.into_iter().map(Book::from).collect();
        Ok(SearchPage::new(books, total, page, limit, resp.start))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn gateway(base_url: &str, timeout: Duration) -> OpenLibraryGateway {
        OpenLibraryGateway::with_params(base_url, timeout, 1, Duration::ZERO, "bookscout-test")
            .unwrap()
    }

    fn search_query(q: &str, page: &str) -> Matcher {
        Matcher::AllOf(vec![
            Matcher::UrlEncoded("q".into(), q.into()),
            Matcher::UrlEncoded("page".into(), page.into()),
            Matcher::UrlEncoded("limit".into(), "25".into()),
            Matcher::UrlEncoded("fields".into(), SEARCH_FIELDS.into()),
        ])
    }

    #[tokio::test]
    async fn test_search_normalizes_response() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/search.json")
            .match_query(search_query("the hobbit", "2"))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                "numFound": 142,
                "num_found": 142,
                "start": 25,
                "docs": [
                    {
                        "key": "/works/OL262758W",
                        "title": "The Hobbit",
                        "author_name": ["J.R.R. Tolkien"],
                        "first_publish_year": 1937,
                        "cover_i": 14627509,
                        "number_of_pages_median": 310,
                        "publisher": ["Allen & Unwin"],
                        "edition_count": 563,
                        "subject": ["Fantasy"],
                        "language": ["eng", "por"]
                    },
                    { "key": "/works/OL1W", "title": "Untitled companion" }
                ]
            }"#,
            )
            .create_async()
            .await;

        let gw = gateway(&server.url(), Duration::from_secs(5));
        let page = gw.search("  the hobbit ", 2, 25).await.unwrap();

        assert_eq!(page.total_results(), 142);
        assert_eq!(page.page(), 2);
        assert_eq!(page.limit(), 25);
        assert_eq!(page.start(), 25);
        assert_eq!(page.books().len(), 2);
        let hobbit = &page.books()[0];
        assert_eq!(hobbit.authors, vec!["J.R.R. Tolkien"]);
        assert_eq!(hobbit.median_pages, Some(310));
        assert_eq!(hobbit.languages, vec!["eng", "por"]);
        assert!(page.books()[1].authors.is_empty());
    }

    #[tokio::test]
    async fn test_blank_query_sent_as_wildcard() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", "/search.json")
            .match_query(search_query("*", "1"))
            .with_status(200)
            .with_body(r#"{"numFound": 3, "docs": []}"#)
            .create_async()
            .await;

        let gw = gateway(&server.url(), Duration::from_secs(5));
        let page = gw.search("", 1, 25).await.unwrap();
        assert_eq!(page.total_results(), 3);
        m.assert_async().await;
    }

    #[tokio::test]
    async fn test_server_error_retried_once() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", "/search.json")
            .match_query(Matcher::Any)
            .with_status(503)
            .expect(2)
            .create_async()
            .await;

        let gw = gateway(&server.url(), Duration::from_secs(5));
        let err = gw.search("dune", 1, 25).await.unwrap_err();
        assert!(matches!(err, CatalogError::ServiceUnavailable));
        m.assert_async().await;
    }

    #[tokio::test]
    async fn test_rate_limited() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/search.json")
            .match_query(Matcher::Any)
            .with_status(429)
            .expect(2)
            .create_async()
            .await;

        let gw = gateway(&server.url(), Duration::from_secs(5));
        let err = gw.search("dune", 1, 25).await.unwrap_err();
        assert!(matches!(err, CatalogError::RateLimited));
    }

    #[tokio::test]
    async fn test_upstream_message_surfaces() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/search.json")
            .match_query(Matcher::Any)
            .with_status(400)
            .with_body(r#"{"message": "query too long"}"#)
            .expect(2)
            .create_async()
            .await;

        let gw = gateway(&server.url(), Duration::from_secs(5));
        match gw.search("dune", 1, 25).await.unwrap_err() {
            CatalogError::RequestFailed(msg) => assert_eq!(msg, "query too long"),
            other => panic!("unexpected {other:?}"),
        }
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_retry_recovers() {
        let mut server = Server::new_async().await;
        let failing = server
            .mock("GET", "/search.json")
            .match_query(Matcher::Any)
            .with_status(500)
            .expect(1)
            .create_async()
            .await;
        let ok = server
            .mock("GET", "/search.json")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"num_found": 1, "docs": [{"key": "/works/OL9W", "title": "Dune"}]}"#)
            .create_async()
            .await;

        let gw = gateway(&server.url(), Duration::from_secs(5));
        let page = gw.search("dune", 1, 25).await.unwrap();
        assert_eq!(page.books()[0].title, "Dune");
        failing.assert_async().await;
        ok.assert_async().await;
    }

    #[tokio::test]
    async fn test_timeout() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((sock, _)) = listener.accept().await {
                held.push(sock);
            }
        });

        let gw = gateway(&format!("http://{addr}"), Duration::from_millis(100));
        let err = gw.search("dune", 1, 25).await.unwrap_err();
        assert!(matches!(err, CatalogError::Timeout));
    }

    #[tokio::test]
    async fn test_work_details() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/works/OL47804W.json")
            .with_status(200)
            .with_body(
                r#"{
                "key": "/works/OL47804W",
                "title": "1984",
                "description": {"type": "/type/text", "value": "A dystopian novel."},
                "subjects": ["Totalitarianism", "Dystopias"],
                "first_publish_date": "1949"
            }"#,
            )
            .create_async()
            .await;

        let gw = gateway(&server.url(), Duration::from_secs(5));
        let work = gw.work_details("/works/OL47804W").await.unwrap();
        assert_eq!(work.title, "1984");
        assert_eq!(work.description.as_deref(), Some("A dystopian novel."));
        assert_eq!(work.subjects.len(), 2);
        assert_eq!(work.first_publish_date.as_deref(), Some("1949"));
    }

    #[test]
    fn test_plain_string_description() {
        let v = serde_json::json!({"title": "Emma", "description": "A novel."});
        assert_eq!(WorkDetails::from_json(&v).description.as_deref(), Some("A novel."));
    }

    #[test]
    fn test_search_url_with_base_path() {
        let gw = gateway("http://localhost:9/api/", Duration::from_secs(1));
        let url = gw.search_url("dune", 0, 10).unwrap();
        assert_eq!(url.path(), "/api/search.json");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("page".to_string(), "1".to_string())));
        assert!(pairs.contains(&("q".to_string(), "dune".to_string())));
    }
}
