use std::time::Duration;

use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::time::sleep;

use crate::error::{CatalogError, Result};

// ─── RetryingClient ───────────────────────────────────────────────────────────

/// GET client with a per-request timeout and exponential backoff between attempts.
///
/// Attempt `n` (0-based) that fails is followed by a wait of `backoff_base * 2^n`
/// before the next one, up to `max_retries` retries.
pub struct RetryingClient {
    client: reqwest::Client,
    max_retries: u32,
    backoff_base: Duration,
}

impl RetryingClient {
    pub fn new(
        timeout: Duration,
        max_retries: u32,
        backoff_base: Duration,
        user_agent: &str,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .gzip(true)
            .build()
            .map_err(|e| CatalogError::Client(e.to_string()))?;
        Ok(Self {
            client,
            max_retries,
            backoff_base,
        })
    }

    pub fn backoff_for(&self, attempt: u32) -> Duration {
        self.backoff_base * 2u32.saturating_pow(attempt)
    }

    pub async fn get(&self, url: &Url) -> Result<String> {
        let mut attempt = 0u32;
        loop {
            tracing::debug!(%url, attempt, "GET");
            match self.attempt(url).await {
                Ok(body) => return Ok(body),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    let wait = self.backoff_for(attempt);
                    tracing::warn!(%url, attempt, "request failed ({e}), retrying in {wait:?}");
                    sleep(wait).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    pub async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T> {
        let text = self.get(url).await?;
        serde_json::from_str(&text).map_err(|e| CatalogError::Parse(e.to_string()))
    }

    async fn attempt(&self, url: &Url) -> Result<String> {
        let resp = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(classify_transport)?;

        let status = resp.status();
        if status.is_success() {
            return resp.text().await.map_err(classify_transport);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(classify_status(status, &body))
    }
}

fn classify_transport(e: reqwest::Error) -> CatalogError {
    if e.is_timeout() {
        CatalogError::Timeout
    } else {
        CatalogError::RequestFailed(e.to_string())
    }
}

/// Map a non-success status to an error, preferring the upstream `message` field.
pub(crate) fn classify_status(status: StatusCode, body: &str) -> CatalogError {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return CatalogError::RateLimited;
    }
    if status.is_server_error() {
        return CatalogError::ServiceUnavailable;
    }
    let upstream = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(ToOwned::to_owned))
        .filter(|m| !m.trim().is_empty());
    CatalogError::RequestFailed(upstream.unwrap_or_else(|| format!("HTTP {}", status.as_u16())))
}
