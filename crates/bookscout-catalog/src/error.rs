use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("request timed out, try again")]
    Timeout,

    #[error("too many requests, wait a moment before trying again")]
    RateLimited,

    #[error("catalog temporarily unavailable, try again in a few minutes")]
    ServiceUnavailable,

    #[error("request failed: {0}")]
    RequestFailed(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP client error: {0}")]
    Client(String),
}

impl CatalogError {
    /// Whether another attempt could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout | Self::RateLimited | Self::ServiceUnavailable | Self::RequestFailed(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
