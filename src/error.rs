//! Error types for the network boundary of the cover pipeline.
//!
//! Every remote call made while resolving a cover image returns a
//! [`FetchError`] instead of panicking or bubbling a raw `reqwest::Error`.
//! Callers split on [`FetchError::is_rejection`] before moving on to the next
//! candidate: rejected payloads are logged at `debug`, endpoint failures
//! (timeouts, transport errors, bad status, malformed bodies) at `warn`.

use thiserror::Error;

pub type FetchResult<T> = std::result::Result<T, FetchError>;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timed out: {url}")]
    Timeout { url: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("not an image (content-type {content_type:?})")]
    NotImage { content_type: String },

    #[error("payload too small ({len} < {min} bytes)")]
    TooSmall { len: usize, min: usize },

    #[error("malformed response: {0}")]
    Decode(String),

    #[error("tier unavailable: {0}")]
    Unavailable(&'static str),
}

impl FetchError {
    /// Failures that say nothing about the endpoint itself (policy-style
    /// rejections of an otherwise healthy response).
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            FetchError::NotImage { .. } | FetchError::TooSmall { .. } | FetchError::Unavailable(_)
        )
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            let url = err.url().map(|u| u.to_string()).unwrap_or_default();
            FetchError::Timeout { url }
        } else if err.is_decode() {
            FetchError::Decode(err.to_string())
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Decode(err.to_string())
    }
}
