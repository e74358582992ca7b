// Error taxonomy shared by the data layer.

use std::time::Duration;

use thiserror::Error;

/// Failures talking to the upstream league API.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Transport failure or non-success status. Surfaced, never retried.
    #[error("network error fetching {url}: {message}")]
    Network { url: String, message: String },

    /// Upstream (or the client-side request limiter) refused the request.
    /// `retry_after` is the earliest point a retry can succeed, when known.
    #[error("rate limited fetching {url}")]
    RateLimited {
        url: String,
        retry_after: Option<Duration>,
    },

    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        source: serde_json::Error,
    },
}

impl SourceError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, SourceError::RateLimited { .. })
    }

    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            SourceError::RateLimited { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}

/// Errors surfaced by the data layer to callers.
#[derive(Debug, Error)]
pub enum FplError {
    #[error(transparent)]
    Source(#[from] SourceError),

    /// Lookup by id with no match.
    #[error("{kind} {id} not found")]
    DataNotFound { kind: &'static str, id: u64 },

    #[error("no {0} game-week in the current season data")]
    NoGameWeek(&'static str),
}

impl FplError {
    pub fn not_found(kind: &'static str, id: impl Into<u64>) -> Self {
        FplError::DataNotFound {
            kind,
            id: id.into(),
        }
    }
}
