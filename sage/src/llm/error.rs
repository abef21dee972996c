//! LLM error types

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during LLM operations
///
/// The assistant treats every variant the same way, but the split lets a
/// caller tell a rejected credential apart from a network problem.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Credential rejected ({status}): {message}")]
    Auth { status: u16, message: String },

    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Duration },

    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl LlmError {
    /// Map a transport-level reqwest failure, separating timeouts
    pub fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            LlmError::Timeout(timeout)
        } else {
            LlmError::Network(err)
        }
    }

    /// Map a non-success HTTP status to an error
    ///
    /// `retry_after` is the raw `retry-after` header value, in seconds.
    pub fn from_status(status: u16, retry_after: Option<&str>, message: String) -> Self {
        match status {
            401 | 403 => LlmError::Auth { status, message },
            429 => {
                let secs = retry_after.and_then(|s| s.trim().parse::<u64>().ok()).unwrap_or(60);
                LlmError::RateLimited {
                    retry_after: Duration::from_secs(secs),
                }
            }
            _ => LlmError::ApiError { status, message },
        }
    }

    /// Check if the provider rejected the credential
    pub fn is_auth(&self) -> bool {
        matches!(self, LlmError::Auth { .. })
    }

    /// Check if this is a rate limit error
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, LlmError::RateLimited { .. })
    }

    /// Check if the request never got a usable HTTP answer
    pub fn is_transport(&self) -> bool {
        matches!(self, LlmError::Network(_) | LlmError::Timeout(_))
    }

    /// Get the retry duration if this is a rate limit error
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            LlmError::RateLimited { retry_after } => Some(*retry_after),
            _ => None,
        }
    }
}
