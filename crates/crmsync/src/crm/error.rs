//! CRM API error types.

use thiserror::Error;

/// Maximum number of response-body bytes kept in an [`CrmError::Api`] error.
/// Enough to see the API's error message without dragging a whole listing
/// payload through logs.
const MAX_BODY_SNIPPET: usize = 512;

/// Errors that can occur when fetching a page from the CRM API.
#[derive(Debug, Error)]
pub enum CrmError {
    /// Network-level failure. `timeout` is set when the per-page deadline
    /// elapsed rather than the connection itself failing.
    #[error("transport error: {message}")]
    Transport { message: String, timeout: bool },

    /// The remote service answered with a non-success status.
    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    /// The remote service answered 200 with a body that does not match the
    /// listing contract (missing envelope key, non-object records, ...).
    #[error("malformed API response: {message}")]
    Decode { message: String },
}

impl CrmError {
    /// Create a transport error (non-timeout).
    #[inline]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            timeout: false,
        }
    }

    /// Create a timeout error.
    #[inline]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            timeout: true,
        }
    }

    /// Create an API error, truncating the body to a log-friendly snippet.
    #[inline]
    pub fn api(status: u16, body: &[u8]) -> Self {
        let mut body = String::from_utf8_lossy(body).into_owned();
        if body.len() > MAX_BODY_SNIPPET {
            let mut end = MAX_BODY_SNIPPET;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            body.truncate(end);
        }
        Self::Api { status, body }
    }

    /// Create a decode error.
    #[inline]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Check whether this error is a timeout.
    #[inline]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport { timeout: true, .. })
    }

    /// Check whether retrying this request can plausibly succeed.
    ///
    /// Transport failures and timeouts are retryable; API errors only for
    /// server-side statuses (5xx) and throttling (429). Other 4xx statuses
    /// mean the request itself is wrong and will keep failing.
    #[inline]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { .. } => true,
            Self::Api { status, .. } => *status == 429 || (500..600).contains(status),
            Self::Decode { .. } => false,
        }
    }
}

/// Extract a short error message suitable for progress display.
///
/// Takes the first line of an error message, which is useful for errors that
/// include multi-line details.
#[inline]
pub fn short_error_message(e: &impl std::error::Error) -> String {
    let full = e.to_string();
    full.lines().next().unwrap_or(&full).to_string()
}

/// Result type for CRM API operations.
pub type Result<T> = std::result::Result<T, CrmError>;
