//! Bounded retry with exponential backoff for page fetches.
//!
//! This is deliberately separate from the paginator's page-count safety
//! bound: the retry budget guards against transient faults on one request,
//! the page bound guards against an API that never reports a final page.
//! The two limits must not be conflated.

use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};

use crate::crm::error::{short_error_message, CrmError};
use crate::entity::resource_type::ResourceType;
use crate::sync::progress::{emit, ProgressCallback, SyncProgress};
use crate::sync::types::{INITIAL_BACKOFF_MS, MAX_BACKOFF_MS, MAX_FETCH_RETRIES};

/// Configuration for retrying a failed page fetch.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Minimum delay between retries.
    pub min_delay: Duration,
    /// Maximum delay between retries.
    pub max_delay: Duration,
    /// Maximum number of retry attempts.
    pub max_retries: usize,
    /// Whether to add jitter to delays.
    pub with_jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_millis(INITIAL_BACKOFF_MS),
            max_delay: Duration::from_millis(MAX_BACKOFF_MS),
            max_retries: MAX_FETCH_RETRIES as usize,
            with_jitter: true,
        }
    }
}

impl RetryConfig {
    /// Create a new retry configuration with custom values.
    #[must_use]
    pub fn new(min_delay: Duration, max_delay: Duration, max_retries: usize) -> Self {
        Self {
            min_delay,
            max_delay,
            max_retries,
            with_jitter: true,
        }
    }

    /// Set whether to use jitter.
    #[must_use]
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.with_jitter = jitter;
        self
    }

    /// Build an exponential backoff strategy from this configuration.
    #[must_use]
    pub fn into_backoff(self) -> ExponentialBuilder {
        let mut builder = ExponentialBuilder::default()
            .with_min_delay(self.min_delay)
            .with_max_delay(self.max_delay)
            .with_max_times(self.max_retries);

        if self.with_jitter {
            builder = builder.with_jitter();
        }

        builder
    }
}

/// Execute a page fetch with automatic retry on retryable errors.
///
/// Retries while [`CrmError::is_retryable`] holds (transport failures,
/// timeouts, 5xx and 429 responses) up to the configured attempt budget,
/// reporting each backoff via the progress callback and debug-level tracing.
/// Non-retryable errors and exhausted budgets propagate unchanged.
pub async fn with_page_retry<T, F, Fut>(
    mut operation: F,
    config: &RetryConfig,
    resource: ResourceType,
    page: u32,
    on_progress: Option<&ProgressCallback>,
) -> Result<T, CrmError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, CrmError>>,
{
    // Track attempt number for progress reporting
    let attempt = AtomicU32::new(0);

    let retry_op = || {
        attempt.fetch_add(1, Ordering::SeqCst);
        operation()
    };

    retry_op
        .retry(config.clone().into_backoff())
        .notify(|err: &CrmError, dur| {
            let current_attempt = attempt.load(Ordering::SeqCst);
            emit(
                on_progress,
                SyncProgress::PageFetchRetry {
                    resource,
                    page,
                    retry_after_ms: dur.as_millis() as u64,
                    attempt: current_attempt,
                },
            );
            tracing::debug!(
                %resource,
                page,
                attempt = current_attempt,
                retry_in = ?dur,
                error = %short_error_message(err),
                "Page fetch failed, retrying"
            );
        })
        .when(CrmError::is_retryable)
        .await
}
