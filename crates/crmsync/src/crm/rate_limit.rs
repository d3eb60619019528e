//! Proactive rate limiting for the CRM API.
//!
//! The CRM tenant shares one request budget across all collections, so a
//! single limiter instance is shared by every pagination sequence of a sync
//! run.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};

/// Type alias for the governor rate limiter.
type GovernorRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// An API rate limiter enforcing a minimum interval between requests.
///
/// The first request passes immediately; every subsequent request waits until
/// the configured interval has elapsed since the previous one.
///
/// # Example
///
/// ```ignore
/// use std::time::Duration;
/// use crmsync::crm::ApiRateLimiter;
///
/// let limiter = ApiRateLimiter::new(Duration::from_millis(500));
///
/// // Before each API call:
/// limiter.wait().await;
/// ```
#[derive(Clone)]
pub struct ApiRateLimiter {
    inner: Arc<GovernorRateLimiter>,
}

impl ApiRateLimiter {
    /// Create a rate limiter with the given minimum inter-request interval.
    ///
    /// A zero interval is clamped to one millisecond so the limiter stays
    /// well-formed; callers wanting no delay should just pass a tiny interval.
    #[must_use]
    pub fn new(min_interval: Duration) -> Self {
        let period = if min_interval.is_zero() {
            Duration::from_millis(1)
        } else {
            min_interval
        };
        let quota = Quota::with_period(period)
            .unwrap_or_else(|| Quota::per_second(NonZeroU32::MIN))
            .allow_burst(NonZeroU32::MIN);

        Self {
            inner: Arc::new(RateLimiter::direct(quota)),
        }
    }

    /// Wait until the rate limiter allows the next request.
    pub async fn wait(&self) {
        self.inner.until_ready().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_request_passes_immediately() {
        let limiter = ApiRateLimiter::new(Duration::from_secs(3600));
        // Would hang for an hour if the first call had to wait.
        limiter.wait().await;
    }

    #[tokio::test]
    async fn zero_interval_is_well_formed() {
        let limiter = ApiRateLimiter::new(Duration::ZERO);
        limiter.wait().await;
        limiter.wait().await;
    }

    #[tokio::test]
    async fn clones_share_the_same_budget() {
        let limiter = ApiRateLimiter::new(Duration::from_millis(200));
        let clone = limiter.clone();

        limiter.wait().await;
        // The clone's first wait contends with the original's: it must not
        // pass instantly.
        let start = std::time::Instant::now();
        clone.wait().await;
        assert!(start.elapsed() >= Duration::from_millis(100));
    }
}
