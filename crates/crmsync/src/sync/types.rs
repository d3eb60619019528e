//! Shared sync types and constants.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::entity::resource_type::ResourceType;

/// Default minimum delay between paginated requests, in milliseconds.
pub const DEFAULT_PAGE_DELAY_MS: u64 = 500;

/// Default overall timeout for a single page fetch, in milliseconds.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

/// Default safety bound on pages fetched for one resource.
///
/// A defensive limit against an API that keeps reporting a next page, not an
/// observed real collection size.
pub const DEFAULT_MAX_PAGES: u32 = 10_000;

/// Maximum retries for a single page fetch.
pub const MAX_FETCH_RETRIES: u32 = 5;

/// Initial backoff delay in milliseconds.
pub const INITIAL_BACKOFF_MS: u64 = 1_000;

/// Maximum backoff delay in milliseconds.
pub const MAX_BACKOFF_MS: u64 = 60_000;

/// Run-level cancellation flag, checked between pages and between resources.
///
/// Flipped by the caller (e.g. a Ctrl+C handler); the engine finishes the
/// current page or batch, then stops without leaving a resource half-written.
pub type CancelFlag = Arc<AtomicBool>;

/// Check a cancellation flag, tolerating the "no flag" case.
#[inline]
pub(crate) fn is_cancelled(cancel: Option<&CancelFlag>) -> bool {
    cancel.is_some_and(|flag| flag.load(Ordering::Acquire))
}

/// Overall status of a sync run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Every resource type completed with zero unrecovered errors.
    Success,
    /// Some resource types failed, others completed.
    PartialFailure,
    /// Every attempted resource type failed.
    Failure,
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStatus::Success => write!(f, "success"),
            RunStatus::PartialFailure => write!(f, "partial_failure"),
            RunStatus::Failure => write!(f, "failure"),
        }
    }
}

/// Outcome of syncing a single resource type.
#[derive(Debug, Clone, Serialize)]
pub struct ResourceOutcome {
    /// The resource type this outcome describes.
    pub resource_type: ResourceType,
    /// Raw records fetched across all pages.
    pub fetched: usize,
    /// Records newly inserted into the destination store.
    pub inserted: u64,
    /// Records updated in place.
    pub updated: u64,
    /// Records that did not land: transform skips plus sink failures.
    pub failed: usize,
    /// Resource-level failure, if the resource did not complete.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResourceOutcome {
    /// An outcome for a resource that failed before anything was written.
    pub fn failed(resource_type: ResourceType, fetched: usize, error: impl Into<String>) -> Self {
        Self {
            resource_type,
            fetched,
            inserted: 0,
            updated: 0,
            failed: fetched,
            error: Some(error.into()),
        }
    }

    /// True when the resource completed without a resource-level failure.
    ///
    /// Per-record transform skips are recovered errors and do not flip this.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// The unit of execution: one pass over all configured resource types.
///
/// Built up by the orchestrator while resources complete, finalized once
/// every resource has been attempted. The serialized shape is the stable
/// contract consumed by schedulers and monitoring.
#[derive(Debug, Serialize)]
pub struct SyncRun {
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the run finished; set by [`SyncRun::finalize`].
    pub finished_at: Option<DateTime<Utc>>,
    /// Overall status; meaningful only after finalization.
    pub status: RunStatus,
    /// One outcome per resource type, in processing order.
    #[serde(rename = "per_resource")]
    pub resources: Vec<ResourceOutcome>,
}

impl SyncRun {
    /// Start a new run record.
    #[must_use]
    pub fn started() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            status: RunStatus::Failure,
            resources: Vec::new(),
        }
    }

    /// Record the outcome of one resource type.
    pub fn record(&mut self, outcome: ResourceOutcome) {
        self.resources.push(outcome);
    }

    /// Finalize the run: stamp the finish time and derive the overall status
    /// from the per-resource outcomes.
    #[must_use]
    pub fn finalize(mut self) -> Self {
        let succeeded = self.resources.iter().filter(|o| o.is_success()).count();
        self.status = if succeeded == self.resources.len() && !self.resources.is_empty() {
            RunStatus::Success
        } else if succeeded == 0 {
            RunStatus::Failure
        } else {
            RunStatus::PartialFailure
        };
        self.finished_at = Some(Utc::now());
        self
    }

    /// Number of resources that completed without a resource-level failure.
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.resources.iter().filter(|o| o.is_success()).count()
    }

    /// Resources that failed, with their error messages.
    pub fn failures(&self) -> impl Iterator<Item = &ResourceOutcome> {
        self.resources.iter().filter(|o| !o.is_success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok_outcome(resource: ResourceType) -> ResourceOutcome {
        ResourceOutcome {
            resource_type: resource,
            fetched: 2,
            inserted: 2,
            updated: 0,
            failed: 0,
            error: None,
        }
    }

    #[test]
    fn test_finalize_all_success() {
        let mut run = SyncRun::started();
        run.record(ok_outcome(ResourceType::Deal));
        run.record(ok_outcome(ResourceType::Contact));
        let run = run.finalize();

        assert_eq!(run.status, RunStatus::Success);
        assert!(run.finished_at.is_some());
        assert_eq!(run.succeeded(), 2);
    }

    #[test]
    fn test_finalize_partial_failure() {
        let mut run = SyncRun::started();
        run.record(ok_outcome(ResourceType::Deal));
        run.record(ResourceOutcome::failed(ResourceType::Contact, 0, "boom"));
        let run = run.finalize();

        assert_eq!(run.status, RunStatus::PartialFailure);
        assert_eq!(run.failures().count(), 1);
    }

    #[test]
    fn test_finalize_all_failed() {
        let mut run = SyncRun::started();
        run.record(ResourceOutcome::failed(ResourceType::Deal, 0, "boom"));
        let run = run.finalize();

        assert_eq!(run.status, RunStatus::Failure);
    }

    #[test]
    fn test_transform_skips_do_not_flip_resource_success() {
        let outcome = ResourceOutcome {
            resource_type: ResourceType::Deal,
            fetched: 5,
            inserted: 4,
            updated: 0,
            failed: 1,
            error: None,
        };
        assert!(outcome.is_success());
    }

    #[test]
    fn test_report_serialization_shape() {
        let mut run = SyncRun::started();
        run.record(ok_outcome(ResourceType::Deal));
        run.record(ResourceOutcome::failed(ResourceType::Contact, 3, "API error 502"));
        let run = run.finalize();

        let value = serde_json::to_value(&run).expect("run serializes");
        assert_eq!(value["status"], "partial_failure");
        let per_resource = value["per_resource"].as_array().expect("array");
        assert_eq!(per_resource.len(), 2);
        assert_eq!(per_resource[0]["resource_type"], "deal");
        assert_eq!(per_resource[0]["inserted"], 2);
        assert!(per_resource[0].get("error").is_none());
        assert_eq!(per_resource[1]["error"], "API error 502");
    }

    #[test]
    fn test_is_cancelled() {
        assert!(!is_cancelled(None));

        let flag: CancelFlag = Arc::new(AtomicBool::new(false));
        assert!(!is_cancelled(Some(&flag)));
        flag.store(true, Ordering::Release);
        assert!(is_cancelled(Some(&flag)));
    }
}
