//! Progress reporting types for sync operations.
//!
//! Progress events let a UI or log renderer follow a run without coupling the
//! engine to any particular output. Events mirror the pipeline stages:
//! fetch pages, transform records, persist the batch.

use crate::entity::resource_type::ResourceType;

/// Progress events emitted during a sync run.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum SyncProgress {
    /// A run is starting.
    SyncStarted {
        /// Number of resource types to process.
        resources: usize,
    },

    /// Starting to fetch pages for a resource.
    FetchingRecords {
        /// The resource being fetched.
        resource: ResourceType,
    },

    /// Fetched one page of records.
    FetchedPage {
        /// The resource this page belongs to.
        resource: ResourceType,
        /// Page number (1-indexed).
        page: u32,
        /// Number of records on this page.
        count: usize,
        /// Running total of records fetched so far.
        total_so_far: usize,
    },

    /// Finished fetching all pages for a resource.
    FetchComplete {
        /// The resource that finished fetching.
        resource: ResourceType,
        /// Total number of records fetched.
        total: usize,
    },

    /// A page fetch hit a retryable error and is backing off.
    PageFetchRetry {
        /// The resource being fetched.
        resource: ResourceType,
        /// Page number being retried.
        page: u32,
        /// Time to wait before retry (ms).
        retry_after_ms: u64,
        /// Current attempt number.
        attempt: u32,
    },

    /// A single record could not be normalized and was skipped.
    RecordSkipped {
        /// The resource the record belongs to.
        resource: ResourceType,
        /// The record's identifier (0 when the identifier itself was unusable).
        record_id: i64,
        /// The field that failed to coerce.
        field: &'static str,
        /// Error message.
        error: String,
    },

    /// Finished transforming a resource's fetched records.
    TransformComplete {
        /// The resource that finished transforming.
        resource: ResourceType,
        /// Records successfully normalized.
        transformed: usize,
        /// Records skipped with transform errors.
        skipped: usize,
    },

    /// Writing a resource's batch to the destination store.
    PersistingBatch {
        /// The resource being persisted.
        resource: ResourceType,
        /// Number of records in the batch.
        count: usize,
    },

    /// A resource type completed.
    ResourceComplete {
        /// The resource that completed.
        resource: ResourceType,
        /// Records newly inserted.
        inserted: u64,
        /// Records updated in place.
        updated: u64,
        /// Records that did not land.
        failed: usize,
    },

    /// A resource type failed.
    ResourceFailed {
        /// The resource that failed.
        resource: ResourceType,
        /// Error message.
        error: String,
    },

    /// The whole run completed.
    SyncComplete {
        /// Resources that completed without failure.
        succeeded: usize,
        /// Resources that failed.
        failed: usize,
    },

    /// Warning message (non-fatal).
    Warning {
        /// Warning message.
        message: String,
    },
}

/// Progress callback invoked with each event.
pub type ProgressCallback = Box<dyn Fn(SyncProgress) + Send + Sync>;

/// Emit an event through an optional callback.
#[inline]
pub fn emit(on_progress: Option<&ProgressCallback>, event: SyncProgress) {
    if let Some(cb) = on_progress {
        cb(event);
    }
}
