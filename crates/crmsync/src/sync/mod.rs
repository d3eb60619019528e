//! Sync infrastructure: the orchestrator, run reports and progress events.
//!
//! # Module Structure
//!
//! - [`types`] - Run report types: `SyncRun`, `ResourceOutcome`, `RunStatus`,
//!   the cancellation flag and shared constants
//! - [`progress`] - Progress reporting: `SyncProgress`, `ProgressCallback`,
//!   `emit()`
//! - [`engine`] - The orchestrator: `run_sync()`

pub mod engine;
pub mod progress;
pub mod types;

// Re-export the orchestrator entry point
pub use engine::run_sync;

// Re-export report types
pub use types::{CancelFlag, ResourceOutcome, RunStatus, SyncRun};

// Re-export constants
pub use types::{
    DEFAULT_MAX_PAGES, DEFAULT_PAGE_DELAY_MS, DEFAULT_REQUEST_TIMEOUT_MS, INITIAL_BACKOFF_MS,
    MAX_BACKOFF_MS, MAX_FETCH_RETRIES,
};

// Re-export progress types
pub use progress::{emit, ProgressCallback, SyncProgress};
