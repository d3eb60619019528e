//! Upsert sink: idempotent, transactional writes into the destination store.
//!
//! Writes are keyed by the remote identifier, so repeated delivery of the
//! same record is an in-place update rather than a duplicate insert. One
//! batch per resource type is written as a single transaction; partial
//! visibility is bounded to whole-resource granularity.

mod bulk;
mod convert;
pub mod errors;
pub mod query;

pub use bulk::{upsert_batch, SINK_RETRY_ATTEMPTS, SINK_RETRY_BACKOFF_MS};
pub use errors::SinkError;

use serde::Serialize;

/// Result of upserting one resource type's batch.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct UpsertResult {
    /// Records inserted for the first time.
    pub inserted: u64,
    /// Records that already existed and were updated in place.
    pub updated: u64,
    /// Identifiers that did not land. Empty on success; a failed batch is
    /// reported through [`SinkError::Batch`] instead, where the whole batch
    /// appears because the transaction rolled back.
    pub failed: Vec<i64>,
}
