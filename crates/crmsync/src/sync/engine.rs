//! Sync orchestrator.
//!
//! Runs the fetch → transform → upsert pipeline for each configured resource
//! type in turn. Failure isolation is the key invariant: one resource's
//! pagination or sink failure is recorded in its outcome and never aborts
//! the remaining resource types. The run report always completes; the
//! orchestrator itself never returns an error out of a full run.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use crmsync::{connect_and_migrate, CrmClient, SyncerConfig};
//! use crmsync::http::ReqwestTransport;
//! use crmsync::sync::run_sync;
//!
//! let config = SyncerConfig::new(base_url, api_key);
//! let client = CrmClient::new(&config, Arc::new(ReqwestTransport::default()))?;
//! let db = connect_and_migrate("sqlite://crm.db?mode=rwc").await?;
//! let run = run_sync(&db, &client, &config, None, None).await;
//! println!("{}", serde_json::to_string_pretty(&run)?);
//! ```

use sea_orm::DatabaseConnection;

use crate::config::SyncerConfig;
use crate::crm::client::CrmClient;
use crate::crm::pagination::fetch_all_pages;
use crate::entity::resource_type::ResourceType;
use crate::sink::upsert_batch;
use crate::transform::records::NormalizedRecord;
use crate::transform::transform;

use super::progress::{emit, ProgressCallback, SyncProgress};
use super::types::{is_cancelled, CancelFlag, ResourceOutcome, SyncRun};

/// Run one full sync pass over the configured resource types.
///
/// Resources are processed sequentially; within a resource, no data is
/// written until all of its pages are fetched and transformed
/// (buffer-then-write). The cancellation flag is honored between pages and
/// between resource types; resources not attempted after a cancellation are
/// recorded as failed with a "sync cancelled" error so the report shape
/// stays stable.
#[tracing::instrument(skip_all, fields(resources = config.resource_types.len()))]
pub async fn run_sync(
    db: &DatabaseConnection,
    client: &CrmClient,
    config: &SyncerConfig,
    cancel: Option<&CancelFlag>,
    on_progress: Option<&ProgressCallback>,
) -> SyncRun {
    let mut run = SyncRun::started();

    emit(
        on_progress,
        SyncProgress::SyncStarted {
            resources: config.resource_types.len(),
        },
    );

    for (index, &resource) in config.resource_types.iter().enumerate() {
        if is_cancelled(cancel) {
            tracing::warn!(%resource, "Sync cancelled, skipping remaining resources");
            for &remaining in &config.resource_types[index..] {
                run.record(ResourceOutcome::failed(
                    remaining,
                    0,
                    "sync cancelled before this resource was attempted",
                ));
            }
            break;
        }

        let outcome = sync_resource(db, client, config, resource, cancel, on_progress).await;

        match &outcome.error {
            None => {
                tracing::info!(
                    %resource,
                    fetched = outcome.fetched,
                    inserted = outcome.inserted,
                    updated = outcome.updated,
                    failed = outcome.failed,
                    "Resource synced"
                );
                emit(
                    on_progress,
                    SyncProgress::ResourceComplete {
                        resource,
                        inserted: outcome.inserted,
                        updated: outcome.updated,
                        failed: outcome.failed,
                    },
                );
            }
            Some(error) => {
                tracing::error!(%resource, %error, "Resource sync failed");
                emit(
                    on_progress,
                    SyncProgress::ResourceFailed {
                        resource,
                        error: error.clone(),
                    },
                );
            }
        }

        run.record(outcome);
    }

    let run = run.finalize();
    emit(
        on_progress,
        SyncProgress::SyncComplete {
            succeeded: run.succeeded(),
            failed: run.failures().count(),
        },
    );
    run
}

/// Sync one resource type: fetch all pages, transform, upsert the batch.
async fn sync_resource(
    db: &DatabaseConnection,
    client: &CrmClient,
    config: &SyncerConfig,
    resource: ResourceType,
    cancel: Option<&CancelFlag>,
    on_progress: Option<&ProgressCallback>,
) -> ResourceOutcome {
    // Fetch. Pagination owns the raw records until they are handed to the
    // transformer; a fetch failure means nothing was written.
    let raw_records = match fetch_all_pages(
        client,
        resource,
        config.max_pages,
        &config.retry,
        cancel,
        on_progress,
    )
    .await
    {
        Ok(records) => records,
        Err(e) => return ResourceOutcome::failed(resource, 0, e.to_string()),
    };
    let fetched = raw_records.len();

    // Transform. Per-record failures are recovered by skipping: the record
    // is counted as failed, the resource keeps going.
    let mut normalized: Vec<NormalizedRecord> = Vec::with_capacity(fetched);
    let mut skipped = 0usize;
    for raw in &raw_records {
        match transform(resource, raw) {
            Ok(record) => normalized.push(record),
            Err(e) => {
                skipped += 1;
                tracing::warn!(%resource, error = %e, "Skipping record that failed to normalize");
                emit(
                    on_progress,
                    SyncProgress::RecordSkipped {
                        resource,
                        record_id: e.record_id,
                        field: e.field,
                        error: e.to_string(),
                    },
                );
            }
        }
    }

    emit(
        on_progress,
        SyncProgress::TransformComplete {
            resource,
            transformed: normalized.len(),
            skipped,
        },
    );

    // Abort before committing a batch, never mid-batch.
    if is_cancelled(cancel) {
        return ResourceOutcome::failed(
            resource,
            fetched,
            "sync cancelled before the batch was written",
        );
    }

    emit(
        on_progress,
        SyncProgress::PersistingBatch {
            resource,
            count: normalized.len(),
        },
    );

    match upsert_batch(db, resource, &normalized).await {
        Ok(result) => ResourceOutcome {
            resource_type: resource,
            fetched,
            inserted: result.inserted,
            updated: result.updated,
            failed: skipped + result.failed.len(),
            error: None,
        },
        Err(e) => ResourceOutcome {
            resource_type: resource,
            fetched,
            inserted: 0,
            updated: 0,
            failed: fetched,
            error: Some(e.to_string()),
        },
    }
}
