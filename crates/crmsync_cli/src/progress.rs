//! Progress rendering for sync runs.
//!
//! Interactive terminals get single-line status output; non-TTY runs fall
//! back to structured tracing so logs stay grep-able.

use console::{style, Term};
use crmsync::sync::{ProgressCallback, SyncProgress};

/// Build a progress callback appropriate for the current terminal.
pub(crate) fn reporter() -> ProgressCallback {
    let is_tty = Term::stdout().is_term();
    Box::new(move |event| {
        if is_tty {
            render_tty(&event);
        } else {
            render_log(&event);
        }
    })
}

fn render_tty(event: &SyncProgress) {
    match event {
        SyncProgress::SyncStarted { resources } => {
            println!("Syncing {} resource type(s)...", resources);
        }
        SyncProgress::FetchingRecords { resource } => {
            println!("  {} fetching {}", style("→").cyan(), resource);
        }
        SyncProgress::FetchedPage {
            resource,
            page,
            count,
            total_so_far,
        } => {
            println!(
                "    {resource} page {page}: {count} record(s), {total_so_far} total"
            );
        }
        SyncProgress::PageFetchRetry {
            resource,
            page,
            retry_after_ms,
            attempt,
        } => {
            println!(
                "    {} {resource} page {page} retry #{attempt} in {retry_after_ms}ms",
                style("⟳").yellow()
            );
        }
        SyncProgress::RecordSkipped { error, .. } => {
            println!("    {} {error}", style("skip").yellow());
        }
        SyncProgress::TransformComplete {
            resource,
            transformed,
            skipped,
        } => {
            if *skipped > 0 {
                println!(
                    "    {resource}: {transformed} normalized, {skipped} skipped"
                );
            }
        }
        SyncProgress::ResourceComplete {
            resource,
            inserted,
            updated,
            failed,
        } => {
            println!(
                "  {} {resource}: {inserted} inserted, {updated} updated, {failed} failed",
                style("✓").green()
            );
        }
        SyncProgress::ResourceFailed { resource, error } => {
            println!("  {} {resource}: {error}", style("✗").red());
        }
        SyncProgress::SyncComplete { succeeded, failed } => {
            println!(
                "Done: {succeeded} resource(s) synced, {failed} failed"
            );
        }
        SyncProgress::Warning { message } => {
            println!("  {} {message}", style("warning").yellow());
        }
        // Page-level events already cover these.
        SyncProgress::FetchComplete { .. } | SyncProgress::PersistingBatch { .. } => {}
        _ => {}
    }
}

fn render_log(event: &SyncProgress) {
    match event {
        SyncProgress::SyncStarted { resources } => {
            tracing::info!(resources = *resources, "Sync started");
        }
        SyncProgress::FetchedPage {
            resource,
            page,
            count,
            total_so_far,
        } => {
            tracing::debug!(
                %resource,
                page = *page,
                count = *count,
                total_so_far = *total_so_far,
                "Fetched page"
            );
        }
        SyncProgress::PageFetchRetry {
            resource,
            page,
            retry_after_ms,
            attempt,
        } => {
            tracing::warn!(
                %resource,
                page = *page,
                retry_after_ms = *retry_after_ms,
                attempt = *attempt,
                "Page fetch retry"
            );
        }
        SyncProgress::RecordSkipped { resource, record_id, error, .. } => {
            tracing::warn!(%resource, record_id = *record_id, %error, "Record skipped");
        }
        SyncProgress::ResourceComplete {
            resource,
            inserted,
            updated,
            failed,
        } => {
            tracing::info!(
                %resource,
                inserted = *inserted,
                updated = *updated,
                failed = *failed,
                "Resource complete"
            );
        }
        SyncProgress::ResourceFailed { resource, error } => {
            tracing::error!(%resource, %error, "Resource failed");
        }
        SyncProgress::SyncComplete { succeeded, failed } => {
            tracing::info!(succeeded = *succeeded, failed = *failed, "Sync complete");
        }
        _ => {}
    }
}
