//! The `sync` command: run one full pass over the configured resources.

use std::sync::Arc;
use std::time::Duration;

use crmsync::http::ReqwestTransport;
use crmsync::sync::run_sync;
use crmsync::{CancelFlag, CrmClient, ResourceType, RunStatus, SyncerConfig};

use crate::config::Config;
use crate::progress;
use crate::SyncOptions;

/// Build the engine configuration from the layered CLI config plus flag
/// overrides, run the sync, and print the report.
///
/// Returns the run status so the caller can map it to an exit code.
pub(crate) async fn handle_sync(
    opts: SyncOptions,
    config: &Config,
    database_url: &str,
    cancel: CancelFlag,
) -> Result<RunStatus, Box<dyn std::error::Error>> {
    let base_url = config
        .crm
        .url
        .clone()
        .ok_or("CRM base URL is not configured (crm.url or CRMSYNC_CRM_URL)")?;
    let api_key = config
        .crm
        .key
        .clone()
        .ok_or("CRM API key is not configured (crm.key or CRMSYNC_CRM_KEY)")?;

    let mut syncer = SyncerConfig::new(base_url, api_key);

    // Resource selection: flags beat config; config beats "all".
    let requested: &[String] = if opts.resources.is_empty() {
        &config.sync.resources
    } else {
        &opts.resources
    };
    if !requested.is_empty() {
        let mut resources = Vec::with_capacity(requested.len());
        for name in requested {
            resources.push(name.parse::<ResourceType>()?);
        }
        syncer.resource_types = resources;
    }

    syncer.page_delay =
        Duration::from_millis(opts.page_delay_ms.unwrap_or(config.sync.page_delay_ms));
    syncer.max_pages = opts.max_pages.unwrap_or(config.sync.max_pages);
    syncer.request_timeout = Duration::from_millis(
        opts.request_timeout_ms
            .unwrap_or(config.sync.request_timeout_ms),
    );

    // Fail fast on a bad endpoint before touching the database.
    let client = CrmClient::new(&syncer, Arc::new(ReqwestTransport::default()))?;

    let db = crmsync::connect_and_migrate(database_url).await?;

    let on_progress = progress::reporter();
    let run = run_sync(&db, &client, &syncer, Some(&cancel), Some(&on_progress)).await;

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&run)?);
    } else {
        print_summary(&run);
    }

    Ok(run.status)
}

fn print_summary(run: &crmsync::SyncRun) {
    println!();
    println!(
        "{:<16} {:>8} {:>9} {:>8} {:>7}  error",
        "resource", "fetched", "inserted", "updated", "failed"
    );
    for outcome in &run.resources {
        println!(
            "{:<16} {:>8} {:>9} {:>8} {:>7}  {}",
            outcome.resource_type.to_string(),
            outcome.fetched,
            outcome.inserted,
            outcome.updated,
            outcome.failed,
            outcome.error.as_deref().unwrap_or("-"),
        );
    }
    println!("status: {}", run.status);
}
