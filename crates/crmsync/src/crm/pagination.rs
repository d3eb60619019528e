//! Paginated fetching for one resource's collection.
//!
//! Drives the client across all pages of a listing endpoint until the API
//! stops reporting a next page, concatenating records in page order. Two
//! independent defensive limits apply: the per-request retry budget
//! (`retry::with_page_retry`) and the page-count safety bound handled here.

use thiserror::Error;

use crate::entity::resource_type::ResourceType;
use crate::retry::{with_page_retry, RetryConfig};
use crate::sync::progress::{emit, ProgressCallback, SyncProgress};
use crate::sync::types::{is_cancelled, CancelFlag};

use super::client::CrmClient;
use super::error::CrmError;
use super::types::RawRecord;

/// Errors that can end a pagination sequence.
#[derive(Debug, Error)]
pub enum PaginationError {
    /// The API kept reporting a next page past the safety bound.
    #[error("pagination for {resource} exceeded {max_pages} pages without a final page")]
    RunawayPagination {
        resource: ResourceType,
        max_pages: u32,
    },

    /// A page fetch failed after exhausting its retry budget (or with a
    /// non-retryable error); the underlying error is propagated unchanged.
    #[error(transparent)]
    Fetch(#[from] CrmError),

    /// The run was cancelled between pages.
    #[error("sync cancelled while fetching {resource}")]
    Cancelled { resource: ResourceType },
}

/// Fetch every page of a resource's collection.
///
/// Returns the concatenation of all pages' records, in API order. Stops as
/// soon as a page carries no next-page indicator; aborts with
/// [`PaginationError::RunawayPagination`] once `max_pages` pages have been
/// fetched and the API still reports more.
pub async fn fetch_all_pages(
    client: &CrmClient,
    resource: ResourceType,
    max_pages: u32,
    retry: &RetryConfig,
    cancel: Option<&CancelFlag>,
    on_progress: Option<&ProgressCallback>,
) -> Result<Vec<RawRecord>, PaginationError> {
    let mut all_records: Vec<RawRecord> = Vec::new();
    let mut page = 1u32;

    emit(on_progress, SyncProgress::FetchingRecords { resource });

    loop {
        if is_cancelled(cancel) {
            return Err(PaginationError::Cancelled { resource });
        }

        let fetched = with_page_retry(
            || client.fetch_page(resource, page),
            retry,
            resource,
            page,
            on_progress,
        )
        .await?;

        let count = fetched.records.len();
        all_records.extend(fetched.records);

        emit(
            on_progress,
            SyncProgress::FetchedPage {
                resource,
                page,
                count,
                total_so_far: all_records.len(),
            },
        );

        match fetched.next_page {
            None => break,
            Some(next) => {
                if page >= max_pages {
                    return Err(PaginationError::RunawayPagination {
                        resource,
                        max_pages,
                    });
                }
                page = next;
            }
        }
    }

    emit(
        on_progress,
        SyncProgress::FetchComplete {
            resource,
            total: all_records.len(),
        },
    );

    Ok(all_records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SyncerConfig;
    use crate::http::{HttpResponse, MockTransport};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use serde_json::json;

    const BASE: &str = "https://acme.example/crm/sales/api";

    fn test_client(transport: MockTransport) -> CrmClient {
        let mut config = SyncerConfig::new(BASE, "key-123");
        config.page_delay = Duration::ZERO;
        CrmClient::new(&config, Arc::new(transport)).expect("valid config")
    }

    fn no_retry() -> RetryConfig {
        RetryConfig::new(Duration::from_millis(1), Duration::from_millis(1), 0)
    }

    fn deal_url(page: u32) -> String {
        format!("{BASE}/deals?page={page}&per_page=100")
    }

    #[tokio::test]
    async fn concatenates_pages_in_order_and_stops_at_final_page() {
        let transport = MockTransport::new();
        for page in 1..=3u32 {
            transport.push_json(
                deal_url(page),
                &json!({
                    "deals": [{"id": page * 10}, {"id": page * 10 + 1}],
                    "meta": {"total_pages": 3}
                }),
            );
        }

        let client = test_client(transport.clone());
        let records = fetch_all_pages(
            &client,
            ResourceType::Deal,
            100,
            &no_retry(),
            None,
            None,
        )
        .await
        .expect("pagination should succeed");

        let ids: Vec<i64> = records
            .iter()
            .map(|r| r.get("id").and_then(|v| v.as_i64()).unwrap())
            .collect();
        assert_eq!(ids, vec![10, 11, 20, 21, 30, 31]);

        // No request for a fourth page.
        assert_eq!(transport.requests().len(), 3);
    }

    #[tokio::test]
    async fn runaway_pagination_aborts_after_exactly_max_pages_fetches() {
        let transport = MockTransport::new();
        // The API always claims more pages exist.
        for page in 1..=5u32 {
            transport.push_json(
                deal_url(page),
                &json!({
                    "deals": [{"id": page}],
                    "meta": {"total_pages": 9999}
                }),
            );
        }

        let client = test_client(transport.clone());
        let err = fetch_all_pages(
            &client,
            ResourceType::Deal,
            5,
            &no_retry(),
            None,
            None,
        )
        .await
        .expect_err("runaway pagination should abort");

        assert!(matches!(
            err,
            PaginationError::RunawayPagination { max_pages: 5, .. }
        ));
        assert_eq!(transport.requests().len(), 5);
    }

    #[tokio::test]
    async fn propagates_fatal_fetch_errors_unchanged() {
        let transport = MockTransport::new();
        transport.push_response(
            deal_url(1),
            HttpResponse {
                status: 404,
                body: b"not found".to_vec(),
            },
        );

        let client = test_client(transport.clone());
        let err = fetch_all_pages(
            &client,
            ResourceType::Deal,
            100,
            &no_retry(),
            None,
            None,
        )
        .await
        .expect_err("404 should be fatal");

        assert!(matches!(
            err,
            PaginationError::Fetch(CrmError::Api { status: 404, .. })
        ));
        // 4xx is not retried.
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn retries_transient_errors_before_succeeding() {
        let transport = MockTransport::new();
        transport.push_response(
            deal_url(1),
            HttpResponse {
                status: 503,
                body: b"maintenance".to_vec(),
            },
        );
        transport.push_json(deal_url(1), &json!({"deals": [{"id": 1}]}));

        let client = test_client(transport.clone());
        let retry = RetryConfig::new(Duration::from_millis(1), Duration::from_millis(5), 2)
            .with_jitter(false);
        let records = fetch_all_pages(
            &client,
            ResourceType::Deal,
            100,
            &retry,
            None,
            None,
        )
        .await
        .expect("retry should recover");

        assert_eq!(records.len(), 1);
        assert_eq!(transport.requests().len(), 2);
    }

    #[tokio::test]
    async fn cancellation_is_checked_between_pages() {
        let transport = MockTransport::new();
        let cancel: CancelFlag = Arc::new(AtomicBool::new(true));

        let client = test_client(transport.clone());
        let err = fetch_all_pages(
            &client,
            ResourceType::Deal,
            100,
            &no_retry(),
            Some(&cancel),
            None,
        )
        .await
        .expect_err("cancelled run should abort");

        assert!(matches!(err, PaginationError::Cancelled { .. }));
        assert!(transport.requests().is_empty());
        // Not strictly needed, but documents the flag stays set.
        assert!(cancel.load(Ordering::Acquire));
    }

    #[tokio::test]
    async fn emits_page_progress_events() {
        use std::sync::Mutex;

        let transport = MockTransport::new();
        transport.push_json(deal_url(1), &json!({"deals": [{"id": 1}]}));

        let events: Arc<Mutex<Vec<SyncProgress>>> = Arc::new(Mutex::new(Vec::new()));
        let events_capture = Arc::clone(&events);
        let callback: ProgressCallback = Box::new(move |event| {
            events_capture
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(event);
        });

        let client = test_client(transport);
        fetch_all_pages(
            &client,
            ResourceType::Deal,
            100,
            &no_retry(),
            None,
            Some(&callback),
        )
        .await
        .expect("pagination should succeed");

        let events = events.lock().unwrap_or_else(|e| e.into_inner());
        assert!(events
            .iter()
            .any(|e| matches!(e, SyncProgress::FetchingRecords { .. })));
        assert!(events
            .iter()
            .any(|e| matches!(e, SyncProgress::FetchedPage { page: 1, count: 1, .. })));
        assert!(events
            .iter()
            .any(|e| matches!(e, SyncProgress::FetchComplete { total: 1, .. })));
    }
}
