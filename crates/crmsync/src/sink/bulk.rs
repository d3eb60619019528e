//! Bulk upsert of normalized record batches.
//!
//! One call writes one resource type's whole batch as a single transaction:
//! either every record lands, or the transaction rolls back and the error
//! reports every identifier as failed. The transaction is also what
//! serializes concurrent writers to the same identifier: the end state of a
//! row always equals exactly one writer's complete record, never a mix of
//! two writers' fields.

use std::collections::HashSet;

use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, QuerySelect, TransactionTrait,
};

use crate::entity::prelude::*;
use crate::transform::records::NormalizedRecord;

use super::convert;
use super::errors::{Result, SinkError};
use super::UpsertResult;

/// Number of retry attempts for transient database errors.
pub const SINK_RETRY_ATTEMPTS: u32 = 3;

/// Initial backoff delay in milliseconds between write retries.
pub const SINK_RETRY_BACKOFF_MS: u64 = 100;

/// Chunk size for the existing-identifier pre-read.
const SELECT_CHUNK: usize = 100;

/// Upsert a homogeneous batch of normalized records.
///
/// Records whose identifier already exists in the destination are updated in
/// place (last-write-wins on all fields); unseen identifiers are inserted.
/// Transient database errors (locked, busy, connection trouble) are retried
/// with exponential backoff before the batch is declared failed.
pub async fn upsert_batch(
    db: &DatabaseConnection,
    resource_type: ResourceType,
    records: &[NormalizedRecord],
) -> Result<UpsertResult> {
    if records.is_empty() {
        return Ok(UpsertResult::default());
    }

    for record in records {
        let found = record.resource_type();
        if found != resource_type {
            return Err(SinkError::MixedBatch {
                expected: resource_type,
                found,
            });
        }
    }

    // A record can reappear on a later page when the remote collection
    // shifts mid-crawl. One multi-row INSERT must not touch the same row
    // twice, so keep the last occurrence per identifier.
    let mut seen = HashSet::with_capacity(records.len());
    let mut deduped: Vec<&NormalizedRecord> = Vec::with_capacity(records.len());
    for record in records.iter().rev() {
        if seen.insert(record.id()) {
            deduped.push(record);
        }
    }
    deduped.reverse();
    let records = deduped;

    let ids: Vec<i64> = records.iter().map(|r| r.id()).collect();

    tracing::debug!(%resource_type, count = records.len(), "Starting batch upsert");
    let mut backoff_ms = SINK_RETRY_BACKOFF_MS;
    let mut attempt = 0u32;

    loop {
        match write_once(db, resource_type, &records, &ids).await {
            Ok(result) => return Ok(result),
            Err(e) if is_retryable_db_error(&e) && attempt < SINK_RETRY_ATTEMPTS => {
                attempt += 1;
                tracing::warn!(
                    %resource_type,
                    attempt,
                    backoff_ms,
                    error = %e,
                    "Batch upsert failed, retrying"
                );
                tokio::time::sleep(std::time::Duration::from_millis(backoff_ms)).await;
                backoff_ms *= 2;
            }
            Err(e) => {
                return Err(SinkError::Batch {
                    resource_type,
                    failed: ids,
                    source: e,
                });
            }
        }
    }
}

/// One transactional write attempt.
async fn write_once(
    db: &DatabaseConnection,
    resource_type: ResourceType,
    records: &[&NormalizedRecord],
    ids: &[i64],
) -> std::result::Result<UpsertResult, DbErr> {
    let txn = db.begin().await?;

    // Pre-read inside the transaction so the insert/update split is
    // consistent with what the write actually did.
    let existing = existing_ids(&txn, resource_type, ids).await?;
    write_models(&txn, resource_type, records).await?;

    txn.commit().await?;

    let updated = ids.iter().filter(|id| existing.contains(*id)).count() as u64;
    let inserted = ids.len() as u64 - updated;
    Ok(UpsertResult {
        inserted,
        updated,
        failed: Vec::new(),
    })
}

/// Collect which of `ids` already exist in the resource's table.
async fn existing_ids(
    txn: &DatabaseTransaction,
    resource_type: ResourceType,
    ids: &[i64],
) -> std::result::Result<HashSet<i64>, DbErr> {
    let mut existing = HashSet::with_capacity(ids.len());

    for chunk in ids.chunks(SELECT_CHUNK) {
        let chunk = chunk.to_vec();
        let found: Vec<i64> = match resource_type {
            ResourceType::Deal => {
                Deal::find()
                    .select_only()
                    .column(DealColumn::Id)
                    .filter(DealColumn::Id.is_in(chunk))
                    .into_tuple()
                    .all(txn)
                    .await?
            }
            ResourceType::Contact => {
                Contact::find()
                    .select_only()
                    .column(ContactColumn::Id)
                    .filter(ContactColumn::Id.is_in(chunk))
                    .into_tuple()
                    .all(txn)
                    .await?
            }
            ResourceType::Account => {
                Account::find()
                    .select_only()
                    .column(AccountColumn::Id)
                    .filter(AccountColumn::Id.is_in(chunk))
                    .into_tuple()
                    .all(txn)
                    .await?
            }
            ResourceType::Product => {
                Product::find()
                    .select_only()
                    .column(ProductColumn::Id)
                    .filter(ProductColumn::Id.is_in(chunk))
                    .into_tuple()
                    .all(txn)
                    .await?
            }
            ResourceType::SalesActivity => {
                SalesActivity::find()
                    .select_only()
                    .column(SalesActivityColumn::Id)
                    .filter(SalesActivityColumn::Id.is_in(chunk))
                    .into_tuple()
                    .all(txn)
                    .await?
            }
        };
        existing.extend(found);
    }

    Ok(existing)
}

/// Write the batch with `INSERT ... ON CONFLICT (id) DO UPDATE` on every
/// non-key column.
async fn write_models<C: ConnectionTrait>(
    conn: &C,
    resource_type: ResourceType,
    records: &[&NormalizedRecord],
) -> std::result::Result<(), DbErr> {
    let synced_at = Utc::now().fixed_offset();

    match resource_type {
        ResourceType::Deal => {
            let models: Vec<DealActiveModel> = records
                .iter()
                .filter_map(|r| match r {
                    NormalizedRecord::Deal(deal) => Some(convert::deal_model(deal, synced_at)),
                    _ => None,
                })
                .collect();
            Deal::insert_many(models)
                .on_conflict(
                    OnConflict::column(DealColumn::Id)
                        .update_columns([
                            DealColumn::Name,
                            DealColumn::Amount,
                            DealColumn::CloseDate,
                            DealColumn::ProductId,
                            DealColumn::AccountId,
                            DealColumn::ContactId,
                            DealColumn::SyncedAt,
                        ])
                        .to_owned(),
                )
                .exec_without_returning(conn)
                .await?;
        }
        ResourceType::Contact => {
            let models: Vec<ContactActiveModel> = records
                .iter()
                .filter_map(|r| match r {
                    NormalizedRecord::Contact(contact) => {
                        Some(convert::contact_model(contact, synced_at))
                    }
                    _ => None,
                })
                .collect();
            Contact::insert_many(models)
                .on_conflict(
                    OnConflict::column(ContactColumn::Id)
                        .update_columns([
                            ContactColumn::FirstName,
                            ContactColumn::LastName,
                            ContactColumn::Email,
                            ContactColumn::SyncedAt,
                        ])
                        .to_owned(),
                )
                .exec_without_returning(conn)
                .await?;
        }
        ResourceType::Account => {
            let models: Vec<AccountActiveModel> = records
                .iter()
                .filter_map(|r| match r {
                    NormalizedRecord::Account(account) => {
                        Some(convert::account_model(account, synced_at))
                    }
                    _ => None,
                })
                .collect();
            Account::insert_many(models)
                .on_conflict(
                    OnConflict::column(AccountColumn::Id)
                        .update_columns([
                            AccountColumn::Name,
                            AccountColumn::Industry,
                            AccountColumn::SyncedAt,
                        ])
                        .to_owned(),
                )
                .exec_without_returning(conn)
                .await?;
        }
        ResourceType::Product => {
            let models: Vec<ProductActiveModel> = records
                .iter()
                .filter_map(|r| match r {
                    NormalizedRecord::Product(product) => {
                        Some(convert::product_model(product, synced_at))
                    }
                    _ => None,
                })
                .collect();
            Product::insert_many(models)
                .on_conflict(
                    OnConflict::column(ProductColumn::Id)
                        .update_columns([
                            ProductColumn::Name,
                            ProductColumn::Price,
                            ProductColumn::SyncedAt,
                        ])
                        .to_owned(),
                )
                .exec_without_returning(conn)
                .await?;
        }
        ResourceType::SalesActivity => {
            let models: Vec<SalesActivityActiveModel> = records
                .iter()
                .filter_map(|r| match r {
                    NormalizedRecord::SalesActivity(activity) => {
                        Some(convert::sales_activity_model(activity, synced_at))
                    }
                    _ => None,
                })
                .collect();
            SalesActivity::insert_many(models)
                .on_conflict(
                    OnConflict::column(SalesActivityColumn::Id)
                        .update_columns([
                            SalesActivityColumn::Title,
                            SalesActivityColumn::ActivityType,
                            SalesActivityColumn::TargetableType,
                            SalesActivityColumn::TargetableId,
                            SalesActivityColumn::StartDate,
                            SalesActivityColumn::EndDate,
                            SalesActivityColumn::Outcome,
                            SalesActivityColumn::SyncedAt,
                        ])
                        .to_owned(),
                )
                .exec_without_returning(conn)
                .await?;
        }
    }

    Ok(())
}

/// Check if a database error is transient.
fn is_retryable_db_error(err: &DbErr) -> bool {
    match err {
        DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => true,
        DbErr::Exec(_) | DbErr::Query(_) => {
            let err_str = err.to_string().to_lowercase();
            // SQLite: database is locked, busy
            // PostgreSQL: connection refused, too many connections
            // General: timeout, connection reset
            err_str.contains("locked")
                || err_str.contains("busy")
                || err_str.contains("timeout")
                || err_str.contains("connection")
                || err_str.contains("temporarily unavailable")
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::records::{ContactRecord, ProductRecord};

    fn contact(id: i64) -> NormalizedRecord {
        NormalizedRecord::Contact(ContactRecord {
            id,
            first_name: Some("Ada".to_string()),
            last_name: None,
            email: None,
        })
    }

    #[tokio::test]
    async fn empty_batch_is_a_no_op() {
        // No queries should be issued: a mock connection with no prepared
        // results would panic on any database access.
        let db = sea_orm::MockDatabase::new(sea_orm::DatabaseBackend::Sqlite).into_connection();
        let result = upsert_batch(&db, ResourceType::Contact, &[])
            .await
            .expect("empty batch should succeed");
        assert_eq!(result.inserted, 0);
        assert_eq!(result.updated, 0);
        assert!(result.failed.is_empty());
    }

    #[tokio::test]
    async fn mixed_batch_is_rejected_before_any_write() {
        let db = sea_orm::MockDatabase::new(sea_orm::DatabaseBackend::Sqlite).into_connection();
        let batch = vec![
            contact(1),
            NormalizedRecord::Product(ProductRecord {
                id: 2,
                name: None,
                price: None,
            }),
        ];

        let err = upsert_batch(&db, ResourceType::Contact, &batch)
            .await
            .expect_err("mixed batch should be rejected");
        assert!(matches!(
            err,
            SinkError::MixedBatch {
                expected: ResourceType::Contact,
                found: ResourceType::Product,
            }
        ));
    }

    #[test]
    fn retryable_classification() {
        assert!(is_retryable_db_error(&DbErr::Conn(
            sea_orm::RuntimeErr::Internal("temporarily unavailable".to_string())
        )));
        assert!(is_retryable_db_error(&DbErr::Exec(
            sea_orm::RuntimeErr::Internal("database is locked".to_string())
        )));
        assert!(!is_retryable_db_error(&DbErr::Custom(
            "constraint violation".to_string()
        )));
    }
}
