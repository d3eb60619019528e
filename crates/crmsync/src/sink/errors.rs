//! Upsert sink error types.

use sea_orm::DbErr;
use thiserror::Error;

use crate::entity::resource_type::ResourceType;

/// Errors that can occur when writing a batch to the destination store.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The batch did not land. The transaction rolled back, so `failed`
    /// lists every identifier in the batch: none of them reached the store.
    #[error("failed to upsert {count} {resource_type} record(s): {source}", count = .failed.len())]
    Batch {
        resource_type: ResourceType,
        failed: Vec<i64>,
        #[source]
        source: DbErr,
    },

    /// The caller mixed resource types in one batch.
    #[error("upsert batch mixed resource types: expected {expected}, found {found}")]
    MixedBatch {
        expected: ResourceType,
        found: ResourceType,
    },
}

/// Result type for sink operations.
pub type Result<T> = std::result::Result<T, SinkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_error_names_resource_and_count() {
        let err = SinkError::Batch {
            resource_type: ResourceType::Deal,
            failed: vec![1, 2, 3],
            source: DbErr::Custom("database is locked".to_string()),
        };
        let message = err.to_string();
        assert!(message.contains("3 deal record(s)"));
    }

    #[test]
    fn mixed_batch_error_names_both_types() {
        let err = SinkError::MixedBatch {
            expected: ResourceType::Contact,
            found: ResourceType::Product,
        };
        let message = err.to_string();
        assert!(message.contains("contact"));
        assert!(message.contains("product"));
    }
}
