//! crmsync - an incremental CRM-to-database synchronization engine.
//!
//! This library pulls paginated collections from a rate-limited CRM HTTP
//! API, normalizes the loosely-typed records into per-resource typed shapes,
//! and upserts them into a local SQLite or PostgreSQL store keyed by the
//! remote identifier, so repeated runs converge instead of duplicating.
//!
//! # Features
//!
//! - `migrate` - Enables database migration support. When enabled, you can
//!   use [`connect_and_migrate`] to bring the destination schema up to date
//!   on connection.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use crmsync::http::ReqwestTransport;
//! use crmsync::{connect_and_migrate, run_sync, CrmClient, SyncerConfig};
//!
//! let config = SyncerConfig::new(
//!     "https://acme.myfreshworks.com/crm/sales/api",
//!     std::env::var("CRM_API_KEY")?,
//! );
//! let client = CrmClient::new(&config, Arc::new(ReqwestTransport::default()))?;
//! let db = connect_and_migrate("sqlite://crm.db?mode=rwc").await?;
//!
//! let run = run_sync(&db, &client, &config, None, None).await;
//! println!("sync finished: {}", run.status);
//! ```

pub mod config;
pub mod crm;
pub mod db;
pub mod entity;
pub mod http;
pub mod retry;
pub mod sink;
pub mod sync;
pub mod transform;

#[cfg(feature = "migrate")]
pub mod migration;

pub use config::{ConfigError, SyncerConfig};
pub use crm::{ApiRateLimiter, CrmClient, CrmError, PaginationError};
pub use db::connect;
#[cfg(feature = "migrate")]
pub use db::connect_and_migrate;
pub use entity::prelude::*;
pub use sink::{SinkError, UpsertResult};
pub use sync::{run_sync, CancelFlag, ResourceOutcome, RunStatus, SyncRun};
pub use transform::{transform, NormalizedRecord, TransformError};
