//! CRM API integration: client, pagination, rate limiting and error types.
//!
//! The fetch path is deliberately layered:
//!
//! - [`client::CrmClient`] issues a single rate-limited, timeout-bounded
//!   page request,
//! - [`pagination::fetch_all_pages`] drives the client across a whole
//!   collection, retrying transient failures and guarding against runaway
//!   page counts.

pub mod client;
pub mod error;
pub mod pagination;
pub mod rate_limit;
pub mod types;

pub use client::CrmClient;
pub use error::{short_error_message, CrmError};
pub use pagination::{fetch_all_pages, PaginationError};
pub use rate_limit::ApiRateLimiter;
pub use types::{Page, RawRecord, PER_PAGE};
