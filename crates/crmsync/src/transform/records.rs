//! Normalized record types, one per resource.
//!
//! These are the strongly-shaped counterparts of the API's loose JSON
//! records. Every struct carries the remote identifier verbatim; optional
//! fields stay `None` when the API omitted them, so downstream consumers can
//! distinguish "unset" from real data.

use chrono::{DateTime, FixedOffset, NaiveDate};

use crate::entity::resource_type::ResourceType;

/// A normalized sales deal.
#[derive(Debug, Clone, PartialEq)]
pub struct DealRecord {
    pub id: i64,
    pub name: Option<String>,
    pub amount: Option<f64>,
    pub close_date: Option<NaiveDate>,
    pub product_id: Option<i64>,
    pub account_id: Option<i64>,
    pub contact_id: Option<i64>,
}

/// A normalized contact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactRecord {
    pub id: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

/// A normalized company account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountRecord {
    pub id: i64,
    pub name: Option<String>,
    pub industry: Option<String>,
}

/// A normalized catalog product.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductRecord {
    pub id: i64,
    pub name: Option<String>,
    pub price: Option<f64>,
}

/// A normalized sales activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalesActivityRecord {
    pub id: i64,
    pub title: Option<String>,
    pub activity_type: Option<String>,
    pub targetable_type: Option<String>,
    pub targetable_id: Option<i64>,
    pub start_date: Option<DateTime<FixedOffset>>,
    pub end_date: Option<DateTime<FixedOffset>>,
    pub outcome: Option<String>,
}

/// A normalized record of any resource type.
///
/// The tagged union keeps heterogeneous batches impossible to mix up: the
/// sink dispatches on the variant, never on strings.
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedRecord {
    Deal(DealRecord),
    Contact(ContactRecord),
    Account(AccountRecord),
    Product(ProductRecord),
    SalesActivity(SalesActivityRecord),
}

impl NormalizedRecord {
    /// The resource type this record belongs to.
    #[must_use]
    pub fn resource_type(&self) -> ResourceType {
        match self {
            NormalizedRecord::Deal(_) => ResourceType::Deal,
            NormalizedRecord::Contact(_) => ResourceType::Contact,
            NormalizedRecord::Account(_) => ResourceType::Account,
            NormalizedRecord::Product(_) => ResourceType::Product,
            NormalizedRecord::SalesActivity(_) => ResourceType::SalesActivity,
        }
    }

    /// The stable primary identifier, equal to the raw record's.
    #[must_use]
    pub fn id(&self) -> i64 {
        match self {
            NormalizedRecord::Deal(r) => r.id,
            NormalizedRecord::Contact(r) => r.id,
            NormalizedRecord::Account(r) => r.id,
            NormalizedRecord::Product(r) => r.id,
            NormalizedRecord::SalesActivity(r) => r.id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_type_and_id_follow_the_variant() {
        let record = NormalizedRecord::Product(ProductRecord {
            id: 42,
            name: Some("Widget".to_string()),
            price: None,
        });
        assert_eq!(record.resource_type(), ResourceType::Product);
        assert_eq!(record.id(), 42);

        let record = NormalizedRecord::Contact(ContactRecord {
            id: 7,
            first_name: None,
            last_name: None,
            email: None,
        });
        assert_eq!(record.resource_type(), ResourceType::Contact);
        assert_eq!(record.id(), 7);
    }
}
