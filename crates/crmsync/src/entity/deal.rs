//! Deal entity - normalized sales deals keyed by their remote identifier.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Deal model. The primary key is the identifier assigned by the CRM, so
/// repeated syncs update in place instead of inserting duplicates.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "deals")]
pub struct Model {
    /// Remote CRM identifier.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,

    /// Deal name.
    pub name: Option<String>,
    /// Deal value in the account currency. Absent upstream stays absent here;
    /// an unset amount is not the same as a zero amount.
    pub amount: Option<f64>,
    /// Expected (or actual) close date.
    pub close_date: Option<Date>,

    // ─── Foreign keys into sibling tables ────────────────────────────────────
    /// First related product, if any.
    pub product_id: Option<i64>,
    /// Related company account, if any.
    pub account_id: Option<i64>,
    /// First related contact, if any.
    pub contact_id: Option<i64>,

    /// When this record was last written by a sync run.
    pub synced_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
