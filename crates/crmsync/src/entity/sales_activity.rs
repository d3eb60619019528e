//! Sales activity entity - logged calls, meetings and other touchpoints.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sales_activities")]
pub struct Model {
    /// Remote CRM identifier.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,

    pub title: Option<String>,
    /// Activity kind as reported by the CRM (`type` upstream).
    pub activity_type: Option<String>,

    // ─── Target of the activity ──────────────────────────────────────────────
    /// Kind of record the activity is attached to (e.g. "Contact", "Deal").
    pub targetable_type: Option<String>,
    /// Identifier of the attached record, interpreted per `targetable_type`.
    pub targetable_id: Option<i64>,

    pub start_date: Option<DateTimeWithTimeZone>,
    pub end_date: Option<DateTimeWithTimeZone>,

    /// Outcome label, extracted from the nested `outcome` sub-object.
    pub outcome: Option<String>,

    /// When this record was last written by a sync run.
    pub synced_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
