//! Account entity - company records keyed by their remote identifier.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    /// Remote CRM identifier.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,

    pub name: Option<String>,
    /// Industry label, extracted from the nested `industry_type` sub-object.
    pub industry: Option<String>,

    /// When this record was last written by a sync run.
    pub synced_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
