//! Product entity - catalog products keyed by their remote identifier.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Remote CRM identifier.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,

    pub name: Option<String>,
    /// Unit price. Absent upstream stays absent here, never coerced to zero.
    pub price: Option<f64>,

    /// When this record was last written by a sync run.
    pub synced_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
