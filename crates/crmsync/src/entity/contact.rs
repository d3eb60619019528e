//! Contact entity - people records keyed by their remote identifier.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "contacts")]
pub struct Model {
    /// Remote CRM identifier.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,

    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,

    /// When this record was last written by a sync run.
    pub synced_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Best-effort display name assembled from the name parts.
    pub fn display_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{} {}", first, last),
            (Some(first), None) => first.clone(),
            (None, Some(last)) => last.clone(),
            (None, None) => format!("contact #{}", self.id),
        }
    }
}
