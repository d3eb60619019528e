//! Read-side helpers over the destination store.
//!
//! The downstream reporting layer queries the store directly; these helpers
//! only cover what the sync tooling itself needs (row counts for run
//! summaries and the `status` command).

use sea_orm::{DatabaseConnection, DbErr, EntityTrait, PaginatorTrait};

use crate::entity::prelude::*;

/// Count stored records for one resource type.
pub async fn count(db: &DatabaseConnection, resource: ResourceType) -> Result<u64, DbErr> {
    match resource {
        ResourceType::Deal => Deal::find().count(db).await,
        ResourceType::Contact => Contact::find().count(db).await,
        ResourceType::Account => Account::find().count(db).await,
        ResourceType::Product => Product::find().count(db).await,
        ResourceType::SalesActivity => SalesActivity::find().count(db).await,
    }
}

/// Count stored records for every resource type, in canonical order.
pub async fn counts(db: &DatabaseConnection) -> Result<Vec<(ResourceType, u64)>, DbErr> {
    let mut out = Vec::with_capacity(ResourceType::ALL.len());
    for resource in ResourceType::ALL {
        out.push((resource, count(db, resource).await?));
    }
    Ok(out)
}
