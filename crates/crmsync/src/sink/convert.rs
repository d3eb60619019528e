//! Conversion from normalized records to SeaORM active models.
//!
//! Every column is `Set`, including the `None`s: an upsert must overwrite
//! stale values with "unset" when the upstream record dropped a field
//! (last-write-wins on all fields).

use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::Set;

use crate::entity::prelude::*;
use crate::transform::records::{
    AccountRecord, ContactRecord, DealRecord, ProductRecord, SalesActivityRecord,
};

pub(crate) fn deal_model(record: &DealRecord, synced_at: DateTimeWithTimeZone) -> DealActiveModel {
    DealActiveModel {
        id: Set(record.id),
        name: Set(record.name.clone()),
        amount: Set(record.amount),
        close_date: Set(record.close_date),
        product_id: Set(record.product_id),
        account_id: Set(record.account_id),
        contact_id: Set(record.contact_id),
        synced_at: Set(synced_at),
    }
}

pub(crate) fn contact_model(
    record: &ContactRecord,
    synced_at: DateTimeWithTimeZone,
) -> ContactActiveModel {
    ContactActiveModel {
        id: Set(record.id),
        first_name: Set(record.first_name.clone()),
        last_name: Set(record.last_name.clone()),
        email: Set(record.email.clone()),
        synced_at: Set(synced_at),
    }
}

pub(crate) fn account_model(
    record: &AccountRecord,
    synced_at: DateTimeWithTimeZone,
) -> AccountActiveModel {
    AccountActiveModel {
        id: Set(record.id),
        name: Set(record.name.clone()),
        industry: Set(record.industry.clone()),
        synced_at: Set(synced_at),
    }
}

pub(crate) fn product_model(
    record: &ProductRecord,
    synced_at: DateTimeWithTimeZone,
) -> ProductActiveModel {
    ProductActiveModel {
        id: Set(record.id),
        name: Set(record.name.clone()),
        price: Set(record.price),
        synced_at: Set(synced_at),
    }
}

pub(crate) fn sales_activity_model(
    record: &SalesActivityRecord,
    synced_at: DateTimeWithTimeZone,
) -> SalesActivityActiveModel {
    SalesActivityActiveModel {
        id: Set(record.id),
        title: Set(record.title.clone()),
        activity_type: Set(record.activity_type.clone()),
        targetable_type: Set(record.targetable_type.clone()),
        targetable_id: Set(record.targetable_id),
        start_date: Set(record.start_date),
        end_date: Set(record.end_date),
        outcome: Set(record.outcome.clone()),
        synced_at: Set(synced_at),
    }
}
