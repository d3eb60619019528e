//! SeaORM entity definitions for the crmsync destination schema.

pub mod account;
pub mod contact;
pub mod deal;
pub mod prelude;
pub mod product;
pub mod resource_type;
pub mod sales_activity;
