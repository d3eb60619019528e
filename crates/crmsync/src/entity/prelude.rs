//! Common re-exports for convenient entity usage.

pub use super::account::{
    ActiveModel as AccountActiveModel, Column as AccountColumn, Entity as Account,
    Model as AccountModel,
};
pub use super::contact::{
    ActiveModel as ContactActiveModel, Column as ContactColumn, Entity as Contact,
    Model as ContactModel,
};
pub use super::deal::{
    ActiveModel as DealActiveModel, Column as DealColumn, Entity as Deal, Model as DealModel,
};
pub use super::product::{
    ActiveModel as ProductActiveModel, Column as ProductColumn, Entity as Product,
    Model as ProductModel,
};
pub use super::resource_type::ResourceType;
pub use super::sales_activity::{
    ActiveModel as SalesActivityActiveModel, Column as SalesActivityColumn,
    Entity as SalesActivity, Model as SalesActivityModel,
};
