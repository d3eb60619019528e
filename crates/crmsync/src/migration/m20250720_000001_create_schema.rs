//! Initial migration to create the crmsync destination schema.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        self.create_contacts(manager).await?;
        self.create_accounts(manager).await?;
        self.create_products(manager).await?;
        self.create_deals(manager).await?;
        self.create_sales_activities(manager).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SalesActivities::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Deals::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Products::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Contacts::Table).to_owned())
            .await?;
        Ok(())
    }
}

impl Migration {
    async fn create_contacts(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Contacts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Contacts::Id)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Contacts::FirstName).string().null())
                    .col(ColumnDef::new(Contacts::LastName).string().null())
                    .col(ColumnDef::new(Contacts::Email).string().null())
                    .col(
                        ColumnDef::new(Contacts::SyncedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn create_accounts(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Accounts::Id)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Accounts::Name).string().null())
                    .col(ColumnDef::new(Accounts::Industry).string().null())
                    .col(
                        ColumnDef::new(Accounts::SyncedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn create_products(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Products::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Products::Id)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Products::Name).string().null())
                    .col(ColumnDef::new(Products::Price).double().null())
                    .col(
                        ColumnDef::new(Products::SyncedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn create_deals(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Deals::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Deals::Id)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Deals::Name).string().null())
                    .col(ColumnDef::new(Deals::Amount).double().null())
                    .col(ColumnDef::new(Deals::CloseDate).date().null())
                    // Foreign keys are plain columns: referenced records may
                    // arrive in a later resource's batch or a later run.
                    .col(ColumnDef::new(Deals::ProductId).big_integer().null())
                    .col(ColumnDef::new(Deals::AccountId).big_integer().null())
                    .col(ColumnDef::new(Deals::ContactId).big_integer().null())
                    .col(
                        ColumnDef::new(Deals::SyncedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_deals_account_id")
                    .table(Deals::Table)
                    .col(Deals::AccountId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_deals_close_date")
                    .table(Deals::Table)
                    .col(Deals::CloseDate)
                    .to_owned(),
            )
            .await
    }

    async fn create_sales_activities(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SalesActivities::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SalesActivities::Id)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SalesActivities::Title).string().null())
                    .col(ColumnDef::new(SalesActivities::ActivityType).string().null())
                    .col(
                        ColumnDef::new(SalesActivities::TargetableType)
                            .string()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(SalesActivities::TargetableId)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(SalesActivities::StartDate)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(SalesActivities::EndDate)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(SalesActivities::Outcome).string().null())
                    .col(
                        ColumnDef::new(SalesActivities::SyncedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum Contacts {
    Table,
    Id,
    FirstName,
    LastName,
    Email,
    SyncedAt,
}

#[derive(DeriveIden)]
enum Accounts {
    Table,
    Id,
    Name,
    Industry,
    SyncedAt,
}

#[derive(DeriveIden)]
enum Products {
    Table,
    Id,
    Name,
    Price,
    SyncedAt,
}

#[derive(DeriveIden)]
enum Deals {
    Table,
    Id,
    Name,
    Amount,
    CloseDate,
    ProductId,
    AccountId,
    ContactId,
    SyncedAt,
}

#[derive(DeriveIden)]
enum SalesActivities {
    Table,
    Id,
    Title,
    ActivityType,
    TargetableType,
    TargetableId,
    StartDate,
    EndDate,
    Outcome,
    SyncedAt,
}
