//! Create `customer` table. Email is unique across customers.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Customer::Table)
                    .if_not_exists()
                    .col(pk_auto(Customer::Id))
                    .col(string_len(Customer::Name, 100).not_null())
                    .col(string_len(Customer::Email, 255).unique_key().not_null())
                    .col(string_len(Customer::Phone, 32).not_null())
                    .col(string_len(Customer::PasswordHash, 255).not_null())
                    .col(ColumnDef::new(Customer::Address).string_len(255).null())
                    .col(ColumnDef::new(Customer::Image).string_len(512).null())
                    .col(timestamp_with_time_zone(Customer::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Customer::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Customer::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Customer { Table, Id, Name, Email, Phone, PasswordHash, Address, Image, CreatedAt, UpdatedAt }
