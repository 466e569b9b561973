//! Create `mechanic` table.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Mechanic::Table)
                    .if_not_exists()
                    .col(pk_auto(Mechanic::Id))
                    .col(string_len(Mechanic::Name, 100).not_null())
                    .col(string_len(Mechanic::Email, 255).unique_key().not_null())
                    .col(string_len(Mechanic::PasswordHash, 255).not_null())
                    .col(string_len(Mechanic::Phone, 32).not_null())
                    .col(double(Mechanic::Salary).not_null())
                    .col(ColumnDef::new(Mechanic::Address).string_len(255).null())
                    .col(ColumnDef::new(Mechanic::Image).string_len(512).null())
                    .col(timestamp_with_time_zone(Mechanic::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Mechanic::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Mechanic::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Mechanic { Table, Id, Name, Email, PasswordHash, Phone, Salary, Address, Image, CreatedAt, UpdatedAt }
