//! Create the `priority`, `ticket_status` and `category` lookup tables.
//!
//! Rows here are referenced by foreign key and never deleted by the app.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(lookup_table(Priority::Table, Priority::Id, Priority::Name, Priority::Description, Priority::CreatedAt, Priority::UpdatedAt)).await?;
        manager
            .create_table(lookup_table(
                TicketStatus::Table,
                TicketStatus::Id,
                TicketStatus::Name,
                TicketStatus::Description,
                TicketStatus::CreatedAt,
                TicketStatus::UpdatedAt,
            ))
            .await?;
        manager.create_table(lookup_table(Category::Table, Category::Id, Category::Name, Category::Description, Category::CreatedAt, Category::UpdatedAt)).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Category::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(TicketStatus::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Priority::Table).to_owned()).await
    }
}

fn lookup_table<T: IntoIden + 'static>(
    table: T,
    id: T,
    name: T,
    description: T,
    created_at: T,
    updated_at: T,
) -> TableCreateStatement {
    Table::create()
        .table(table)
        .if_not_exists()
        .col(pk_auto(id))
        .col(string_len(name, 64).unique_key().not_null())
        .col(ColumnDef::new(description).text().null())
        .col(timestamp_with_time_zone(created_at).not_null())
        .col(timestamp_with_time_zone(updated_at).not_null())
        .to_owned()
}

#[derive(DeriveIden)]
enum Priority { Table, Id, Name, Description, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum TicketStatus { Table, Id, Name, Description, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum Category { Table, Id, Name, Description, CreatedAt, UpdatedAt }
