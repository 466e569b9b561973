//! Create `part_description` table with optional FK to `category`.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PartDescription::Table)
                    .if_not_exists()
                    .col(pk_auto(PartDescription::Id))
                    .col(string_len(PartDescription::Name, 255).not_null())
                    .col(string_len(PartDescription::Brand, 255).not_null())
                    .col(double(PartDescription::Price).not_null())
                    .col(ColumnDef::new(PartDescription::CategoryId).integer().null())
                    .col(timestamp_with_time_zone(PartDescription::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(PartDescription::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_part_description_category")
                            .from(PartDescription::Table, PartDescription::CategoryId)
                            .to(Category::Table, Category::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(PartDescription::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum PartDescription { Table, Id, Name, Brand, Price, CategoryId, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum Category { Table, Id }
