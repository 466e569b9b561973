//! Create `serialized_part` table.
//!
//! A null `ticket_id` means the unit is in stock. Descriptions cannot be
//! dropped while units reference them; deleting a ticket returns its units
//! to stock.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SerializedPart::Table)
                    .if_not_exists()
                    .col(pk_auto(SerializedPart::Id))
                    .col(integer(SerializedPart::DescId).not_null())
                    .col(ColumnDef::new(SerializedPart::TicketId).integer().null())
                    .col(timestamp_with_time_zone(SerializedPart::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(SerializedPart::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_serialized_part_description")
                            .from(SerializedPart::Table, SerializedPart::DescId)
                            .to(PartDescription::Table, PartDescription::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_serialized_part_ticket")
                            .from(SerializedPart::Table, SerializedPart::TicketId)
                            .to(ServiceTicket::Table, ServiceTicket::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(SerializedPart::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum SerializedPart { Table, Id, DescId, TicketId, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum PartDescription { Table, Id }

#[derive(DeriveIden)]
enum ServiceTicket { Table, Id }
