//! Create `service_ticket` table.
//!
//! Tickets cascade with their customer; status and priority rows cannot be
//! removed while a ticket points at them.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ServiceTicket::Table)
                    .if_not_exists()
                    .col(pk_auto(ServiceTicket::Id))
                    .col(integer(ServiceTicket::CustomerId).not_null())
                    .col(string_len(ServiceTicket::Vin, 255).not_null())
                    .col(integer(ServiceTicket::StatusId).not_null())
                    .col(integer(ServiceTicket::PriorityId).not_null())
                    .col(date(ServiceTicket::ServiceDate).not_null())
                    .col(ColumnDef::new(ServiceTicket::CompletionDate).date().null())
                    .col(string_len(ServiceTicket::ServiceDesc, 255).not_null())
                    .col(ColumnDef::new(ServiceTicket::EstimatedCost).double().null())
                    .col(ColumnDef::new(ServiceTicket::ActualCost).double().null())
                    .col(timestamp_with_time_zone(ServiceTicket::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(ServiceTicket::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_service_ticket_customer")
                            .from(ServiceTicket::Table, ServiceTicket::CustomerId)
                            .to(Customer::Table, Customer::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_service_ticket_status")
                            .from(ServiceTicket::Table, ServiceTicket::StatusId)
                            .to(TicketStatus::Table, TicketStatus::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_service_ticket_priority")
                            .from(ServiceTicket::Table, ServiceTicket::PriorityId)
                            .to(Priority::Table, Priority::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(ServiceTicket::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum ServiceTicket {
    Table,
    Id,
    CustomerId,
    Vin,
    StatusId,
    PriorityId,
    ServiceDate,
    CompletionDate,
    ServiceDesc,
    EstimatedCost,
    ActualCost,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Customer { Table, Id }

#[derive(DeriveIden)]
enum TicketStatus { Table, Id }

#[derive(DeriveIden)]
enum Priority { Table, Id }
