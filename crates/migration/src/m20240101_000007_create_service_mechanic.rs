//! Create the `service_mechanic` join table.
//!
//! The composite primary key makes a mechanic a member of a ticket at most once.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ServiceMechanic::Table)
                    .if_not_exists()
                    .col(integer(ServiceMechanic::TicketId).not_null())
                    .col(integer(ServiceMechanic::MechanicId).not_null())
                    .col(timestamp_with_time_zone(ServiceMechanic::CreatedAt).not_null())
                    .primary_key(
                        Index::create()
                            .name("pk_service_mechanic")
                            .col(ServiceMechanic::TicketId)
                            .col(ServiceMechanic::MechanicId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_service_mechanic_ticket")
                            .from(ServiceMechanic::Table, ServiceMechanic::TicketId)
                            .to(ServiceTicket::Table, ServiceTicket::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_service_mechanic_mechanic")
                            .from(ServiceMechanic::Table, ServiceMechanic::MechanicId)
                            .to(Mechanic::Table, Mechanic::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(ServiceMechanic::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum ServiceMechanic { Table, TicketId, MechanicId, CreatedAt }

#[derive(DeriveIden)]
enum ServiceTicket { Table, Id }

#[derive(DeriveIden)]
enum Mechanic { Table, Id }
