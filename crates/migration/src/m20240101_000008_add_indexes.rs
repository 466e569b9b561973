use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ServiceTicket: lookups by owner
        manager
            .create_index(
                Index::create()
                    .name("idx_service_ticket_customer")
                    .table(ServiceTicket::Table)
                    .col(ServiceTicket::CustomerId)
                    .to_owned(),
            )
            .await?;

        // SerializedPart: stock counts scan (desc_id, ticket_id)
        manager
            .create_index(
                Index::create()
                    .name("idx_serialized_part_desc_ticket")
                    .table(SerializedPart::Table)
                    .col(SerializedPart::DescId)
                    .col(SerializedPart::TicketId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_serialized_part_ticket")
                    .table(SerializedPart::Table)
                    .col(SerializedPart::TicketId)
                    .to_owned(),
            )
            .await?;

        // ServiceMechanic: reverse lookup for a mechanic's tickets
        manager
            .create_index(
                Index::create()
                    .name("idx_service_mechanic_mechanic")
                    .table(ServiceMechanic::Table)
                    .col(ServiceMechanic::MechanicId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_service_ticket_customer").table(ServiceTicket::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_serialized_part_desc_ticket").table(SerializedPart::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_serialized_part_ticket").table(SerializedPart::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_service_mechanic_mechanic").table(ServiceMechanic::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ServiceTicket { Table, CustomerId }

#[derive(DeriveIden)]
enum SerializedPart { Table, DescId, TicketId }

#[derive(DeriveIden)]
enum ServiceMechanic { Table, MechanicId }
