//! Seed the ticket statuses and priorities new tickets default to.
use chrono::Utc;
use sea_orm_migration::prelude::*;

pub const DEFAULT_STATUS: &str = "open";
pub const DEFAULT_PRIORITY: &str = "normal";

const STATUSES: &[(&str, &str)] = &[
    ("open", "Ticket received, work not started"),
    ("in_progress", "A mechanic is working on the vehicle"),
    ("completed", "Work finished, awaiting pickup"),
    ("closed", "Vehicle returned to the customer"),
];

const PRIORITIES: &[(&str, &str)] = &[
    ("low", "Schedule when convenient"),
    ("normal", "Standard turnaround"),
    ("high", "Move ahead of normal work"),
    ("urgent", "Vehicle is unsafe or blocking the bay"),
];

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let now = Utc::now();
        for (table, rows) in [(Lookup::TicketStatus, STATUSES), (Lookup::Priority, PRIORITIES)] {
            let mut insert = Query::insert();
            insert
                .into_table(table)
                .columns([Lookup::Name, Lookup::Description, Lookup::CreatedAt, Lookup::UpdatedAt]);
            for (name, description) in rows {
                insert.values_panic([(*name).into(), (*description).into(), now.into(), now.into()]);
            }
            manager.exec_stmt(insert.to_owned()).await?;
        }
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (table, rows) in [(Lookup::TicketStatus, STATUSES), (Lookup::Priority, PRIORITIES)] {
            let names: Vec<&str> = rows.iter().map(|(name, _)| *name).collect();
            let delete = Query::delete()
                .from_table(table)
                .and_where(Expr::col(Lookup::Name).is_in(names))
                .to_owned();
            manager.exec_stmt(delete).await?;
        }
        Ok(())
    }
}

#[derive(DeriveIden, Clone, Copy)]
enum Lookup {
    TicketStatus,
    Priority,
    Name,
    Description,
    CreatedAt,
    UpdatedAt,
}
