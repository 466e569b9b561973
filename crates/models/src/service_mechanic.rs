//! Ticket <-> mechanic membership. The composite key allows one row per pair.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{mechanic, service_ticket};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "service_mechanic")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub ticket_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub mechanic_id: i32,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    ServiceTicket,
    Mechanic,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::ServiceTicket => Entity::belongs_to(service_ticket::Entity)
                .from(Column::TicketId)
                .to(service_ticket::Column::Id)
                .into(),
            Relation::Mechanic => Entity::belongs_to(mechanic::Entity)
                .from(Column::MechanicId)
                .to(mechanic::Column::Id)
                .into(),
        }
    }
}

impl Related<service_ticket::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ServiceTicket.def()
    }
}

impl Related<mechanic::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Mechanic.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
