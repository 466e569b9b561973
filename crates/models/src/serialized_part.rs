//! One physical unit of a part description.
//!
//! `ticket_id == None` means the unit is in stock; `Some(t)` means it is
//! allocated to ticket `t` and nowhere else.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{part_description, service_ticket};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "serialized_part")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub desc_id: i32,
    pub ticket_id: Option<i32>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

impl Model {
    pub fn is_available(&self) -> bool {
        self.ticket_id.is_none()
    }
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    PartDescription,
    ServiceTicket,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::PartDescription => Entity::belongs_to(part_description::Entity)
                .from(Column::DescId)
                .to(part_description::Column::Id)
                .into(),
            Relation::ServiceTicket => Entity::belongs_to(service_ticket::Entity)
                .from(Column::TicketId)
                .to(service_ticket::Column::Id)
                .into(),
        }
    }
}

impl Related<part_description::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PartDescription.def()
    }
}

impl Related<service_ticket::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ServiceTicket.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
