use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{customer, mechanic, priority, serialized_part, service_mechanic, ticket_status};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "service_ticket")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub customer_id: i32,
    pub vin: String,
    pub status_id: i32,
    pub priority_id: i32,
    pub service_date: Date,
    pub completion_date: Option<Date>,
    pub service_desc: String,
    pub estimated_cost: Option<f64>,
    pub actual_cost: Option<f64>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Customer,
    TicketStatus,
    Priority,
    SerializedPart,
    ServiceMechanic,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Customer => Entity::belongs_to(customer::Entity)
                .from(Column::CustomerId)
                .to(customer::Column::Id)
                .into(),
            Relation::TicketStatus => Entity::belongs_to(ticket_status::Entity)
                .from(Column::StatusId)
                .to(ticket_status::Column::Id)
                .into(),
            Relation::Priority => Entity::belongs_to(priority::Entity)
                .from(Column::PriorityId)
                .to(priority::Column::Id)
                .into(),
            Relation::SerializedPart => Entity::has_many(serialized_part::Entity).into(),
            Relation::ServiceMechanic => Entity::has_many(service_mechanic::Entity).into(),
        }
    }
}

impl Related<customer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl Related<ticket_status::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TicketStatus.def()
    }
}

impl Related<priority::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Priority.def()
    }
}

impl Related<serialized_part::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SerializedPart.def()
    }
}

impl Related<service_mechanic::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ServiceMechanic.def()
    }
}

impl Related<mechanic::Entity> for Entity {
    fn to() -> RelationDef {
        service_mechanic::Relation::Mechanic.def()
    }

    fn via() -> Option<RelationDef> {
        Some(service_mechanic::Relation::ServiceTicket.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
