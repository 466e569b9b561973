use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::{service_mechanic, service_ticket};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "mechanic")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub phone: String,
    pub salary: f64,
    pub address: Option<String>,
    pub image: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    ServiceMechanic,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::ServiceMechanic => Entity::has_many(service_mechanic::Entity).into(),
        }
    }
}

impl Related<service_mechanic::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ServiceMechanic.def()
    }
}

impl Related<service_ticket::Entity> for Entity {
    fn to() -> RelationDef {
        service_mechanic::Relation::ServiceTicket.def()
    }

    fn via() -> Option<RelationDef> {
        Some(service_mechanic::Relation::Mechanic.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub async fn find_by_email<C: ConnectionTrait>(db: &C, email: &str) -> Result<Option<Model>, ModelError> {
    let found = Entity::find().filter(Column::Email.eq(email.trim().to_lowercase())).one(db).await?;
    Ok(found)
}
