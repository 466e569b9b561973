use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{category, serialized_part};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "part_description")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub brand: String,
    pub price: f64,
    pub category_id: Option<i32>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Category,
    SerializedPart,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Category => Entity::belongs_to(category::Entity)
                .from(Column::CategoryId)
                .to(category::Column::Id)
                .into(),
            Relation::SerializedPart => Entity::has_many(serialized_part::Entity).into(),
        }
    }
}

impl Related<category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<serialized_part::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SerializedPart.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
