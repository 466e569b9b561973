//! Lookup tables: priorities, ticket statuses and part categories.
//!
//! Rows can be listed and added; nothing here deletes them.
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use models::validate::Validator;
use models::{category, priority, ticket_status};

use crate::errors::ServiceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    Priority,
    TicketStatus,
    Category,
}

impl ReferenceKind {
    pub fn label(&self) -> &'static str {
        match self {
            ReferenceKind::Priority => "priority",
            ReferenceKind::TicketStatus => "ticket status",
            ReferenceKind::Category => "category",
        }
    }

    fn duplicate_message(&self) -> String {
        format!("A {} with this name already exists!", self.label())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReferenceItem {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

impl From<priority::Model> for ReferenceItem {
    fn from(m: priority::Model) -> Self {
        Self { id: m.id, name: m.name, description: m.description, created_at: m.created_at, updated_at: m.updated_at }
    }
}

impl From<ticket_status::Model> for ReferenceItem {
    fn from(m: ticket_status::Model) -> Self {
        Self { id: m.id, name: m.name, description: m.description, created_at: m.created_at, updated_at: m.updated_at }
    }
}

impl From<category::Model> for ReferenceItem {
    fn from(m: category::Model) -> Self {
        Self { id: m.id, name: m.name, description: m.description, created_at: m.created_at, updated_at: m.updated_at }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateReference {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

pub async fn list<C: ConnectionTrait>(db: &C, kind: ReferenceKind) -> Result<Vec<ReferenceItem>, ServiceError> {
    let items = match kind {
        ReferenceKind::Priority => priority::Entity::find()
            .order_by_asc(priority::Column::Id)
            .all(db)
            .await?
            .into_iter()
            .map(ReferenceItem::from)
            .collect(),
        ReferenceKind::TicketStatus => ticket_status::Entity::find()
            .order_by_asc(ticket_status::Column::Id)
            .all(db)
            .await?
            .into_iter()
            .map(ReferenceItem::from)
            .collect(),
        ReferenceKind::Category => category::Entity::find()
            .order_by_asc(category::Column::Id)
            .all(db)
            .await?
            .into_iter()
            .map(ReferenceItem::from)
            .collect(),
    };
    Ok(items)
}

#[instrument(skip(db, input), fields(kind = kind.label(), name = %input.name))]
pub async fn create<C: ConnectionTrait>(db: &C, kind: ReferenceKind, input: CreateReference) -> Result<ReferenceItem, ServiceError> {
    let mut v = Validator::new();
    v.text("name", &input.name, 64);
    v.finish()?;

    let name = input.name.trim().to_string();
    let now = crate::now();
    let dup = kind.duplicate_message();
    let item: ReferenceItem = match kind {
        ReferenceKind::Priority => priority::ActiveModel {
            name: Set(name),
            description: Set(input.description),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(|e| ServiceError::from_unique(e, &dup))?
        .into(),
        ReferenceKind::TicketStatus => ticket_status::ActiveModel {
            name: Set(name),
            description: Set(input.description),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(|e| ServiceError::from_unique(e, &dup))?
        .into(),
        ReferenceKind::Category => category::ActiveModel {
            name: Set(name),
            description: Set(input.description),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(|e| ServiceError::from_unique(e, &dup))?
        .into(),
    };
    info!(id = item.id, "reference_created");
    Ok(item)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;

    #[tokio::test]
    async fn seeded_lists_and_duplicate_names() -> anyhow::Result<()> {
        let db = get_db().await?;
        let statuses = list(&db, ReferenceKind::TicketStatus).await?;
        assert_eq!(statuses.first().map(|s| s.name.as_str()), Some("open"));
        assert!(list(&db, ReferenceKind::Category).await?.is_empty());

        let brakes = create(&db, ReferenceKind::Category, CreateReference { name: "Brakes".into(), description: None }).await?;
        assert_eq!(brakes.name, "Brakes");
        let dup = create(&db, ReferenceKind::Category, CreateReference { name: "Brakes".into(), description: None }).await;
        assert!(matches!(dup, Err(ServiceError::Conflict(m)) if m == "A category with this name already exists!"));

        let dup_status = create(&db, ReferenceKind::TicketStatus, CreateReference { name: "open".into(), description: None }).await;
        assert!(matches!(dup_status, Err(ServiceError::Conflict(_))));
        Ok(())
    }
}
