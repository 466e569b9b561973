use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Deserialize;
use tracing::{info, instrument};

use models::{part_description, serialized_part};

use crate::errors::ServiceError;
use crate::pagination::{fetch_page, Page, Pagination};

pub const MSG_NOT_FOUND: &str = "Serialized part not found";
pub const MSG_BAD_DESC: &str = "Invalid part description id";
pub const MSG_ALLOCATED_DELETE: &str = "Cannot delete: part is assigned to a ticket.";
pub const MSG_ALLOCATED_CHANGE: &str = "Cannot change the description of a part assigned to a ticket.";

/// New units always start in stock.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateSerializedPart {
    pub desc_id: i32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateSerializedPart {
    pub desc_id: i32,
}

async fn ensure_desc<C: ConnectionTrait>(db: &C, desc_id: i32) -> Result<(), ServiceError> {
    part_description::Entity::find_by_id(desc_id)
        .one(db)
        .await?
        .map(|_| ())
        .ok_or_else(|| ServiceError::validation(MSG_BAD_DESC))
}

#[instrument(skip(db))]
pub async fn create_serialized_part(db: &DatabaseConnection, input: CreateSerializedPart) -> Result<serialized_part::Model, ServiceError> {
    ensure_desc(db, input.desc_id).await?;
    let now = crate::now();
    let created = serialized_part::ActiveModel {
        desc_id: Set(input.desc_id),
        ticket_id: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;
    info!(part_id = created.id, desc_id = created.desc_id, "unit_created");
    Ok(created)
}

pub async fn get_serialized_part<C: ConnectionTrait>(db: &C, id: i32) -> Result<serialized_part::Model, ServiceError> {
    serialized_part::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found(MSG_NOT_FOUND))
}

pub async fn list_serialized_parts<C: ConnectionTrait>(db: &C, opts: Pagination) -> Result<Page<serialized_part::Model>, ServiceError> {
    fetch_page(db, serialized_part::Entity::find().order_by_asc(serialized_part::Column::Id), opts).await
}

/// Point unit `id` at `desc_id` only while it is still in stock. One statement,
/// so an allocation that lands first makes this a no-op. Returns rows written.
async fn redescribe_in_stock<C: ConnectionTrait>(db: &C, id: i32, desc_id: i32) -> Result<u64, ServiceError> {
    let res = serialized_part::Entity::update_many()
        .col_expr(serialized_part::Column::DescId, Expr::value(desc_id))
        .col_expr(serialized_part::Column::UpdatedAt, Expr::value(crate::now()))
        .filter(serialized_part::Column::Id.eq(id))
        .filter(serialized_part::Column::TicketId.is_null())
        .exec(db)
        .await?;
    Ok(res.rows_affected)
}

async fn delete_in_stock<C: ConnectionTrait>(db: &C, id: i32) -> Result<u64, ServiceError> {
    let res = serialized_part::Entity::delete_many()
        .filter(serialized_part::Column::Id.eq(id))
        .filter(serialized_part::Column::TicketId.is_null())
        .exec(db)
        .await?;
    Ok(res.rows_affected)
}

/// Re-describe an in-stock unit. Allocation is only changed through tickets.
#[instrument(skip(db))]
pub async fn update_serialized_part(db: &DatabaseConnection, id: i32, input: UpdateSerializedPart) -> Result<serialized_part::Model, ServiceError> {
    ensure_desc(db, input.desc_id).await?;
    if redescribe_in_stock(db, id, input.desc_id).await? == 0 {
        // missing unit reports NotFound, an allocated one the conflict
        get_serialized_part(db, id).await?;
        return Err(ServiceError::conflict(MSG_ALLOCATED_CHANGE));
    }
    get_serialized_part(db, id).await
}

#[instrument(skip(db))]
pub async fn delete_serialized_part(db: &DatabaseConnection, id: i32) -> Result<(), ServiceError> {
    if delete_in_stock(db, id).await? == 0 {
        get_serialized_part(db, id).await?;
        return Err(ServiceError::conflict(MSG_ALLOCATED_DELETE));
    }
    info!(part_id = id, "unit_deleted");
    Ok(())
}
