//! Inventory allocator.
//!
//! Stock is derived from `serialized_part.ticket_id` alone: a unit is in stock
//! iff that column is null. Allocation and release are conditional updates
//! whose affected-row count decides success, so two callers racing for the
//! same unit cannot both win.
//!
//! Every function takes the connection explicitly. Pass a transaction when a
//! call is part of a larger unit of work; `allocate_batch` in particular must
//! run inside one so a short update rolls back.

pub mod cache;

pub use cache::InventoryCache;

use std::collections::HashMap;

use models::{part_description, serialized_part, service_ticket};
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::errors::ServiceError;

pub const MSG_PART_TAKEN: &str = "Part already assigned to a ticket.";
pub const MSG_PART_NOT_ON_TICKET: &str = "Serialized part not included to this ticket.";
pub const MSG_TICKET_OR_PART_MISSING: &str = "Service ticket or serialized part not found.";
pub const MSG_BAD_TICKET_OR_DESC: &str = "Invalid ticket_id or part_id.";
pub const MSG_DESC_MISSING: &str = "Part description not found";

pub fn short_stock_message(available: usize) -> String {
    format!("Only {available} stock(s) available for this part.")
}

/// A part description with its in-stock unit count.
#[derive(Debug, Clone, Serialize)]
pub struct StockLine {
    #[serde(flatten)]
    pub description: part_description::Model,
    pub stock: u64,
}

/// Stock for a single description, by name.
#[derive(Debug, Clone, Serialize)]
pub struct ItemStock {
    pub item: String,
    pub stock: u64,
}

/// Number of unallocated units under `desc_id`.
pub async fn available_count<C: ConnectionTrait>(db: &C, desc_id: i32) -> Result<u64, ServiceError> {
    part_description::Entity::find_by_id(desc_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found(MSG_DESC_MISSING))?;
    count_free(db, desc_id).await
}

async fn count_free<C: ConnectionTrait>(db: &C, desc_id: i32) -> Result<u64, ServiceError> {
    let n = serialized_part::Entity::find()
        .filter(serialized_part::Column::DescId.eq(desc_id))
        .filter(serialized_part::Column::TicketId.is_null())
        .count(db)
        .await?;
    Ok(n)
}

/// Attach unit `part_id` to `ticket_id` if it is currently in stock.
#[instrument(skip(db))]
pub async fn allocate<C: ConnectionTrait>(db: &C, ticket_id: i32, part_id: i32) -> Result<serialized_part::Model, ServiceError> {
    ensure_ticket_and_part(db, ticket_id, part_id).await?;
    let res = serialized_part::Entity::update_many()
        .col_expr(serialized_part::Column::TicketId, Expr::value(ticket_id))
        .col_expr(serialized_part::Column::UpdatedAt, Expr::value(crate::now()))
        .filter(serialized_part::Column::Id.eq(part_id))
        .filter(serialized_part::Column::TicketId.is_null())
        .exec(db)
        .await?;
    if res.rows_affected == 0 {
        return Err(ServiceError::conflict(MSG_PART_TAKEN));
    }
    debug!("unit allocated");
    reload(db, part_id).await
}

/// Return unit `part_id` to stock, provided it is attached to `ticket_id`.
#[instrument(skip(db))]
pub async fn deallocate<C: ConnectionTrait>(db: &C, ticket_id: i32, part_id: i32) -> Result<serialized_part::Model, ServiceError> {
    ensure_ticket_and_part(db, ticket_id, part_id).await?;
    let res = serialized_part::Entity::update_many()
        .col_expr(serialized_part::Column::TicketId, Expr::value(Option::<i32>::None))
        .col_expr(serialized_part::Column::UpdatedAt, Expr::value(crate::now()))
        .filter(serialized_part::Column::Id.eq(part_id))
        .filter(serialized_part::Column::TicketId.eq(ticket_id))
        .exec(db)
        .await?;
    if res.rows_affected == 0 {
        return Err(ServiceError::conflict(MSG_PART_NOT_ON_TICKET));
    }
    debug!("unit released");
    reload(db, part_id).await
}

/// Allocate the `quantity` lowest-id free units of `desc_id` to `ticket_id`.
///
/// Fails with `Conflict("Only k stock(s) available for this part.")` when
/// fewer than `quantity` are free; nothing is written in that case. If a
/// concurrent writer takes a selected unit first, the update comes back short
/// and the same conflict is returned; the caller's transaction must then be
/// dropped so the partial update is rolled back.
#[instrument(skip(db))]
pub async fn allocate_batch<C: ConnectionTrait>(
    db: &C,
    ticket_id: i32,
    desc_id: i32,
    quantity: u64,
) -> Result<Vec<serialized_part::Model>, ServiceError> {
    if quantity == 0 {
        return Err(ServiceError::validation("Quantity must be at least 1."));
    }
    let ticket = service_ticket::Entity::find_by_id(ticket_id).one(db).await?;
    let desc = part_description::Entity::find_by_id(desc_id).one(db).await?;
    if ticket.is_none() || desc.is_none() {
        return Err(ServiceError::not_found(MSG_BAD_TICKET_OR_DESC));
    }

    let free: Vec<i32> = serialized_part::Entity::find()
        .select_only()
        .column(serialized_part::Column::Id)
        .filter(serialized_part::Column::DescId.eq(desc_id))
        .filter(serialized_part::Column::TicketId.is_null())
        .order_by_asc(serialized_part::Column::Id)
        .limit(quantity)
        .into_tuple()
        .all(db)
        .await?;
    if (free.len() as u64) < quantity {
        return Err(ServiceError::conflict(short_stock_message(free.len())));
    }

    let res = serialized_part::Entity::update_many()
        .col_expr(serialized_part::Column::TicketId, Expr::value(ticket_id))
        .col_expr(serialized_part::Column::UpdatedAt, Expr::value(crate::now()))
        .filter(serialized_part::Column::Id.is_in(free.clone()))
        .filter(serialized_part::Column::TicketId.is_null())
        .exec(db)
        .await?;
    if res.rows_affected != quantity {
        let left = count_free(db, desc_id).await? + res.rows_affected;
        return Err(ServiceError::conflict(short_stock_message(left as usize)));
    }

    let units = serialized_part::Entity::find()
        .filter(serialized_part::Column::Id.is_in(free))
        .order_by_asc(serialized_part::Column::Id)
        .all(db)
        .await?;
    debug!(allocated = units.len(), "batch allocated");
    Ok(units)
}

/// Every part description with its in-stock count, ordered by id.
pub async fn stock_report<C: ConnectionTrait>(db: &C) -> Result<Vec<StockLine>, ServiceError> {
    let descriptions = part_description::Entity::find()
        .order_by_asc(part_description::Column::Id)
        .all(db)
        .await?;
    let counts: HashMap<i32, i64> = serialized_part::Entity::find()
        .select_only()
        .column(serialized_part::Column::DescId)
        .column_as(Expr::col(serialized_part::Column::Id).count(), "stock")
        .filter(serialized_part::Column::TicketId.is_null())
        .group_by(serialized_part::Column::DescId)
        .into_tuple::<(i32, i64)>()
        .all(db)
        .await?
        .into_iter()
        .collect();
    Ok(descriptions
        .into_iter()
        .map(|d| {
            let stock = counts.get(&d.id).copied().unwrap_or(0).max(0) as u64;
            StockLine { description: d, stock }
        })
        .collect())
}

pub async fn stock_for<C: ConnectionTrait>(db: &C, desc_id: i32) -> Result<ItemStock, ServiceError> {
    let desc = part_description::Entity::find_by_id(desc_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found(MSG_DESC_MISSING))?;
    let stock = count_free(db, desc_id).await?;
    Ok(ItemStock { item: desc.name, stock })
}

/// Put every unit held by `ticket_id` back in stock. Returns how many moved.
pub async fn release_all<C: ConnectionTrait>(db: &C, ticket_id: i32) -> Result<u64, ServiceError> {
    let res = serialized_part::Entity::update_many()
        .col_expr(serialized_part::Column::TicketId, Expr::value(Option::<i32>::None))
        .col_expr(serialized_part::Column::UpdatedAt, Expr::value(crate::now()))
        .filter(serialized_part::Column::TicketId.eq(ticket_id))
        .exec(db)
        .await?;
    Ok(res.rows_affected)
}

async fn ensure_ticket_and_part<C: ConnectionTrait>(db: &C, ticket_id: i32, part_id: i32) -> Result<(), ServiceError> {
    let ticket = service_ticket::Entity::find_by_id(ticket_id).one(db).await?;
    let part = serialized_part::Entity::find_by_id(part_id).one(db).await?;
    match (ticket, part) {
        (Some(_), Some(_)) => Ok(()),
        _ => Err(ServiceError::not_found(MSG_TICKET_OR_PART_MISSING)),
    }
}

async fn reload<C: ConnectionTrait>(db: &C, part_id: i32) -> Result<serialized_part::Model, ServiceError> {
    serialized_part::Entity::find_by_id(part_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found(MSG_TICKET_OR_PART_MISSING))
}

#[cfg(test)]
mod tests;
