//! Ticket assignment engine: mechanic membership and part membership.
//!
//! Membership changes are idempotent at the storage level (composite key,
//! conditional updates); the engine turns a no-op into a `Conflict` so callers
//! learn the request had no effect.
use std::collections::HashSet;

use common::metrics::{ALLOCATION_CONFLICTS_TOTAL, PARTS_ALLOCATED_TOTAL, PARTS_RELEASED_TOTAL};
use sea_orm::{ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, TransactionTrait};
use serde::Deserialize;
use tracing::{info, instrument, warn};

use models::{mechanic, part_description, serialized_part, service_mechanic, service_ticket};

use super::ticket_service::{attach_mechanics, dedupe, get_ticket, TicketView, MSG_TICKET_NOT_FOUND};
use crate::errors::ServiceError;
use crate::inventory;

pub const MSG_TICKET_OR_MECHANIC_MISSING: &str = "Service ticket or mechanic not found.";
pub const MSG_MECHANIC_ASSIGNED: &str = "Mechanic already assigned to this ticket.";
pub const MSG_MECHANIC_NOT_INCLUDED: &str = "Mechanic not included on this ticket.";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EditMechanics {
    #[serde(default)]
    pub add_mechanic_ids: Vec<i32>,
    #[serde(default)]
    pub remove_mechanic_ids: Vec<i32>,
}

/// add-to-cart body; an empty body means one unit.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CartRequest {
    #[serde(default = "one")]
    pub quantity: u64,
}

impl Default for CartRequest {
    fn default() -> Self { Self { quantity: 1 } }
}

fn one() -> u64 { 1 }

/// A unit that just moved, with its description for response messages.
#[derive(Debug, Clone)]
pub struct PartChange {
    pub part: serialized_part::Model,
    pub description: Option<part_description::Model>,
}

impl PartChange {
    pub fn name(&self) -> &str {
        self.description.as_ref().map(|d| d.name.as_str()).unwrap_or("unknown")
    }
}

async fn ticket_and_mechanic<C: ConnectionTrait>(db: &C, ticket_id: i32, mechanic_id: i32) -> Result<mechanic::Model, ServiceError> {
    let ticket = service_ticket::Entity::find_by_id(ticket_id).one(db).await?;
    let mech = mechanic::Entity::find_by_id(mechanic_id).one(db).await?;
    match (ticket, mech) {
        (Some(_), Some(m)) => Ok(m),
        _ => Err(ServiceError::not_found(MSG_TICKET_OR_MECHANIC_MISSING)),
    }
}

/// Add `mechanic_id` to the crew of `ticket_id`. Conflict if already there.
pub async fn assign_mechanic<C: ConnectionTrait>(db: &C, ticket_id: i32, mechanic_id: i32) -> Result<mechanic::Model, ServiceError> {
    let mech = ticket_and_mechanic(db, ticket_id, mechanic_id).await?;
    if attach_mechanics(db, ticket_id, &[mechanic_id]).await? == 0 {
        return Err(ServiceError::conflict(MSG_MECHANIC_ASSIGNED));
    }
    Ok(mech)
}

/// Remove `mechanic_id` from the crew of `ticket_id`. Conflict if not a member.
pub async fn unassign_mechanic<C: ConnectionTrait>(db: &C, ticket_id: i32, mechanic_id: i32) -> Result<mechanic::Model, ServiceError> {
    let mech = ticket_and_mechanic(db, ticket_id, mechanic_id).await?;
    let res = service_mechanic::Entity::delete_many()
        .filter(service_mechanic::Column::TicketId.eq(ticket_id))
        .filter(service_mechanic::Column::MechanicId.eq(mechanic_id))
        .exec(db)
        .await?;
    if res.rows_affected == 0 {
        return Err(ServiceError::conflict(MSG_MECHANIC_NOT_INCLUDED));
    }
    Ok(mech)
}

#[instrument(skip(db))]
pub async fn add_mechanic(db: &DatabaseConnection, ticket_id: i32, mechanic_id: i32) -> Result<mechanic::Model, ServiceError> {
    let txn = db.begin().await?;
    let mech = assign_mechanic(&txn, ticket_id, mechanic_id).await?;
    txn.commit().await?;
    info!("mechanic_assigned");
    Ok(mech)
}

#[instrument(skip(db))]
pub async fn remove_mechanic(db: &DatabaseConnection, ticket_id: i32, mechanic_id: i32) -> Result<mechanic::Model, ServiceError> {
    let txn = db.begin().await?;
    let mech = unassign_mechanic(&txn, ticket_id, mechanic_id).await?;
    txn.commit().await?;
    info!("mechanic_unassigned");
    Ok(mech)
}

/// Apply a bulk crew edit. Every id in both lists is checked before anything
/// is written; the first offending id aborts the whole call.
#[instrument(skip(db, edit))]
pub async fn edit_mechanics(db: &DatabaseConnection, ticket_id: i32, edit: EditMechanics) -> Result<TicketView, ServiceError> {
    let add = dedupe(&edit.add_mechanic_ids);
    let remove = dedupe(&edit.remove_mechanic_ids);
    if let Some(both) = add.iter().find(|id| remove.contains(id)) {
        return Err(ServiceError::validation(format!("Mechanic {both} cannot be both added and removed.")));
    }

    let txn = db.begin().await?;
    service_ticket::Entity::find_by_id(ticket_id)
        .one(&txn)
        .await?
        .ok_or_else(|| ServiceError::not_found(MSG_TICKET_NOT_FOUND))?;

    let wanted: Vec<i32> = add.iter().chain(remove.iter()).copied().collect();
    let known: HashSet<i32> = if wanted.is_empty() {
        HashSet::new()
    } else {
        mechanic::Entity::find()
            .filter(mechanic::Column::Id.is_in(wanted.clone()))
            .all(&txn)
            .await?
            .into_iter()
            .map(|m| m.id)
            .collect()
    };
    let crew: HashSet<i32> = service_mechanic::Entity::find()
        .filter(service_mechanic::Column::TicketId.eq(ticket_id))
        .all(&txn)
        .await?
        .into_iter()
        .map(|m| m.mechanic_id)
        .collect();

    if let Some(id) = wanted.iter().find(|id| !known.contains(*id)) {
        return Err(ServiceError::not_found(format!("Mechanic {id} not found.")));
    }
    if let Some(id) = add.iter().find(|id| crew.contains(*id)) {
        return Err(ServiceError::conflict(format!("Mechanic {id} already assigned to this ticket.")));
    }
    if let Some(id) = remove.iter().find(|id| !crew.contains(*id)) {
        return Err(ServiceError::conflict(format!("Mechanic {id} not included on this ticket.")));
    }

    for id in &add {
        assign_mechanic(&txn, ticket_id, *id).await?;
    }
    for id in &remove {
        unassign_mechanic(&txn, ticket_id, *id).await?;
    }
    txn.commit().await?;
    info!(added = add.len(), removed = remove.len(), "crew_edited");
    get_ticket(db, ticket_id).await
}

async fn describe<C: ConnectionTrait>(db: &C, part: serialized_part::Model) -> Result<PartChange, ServiceError> {
    let description = part_description::Entity::find_by_id(part.desc_id).one(db).await?;
    Ok(PartChange { part, description })
}

fn count_conflict<T>(res: &Result<T, ServiceError>) {
    if let Err(ServiceError::Conflict(msg)) = res {
        ALLOCATION_CONFLICTS_TOTAL.inc();
        warn!(reason = %msg, "allocation rejected");
    }
}

#[instrument(skip(db))]
pub async fn add_part(db: &DatabaseConnection, ticket_id: i32, part_id: i32) -> Result<PartChange, ServiceError> {
    let txn = db.begin().await?;
    let res = inventory::allocate(&txn, ticket_id, part_id).await;
    count_conflict(&res);
    let change = describe(&txn, res?).await?;
    txn.commit().await?;
    PARTS_ALLOCATED_TOTAL.inc();
    Ok(change)
}

#[instrument(skip(db))]
pub async fn remove_part(db: &DatabaseConnection, ticket_id: i32, part_id: i32) -> Result<PartChange, ServiceError> {
    let txn = db.begin().await?;
    let part = inventory::deallocate(&txn, ticket_id, part_id).await?;
    let change = describe(&txn, part).await?;
    txn.commit().await?;
    PARTS_RELEASED_TOTAL.inc();
    Ok(change)
}

/// Allocate `quantity` free units of `desc_id` to the ticket, all or nothing.
#[instrument(skip(db))]
pub async fn add_to_cart(db: &DatabaseConnection, ticket_id: i32, desc_id: i32, quantity: u64) -> Result<Vec<serialized_part::Model>, ServiceError> {
    let txn = db.begin().await?;
    let res = inventory::allocate_batch(&txn, ticket_id, desc_id, quantity).await;
    count_conflict(&res);
    let units = res?;
    txn.commit().await?;
    PARTS_ALLOCATED_TOTAL.inc_by(units.len() as u64);
    info!(allocated = units.len(), "cart_filled");
    Ok(units)
}
