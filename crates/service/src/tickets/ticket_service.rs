use chrono::NaiveDate;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, LoaderTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use migration::{DEFAULT_PRIORITY, DEFAULT_STATUS};
use models::validate::Validator;
use models::{customer, mechanic, priority, serialized_part, service_mechanic, service_ticket, ticket_status};

use crate::errors::ServiceError;
use crate::inventory;
use crate::pagination::{fetch_page, Page, Pagination};

pub const MSG_TICKET_NOT_FOUND: &str = "Service ticket not found";
pub const MSG_BAD_CUSTOMER: &str = "Invalid customer id";

/// POST body. Status and priority fall back to the seeded defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateTicket {
    pub customer_id: i32,
    pub vin: String,
    pub service_date: NaiveDate,
    pub service_desc: String,
    #[serde(default)]
    pub mechanic_ids: Vec<i32>,
    #[serde(default)]
    pub status_id: Option<i32>,
    #[serde(default)]
    pub priority_id: Option<i32>,
    #[serde(default)]
    pub completion_date: Option<NaiveDate>,
    #[serde(default)]
    pub estimated_cost: Option<f64>,
    #[serde(default)]
    pub actual_cost: Option<f64>,
}

/// PUT body. Required fields are overwritten, optional ones only when
/// present, and `mechanic_ids` is merged into the existing crew.
pub type UpdateTicket = CreateTicket;

/// A ticket with everything clients render alongside it.
#[derive(Debug, Clone, Serialize)]
pub struct TicketView {
    #[serde(flatten)]
    pub ticket: service_ticket::Model,
    pub customer: Option<customer::Model>,
    pub status: Option<ticket_status::Model>,
    pub priority: Option<priority::Model>,
    pub mechanics: Vec<mechanic::Model>,
    pub ticket_items: Vec<serialized_part::Model>,
}

fn validate(input: &CreateTicket) -> Result<(), ServiceError> {
    let mut v = Validator::new();
    v.text("vin", &input.vin, 255).text("service_desc", &input.service_desc, 255);
    if let Some(c) = input.estimated_cost {
        v.non_negative("estimated_cost", c);
    }
    if let Some(c) = input.actual_cost {
        v.non_negative("actual_cost", c);
    }
    if let Some(done) = input.completion_date {
        if done < input.service_date {
            v.push("completion_date", "Must not be before service_date.");
        }
    }
    Ok(v.finish()?)
}

/// Drop repeats while keeping first-seen order.
pub(crate) fn dedupe(ids: &[i32]) -> Vec<i32> {
    let mut seen = std::collections::HashSet::new();
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

async fn resolve_status<C: ConnectionTrait>(db: &C, id: Option<i32>) -> Result<i32, ServiceError> {
    match id {
        Some(id) => ticket_status::Entity::find_by_id(id)
            .one(db)
            .await?
            .map(|s| s.id)
            .ok_or_else(|| ServiceError::validation("Invalid status id")),
        None => ticket_status::find_by_name(db, DEFAULT_STATUS)
            .await?
            .map(|s| s.id)
            .ok_or_else(|| ServiceError::Db(format!("default status '{DEFAULT_STATUS}' is not seeded"))),
    }
}

async fn resolve_priority<C: ConnectionTrait>(db: &C, id: Option<i32>) -> Result<i32, ServiceError> {
    match id {
        Some(id) => priority::Entity::find_by_id(id)
            .one(db)
            .await?
            .map(|p| p.id)
            .ok_or_else(|| ServiceError::validation("Invalid priority id")),
        None => priority::find_by_name(db, DEFAULT_PRIORITY)
            .await?
            .map(|p| p.id)
            .ok_or_else(|| ServiceError::Db(format!("default priority '{DEFAULT_PRIORITY}' is not seeded"))),
    }
}

async fn ensure_customer<C: ConnectionTrait>(db: &C, id: i32) -> Result<(), ServiceError> {
    customer::Entity::find_by_id(id)
        .one(db)
        .await?
        .map(|_| ())
        .ok_or_else(|| ServiceError::validation(MSG_BAD_CUSTOMER))
}

/// Every id must name an existing mechanic; the first bad one is reported.
async fn ensure_mechanics<C: ConnectionTrait>(db: &C, ids: &[i32]) -> Result<(), ServiceError> {
    if ids.is_empty() {
        return Ok(());
    }
    let found: Vec<i32> = mechanic::Entity::find()
        .filter(mechanic::Column::Id.is_in(ids.to_vec()))
        .all(db)
        .await?
        .into_iter()
        .map(|m| m.id)
        .collect();
    match ids.iter().find(|id| !found.contains(id)) {
        Some(bad) => Err(ServiceError::validation(format!("Invalid mechanic id: {bad}"))),
        None => Ok(()),
    }
}

/// Insert memberships, skipping pairs that already exist. Returns rows added.
pub(crate) async fn attach_mechanics<C: ConnectionTrait>(db: &C, ticket_id: i32, ids: &[i32]) -> Result<u64, ServiceError> {
    let mut added = 0;
    for id in ids {
        let row = service_mechanic::ActiveModel {
            ticket_id: Set(ticket_id),
            mechanic_id: Set(*id),
            created_at: Set(crate::now()),
        };
        let res = service_mechanic::Entity::insert(row)
            .on_conflict(
                OnConflict::columns([service_mechanic::Column::TicketId, service_mechanic::Column::MechanicId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await;
        match res {
            Ok(n) => added += n,
            Err(sea_orm::DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(added)
}

#[instrument(skip(db, input), fields(customer_id = input.customer_id))]
pub async fn create_ticket(db: &DatabaseConnection, input: CreateTicket) -> Result<TicketView, ServiceError> {
    validate(&input)?;
    let mechanic_ids = dedupe(&input.mechanic_ids);

    let txn = db.begin().await?;
    ensure_customer(&txn, input.customer_id).await?;
    ensure_mechanics(&txn, &mechanic_ids).await?;
    let status_id = resolve_status(&txn, input.status_id).await?;
    let priority_id = resolve_priority(&txn, input.priority_id).await?;

    let now = crate::now();
    let created = service_ticket::ActiveModel {
        customer_id: Set(input.customer_id),
        vin: Set(input.vin.trim().to_string()),
        status_id: Set(status_id),
        priority_id: Set(priority_id),
        service_date: Set(input.service_date),
        completion_date: Set(input.completion_date),
        service_desc: Set(input.service_desc.trim().to_string()),
        estimated_cost: Set(input.estimated_cost),
        actual_cost: Set(input.actual_cost),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    attach_mechanics(&txn, created.id, &mechanic_ids).await?;
    txn.commit().await?;

    info!(ticket_id = created.id, mechanics = mechanic_ids.len(), "ticket_created");
    get_ticket(db, created.id).await
}

pub async fn get_ticket<C: ConnectionTrait>(db: &C, id: i32) -> Result<TicketView, ServiceError> {
    let ticket = service_ticket::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found(MSG_TICKET_NOT_FOUND))?;
    let mut views = load_views(db, vec![ticket]).await?;
    views.pop().ok_or_else(|| ServiceError::not_found(MSG_TICKET_NOT_FOUND))
}

pub async fn list_tickets<C: ConnectionTrait>(db: &C, opts: Pagination) -> Result<Page<TicketView>, ServiceError> {
    let mut page = fetch_page(db, service_ticket::Entity::find().order_by_asc(service_ticket::Column::Id), opts).await?;
    let tickets = std::mem::take(&mut page.items);
    let views = load_views(db, tickets).await?;
    Ok(page.with_items(views))
}

/// Batch-load relations for `tickets`, preserving their order.
pub async fn load_views<C: ConnectionTrait>(db: &C, tickets: Vec<service_ticket::Model>) -> Result<Vec<TicketView>, ServiceError> {
    if tickets.is_empty() {
        return Ok(Vec::new());
    }
    let customers = tickets.load_one(customer::Entity, db).await?;
    let statuses = tickets.load_one(ticket_status::Entity, db).await?;
    let priorities = tickets.load_one(priority::Entity, db).await?;
    let crews = tickets.load_many_to_many(mechanic::Entity, service_mechanic::Entity, db).await?;
    let items = tickets.load_many(serialized_part::Entity, db).await?;

    let views = tickets
        .into_iter()
        .zip(customers)
        .zip(statuses)
        .zip(priorities)
        .zip(crews)
        .zip(items)
        .map(|(((((ticket, customer), status), priority), mut mechanics), mut ticket_items)| {
            mechanics.sort_by_key(|m| m.id);
            ticket_items.sort_by_key(|p| p.id);
            TicketView { ticket, customer, status, priority, mechanics, ticket_items }
        })
        .collect();
    Ok(views)
}

#[instrument(skip(db, input))]
pub async fn update_ticket(db: &DatabaseConnection, id: i32, input: UpdateTicket) -> Result<TicketView, ServiceError> {
    validate(&input)?;
    let mechanic_ids = dedupe(&input.mechanic_ids);

    let txn = db.begin().await?;
    let existing = service_ticket::Entity::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or_else(|| ServiceError::not_found(MSG_TICKET_NOT_FOUND))?;
    ensure_customer(&txn, input.customer_id).await?;
    ensure_mechanics(&txn, &mechanic_ids).await?;

    let mut am: service_ticket::ActiveModel = existing.into();
    am.customer_id = Set(input.customer_id);
    am.vin = Set(input.vin.trim().to_string());
    am.service_date = Set(input.service_date);
    am.service_desc = Set(input.service_desc.trim().to_string());
    if input.status_id.is_some() {
        am.status_id = Set(resolve_status(&txn, input.status_id).await?);
    }
    if input.priority_id.is_some() {
        am.priority_id = Set(resolve_priority(&txn, input.priority_id).await?);
    }
    if let Some(d) = input.completion_date {
        am.completion_date = Set(Some(d));
    }
    if let Some(c) = input.estimated_cost {
        am.estimated_cost = Set(Some(c));
    }
    if let Some(c) = input.actual_cost {
        am.actual_cost = Set(Some(c));
    }
    am.updated_at = Set(crate::now());
    am.update(&txn).await?;
    let added = attach_mechanics(&txn, id, &mechanic_ids).await?;
    txn.commit().await?;

    info!(ticket_id = id, mechanics_added = added, "ticket_updated");
    get_ticket(db, id).await
}

/// Delete a ticket, returning its parts to stock. Returns units released.
#[instrument(skip(db))]
pub async fn delete_ticket(db: &DatabaseConnection, id: i32) -> Result<u64, ServiceError> {
    let txn = db.begin().await?;
    service_ticket::Entity::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or_else(|| ServiceError::not_found(MSG_TICKET_NOT_FOUND))?;
    let released = purge_ticket(&txn, id).await?;
    txn.commit().await?;
    info!(ticket_id = id, released, "ticket_deleted");
    Ok(released)
}

/// Release parts, drop memberships, then the ticket row itself.
pub(crate) async fn purge_ticket<C: ConnectionTrait>(db: &C, id: i32) -> Result<u64, ServiceError> {
    let released = inventory::release_all(db, id).await?;
    service_mechanic::Entity::delete_many()
        .filter(service_mechanic::Column::TicketId.eq(id))
        .exec(db)
        .await?;
    service_ticket::Entity::delete_by_id(id).exec(db).await?;
    Ok(released)
}

/// Tickets owned by `customer_id`, oldest first.
pub async fn tickets_for_customer<C: ConnectionTrait>(db: &C, customer_id: i32) -> Result<Vec<TicketView>, ServiceError> {
    let tickets = service_ticket::Entity::find()
        .filter(service_ticket::Column::CustomerId.eq(customer_id))
        .order_by_asc(service_ticket::Column::Id)
        .all(db)
        .await?;
    load_views(db, tickets).await
}

/// Tickets `mechanic_id` is assigned to, oldest first.
pub async fn tickets_for_mechanic<C: ConnectionTrait>(db: &C, mechanic_id: i32) -> Result<Vec<TicketView>, ServiceError> {
    let ids: Vec<i32> = service_mechanic::Entity::find()
        .filter(service_mechanic::Column::MechanicId.eq(mechanic_id))
        .all(db)
        .await?
        .into_iter()
        .map(|m| m.ticket_id)
        .collect();
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let tickets = service_ticket::Entity::find()
        .filter(service_ticket::Column::Id.is_in(ids))
        .order_by_asc(service_ticket::Column::Id)
        .all(db)
        .await?;
    load_views(db, tickets).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{get_db, seed_customer, seed_description, seed_mechanic, seed_units};

    fn body(customer_id: i32, mechanic_ids: Vec<i32>) -> CreateTicket {
        CreateTicket {
            customer_id,
            vin: "1HGCM82633A004352".into(),
            service_date: NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            service_desc: "Replace front pads".into(),
            mechanic_ids,
            status_id: None,
            priority_id: None,
            completion_date: None,
            estimated_cost: None,
            actual_cost: None,
        }
    }

    #[tokio::test]
    async fn create_defaults_status_and_dedupes_crew() -> anyhow::Result<()> {
        let db = get_db().await?;
        let c = seed_customer(&db, "tk1@shop.example").await?;
        let m = seed_mechanic(&db, "tk1m@shop.example").await?;
        let view = create_ticket(&db, body(c.id, vec![m.id, m.id])).await?;
        assert_eq!(view.status.as_ref().map(|s| s.name.as_str()), Some(DEFAULT_STATUS));
        assert_eq!(view.priority.as_ref().map(|p| p.name.as_str()), Some(DEFAULT_PRIORITY));
        assert_eq!(view.mechanics.len(), 1);
        assert_eq!(view.customer.map(|c| c.id), Some(c.id));
        Ok(())
    }

    #[tokio::test]
    async fn create_rejects_unknown_customer_or_mechanic() -> anyhow::Result<()> {
        let db = get_db().await?;
        let bad_customer = create_ticket(&db, body(404, vec![])).await;
        assert!(matches!(bad_customer, Err(ServiceError::Validation(m)) if m == MSG_BAD_CUSTOMER));

        let c = seed_customer(&db, "tk2@shop.example").await?;
        let m = seed_mechanic(&db, "tk2m@shop.example").await?;
        let bad_mech = create_ticket(&db, body(c.id, vec![m.id, 77])).await;
        assert!(matches!(bad_mech, Err(ServiceError::Validation(msg)) if msg == "Invalid mechanic id: 77"));
        assert_eq!(service_ticket::Entity::find().all(&db).await?.len(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn blank_vin_is_a_field_error() -> anyhow::Result<()> {
        let db = get_db().await?;
        let c = seed_customer(&db, "tk3@shop.example").await?;
        let mut b = body(c.id, vec![]);
        b.vin = "   ".into();
        let err = create_ticket(&db, b).await.unwrap_err();
        assert!(err.field_errors().is_some_and(|f| f.contains_key("vin")));
        Ok(())
    }

    #[tokio::test]
    async fn update_overwrites_fields_and_merges_crew() -> anyhow::Result<()> {
        let db = get_db().await?;
        let c = seed_customer(&db, "tk4@shop.example").await?;
        let m1 = seed_mechanic(&db, "tk4a@shop.example").await?;
        let m2 = seed_mechanic(&db, "tk4b@shop.example").await?;
        let mut first = body(c.id, vec![m1.id]);
        first.estimated_cost = Some(250.0);
        let created = create_ticket(&db, first).await?;

        let mut upd = body(c.id, vec![m2.id]);
        upd.service_desc = "Pads and rotors".into();
        let view = update_ticket(&db, created.ticket.id, upd).await?;
        assert_eq!(view.ticket.service_desc, "Pads and rotors");
        assert_eq!(view.ticket.estimated_cost, Some(250.0));
        assert_eq!(view.mechanics.iter().map(|m| m.id).collect::<Vec<_>>(), vec![m1.id, m2.id]);

        let missing = update_ticket(&db, 999, body(c.id, vec![])).await;
        assert!(matches!(missing, Err(ServiceError::NotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn delete_returns_parts_to_stock() -> anyhow::Result<()> {
        let db = get_db().await?;
        let c = seed_customer(&db, "tk5@shop.example").await?;
        let m = seed_mechanic(&db, "tk5m@shop.example").await?;
        let view = create_ticket(&db, body(c.id, vec![m.id])).await?;
        let desc = seed_description(&db, "Brake Pad", 99.99).await?;
        seed_units(&db, desc.id, 2).await?;
        inventory::allocate_batch(&db, view.ticket.id, desc.id, 2).await?;

        assert_eq!(delete_ticket(&db, view.ticket.id).await?, 2);
        assert_eq!(inventory::available_count(&db, desc.id).await?, 2);
        assert!(service_mechanic::Entity::find().all(&db).await?.is_empty());
        assert!(matches!(get_ticket(&db, view.ticket.id).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn list_pages_and_scoped_queries() -> anyhow::Result<()> {
        let db = get_db().await?;
        let c = seed_customer(&db, "tk6@shop.example").await?;
        let m = seed_mechanic(&db, "tk6m@shop.example").await?;
        for i in 0..3 {
            let ids = if i == 0 { vec![m.id] } else { vec![] };
            create_ticket(&db, body(c.id, ids)).await?;
        }
        let page = list_tickets(&db, Pagination { page: 2, per_page: 2 }).await?;
        assert_eq!((page.total, page.pages, page.items.len()), (3, 2, 1));

        assert_eq!(tickets_for_customer(&db, c.id).await?.len(), 3);
        assert_eq!(tickets_for_mechanic(&db, m.id).await?.len(), 1);
        Ok(())
    }

    #[test]
    fn dedupe_keeps_first_order() {
        assert_eq!(dedupe(&[3, 1, 3, 2, 1]), vec![3, 1, 2]);
    }
}
