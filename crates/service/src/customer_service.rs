use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait};
use serde::Deserialize;
use tracing::{info, instrument};

use models::validate::Validator;
use models::{customer, service_ticket};

use crate::auth::password::hash_password;
use crate::errors::ServiceError;
use crate::pagination::{fetch_page, Page, Pagination};
use crate::search::contains_any;
use crate::tickets::ticket_service::{purge_ticket, tickets_for_customer, TicketView};

pub const MSG_CUSTOMER_NOT_FOUND: &str = "Invalid customer";
pub const MSG_DUPLICATE_EMAIL: &str = "A customer with this email already exists!";
pub const MSG_SEARCH_NEEDS_FILTER: &str = "At least one search parameter (name or email) is required.";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateCustomer {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

/// Partial update: only supplied fields are written.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateCustomer {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
    pub address: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerSearch {
    pub name: Option<String>,
    pub email: Option<String>,
}

fn validate_create(input: &CreateCustomer) -> Result<(), ServiceError> {
    let mut v = Validator::new();
    v.text("name", &input.name, 100)
        .email("email", &input.email)
        .text("email", &input.email, 255)
        .text("phone", &input.phone, 32)
        .text("password", &input.password, 255)
        .opt_text("address", input.address.as_deref(), 255)
        .opt_text("image", input.image.as_deref(), 512);
    Ok(v.finish()?)
}

fn validate_update(input: &UpdateCustomer) -> Result<(), ServiceError> {
    let mut v = Validator::new();
    v.opt_text("name", input.name.as_deref(), 100)
        .opt_text("phone", input.phone.as_deref(), 32)
        .opt_text("password", input.password.as_deref(), 255)
        .opt_text("address", input.address.as_deref(), 255)
        .opt_text("image", input.image.as_deref(), 512);
    if let Some(email) = &input.email {
        v.email("email", email).text("email", email, 255);
    }
    Ok(v.finish()?)
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[instrument(skip(db, input), fields(email = %input.email))]
pub async fn create_customer(db: &DatabaseConnection, input: CreateCustomer) -> Result<customer::Model, ServiceError> {
    validate_create(&input)?;
    let email = normalize_email(&input.email);
    if customer::find_by_email(db, &email).await?.is_some() {
        return Err(ServiceError::conflict(MSG_DUPLICATE_EMAIL));
    }
    let hash = hash_password(&input.password).map_err(|e| ServiceError::Internal(e.to_string()))?;
    let now = crate::now();
    let created = customer::ActiveModel {
        name: Set(input.name.trim().to_string()),
        email: Set(email),
        phone: Set(input.phone.trim().to_string()),
        password_hash: Set(hash),
        address: Set(input.address),
        image: Set(input.image),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(|e| ServiceError::from_unique(e, MSG_DUPLICATE_EMAIL))?;
    info!(customer_id = created.id, "customer_created");
    Ok(created)
}

pub async fn get_customer<C: ConnectionTrait>(db: &C, id: i32) -> Result<customer::Model, ServiceError> {
    customer::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found(MSG_CUSTOMER_NOT_FOUND))
}

pub async fn list_customers<C: ConnectionTrait>(db: &C, opts: Pagination) -> Result<Page<customer::Model>, ServiceError> {
    fetch_page(db, customer::Entity::find().order_by_asc(customer::Column::Id), opts).await
}

pub async fn search_customers<C: ConnectionTrait>(db: &C, q: &CustomerSearch) -> Result<Vec<customer::Model>, ServiceError> {
    let cond = contains_any(&[
        (customer::Column::Name, q.name.as_deref()),
        (customer::Column::Email, q.email.as_deref()),
    ])
    .ok_or_else(|| ServiceError::validation(MSG_SEARCH_NEEDS_FILTER))?;
    Ok(customer::Entity::find().filter(cond).order_by_asc(customer::Column::Id).all(db).await?)
}

#[instrument(skip(db, input))]
pub async fn update_customer(db: &DatabaseConnection, id: i32, input: UpdateCustomer) -> Result<customer::Model, ServiceError> {
    validate_update(&input)?;
    let existing = get_customer(db, id).await?;
    let mut am: customer::ActiveModel = existing.clone().into();
    if let Some(email) = input.email.as_deref().map(normalize_email) {
        if email != existing.email {
            if customer::find_by_email(db, &email).await?.is_some() {
                return Err(ServiceError::conflict(MSG_DUPLICATE_EMAIL));
            }
            am.email = Set(email);
        }
    }
    if let Some(name) = input.name {
        am.name = Set(name.trim().to_string());
    }
    if let Some(phone) = input.phone {
        am.phone = Set(phone.trim().to_string());
    }
    if let Some(password) = input.password {
        am.password_hash = Set(hash_password(&password).map_err(|e| ServiceError::Internal(e.to_string()))?);
    }
    if let Some(address) = input.address {
        am.address = Set(Some(address));
    }
    if let Some(image) = input.image {
        am.image = Set(Some(image));
    }
    am.updated_at = Set(crate::now());
    let updated = am.update(db).await.map_err(|e| ServiceError::from_unique(e, MSG_DUPLICATE_EMAIL))?;
    info!(customer_id = id, "customer_updated");
    Ok(updated)
}

/// Delete a customer and every ticket they own. Returns units put back in stock.
#[instrument(skip(db))]
pub async fn delete_customer(db: &DatabaseConnection, id: i32) -> Result<u64, ServiceError> {
    let txn = db.begin().await?;
    get_customer(&txn, id).await?;
    let tickets = service_ticket::Entity::find()
        .filter(service_ticket::Column::CustomerId.eq(id))
        .all(&txn)
        .await?;
    let mut released = 0;
    for t in &tickets {
        released += purge_ticket(&txn, t.id).await?;
    }
    customer::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;
    info!(customer_id = id, tickets = tickets.len(), released, "customer_deleted");
    Ok(released)
}

pub async fn my_tickets<C: ConnectionTrait>(db: &C, id: i32) -> Result<Vec<TicketView>, ServiceError> {
    get_customer(db, id).await?;
    tickets_for_customer(db, id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{get_db, seed_description, seed_ticket, seed_units};

    fn body(email: &str) -> CreateCustomer {
        CreateCustomer {
            name: "Ann Driver".into(),
            email: email.into(),
            phone: "555-0100".into(),
            password: "pw-ann-123".into(),
            address: None,
            image: None,
        }
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() -> anyhow::Result<()> {
        let db = get_db().await?;
        let c = create_customer(&db, body("Ann@Shop.example")).await?;
        assert_eq!(c.email, "ann@shop.example");
        assert!(c.password_hash.starts_with("$argon2"));
        let dup = create_customer(&db, body("ann@shop.example")).await;
        assert!(matches!(dup, Err(ServiceError::Conflict(m)) if m == MSG_DUPLICATE_EMAIL));
        Ok(())
    }

    #[tokio::test]
    async fn invalid_fields_are_keyed() -> anyhow::Result<()> {
        let db = get_db().await?;
        let mut b = body("not-an-email");
        b.name = "".into();
        let err = create_customer(&db, b).await.unwrap_err();
        let fields = err.field_errors().cloned().unwrap_or_default();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("name"));
        Ok(())
    }

    #[tokio::test]
    async fn partial_update_and_email_guard() -> anyhow::Result<()> {
        let db = get_db().await?;
        let a = create_customer(&db, body("a@shop.example")).await?;
        create_customer(&db, body("b@shop.example")).await?;

        let upd = update_customer(&db, a.id, UpdateCustomer { phone: Some("555-0111".into()), ..Default::default() }).await?;
        assert_eq!(upd.phone, "555-0111");
        assert_eq!(upd.name, a.name);

        let clash = update_customer(&db, a.id, UpdateCustomer { email: Some("b@shop.example".into()), ..Default::default() }).await;
        assert!(matches!(clash, Err(ServiceError::Conflict(_))));
        Ok(())
    }

    #[tokio::test]
    async fn search_requires_a_filter_and_ignores_case() -> anyhow::Result<()> {
        let db = get_db().await?;
        create_customer(&db, body("search@shop.example")).await?;
        let none = search_customers(&db, &CustomerSearch::default()).await;
        assert!(matches!(none, Err(ServiceError::Validation(m)) if m == MSG_SEARCH_NEEDS_FILTER));
        let hits = search_customers(&db, &CustomerSearch { name: Some("ANN".into()), email: None }).await?;
        assert_eq!(hits.len(), 1);
        let miss = search_customers(&db, &CustomerSearch { name: Some("zed".into()), email: Some("nobody".into()) }).await?;
        assert!(miss.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn delete_cascades_tickets_and_frees_parts() -> anyhow::Result<()> {
        let db = get_db().await?;
        let c = create_customer(&db, body("gone@shop.example")).await?;
        let t = seed_ticket(&db, c.id).await?;
        let d = seed_description(&db, "Brake Pad", 99.99).await?;
        seed_units(&db, d.id, 1).await?;
        crate::inventory::allocate_batch(&db, t.id, d.id, 1).await?;

        assert_eq!(delete_customer(&db, c.id).await?, 1);
        assert!(service_ticket::Entity::find().all(&db).await?.is_empty());
        assert_eq!(crate::inventory::available_count(&db, d.id).await?, 1);
        assert!(matches!(get_customer(&db, c.id).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn my_tickets_scoped_to_owner() -> anyhow::Result<()> {
        let db = get_db().await?;
        let a = create_customer(&db, body("mine@shop.example")).await?;
        let b = create_customer(&db, body("theirs@shop.example")).await?;
        seed_ticket(&db, a.id).await?;
        seed_ticket(&db, b.id).await?;
        let mine = my_tickets(&db, a.id).await?;
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].ticket.customer_id, a.id);
        Ok(())
    }
}
