use std::collections::HashMap;

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
    Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use models::validate::Validator;
use models::{mechanic, service_mechanic};

use crate::auth::password::hash_password;
use crate::errors::ServiceError;
use crate::pagination::{fetch_page, Page, Pagination};
use crate::search::contains_any;
use crate::tickets::ticket_service::{tickets_for_mechanic, TicketView};

pub const MSG_MECHANIC_NOT_FOUND: &str = "Invalid mechanic";
pub const MSG_DUPLICATE_EMAIL: &str = "A mechanic with this email already exists!";
pub const MSG_SEARCH_NEEDS_FILTER: &str = "At least one search parameter (name or email) is required.";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateMechanic {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
    pub salary: f64,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateMechanic {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone: Option<String>,
    pub salary: Option<f64>,
    pub address: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MechanicSearch {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// A mechanic ranked by how many tickets they are on.
#[derive(Debug, Clone, Serialize)]
pub struct PopularMechanic {
    #[serde(flatten)]
    pub mechanic: mechanic::Model,
    pub ticket_count: u64,
}

fn validate_create(input: &CreateMechanic) -> Result<(), ServiceError> {
    let mut v = Validator::new();
    v.text("name", &input.name, 100)
        .email("email", &input.email)
        .text("email", &input.email, 255)
        .text("password", &input.password, 255)
        .text("phone", &input.phone, 32)
        .non_negative("salary", input.salary)
        .opt_text("address", input.address.as_deref(), 255)
        .opt_text("image", input.image.as_deref(), 512);
    Ok(v.finish()?)
}

fn validate_update(input: &UpdateMechanic) -> Result<(), ServiceError> {
    let mut v = Validator::new();
    v.opt_text("name", input.name.as_deref(), 100)
        .opt_text("password", input.password.as_deref(), 255)
        .opt_text("phone", input.phone.as_deref(), 32)
        .opt_text("address", input.address.as_deref(), 255)
        .opt_text("image", input.image.as_deref(), 512);
    if let Some(email) = &input.email {
        v.email("email", email).text("email", email, 255);
    }
    if let Some(salary) = input.salary {
        v.non_negative("salary", salary);
    }
    Ok(v.finish()?)
}

#[instrument(skip(db, input), fields(email = %input.email))]
pub async fn create_mechanic(db: &DatabaseConnection, input: CreateMechanic) -> Result<mechanic::Model, ServiceError> {
    validate_create(&input)?;
    let email = input.email.trim().to_lowercase();
    if mechanic::find_by_email(db, &email).await?.is_some() {
        return Err(ServiceError::conflict(MSG_DUPLICATE_EMAIL));
    }
    let hash = hash_password(&input.password).map_err(|e| ServiceError::Internal(e.to_string()))?;
    let now = crate::now();
    let created = mechanic::ActiveModel {
        name: Set(input.name.trim().to_string()),
        email: Set(email),
        password_hash: Set(hash),
        phone: Set(input.phone.trim().to_string()),
        salary: Set(input.salary),
        address: Set(input.address),
        image: Set(input.image),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(|e| ServiceError::from_unique(e, MSG_DUPLICATE_EMAIL))?;
    info!(mechanic_id = created.id, "mechanic_created");
    Ok(created)
}

pub async fn get_mechanic<C: ConnectionTrait>(db: &C, id: i32) -> Result<mechanic::Model, ServiceError> {
    mechanic::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found(MSG_MECHANIC_NOT_FOUND))
}

pub async fn list_mechanics<C: ConnectionTrait>(db: &C, opts: Pagination) -> Result<Page<mechanic::Model>, ServiceError> {
    fetch_page(db, mechanic::Entity::find().order_by_asc(mechanic::Column::Id), opts).await
}

pub async fn search_mechanics<C: ConnectionTrait>(db: &C, q: &MechanicSearch) -> Result<Vec<mechanic::Model>, ServiceError> {
    let cond = contains_any(&[
        (mechanic::Column::Name, q.name.as_deref()),
        (mechanic::Column::Email, q.email.as_deref()),
    ])
    .ok_or_else(|| ServiceError::validation(MSG_SEARCH_NEEDS_FILTER))?;
    Ok(mechanic::Entity::find().filter(cond).order_by_asc(mechanic::Column::Id).all(db).await?)
}

#[instrument(skip(db, input))]
pub async fn update_mechanic(db: &DatabaseConnection, id: i32, input: UpdateMechanic) -> Result<mechanic::Model, ServiceError> {
    validate_update(&input)?;
    let existing = get_mechanic(db, id).await?;
    let mut am: mechanic::ActiveModel = existing.clone().into();
    if let Some(email) = input.email.as_deref().map(|e| e.trim().to_lowercase()) {
        if email != existing.email {
            if mechanic::find_by_email(db, &email).await?.is_some() {
                return Err(ServiceError::conflict(MSG_DUPLICATE_EMAIL));
            }
            am.email = Set(email);
        }
    }
    if let Some(name) = input.name {
        am.name = Set(name.trim().to_string());
    }
    if let Some(password) = input.password {
        am.password_hash = Set(hash_password(&password).map_err(|e| ServiceError::Internal(e.to_string()))?);
    }
    if let Some(phone) = input.phone {
        am.phone = Set(phone.trim().to_string());
    }
    if let Some(salary) = input.salary {
        am.salary = Set(salary);
    }
    if let Some(address) = input.address {
        am.address = Set(Some(address));
    }
    if let Some(image) = input.image {
        am.image = Set(Some(image));
    }
    am.updated_at = Set(crate::now());
    let updated = am.update(db).await.map_err(|e| ServiceError::from_unique(e, MSG_DUPLICATE_EMAIL))?;
    info!(mechanic_id = id, "mechanic_updated");
    Ok(updated)
}

/// Delete a mechanic and their ticket memberships. Tickets themselves stay.
#[instrument(skip(db))]
pub async fn delete_mechanic(db: &DatabaseConnection, id: i32) -> Result<(), ServiceError> {
    let txn = db.begin().await?;
    get_mechanic(&txn, id).await?;
    service_mechanic::Entity::delete_many()
        .filter(service_mechanic::Column::MechanicId.eq(id))
        .exec(&txn)
        .await?;
    mechanic::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;
    info!(mechanic_id = id, "mechanic_deleted");
    Ok(())
}

pub async fn my_tickets<C: ConnectionTrait>(db: &C, id: i32) -> Result<Vec<TicketView>, ServiceError> {
    get_mechanic(db, id).await?;
    tickets_for_mechanic(db, id).await
}

/// All mechanics ordered by ticket count (desc), ties by id.
pub async fn popular_mechanics<C: ConnectionTrait>(db: &C, limit: Option<usize>) -> Result<Vec<PopularMechanic>, ServiceError> {
    let counts: HashMap<i32, i64> = service_mechanic::Entity::find()
        .select_only()
        .column(service_mechanic::Column::MechanicId)
        .column_as(Expr::col(service_mechanic::Column::TicketId).count(), "ticket_count")
        .group_by(service_mechanic::Column::MechanicId)
        .into_tuple::<(i32, i64)>()
        .all(db)
        .await?
        .into_iter()
        .collect();
    let mut ranked: Vec<PopularMechanic> = mechanic::Entity::find()
        .all(db)
        .await?
        .into_iter()
        .map(|m| {
            let ticket_count = counts.get(&m.id).copied().unwrap_or(0).max(0) as u64;
            PopularMechanic { mechanic: m, ticket_count }
        })
        .collect();
    ranked.sort_by(|a, b| b.ticket_count.cmp(&a.ticket_count).then(a.mechanic.id.cmp(&b.mechanic.id)));
    if let Some(n) = limit {
        ranked.truncate(n);
    }
    Ok(ranked)
}
