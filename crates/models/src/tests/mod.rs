/// CRUD and uniqueness checks for the shop entities
pub mod crud_tests;


use chrono::{NaiveDate, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

use crate::{customer, db, mechanic, part_description, serialized_part, service_ticket};

pub(crate) async fn setup() -> anyhow::Result<DatabaseConnection> {
    let db = db::connect_memory().await?;
    db::run_migrations(&db).await?;
    Ok(db)
}

pub(crate) async fn insert_customer(db: &DatabaseConnection, email: &str) -> anyhow::Result<customer::Model> {
    let now = Utc::now().into();
    let am = customer::ActiveModel {
        name: Set("Ann Driver".into()),
        email: Set(email.into()),
        phone: Set("555-0100".into()),
        password_hash: Set("$argon2id$placeholder".into()),
        address: Set(None),
        image: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    Ok(am.insert(db).await?)
}

pub(crate) async fn insert_mechanic(db: &DatabaseConnection, email: &str) -> anyhow::Result<mechanic::Model> {
    let now = Utc::now().into();
    let am = mechanic::ActiveModel {
        name: Set("Max Wrench".into()),
        email: Set(email.into()),
        password_hash: Set("$argon2id$placeholder".into()),
        phone: Set("555-0199".into()),
        salary: Set(52000.0),
        address: Set(None),
        image: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    Ok(am.insert(db).await?)
}

pub(crate) async fn insert_ticket(db: &DatabaseConnection, customer_id: i32) -> anyhow::Result<service_ticket::Model> {
    let now = Utc::now().into();
    let status = crate::ticket_status::find_by_name(db, "open").await?.ok_or_else(|| anyhow::anyhow!("status seed missing"))?;
    let priority = crate::priority::find_by_name(db, "normal").await?.ok_or_else(|| anyhow::anyhow!("priority seed missing"))?;
    let am = service_ticket::ActiveModel {
        customer_id: Set(customer_id),
        vin: Set("1HGCM82633A004352".into()),
        status_id: Set(status.id),
        priority_id: Set(priority.id),
        service_date: Set(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap_or_default()),
        completion_date: Set(None),
        service_desc: Set("Brake inspection".into()),
        estimated_cost: Set(None),
        actual_cost: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    Ok(am.insert(db).await?)
}

pub(crate) async fn insert_description(db: &DatabaseConnection, name: &str) -> anyhow::Result<part_description::Model> {
    let now = Utc::now().into();
    let am = part_description::ActiveModel {
        name: Set(name.into()),
        brand: Set("Bosch".into()),
        price: Set(99.99),
        category_id: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    Ok(am.insert(db).await?)
}

pub(crate) async fn insert_unit(db: &DatabaseConnection, desc_id: i32) -> anyhow::Result<serialized_part::Model> {
    let now = Utc::now().into();
    let am = serialized_part::ActiveModel {
        desc_id: Set(desc_id),
        ticket_id: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    Ok(am.insert(db).await?)
}
