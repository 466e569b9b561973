#![cfg(test)]
use chrono::NaiveDate;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

use models::{customer, db, mechanic, part_description, priority, serialized_part, service_ticket, ticket_status};

// Each test gets its own private in-memory database with the seeded lookup rows.
pub async fn get_db() -> Result<DatabaseConnection, anyhow::Error> {
    let db = db::connect_memory().await?;
    db::run_migrations(&db).await?;
    Ok(db)
}

// Placeholder hashes keep fixtures fast; login tests hash for real.
pub async fn seed_customer(db: &DatabaseConnection, email: &str) -> anyhow::Result<customer::Model> {
    let now = crate::now();
    Ok(customer::ActiveModel {
        name: Set("Ann Driver".into()),
        email: Set(email.to_lowercase()),
        phone: Set("555-0100".into()),
        password_hash: Set("$argon2id$placeholder".into()),
        address: Set(None),
        image: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?)
}

pub async fn seed_mechanic(db: &DatabaseConnection, email: &str) -> anyhow::Result<mechanic::Model> {
    let now = crate::now();
    Ok(mechanic::ActiveModel {
        name: Set("Max Wrench".into()),
        email: Set(email.to_lowercase()),
        password_hash: Set("$argon2id$placeholder".into()),
        phone: Set("555-0199".into()),
        salary: Set(52000.0),
        address: Set(None),
        image: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?)
}

pub async fn seed_ticket(db: &DatabaseConnection, customer_id: i32) -> anyhow::Result<service_ticket::Model> {
    let status = ticket_status::find_by_name(db, "open")
        .await?
        .ok_or_else(|| anyhow::anyhow!("status seed missing"))?;
    let prio = priority::find_by_name(db, "normal")
        .await?
        .ok_or_else(|| anyhow::anyhow!("priority seed missing"))?;
    let service_date = NaiveDate::from_ymd_opt(2024, 3, 1).ok_or_else(|| anyhow::anyhow!("bad date"))?;
    let now = crate::now();
    Ok(service_ticket::ActiveModel {
        customer_id: Set(customer_id),
        vin: Set("1HGCM82633A004352".into()),
        status_id: Set(status.id),
        priority_id: Set(prio.id),
        service_date: Set(service_date),
        completion_date: Set(None),
        service_desc: Set("Brake inspection".into()),
        estimated_cost: Set(None),
        actual_cost: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?)
}

pub async fn seed_description(db: &DatabaseConnection, name: &str, price: f64) -> anyhow::Result<part_description::Model> {
    let now = crate::now();
    Ok(part_description::ActiveModel {
        name: Set(name.into()),
        brand: Set("Bosch".into()),
        price: Set(price),
        category_id: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?)
}

/// Inserts `n` in-stock units; returned in ascending id order.
pub async fn seed_units(db: &DatabaseConnection, desc_id: i32, n: usize) -> anyhow::Result<Vec<serialized_part::Model>> {
    let mut out = Vec::with_capacity(n);
    for _ in 0..n {
        let now = crate::now();
        let unit = serialized_part::ActiveModel {
            desc_id: Set(desc_id),
            ticket_id: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await?;
        out.push(unit);
    }
    Ok(out)
}
