use sea_orm::{ActiveModelTrait, EntityTrait, IntoActiveModel, Set};

use super::*;
use crate::{customer, mechanic, priority, ticket_status};

#[tokio::test]
async fn customer_insert_and_lookup_by_email() -> anyhow::Result<()> {
    let db = setup().await?;
    let created = insert_customer(&db, "ann@shop.example").await?;
    assert!(created.id > 0);

    let found = customer::find_by_email(&db, " ann@shop.example ").await?;
    assert_eq!(found.map(|c| c.id), Some(created.id));
    assert!(customer::find_by_email(&db, "nobody@shop.example").await?.is_none());
    Ok(())
}

#[tokio::test]
async fn duplicate_email_hits_unique_index() -> anyhow::Result<()> {
    let db = setup().await?;
    insert_mechanic(&db, "max@shop.example").await?;
    let err = insert_mechanic(&db, "max@shop.example").await;
    assert!(err.is_err());
    assert_eq!(mechanic::Entity::find().all(&db).await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn password_hash_never_serialized() -> anyhow::Result<()> {
    let db = setup().await?;
    let c = insert_customer(&db, "hidden@shop.example").await?;
    let json = serde_json::to_value(&c)?;
    assert!(json.get("password_hash").is_none());
    assert_eq!(json["email"], "hidden@shop.example");
    Ok(())
}

#[tokio::test]
async fn seeded_reference_rows_present() -> anyhow::Result<()> {
    let db = setup().await?;
    assert!(ticket_status::find_by_name(&db, "open").await?.is_some());
    assert!(ticket_status::find_by_name(&db, "closed").await?.is_some());
    assert!(priority::find_by_name(&db, "normal").await?.is_some());
    assert_eq!(priority::Entity::find().all(&db).await?.len(), 4);
    Ok(())
}

#[tokio::test]
async fn partial_update_keeps_untouched_columns() -> anyhow::Result<()> {
    let db = setup().await?;
    let c = insert_customer(&db, "upd@shop.example").await?;
    let mut am = c.clone().into_active_model();
    am.phone = Set("555-0123".into());
    let updated = am.update(&db).await?;
    assert_eq!(updated.phone, "555-0123");
    assert_eq!(updated.name, c.name);
    assert_eq!(updated.email, c.email);
    Ok(())
}
