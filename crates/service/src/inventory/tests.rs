use sea_orm::{EntityTrait, TransactionTrait};

use super::*;
use crate::test_support::{get_db, seed_customer, seed_description, seed_ticket, seed_units};

#[tokio::test]
async fn allocate_then_release_moves_stock() -> anyhow::Result<()> {
    let db = get_db().await?;
    let customer = seed_customer(&db, "inv1@shop.example").await?;
    let ticket = seed_ticket(&db, customer.id).await?;
    let desc = seed_description(&db, "Brake Pad", 99.99).await?;
    let units = seed_units(&db, desc.id, 2).await?;

    assert_eq!(available_count(&db, desc.id).await?, 2);
    let part = allocate(&db, ticket.id, units[0].id).await?;
    assert_eq!(part.ticket_id, Some(ticket.id));
    assert_eq!(available_count(&db, desc.id).await?, 1);

    let again = allocate(&db, ticket.id, units[0].id).await;
    assert!(matches!(again, Err(ServiceError::Conflict(m)) if m == MSG_PART_TAKEN));

    let back = deallocate(&db, ticket.id, units[0].id).await?;
    assert!(back.is_available());
    assert_eq!(available_count(&db, desc.id).await?, 2);
    Ok(())
}

#[tokio::test]
async fn deallocate_from_wrong_ticket_conflicts() -> anyhow::Result<()> {
    let db = get_db().await?;
    let customer = seed_customer(&db, "inv2@shop.example").await?;
    let t1 = seed_ticket(&db, customer.id).await?;
    let t2 = seed_ticket(&db, customer.id).await?;
    let desc = seed_description(&db, "Rotor", 120.0).await?;
    let units = seed_units(&db, desc.id, 1).await?;

    allocate(&db, t1.id, units[0].id).await?;
    let wrong = deallocate(&db, t2.id, units[0].id).await;
    assert!(matches!(wrong, Err(ServiceError::Conflict(m)) if m == MSG_PART_NOT_ON_TICKET));
    let still = serialized_part::Entity::find_by_id(units[0].id).one(&db).await?;
    assert_eq!(still.and_then(|p| p.ticket_id), Some(t1.id));
    Ok(())
}

#[tokio::test]
async fn missing_ids_are_not_found() -> anyhow::Result<()> {
    let db = get_db().await?;
    let customer = seed_customer(&db, "inv3@shop.example").await?;
    let ticket = seed_ticket(&db, customer.id).await?;
    assert!(matches!(allocate(&db, ticket.id, 999).await, Err(ServiceError::NotFound(_))));
    assert!(matches!(deallocate(&db, 999, 1).await, Err(ServiceError::NotFound(_))));
    assert!(matches!(available_count(&db, 999).await, Err(ServiceError::NotFound(_))));
    assert!(matches!(allocate_batch(&db, ticket.id, 999, 1).await, Err(ServiceError::NotFound(m)) if m == MSG_BAD_TICKET_OR_DESC));
    Ok(())
}

#[tokio::test]
async fn batch_takes_lowest_ids_first() -> anyhow::Result<()> {
    let db = get_db().await?;
    let customer = seed_customer(&db, "inv4@shop.example").await?;
    let ticket = seed_ticket(&db, customer.id).await?;
    let desc = seed_description(&db, "Spark Plug", 8.5).await?;
    let units = seed_units(&db, desc.id, 4).await?;

    let txn = db.begin().await?;
    let got = allocate_batch(&txn, ticket.id, desc.id, 3).await?;
    txn.commit().await?;

    let ids: Vec<i32> = got.iter().map(|p| p.id).collect();
    assert_eq!(ids, units[..3].iter().map(|u| u.id).collect::<Vec<_>>());
    assert!(got.iter().all(|p| p.ticket_id == Some(ticket.id)));
    assert_eq!(available_count(&db, desc.id).await?, 1);
    Ok(())
}

#[tokio::test]
async fn short_batch_leaves_state_unchanged() -> anyhow::Result<()> {
    let db = get_db().await?;
    let customer = seed_customer(&db, "inv5@shop.example").await?;
    let ticket = seed_ticket(&db, customer.id).await?;
    let desc = seed_description(&db, "Brake Pad", 99.99).await?;
    seed_units(&db, desc.id, 2).await?;

    let txn = db.begin().await?;
    allocate_batch(&txn, ticket.id, desc.id, 1).await?;
    txn.commit().await?;

    let txn = db.begin().await?;
    let err = allocate_batch(&txn, ticket.id, desc.id, 4).await;
    drop(txn);
    match err {
        Err(ServiceError::Conflict(m)) => assert_eq!(m, "Only 1 stock(s) available for this part."),
        other => panic!("unexpected: {other:?}"),
    }
    assert_eq!(available_count(&db, desc.id).await?, 1);
    Ok(())
}

#[tokio::test]
async fn zero_quantity_rejected() -> anyhow::Result<()> {
    let db = get_db().await?;
    assert!(matches!(allocate_batch(&db, 1, 1, 0).await, Err(ServiceError::Validation(_))));
    Ok(())
}

#[tokio::test]
async fn report_counts_only_free_units() -> anyhow::Result<()> {
    let db = get_db().await?;
    let customer = seed_customer(&db, "inv6@shop.example").await?;
    let ticket = seed_ticket(&db, customer.id).await?;
    let pads = seed_description(&db, "Brake Pad", 99.99).await?;
    let empty = seed_description(&db, "Wiper", 15.0).await?;
    let units = seed_units(&db, pads.id, 3).await?;
    allocate(&db, ticket.id, units[1].id).await?;

    let report = stock_report(&db).await?;
    let by_id: HashMap<i32, u64> = report.iter().map(|l| (l.description.id, l.stock)).collect();
    assert_eq!(by_id[&pads.id], 2);
    assert_eq!(by_id[&empty.id], 0);

    let item = stock_for(&db, pads.id).await?;
    assert_eq!(item.item, "Brake Pad");
    assert_eq!(item.stock, 2);
    Ok(())
}

#[tokio::test]
async fn release_all_returns_every_unit() -> anyhow::Result<()> {
    let db = get_db().await?;
    let customer = seed_customer(&db, "inv7@shop.example").await?;
    let ticket = seed_ticket(&db, customer.id).await?;
    let desc = seed_description(&db, "Filter", 12.0).await?;
    seed_units(&db, desc.id, 2).await?;
    allocate_batch(&db, ticket.id, desc.id, 2).await?;
    assert_eq!(release_all(&db, ticket.id).await?, 2);
    assert_eq!(available_count(&db, desc.id).await?, 2);
    Ok(())
}

#[tokio::test]
async fn cache_serves_stale_until_invalidated() -> anyhow::Result<()> {
    let db = get_db().await?;
    let desc = seed_description(&db, "Belt", 30.0).await?;
    seed_units(&db, desc.id, 1).await?;
    let cache = InventoryCache::new(std::time::Duration::from_secs(60));

    assert_eq!(cache.item(&db, desc.id).await?.stock, 1);
    seed_units(&db, desc.id, 1).await?;
    assert_eq!(cache.item(&db, desc.id).await?.stock, 1);
    cache.invalidate();
    assert_eq!(cache.item(&db, desc.id).await?.stock, 2);
    assert_eq!(cache.report(&db).await?.len(), 1);

    let off = InventoryCache::new(std::time::Duration::ZERO);
    seed_units(&db, desc.id, 1).await?;
    assert_eq!(off.item(&db, desc.id).await?.stock, 3);
    Ok(())
}
