use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, SqlErr,
};
use serde::Deserialize;
use tracing::{info, instrument};

use models::validate::Validator;
use models::{category, part_description, serialized_part};

use crate::errors::ServiceError;
use crate::pagination::{fetch_page, Page, Pagination};
use crate::search::contains_any;

pub const MSG_INVALID: &str = "Invalid part description";
pub const MSG_NOT_FOUND: &str = "Part description not found";
pub const MSG_HAS_UNITS: &str = "Cannot delete: related serialized parts exist.";
pub const MSG_SEARCH_NEEDS_FILTER: &str = "Please provide a name or brand to search";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreatePartDescription {
    pub name: String,
    pub brand: String,
    pub price: f64,
    #[serde(default)]
    pub category_id: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdatePartDescription {
    pub name: Option<String>,
    pub brand: Option<String>,
    pub price: Option<f64>,
    pub category_id: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PartSearch {
    pub name: Option<String>,
    pub brand: Option<String>,
}

async fn ensure_category<C: ConnectionTrait>(db: &C, id: Option<i32>) -> Result<(), ServiceError> {
    if let Some(id) = id {
        category::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::validation("Invalid category id"))?;
    }
    Ok(())
}

#[instrument(skip(db, input), fields(name = %input.name))]
pub async fn create_part_description(db: &DatabaseConnection, input: CreatePartDescription) -> Result<part_description::Model, ServiceError> {
    let mut v = Validator::new();
    v.text("name", &input.name, 255).text("brand", &input.brand, 255).non_negative("price", input.price);
    v.finish()?;
    ensure_category(db, input.category_id).await?;

    let now = crate::now();
    let created = part_description::ActiveModel {
        name: Set(input.name.trim().to_string()),
        brand: Set(input.brand.trim().to_string()),
        price: Set(input.price),
        category_id: Set(input.category_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;
    info!(desc_id = created.id, "part_description_created");
    Ok(created)
}

pub async fn get_part_description<C: ConnectionTrait>(db: &C, id: i32) -> Result<part_description::Model, ServiceError> {
    part_description::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found(MSG_INVALID))
}

pub async fn list_part_descriptions<C: ConnectionTrait>(db: &C, opts: Pagination) -> Result<Page<part_description::Model>, ServiceError> {
    fetch_page(db, part_description::Entity::find().order_by_asc(part_description::Column::Id), opts).await
}

pub async fn search_part_descriptions<C: ConnectionTrait>(db: &C, q: &PartSearch) -> Result<Vec<part_description::Model>, ServiceError> {
    let cond = contains_any(&[
        (part_description::Column::Name, q.name.as_deref()),
        (part_description::Column::Brand, q.brand.as_deref()),
    ])
    .ok_or_else(|| ServiceError::validation(MSG_SEARCH_NEEDS_FILTER))?;
    Ok(part_description::Entity::find()
        .filter(cond)
        .order_by_asc(part_description::Column::Id)
        .all(db)
        .await?)
}

#[instrument(skip(db, input))]
pub async fn update_part_description(
    db: &DatabaseConnection,
    id: i32,
    input: UpdatePartDescription,
) -> Result<part_description::Model, ServiceError> {
    let mut v = Validator::new();
    v.opt_text("name", input.name.as_deref(), 255).opt_text("brand", input.brand.as_deref(), 255);
    if let Some(p) = input.price {
        v.non_negative("price", p);
    }
    v.finish()?;

    let existing = part_description::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found(MSG_NOT_FOUND))?;
    ensure_category(db, input.category_id).await?;

    let mut am: part_description::ActiveModel = existing.into();
    if let Some(name) = input.name {
        am.name = Set(name.trim().to_string());
    }
    if let Some(brand) = input.brand {
        am.brand = Set(brand.trim().to_string());
    }
    if let Some(price) = input.price {
        am.price = Set(price);
    }
    if input.category_id.is_some() {
        am.category_id = Set(input.category_id);
    }
    am.updated_at = Set(crate::now());
    Ok(am.update(db).await?)
}

/// Refused while any serialized unit still points at the description.
#[instrument(skip(db))]
pub async fn delete_part_description(db: &DatabaseConnection, id: i32) -> Result<(), ServiceError> {
    part_description::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found(MSG_NOT_FOUND))?;
    let units = serialized_part::Entity::find()
        .filter(serialized_part::Column::DescId.eq(id))
        .count(db)
        .await?;
    if units > 0 {
        return Err(ServiceError::conflict(MSG_HAS_UNITS));
    }
    part_description::Entity::delete_by_id(id).exec(db).await.map_err(map_fk)?;
    info!(desc_id = id, "part_description_deleted");
    Ok(())
}

// A unit inserted between the count and the delete trips the foreign key.
fn map_fk(e: DbErr) -> ServiceError {
    match e.sql_err() {
        Some(SqlErr::ForeignKeyConstraintViolation(_)) => ServiceError::conflict(MSG_HAS_UNITS),
        _ => e.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{get_db, seed_units};

    fn pad() -> CreatePartDescription {
        CreatePartDescription { name: "Brake Pad".into(), brand: "Bosch".into(), price: 99.99, category_id: None }
    }

    #[tokio::test]
    async fn delete_blocked_while_units_exist() -> anyhow::Result<()> {
        let db = get_db().await?;
        let d = create_part_description(&db, pad()).await?;
        seed_units(&db, d.id, 1).await?;
        let res = delete_part_description(&db, d.id).await;
        assert!(matches!(res, Err(ServiceError::Conflict(m)) if m == MSG_HAS_UNITS));
        assert!(get_part_description(&db, d.id).await.is_ok());

        let lone = create_part_description(&db, pad()).await?;
        delete_part_description(&db, lone.id).await?;
        assert!(matches!(get_part_description(&db, lone.id).await, Err(ServiceError::NotFound(m)) if m == MSG_INVALID));
        Ok(())
    }

    #[tokio::test]
    async fn search_by_brand_or_name() -> anyhow::Result<()> {
        let db = get_db().await?;
        create_part_description(&db, pad()).await?;
        create_part_description(&db, CreatePartDescription { name: "Oil Filter".into(), brand: "Mann".into(), price: 11.0, category_id: None }).await?;
        let by_brand = search_part_descriptions(&db, &PartSearch { name: None, brand: Some("mann".into()) }).await?;
        assert_eq!(by_brand.len(), 1);
        let either = search_part_descriptions(&db, &PartSearch { name: Some("pad".into()), brand: Some("mann".into()) }).await?;
        assert_eq!(either.len(), 2);
        let none = search_part_descriptions(&db, &PartSearch::default()).await;
        assert!(matches!(none, Err(ServiceError::Validation(m)) if m == MSG_SEARCH_NEEDS_FILTER));
        Ok(())
    }

    #[tokio::test]
    async fn update_price_and_reject_unknown_category() -> anyhow::Result<()> {
        let db = get_db().await?;
        let d = create_part_description(&db, pad()).await?;
        let upd = update_part_description(&db, d.id, UpdatePartDescription { price: Some(89.5), ..Default::default() }).await?;
        assert_eq!(upd.price, 89.5);
        assert_eq!(upd.name, "Brake Pad");
        let bad = update_part_description(&db, d.id, UpdatePartDescription { category_id: Some(77), ..Default::default() }).await;
        assert!(matches!(bad, Err(ServiceError::Validation(_))));
        let missing = update_part_description(&db, 999, UpdatePartDescription::default()).await;
        assert!(matches!(missing, Err(ServiceError::NotFound(m)) if m == MSG_NOT_FOUND));
        Ok(())
    }

    #[tokio::test]
    async fn negative_price_rejected() -> anyhow::Result<()> {
        let db = get_db().await?;
        let mut p = pad();
        p.price = -5.0;
        let err = create_part_description(&db, p).await.unwrap_err();
        assert!(err.field_errors().is_some_and(|f| f.contains_key("price")));
        Ok(())
    }
}
