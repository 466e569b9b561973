use axum::{
    extract::{Query, State},
    http::StatusCode,
    middleware,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::Value;

use common::types::StatusMessage;
use service::inventory::{ItemStock, StockLine};
use service::pagination::Pagination;
use service::serialized_part_service::{self, CreateSerializedPart, UpdateSerializedPart};

use super::{paged, success};
use crate::errors::JsonApiError;
use crate::extract::{ValidJson, ValidPath};
use crate::middleware::auth::require_mechanic;
use crate::state::ServerState;

pub fn router(state: &ServerState) -> Router<ServerState> {
    let public = Router::new()
        .route("/serialized_parts/", get(list))
        .route("/serialized_parts/inventory", get(inventory))
        .route("/serialized_parts/inventory/:desc_id", get(inventory_item))
        .route("/serialized_parts/:id", get(get_one));

    let staff = Router::new()
        .route("/serialized_parts/", post(create))
        .route("/serialized_parts/:id", put(update).delete(remove))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_mechanic));

    public.merge(staff)
}

#[utoipa::path(post, path = "/serialized_parts/", tag = "parts", request_body = crate::openapi::SerializedPartDoc,
    responses((status = 201, description = "Created in stock"), (status = 400, description = "Invalid part description id")), security(("bearer" = [])))]
pub async fn create(State(state): State<ServerState>, ValidJson(input): ValidJson<CreateSerializedPart>) -> Result<(StatusCode, Json<Value>), JsonApiError> {
    let part = serialized_part_service::create_serialized_part(&state.db, input).await?;
    state.inventory.invalidate();
    Ok((StatusCode::CREATED, success("Successfully created serialized part", "serialized_part", part)))
}

#[utoipa::path(get, path = "/serialized_parts/", tag = "parts", params(crate::openapi::PageParams), responses((status = 200, description = "One page of serialized parts")))]
pub async fn list(State(state): State<ServerState>, Query(opts): Query<Pagination>) -> Result<Json<Value>, JsonApiError> {
    let page = serialized_part_service::list_serialized_parts(&state.db, opts).await?;
    Ok(paged("serialized_parts", page))
}

#[utoipa::path(get, path = "/serialized_parts/{id}", tag = "parts", params(("id" = i32, Path, description = "Serialized part id")),
    responses((status = 200, description = "Serialized part"), (status = 404, description = "Serialized part not found")))]
pub async fn get_one(State(state): State<ServerState>, ValidPath(id): ValidPath<i32>) -> Result<Json<models::serialized_part::Model>, JsonApiError> {
    Ok(Json(serialized_part_service::get_serialized_part(&state.db, id).await?))
}

#[utoipa::path(put, path = "/serialized_parts/{id}", tag = "parts", params(("id" = i32, Path, description = "Serialized part id")),
    request_body = crate::openapi::SerializedPartDoc,
    responses((status = 200, description = "Updated"), (status = 400, description = "Part is on a ticket"), (status = 404, description = "Serialized part not found")),
    security(("bearer" = [])))]
pub async fn update(
    State(state): State<ServerState>,
    ValidPath(id): ValidPath<i32>,
    ValidJson(input): ValidJson<UpdateSerializedPart>,
) -> Result<Json<Value>, JsonApiError> {
    let part = serialized_part_service::update_serialized_part(&state.db, id, input).await?;
    state.inventory.invalidate();
    Ok(success("Successfully updated serialized part", "serialized_part", part))
}

#[utoipa::path(delete, path = "/serialized_parts/{id}", tag = "parts", params(("id" = i32, Path, description = "Serialized part id")),
    responses((status = 200, description = "Deleted"), (status = 400, description = "Part is on a ticket"), (status = 404, description = "Serialized part not found")),
    security(("bearer" = [])))]
pub async fn remove(State(state): State<ServerState>, ValidPath(id): ValidPath<i32>) -> Result<Json<StatusMessage>, JsonApiError> {
    serialized_part_service::delete_serialized_part(&state.db, id).await?;
    state.inventory.invalidate();
    Ok(Json(StatusMessage::success("Successfully deleted serialized part")))
}

#[utoipa::path(get, path = "/serialized_parts/inventory", tag = "parts", responses((status = 200, description = "In-stock count per part description")))]
pub async fn inventory(State(state): State<ServerState>) -> Result<Json<Vec<StockLine>>, JsonApiError> {
    let report = state.inventory.report(&state.db).await?;
    Ok(Json(report.to_vec()))
}

#[utoipa::path(get, path = "/serialized_parts/inventory/{desc_id}", tag = "parts", params(("desc_id" = i32, Path, description = "Part description id")),
    responses((status = 200, description = "{item, stock}"), (status = 404, description = "Part description not found")))]
pub async fn inventory_item(State(state): State<ServerState>, ValidPath(desc_id): ValidPath<i32>) -> Result<Json<ItemStock>, JsonApiError> {
    Ok(Json(state.inventory.item(&state.db, desc_id).await?))
}
