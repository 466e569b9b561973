use axum::{
    extract::{Query, State},
    http::StatusCode,
    middleware,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::Value;

use common::types::StatusMessage;
use service::pagination::Pagination;
use service::part_description_service::{self, CreatePartDescription, PartSearch, UpdatePartDescription};

use super::{paged, success};
use crate::errors::JsonApiError;
use crate::extract::{ValidJson, ValidPath};
use crate::middleware::auth::require_mechanic;
use crate::state::ServerState;

pub fn router(state: &ServerState) -> Router<ServerState> {
    let public = Router::new()
        .route("/part-descriptions/", get(list))
        .route("/part-descriptions/search", get(search))
        .route("/part-descriptions/:id", get(get_one));

    let staff = Router::new()
        .route("/part-descriptions/", post(create))
        .route("/part-descriptions/:id", put(update).delete(remove))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_mechanic));

    public.merge(staff)
}

#[utoipa::path(post, path = "/part-descriptions/", tag = "parts", request_body = crate::openapi::CreatePartDescriptionDoc,
    responses((status = 201, description = "Created"), (status = 400, description = "Validation error", body = crate::openapi::ErrorResponse)), security(("bearer" = [])))]
pub async fn create(State(state): State<ServerState>, ValidJson(input): ValidJson<CreatePartDescription>) -> Result<(StatusCode, Json<Value>), JsonApiError> {
    let desc = part_description_service::create_part_description(&state.db, input).await?;
    state.inventory.invalidate();
    Ok((StatusCode::CREATED, success("Successfully created part description", "part_description", desc)))
}

#[utoipa::path(get, path = "/part-descriptions/", tag = "parts", params(crate::openapi::PageParams), responses((status = 200, description = "One page of part descriptions")))]
pub async fn list(State(state): State<ServerState>, Query(opts): Query<Pagination>) -> Result<Json<Value>, JsonApiError> {
    let page = part_description_service::list_part_descriptions(&state.db, opts).await?;
    Ok(paged("items", page))
}

#[utoipa::path(get, path = "/part-descriptions/{id}", tag = "parts", params(("id" = i32, Path, description = "Part description id")),
    responses((status = 200, description = "Part description"), (status = 404, description = "Invalid part description", body = crate::openapi::ErrorResponse)))]
pub async fn get_one(State(state): State<ServerState>, ValidPath(id): ValidPath<i32>) -> Result<Json<models::part_description::Model>, JsonApiError> {
    Ok(Json(part_description_service::get_part_description(&state.db, id).await?))
}

#[utoipa::path(get, path = "/part-descriptions/search", tag = "parts", params(crate::openapi::NameBrandParams),
    responses((status = 200, description = "Matching part descriptions"), (status = 400, description = "No search parameter given")))]
pub async fn search(State(state): State<ServerState>, Query(q): Query<PartSearch>) -> Result<Json<Vec<models::part_description::Model>>, JsonApiError> {
    Ok(Json(part_description_service::search_part_descriptions(&state.db, &q).await?))
}

#[utoipa::path(put, path = "/part-descriptions/{id}", tag = "parts", params(("id" = i32, Path, description = "Part description id")),
    request_body = crate::openapi::UpdatePartDescriptionDoc,
    responses((status = 200, description = "Updated"), (status = 404, description = "Part description not found")), security(("bearer" = [])))]
pub async fn update(
    State(state): State<ServerState>,
    ValidPath(id): ValidPath<i32>,
    ValidJson(input): ValidJson<UpdatePartDescription>,
) -> Result<Json<Value>, JsonApiError> {
    let desc = part_description_service::update_part_description(&state.db, id, input).await?;
    state.inventory.invalidate();
    Ok(success("Successfully updated part description", "part_description", desc))
}

#[utoipa::path(delete, path = "/part-descriptions/{id}", tag = "parts", params(("id" = i32, Path, description = "Part description id")),
    responses((status = 200, description = "Deleted"), (status = 400, description = "Serialized parts still reference it"), (status = 404, description = "Part description not found")),
    security(("bearer" = [])))]
pub async fn remove(State(state): State<ServerState>, ValidPath(id): ValidPath<i32>) -> Result<Json<StatusMessage>, JsonApiError> {
    part_description_service::delete_part_description(&state.db, id).await?;
    state.inventory.invalidate();
    Ok(Json(StatusMessage::success("Successfully deleted part description")))
}
