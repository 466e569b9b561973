//! Priorities, ticket statuses and part categories.
use axum::{extract::State, http::StatusCode, middleware, routing::{get, post}, Json, Router};

use service::reference_service::{self, CreateReference, ReferenceItem, ReferenceKind};

use crate::errors::JsonApiError;
use crate::extract::ValidJson;
use crate::middleware::auth::require_mechanic;
use crate::state::ServerState;

pub fn router(state: &ServerState) -> Router<ServerState> {
    let public = Router::new()
        .route("/priorities/", get(list_priorities))
        .route("/ticket-statuses/", get(list_statuses))
        .route("/categories/", get(list_categories));

    let staff = Router::new()
        .route("/priorities/", post(create_priority))
        .route("/ticket-statuses/", post(create_status))
        .route("/categories/", post(create_category))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_mechanic));

    public.merge(staff)
}

async fn list_kind(state: &ServerState, kind: ReferenceKind) -> Result<Json<Vec<ReferenceItem>>, JsonApiError> {
    Ok(Json(reference_service::list(&state.db, kind).await?))
}

async fn create_kind(state: &ServerState, kind: ReferenceKind, input: CreateReference) -> Result<(StatusCode, Json<ReferenceItem>), JsonApiError> {
    let item = reference_service::create(&state.db, kind, input).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

#[utoipa::path(get, path = "/priorities/", tag = "reference", responses((status = 200, description = "All priorities")))]
pub async fn list_priorities(State(state): State<ServerState>) -> Result<Json<Vec<ReferenceItem>>, JsonApiError> {
    list_kind(&state, ReferenceKind::Priority).await
}

#[utoipa::path(post, path = "/priorities/", tag = "reference", request_body = crate::openapi::CreateReferenceDoc,
    responses((status = 201, description = "Created"), (status = 400, description = "Duplicate name")), security(("bearer" = [])))]
pub async fn create_priority(State(state): State<ServerState>, ValidJson(input): ValidJson<CreateReference>) -> Result<(StatusCode, Json<ReferenceItem>), JsonApiError> {
    create_kind(&state, ReferenceKind::Priority, input).await
}

#[utoipa::path(get, path = "/ticket-statuses/", tag = "reference", responses((status = 200, description = "All ticket statuses")))]
pub async fn list_statuses(State(state): State<ServerState>) -> Result<Json<Vec<ReferenceItem>>, JsonApiError> {
    list_kind(&state, ReferenceKind::TicketStatus).await
}

#[utoipa::path(post, path = "/ticket-statuses/", tag = "reference", request_body = crate::openapi::CreateReferenceDoc,
    responses((status = 201, description = "Created"), (status = 400, description = "Duplicate name")), security(("bearer" = [])))]
pub async fn create_status(State(state): State<ServerState>, ValidJson(input): ValidJson<CreateReference>) -> Result<(StatusCode, Json<ReferenceItem>), JsonApiError> {
    create_kind(&state, ReferenceKind::TicketStatus, input).await
}

#[utoipa::path(get, path = "/categories/", tag = "reference", responses((status = 200, description = "All part categories")))]
pub async fn list_categories(State(state): State<ServerState>) -> Result<Json<Vec<ReferenceItem>>, JsonApiError> {
    list_kind(&state, ReferenceKind::Category).await
}

#[utoipa::path(post, path = "/categories/", tag = "reference", request_body = crate::openapi::CreateReferenceDoc,
    responses((status = 201, description = "Created"), (status = 400, description = "Duplicate name")), security(("bearer" = [])))]
pub async fn create_category(State(state): State<ServerState>, ValidJson(input): ValidJson<CreateReference>) -> Result<(StatusCode, Json<ReferenceItem>), JsonApiError> {
    create_kind(&state, ReferenceKind::Category, input).await
}
