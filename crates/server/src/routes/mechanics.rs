use axum::{
    extract::{Query, State},
    http::StatusCode,
    middleware,
    routing::{get, post, put},
    Extension, Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use common::types::StatusMessage;
use service::auth::domain::LoginInput;
use service::auth::{Principal, Role};
use service::mechanic_service::{self, CreateMechanic, MechanicSearch, PopularMechanic, UpdateMechanic};
use service::pagination::Pagination;

use super::{login_as, paged, success};
use crate::errors::JsonApiError;
use crate::extract::{ValidJson, ValidPath};
use crate::middleware::auth::require_mechanic;
use crate::state::ServerState;

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PopularQuery {
    /// Cap on the number of mechanics returned
    pub limit: Option<usize>,
}

pub fn router(state: &ServerState) -> Router<ServerState> {
    let public = Router::new()
        .route("/mechanics/", get(list).post(create))
        .route("/mechanics/login", post(login))
        .route("/mechanics/search", get(search))
        .route("/mechanics/popular", get(popular))
        .route("/mechanics/:id", get(get_one));

    let owner = Router::new()
        .route("/mechanics/", put(update_me).delete(delete_me))
        .route("/mechanics/my-tickets", get(my_tickets))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_mechanic));

    public.merge(owner)
}

#[utoipa::path(post, path = "/mechanics/", tag = "mechanics", request_body = crate::openapi::CreateMechanicDoc,
    responses((status = 201, description = "Created"), (status = 400, description = "Validation error or duplicate email", body = crate::openapi::ErrorResponse)))]
pub async fn create(State(state): State<ServerState>, ValidJson(input): ValidJson<CreateMechanic>) -> Result<(StatusCode, Json<Value>), JsonApiError> {
    let mechanic = mechanic_service::create_mechanic(&state.db, input).await?;
    Ok((StatusCode::CREATED, success("Successfully created mechanic", "mechanic", mechanic)))
}

#[utoipa::path(get, path = "/mechanics/", tag = "mechanics", params(crate::openapi::PageParams), responses((status = 200, description = "One page of mechanics")))]
pub async fn list(State(state): State<ServerState>, Query(opts): Query<Pagination>) -> Result<Json<Value>, JsonApiError> {
    let page = mechanic_service::list_mechanics(&state.db, opts).await?;
    Ok(paged("mechanics", page))
}

#[utoipa::path(get, path = "/mechanics/{id}", tag = "mechanics", params(("id" = i32, Path, description = "Mechanic id")),
    responses((status = 200, description = "Mechanic"), (status = 404, description = "Invalid mechanic", body = crate::openapi::ErrorResponse)))]
pub async fn get_one(State(state): State<ServerState>, ValidPath(id): ValidPath<i32>) -> Result<Json<models::mechanic::Model>, JsonApiError> {
    Ok(Json(mechanic_service::get_mechanic(&state.db, id).await?))
}

#[utoipa::path(get, path = "/mechanics/search", tag = "mechanics", params(crate::openapi::NameEmailParams),
    responses((status = 200, description = "Matching mechanics"), (status = 400, description = "No search parameter given")))]
pub async fn search(State(state): State<ServerState>, Query(q): Query<MechanicSearch>) -> Result<Json<Vec<models::mechanic::Model>>, JsonApiError> {
    Ok(Json(mechanic_service::search_mechanics(&state.db, &q).await?))
}

#[utoipa::path(get, path = "/mechanics/popular", tag = "mechanics", params(PopularQuery),
    responses((status = 200, description = "Mechanics ordered by ticket count, busiest first")))]
pub async fn popular(State(state): State<ServerState>, Query(q): Query<PopularQuery>) -> Result<Json<Vec<PopularMechanic>>, JsonApiError> {
    Ok(Json(mechanic_service::popular_mechanics(&state.db, q.limit).await?))
}

#[utoipa::path(post, path = "/mechanics/login", tag = "mechanics", request_body = crate::openapi::LoginRequest,
    responses((status = 200, description = "Token issued"), (status = 401, description = "Invalid email or password!", body = crate::openapi::ErrorResponse)))]
pub async fn login(State(state): State<ServerState>, jar: CookieJar, ValidJson(input): ValidJson<LoginInput>) -> Result<(CookieJar, Json<Value>), JsonApiError> {
    login_as(&state, jar, Role::Mechanic, input).await
}

#[utoipa::path(put, path = "/mechanics/", tag = "mechanics", request_body = crate::openapi::UpdateMechanicDoc,
    responses((status = 200, description = "Updated"), (status = 401, description = "Missing or bad token")), security(("bearer" = [])))]
pub async fn update_me(
    State(state): State<ServerState>,
    Extension(me): Extension<Principal>,
    ValidJson(input): ValidJson<UpdateMechanic>,
) -> Result<Json<Value>, JsonApiError> {
    let mechanic = mechanic_service::update_mechanic(&state.db, me.id, input).await?;
    Ok(success("Successfully updated mechanic", "mechanic", mechanic))
}

#[utoipa::path(delete, path = "/mechanics/", tag = "mechanics",
    responses((status = 200, description = "Deleted"), (status = 401, description = "Missing or bad token")), security(("bearer" = [])))]
pub async fn delete_me(State(state): State<ServerState>, Extension(me): Extension<Principal>) -> Result<Json<StatusMessage>, JsonApiError> {
    mechanic_service::delete_mechanic(&state.db, me.id).await?;
    info!(mechanic_id = me.id, "mechanic removed");
    Ok(Json(StatusMessage::success(format!("Successfully deleted mechanic {}", me.id))))
}

#[utoipa::path(get, path = "/mechanics/my-tickets", tag = "mechanics",
    responses((status = 200, description = "Tickets the caller is assigned to")), security(("bearer" = [])))]
pub async fn my_tickets(State(state): State<ServerState>, Extension(me): Extension<Principal>) -> Result<Json<Value>, JsonApiError> {
    let tickets = mechanic_service::my_tickets(&state.db, me.id).await?;
    Ok(Json(json!({ "tickets": tickets })))
}
