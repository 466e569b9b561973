use axum::{
    extract::{Query, State},
    http::StatusCode,
    middleware,
    routing::{get, post, put},
    Extension, Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde_json::Value;
use tracing::info;

use common::types::StatusMessage;
use service::auth::domain::LoginInput;
use service::auth::{Principal, Role};
use service::customer_service::{self, CreateCustomer, CustomerSearch, UpdateCustomer};
use service::pagination::Pagination;

use super::{login_as, paged, success};
use crate::errors::JsonApiError;
use crate::extract::{ValidJson, ValidPath};
use crate::middleware::auth::require_customer;
use crate::state::ServerState;

pub fn router(state: &ServerState) -> Router<ServerState> {
    let public = Router::new()
        .route("/customers/", get(list).post(create))
        .route("/customers/login", post(login))
        .route("/customers/search", get(search))
        .route("/customers/:id", get(get_one));

    let owner = Router::new()
        .route("/customers/", put(update_me).delete(delete_me))
        .route("/customers/my-tickets", get(my_tickets))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_customer));

    public.merge(owner)
}

#[utoipa::path(post, path = "/customers/", tag = "customers", request_body = crate::openapi::CreateCustomerDoc,
    responses((status = 201, description = "Created"), (status = 400, description = "Validation error or duplicate email", body = crate::openapi::ErrorResponse)))]
pub async fn create(State(state): State<ServerState>, ValidJson(input): ValidJson<CreateCustomer>) -> Result<(StatusCode, Json<Value>), JsonApiError> {
    let customer = customer_service::create_customer(&state.db, input).await?;
    Ok((StatusCode::CREATED, success("Successfully created customer", "customer", customer)))
}

#[utoipa::path(get, path = "/customers/", tag = "customers", params(crate::openapi::PageParams), responses((status = 200, description = "One page of customers")))]
pub async fn list(State(state): State<ServerState>, Query(opts): Query<Pagination>) -> Result<Json<Value>, JsonApiError> {
    let page = customer_service::list_customers(&state.db, opts).await?;
    Ok(paged("customers", page))
}

#[utoipa::path(get, path = "/customers/{id}", tag = "customers", params(("id" = i32, Path, description = "Customer id")),
    responses((status = 200, description = "Customer"), (status = 404, description = "Invalid customer", body = crate::openapi::ErrorResponse)))]
pub async fn get_one(State(state): State<ServerState>, ValidPath(id): ValidPath<i32>) -> Result<Json<models::customer::Model>, JsonApiError> {
    Ok(Json(customer_service::get_customer(&state.db, id).await?))
}

#[utoipa::path(get, path = "/customers/search", tag = "customers", params(crate::openapi::NameEmailParams),
    responses((status = 200, description = "Matching customers"), (status = 400, description = "No search parameter given")))]
pub async fn search(State(state): State<ServerState>, Query(q): Query<CustomerSearch>) -> Result<Json<Vec<models::customer::Model>>, JsonApiError> {
    Ok(Json(customer_service::search_customers(&state.db, &q).await?))
}

#[utoipa::path(post, path = "/customers/login", tag = "customers", request_body = crate::openapi::LoginRequest,
    responses((status = 200, description = "Token issued"), (status = 401, description = "Invalid email or password!", body = crate::openapi::ErrorResponse)))]
pub async fn login(State(state): State<ServerState>, jar: CookieJar, ValidJson(input): ValidJson<LoginInput>) -> Result<(CookieJar, Json<Value>), JsonApiError> {
    login_as(&state, jar, Role::User, input).await
}

#[utoipa::path(put, path = "/customers/", tag = "customers", request_body = crate::openapi::UpdateCustomerDoc,
    responses((status = 200, description = "Updated"), (status = 401, description = "Missing or bad token")), security(("bearer" = [])))]
pub async fn update_me(
    State(state): State<ServerState>,
    Extension(me): Extension<Principal>,
    ValidJson(input): ValidJson<UpdateCustomer>,
) -> Result<Json<Value>, JsonApiError> {
    let customer = customer_service::update_customer(&state.db, me.id, input).await?;
    Ok(success("Successfully updated customer", "customer", customer))
}

#[utoipa::path(delete, path = "/customers/", tag = "customers",
    responses((status = 200, description = "Deleted"), (status = 401, description = "Missing or bad token")), security(("bearer" = [])))]
pub async fn delete_me(State(state): State<ServerState>, Extension(me): Extension<Principal>) -> Result<Json<StatusMessage>, JsonApiError> {
    let released = customer_service::delete_customer(&state.db, me.id).await?;
    if released > 0 {
        state.inventory.invalidate();
    }
    info!(customer_id = me.id, released, "customer removed");
    Ok(Json(StatusMessage::success(format!("Successfully deleted customer {}", me.id))))
}

#[utoipa::path(get, path = "/customers/my-tickets", tag = "customers",
    responses((status = 200, description = "Tickets owned by the caller")), security(("bearer" = [])))]
pub async fn my_tickets(State(state): State<ServerState>, Extension(me): Extension<Principal>) -> Result<Json<Value>, JsonApiError> {
    let tickets = customer_service::my_tickets(&state.db, me.id).await?;
    Ok(Json(serde_json::json!({ "tickets": tickets })))
}
