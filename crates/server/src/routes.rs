pub mod customers;
pub mod mechanics;
pub mod part_descriptions;
pub mod reference;
pub mod serialized_parts;
pub mod service_tickets;

use axum::{
    http::header::CONTENT_TYPE,
    middleware,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Serialize;
use serde_json::{json, Value};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::{metrics::encode_metrics, types::Health};
use service::auth::domain::LoginInput;
use service::auth::Role;
use service::pagination::Page;

use crate::errors::JsonApiError;
use crate::middleware::{auth::AUTH_COOKIE, rate_limit::limit_writes, record_request};
use crate::openapi::ApiDoc;
use crate::state::ServerState;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

pub async fn metrics() -> impl IntoResponse {
    let (code, body) = encode_metrics();
    (code, [(CONTENT_TYPE, "text/plain; version=0.0.4")], body)
}

/// `{<key>: [...], total, page, per_page, pages}`
pub(crate) fn paged<T: Serialize>(key: &str, page: Page<T>) -> Json<Value> {
    Json(json!({
        key: page.items,
        "total": page.total,
        "page": page.page,
        "per_page": page.per_page,
        "pages": page.pages,
    }))
}

/// `{"status": "success", "message", <key>: item}`
pub(crate) fn success<T: Serialize>(message: impl Into<String>, key: &str, item: T) -> Json<Value> {
    Json(json!({ "status": "success", "message": message.into(), key: item }))
}

/// Shared by the customer and mechanic login endpoints: token in the body
/// and in an HttpOnly cookie.
pub(crate) async fn login_as(
    state: &ServerState,
    jar: CookieJar,
    role: Role,
    input: LoginInput,
) -> Result<(CookieJar, Json<Value>), JsonApiError> {
    let session = state.auth.login(role, input).await?;
    let mut cookie = Cookie::new(AUTH_COOKIE, session.token.clone());
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_secure(false);
    cookie.set_same_site(SameSite::Lax);
    let body = json!({
        "status": "success",
        "message": "Successfully logged in",
        "token": session.token,
        "expires_in": session.expires_in,
        "account": session.account,
    });
    Ok((jar.add(cookie), Json(body)))
}

/// Build the full application router: resource routes behind the write
/// limiter, plus health, metrics and API docs.
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    let api = Router::new()
        .merge(customers::router(&state))
        .merge(mechanics::router(&state))
        .merge(part_descriptions::router(&state))
        .merge(serialized_parts::router(&state))
        .merge(service_tickets::router(&state))
        .merge(reference::router(&state))
        .route_layer(middleware::from_fn_with_state(state.clone(), limit_writes));

    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .merge(api)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
        .layer(middleware::from_fn(record_request))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
