use axum::{
    extract::{Query, State},
    http::StatusCode,
    middleware,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::info;

use common::types::StatusMessage;
use service::pagination::Pagination;
use service::tickets::assignment::{self, CartRequest};
use service::tickets::ticket_service::{self, TicketView};
use service::tickets::{CreateTicket, EditMechanics, UpdateTicket};

use super::paged;
use crate::errors::JsonApiError;
use crate::extract::{OptionalJson, ValidJson, ValidPath};
use crate::middleware::auth::require_mechanic;
use crate::state::ServerState;

pub fn router(state: &ServerState) -> Router<ServerState> {
    let public = Router::new()
        .route("/service-tickets/", get(list))
        .route("/service-tickets/:id", get(get_one));

    let staff = Router::new()
        .route("/service-tickets/", post(create))
        .route("/service-tickets/:id", put(update).delete(remove))
        .route("/service-tickets/:id/add-mechanic/:mechanic_id", put(add_mechanic))
        .route("/service-tickets/:id/remove-mechanic/:mechanic_id", put(remove_mechanic))
        .route("/service-tickets/:id/edit-mechanics", put(edit_mechanics))
        .route("/service-tickets/:id/add-part/:part_id", put(add_part))
        .route("/service-tickets/:id/remove-part/:part_id", put(remove_part))
        .route("/service-tickets/:id/add-to-cart/:desc_id", put(add_to_cart))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_mechanic));

    public.merge(staff)
}

fn with_ticket(message: String, ticket: TicketView) -> Json<Value> {
    Json(json!({ "status": "success", "message": message, "ticket": ticket }))
}

#[utoipa::path(post, path = "/service-tickets/", tag = "tickets", request_body = crate::openapi::CreateTicketDoc,
    responses((status = 201, description = "Created"), (status = 400, description = "Invalid customer/mechanic id or missing field", body = crate::openapi::ErrorResponse)),
    security(("bearer" = [])))]
pub async fn create(State(state): State<ServerState>, ValidJson(input): ValidJson<CreateTicket>) -> Result<(StatusCode, Json<TicketView>), JsonApiError> {
    let ticket = ticket_service::create_ticket(&state.db, input).await?;
    Ok((StatusCode::CREATED, Json(ticket)))
}

#[utoipa::path(get, path = "/service-tickets/", tag = "tickets", params(crate::openapi::PageParams), responses((status = 200, description = "One page of tickets")))]
pub async fn list(State(state): State<ServerState>, Query(opts): Query<Pagination>) -> Result<Json<Value>, JsonApiError> {
    let page = ticket_service::list_tickets(&state.db, opts).await?;
    Ok(paged("tickets", page))
}

#[utoipa::path(get, path = "/service-tickets/{id}", tag = "tickets", params(("id" = i32, Path, description = "Ticket id")),
    responses((status = 200, description = "Ticket with customer, crew and parts"), (status = 404, description = "Service ticket not found")))]
pub async fn get_one(State(state): State<ServerState>, ValidPath(id): ValidPath<i32>) -> Result<Json<TicketView>, JsonApiError> {
    Ok(Json(ticket_service::get_ticket(&state.db, id).await?))
}

#[utoipa::path(put, path = "/service-tickets/{id}", tag = "tickets", params(("id" = i32, Path, description = "Ticket id")),
    request_body = crate::openapi::CreateTicketDoc,
    responses((status = 200, description = "Updated"), (status = 404, description = "Service ticket not found")), security(("bearer" = [])))]
pub async fn update(
    State(state): State<ServerState>,
    ValidPath(id): ValidPath<i32>,
    ValidJson(input): ValidJson<UpdateTicket>,
) -> Result<Json<TicketView>, JsonApiError> {
    Ok(Json(ticket_service::update_ticket(&state.db, id, input).await?))
}

#[utoipa::path(delete, path = "/service-tickets/{id}", tag = "tickets", params(("id" = i32, Path, description = "Ticket id")),
    responses((status = 200, description = "Deleted; its parts return to stock"), (status = 404, description = "Service ticket not found")),
    security(("bearer" = [])))]
pub async fn remove(State(state): State<ServerState>, ValidPath(id): ValidPath<i32>) -> Result<Json<StatusMessage>, JsonApiError> {
    let released = ticket_service::delete_ticket(&state.db, id).await?;
    if released > 0 {
        state.inventory.invalidate();
    }
    info!(ticket_id = id, released, "ticket removed");
    Ok(Json(StatusMessage::success("Service ticket deleted successfully")))
}

#[utoipa::path(put, path = "/service-tickets/{id}/add-mechanic/{mechanic_id}", tag = "tickets",
    params(("id" = i32, Path, description = "Ticket id"), ("mechanic_id" = i32, Path, description = "Mechanic id")),
    responses((status = 200, description = "Mechanic added"), (status = 400, description = "Mechanic already assigned to this ticket."),
        (status = 404, description = "Service ticket or mechanic not found.")),
    security(("bearer" = [])))]
pub async fn add_mechanic(State(state): State<ServerState>, ValidPath((id, mechanic_id)): ValidPath<(i32, i32)>) -> Result<Json<Value>, JsonApiError> {
    let mechanic = assignment::add_mechanic(&state.db, id, mechanic_id).await?;
    let ticket = ticket_service::get_ticket(&state.db, id).await?;
    Ok(with_ticket(format!("Mechanic {} successfully added to ticket", mechanic.name), ticket))
}

#[utoipa::path(put, path = "/service-tickets/{id}/remove-mechanic/{mechanic_id}", tag = "tickets",
    params(("id" = i32, Path, description = "Ticket id"), ("mechanic_id" = i32, Path, description = "Mechanic id")),
    responses((status = 200, description = "Mechanic removed"), (status = 400, description = "Mechanic not included on this ticket."),
        (status = 404, description = "Service ticket or mechanic not found.")),
    security(("bearer" = [])))]
pub async fn remove_mechanic(State(state): State<ServerState>, ValidPath((id, mechanic_id)): ValidPath<(i32, i32)>) -> Result<Json<Value>, JsonApiError> {
    let mechanic = assignment::remove_mechanic(&state.db, id, mechanic_id).await?;
    let ticket = ticket_service::get_ticket(&state.db, id).await?;
    Ok(with_ticket(format!("Mechanic {} successfully removed from ticket", mechanic.name), ticket))
}

#[utoipa::path(put, path = "/service-tickets/{id}/edit-mechanics", tag = "tickets", params(("id" = i32, Path, description = "Ticket id")),
    request_body = crate::openapi::EditMechanicsDoc,
    responses((status = 200, description = "Crew updated"), (status = 400, description = "An id was already assigned, not included, or in both lists"),
        (status = 404, description = "Ticket or a mechanic id not found")),
    security(("bearer" = [])))]
pub async fn edit_mechanics(
    State(state): State<ServerState>,
    ValidPath(id): ValidPath<i32>,
    ValidJson(edit): ValidJson<EditMechanics>,
) -> Result<Json<Value>, JsonApiError> {
    let ticket = assignment::edit_mechanics(&state.db, id, edit).await?;
    Ok(with_ticket("Mechanics successfully updated".to_string(), ticket))
}

#[utoipa::path(put, path = "/service-tickets/{id}/add-part/{part_id}", tag = "tickets",
    params(("id" = i32, Path, description = "Ticket id"), ("part_id" = i32, Path, description = "Serialized part id")),
    responses((status = 200, description = "Part allocated"), (status = 400, description = "Part already assigned to a ticket."),
        (status = 404, description = "Invalid ticket_id or part_id.")),
    security(("bearer" = [])))]
pub async fn add_part(State(state): State<ServerState>, ValidPath((id, part_id)): ValidPath<(i32, i32)>) -> Result<Json<Value>, JsonApiError> {
    let change = assignment::add_part(&state.db, id, part_id).await?;
    state.inventory.invalidate();
    let ticket = ticket_service::get_ticket(&state.db, id).await?;
    Ok(with_ticket(format!("Part {} successfully added to ticket", change.name()), ticket))
}

#[utoipa::path(put, path = "/service-tickets/{id}/remove-part/{part_id}", tag = "tickets",
    params(("id" = i32, Path, description = "Ticket id"), ("part_id" = i32, Path, description = "Serialized part id")),
    responses((status = 200, description = "Part returned to stock"), (status = 400, description = "Serialized part not included to this ticket."),
        (status = 404, description = "Service ticket or serialized part not found.")),
    security(("bearer" = [])))]
pub async fn remove_part(State(state): State<ServerState>, ValidPath((id, part_id)): ValidPath<(i32, i32)>) -> Result<Json<Value>, JsonApiError> {
    let change = assignment::remove_part(&state.db, id, part_id).await?;
    state.inventory.invalidate();
    let ticket = ticket_service::get_ticket(&state.db, id).await?;
    Ok(with_ticket(format!("Part {} successfully removed from ticket", change.name()), ticket))
}

#[utoipa::path(put, path = "/service-tickets/{id}/add-to-cart/{desc_id}", tag = "tickets",
    params(("id" = i32, Path, description = "Ticket id"), ("desc_id" = i32, Path, description = "Part description id")),
    request_body(content = crate::openapi::CartRequestDoc, description = "Optional; quantity defaults to 1"),
    responses((status = 200, description = "Units allocated"), (status = 400, description = "Only N stock(s) available for this part."),
        (status = 404, description = "Ticket or part description not found")),
    security(("bearer" = [])))]
pub async fn add_to_cart(
    State(state): State<ServerState>,
    ValidPath((id, desc_id)): ValidPath<(i32, i32)>,
    OptionalJson(cart): OptionalJson<CartRequest>,
) -> Result<Json<Value>, JsonApiError> {
    let units = assignment::add_to_cart(&state.db, id, desc_id, cart.quantity).await?;
    state.inventory.invalidate();
    let ticket = ticket_service::get_ticket(&state.db, id).await?;
    Ok(with_ticket(format!("{} part(s) successfully added to cart", units.len()), ticket))
}
