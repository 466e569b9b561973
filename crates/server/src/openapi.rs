//! OpenAPI document served at `/docs`. The `*Doc` types mirror the request
//! bodies the handlers decode.
use std::collections::BTreeMap;

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{IntoParams, Modify, OpenApi, ToSchema};

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct ErrorResponse {
    #[schema(example = "error")]
    pub status: String,
    pub message: String,
    pub errors: Option<BTreeMap<String, Vec<String>>>,
}

#[derive(ToSchema)]
pub struct LoginRequest { pub email: String, pub password: String }

#[derive(ToSchema)]
pub struct CreateCustomerDoc {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub address: Option<String>,
    pub image: Option<String>,
}

#[derive(ToSchema)]
pub struct UpdateCustomerDoc {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
    pub address: Option<String>,
    pub image: Option<String>,
}

#[derive(ToSchema)]
pub struct CreateMechanicDoc {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
    pub salary: f64,
    pub address: Option<String>,
    pub image: Option<String>,
}

#[derive(ToSchema)]
pub struct UpdateMechanicDoc {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone: Option<String>,
    pub salary: Option<f64>,
    pub address: Option<String>,
    pub image: Option<String>,
}

#[derive(ToSchema)]
pub struct CreatePartDescriptionDoc {
    #[schema(example = "Brake Pad")]
    pub name: String,
    pub brand: String,
    #[schema(example = 99.99)]
    pub price: f64,
    pub category_id: Option<i32>,
}

#[derive(ToSchema)]
pub struct UpdatePartDescriptionDoc {
    pub name: Option<String>,
    pub brand: Option<String>,
    pub price: Option<f64>,
    pub category_id: Option<i32>,
}

#[derive(ToSchema)]
pub struct SerializedPartDoc { pub desc_id: i32 }

#[derive(ToSchema)]
pub struct CreateTicketDoc {
    pub customer_id: i32,
    #[schema(example = "1HGCM82633A004352")]
    pub vin: String,
    #[schema(example = "2024-03-01")]
    pub service_date: String,
    pub service_desc: String,
    pub mechanic_ids: Option<Vec<i32>>,
    pub status_id: Option<i32>,
    pub priority_id: Option<i32>,
    pub completion_date: Option<String>,
    pub estimated_cost: Option<f64>,
    pub actual_cost: Option<f64>,
}

#[derive(ToSchema)]
pub struct EditMechanicsDoc {
    pub add_mechanic_ids: Vec<i32>,
    pub remove_mechanic_ids: Vec<i32>,
}

#[derive(ToSchema)]
pub struct CartRequestDoc {
    #[schema(example = 1)]
    pub quantity: Option<u64>,
}

#[derive(ToSchema)]
pub struct CreateReferenceDoc { pub name: String, pub description: Option<String> }

#[derive(IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageParams {
    /// 1-based page, default 1
    pub page: Option<u64>,
    /// default 10, max 100
    pub per_page: Option<u64>,
}

#[derive(IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NameEmailParams { pub name: Option<String>, pub email: Option<String> }

#[derive(IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NameBrandParams { pub name: Option<String>, pub brand: Option<String> }

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).bearer_format("JWT").build()),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::customers::create,
        crate::routes::customers::list,
        crate::routes::customers::get_one,
        crate::routes::customers::search,
        crate::routes::customers::login,
        crate::routes::customers::update_me,
        crate::routes::customers::delete_me,
        crate::routes::customers::my_tickets,
        crate::routes::mechanics::create,
        crate::routes::mechanics::list,
        crate::routes::mechanics::get_one,
        crate::routes::mechanics::search,
        crate::routes::mechanics::popular,
        crate::routes::mechanics::login,
        crate::routes::mechanics::update_me,
        crate::routes::mechanics::delete_me,
        crate::routes::mechanics::my_tickets,
        crate::routes::part_descriptions::create,
        crate::routes::part_descriptions::list,
        crate::routes::part_descriptions::get_one,
        crate::routes::part_descriptions::search,
        crate::routes::part_descriptions::update,
        crate::routes::part_descriptions::remove,
        crate::routes::serialized_parts::create,
        crate::routes::serialized_parts::list,
        crate::routes::serialized_parts::get_one,
        crate::routes::serialized_parts::update,
        crate::routes::serialized_parts::remove,
        crate::routes::serialized_parts::inventory,
        crate::routes::serialized_parts::inventory_item,
        crate::routes::service_tickets::create,
        crate::routes::service_tickets::list,
        crate::routes::service_tickets::get_one,
        crate::routes::service_tickets::update,
        crate::routes::service_tickets::remove,
        crate::routes::service_tickets::add_mechanic,
        crate::routes::service_tickets::remove_mechanic,
        crate::routes::service_tickets::edit_mechanics,
        crate::routes::service_tickets::add_part,
        crate::routes::service_tickets::remove_part,
        crate::routes::service_tickets::add_to_cart,
        crate::routes::reference::list_priorities,
        crate::routes::reference::create_priority,
        crate::routes::reference::list_statuses,
        crate::routes::reference::create_status,
        crate::routes::reference::list_categories,
        crate::routes::reference::create_category,
    ),
    components(
        schemas(
            HealthResponse,
            ErrorResponse,
            LoginRequest,
            CreateCustomerDoc,
            UpdateCustomerDoc,
            CreateMechanicDoc,
            UpdateMechanicDoc,
            CreatePartDescriptionDoc,
            UpdatePartDescriptionDoc,
            SerializedPartDoc,
            CreateTicketDoc,
            EditMechanicsDoc,
            CartRequestDoc,
            CreateReferenceDoc,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health"),
        (name = "customers"),
        (name = "mechanics"),
        (name = "parts"),
        (name = "tickets"),
        (name = "reference")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_core_paths() {
        let doc = ApiDoc::openapi();
        for p in ["/service-tickets/{id}/add-to-cart/{desc_id}", "/serialized_parts/inventory", "/customers/login"] {
            assert!(doc.paths.paths.contains_key(p), "missing {p}");
        }
    }
}
