//! Service layer for the shop: business rules on top of the `models` entities.
//! - Customers, mechanics, tickets and the parts inventory.
//! - Credential checks and bearer tokens live in [`auth`].
//! - Errors are reported as [`errors::ServiceError`]; the HTTP layer maps them.

pub mod errors;
pub mod pagination;
pub mod search;
pub mod auth;
pub mod inventory;
pub mod tickets;
pub mod customer_service;
pub mod mechanic_service;
pub mod part_description_service;
pub mod serialized_part_service;
pub mod reference_service;
#[cfg(test)]
pub mod test_support;

use sea_orm::prelude::DateTimeWithTimeZone;

/// Timestamp written to `created_at` / `updated_at` columns.
pub(crate) fn now() -> DateTimeWithTimeZone {
    chrono::Utc::now().into()
}
