use std::collections::BTreeMap;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

use service::auth::errors::AuthError;
use service::errors::ServiceError;

/// Error body shared by every endpoint: `{"status": "error", "message", "errors"?}`.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub message: String,
    pub errors: Option<BTreeMap<String, Vec<String>>>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    status: &'static str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<&'a BTreeMap<String, Vec<String>>>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into(), errors: None }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn with_errors(mut self, errors: BTreeMap<String, Vec<String>>) -> Self {
        self.errors = Some(errors);
        self
    }

    /// One message against one field, the shape body decoding failures use.
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = BTreeMap::new();
        errors.insert(field.into(), vec![message.into()]);
        Self::bad_request("Validation failed.").with_errors(errors)
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody { status: "error", message: &self.message, errors: self.errors.as_ref() };
        (self.status, Json(body)).into_response()
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        let status = match &e {
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Validation(_) | ServiceError::Fields(_) | ServiceError::Conflict(_) => StatusCode::BAD_REQUEST,
            ServiceError::Model(models::errors::ModelError::Db(_)) | ServiceError::Db(_) | ServiceError::Internal(_) => {
                error!(error = %e, "request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ServiceError::Model(_) => StatusCode::BAD_REQUEST,
        };
        let err = JsonApiError::new(status, e.public_message());
        match e.field_errors() {
            Some(fields) => err.with_errors(fields.clone()),
            None => err,
        }
    }
}

impl From<AuthError> for JsonApiError {
    fn from(e: AuthError) -> Self {
        if e.is_internal() {
            error!(error = %e, code = e.code(), "auth failure");
            return JsonApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error.");
        }
        let status = match e {
            AuthError::Validation(_) => StatusCode::BAD_REQUEST,
            AuthError::Forbidden => StatusCode::FORBIDDEN,
            _ => StatusCode::UNAUTHORIZED,
        };
        JsonApiError::new(status, e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_errors_map_to_status_codes() {
        let nf: JsonApiError = ServiceError::not_found("Invalid customer").into();
        assert_eq!(nf.status, StatusCode::NOT_FOUND);
        assert_eq!(nf.message, "Invalid customer");

        let conflict: JsonApiError = ServiceError::conflict("Mechanic already assigned to this ticket.").into();
        assert_eq!(conflict.status, StatusCode::BAD_REQUEST);

        let db: JsonApiError = ServiceError::Db("connection reset".into()).into();
        assert_eq!(db.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(db.message, "Internal server error.");
    }

    #[test]
    fn field_errors_are_carried() {
        let mut map = BTreeMap::new();
        map.insert("email".to_string(), vec!["Not a valid email address.".to_string()]);
        let e: JsonApiError = ServiceError::Fields(map).into();
        assert_eq!(e.status, StatusCode::BAD_REQUEST);
        assert!(e.errors.as_ref().is_some_and(|m| m.contains_key("email")));
    }

    #[test]
    fn auth_errors_map_to_401_and_403() {
        let e: JsonApiError = AuthError::Expired.into();
        assert_eq!(e.status, StatusCode::UNAUTHORIZED);
        assert_eq!(e.message, "Token has expired!");
        let f: JsonApiError = AuthError::Forbidden.into();
        assert_eq!(f.status, StatusCode::FORBIDDEN);
        let r: JsonApiError = AuthError::Repository("pool closed".into()).into();
        assert_eq!(r.status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
