use std::collections::BTreeMap;

use models::errors::ModelError;
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("validation error on fields")]
    Fields(BTreeMap<String, Vec<String>>),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("database error: {0}")]
    Db(String),
    #[error("internal error: {0}")]
    Internal(String),
    #[error("model error: {0}")]
    Model(#[from] ModelError),
}

impl ServiceError {
    pub fn not_found(msg: impl Into<String>) -> Self { Self::NotFound(msg.into()) }
    pub fn conflict(msg: impl Into<String>) -> Self { Self::Conflict(msg.into()) }
    pub fn validation(msg: impl Into<String>) -> Self { Self::Validation(msg.into()) }

    /// Text safe to hand back to a client. Database details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            ServiceError::Validation(m) | ServiceError::NotFound(m) | ServiceError::Conflict(m) => m.clone(),
            ServiceError::Fields(_) | ServiceError::Model(ModelError::Fields(_)) => "Validation failed.".to_string(),
            ServiceError::Model(ModelError::Validation(m)) => m.clone(),
            ServiceError::Db(_) | ServiceError::Internal(_) | ServiceError::Model(ModelError::Db(_)) => "Internal server error.".to_string(),
        }
    }

    /// Field map for validation failures, if any.
    pub fn field_errors(&self) -> Option<&BTreeMap<String, Vec<String>>> {
        match self {
            ServiceError::Fields(map) | ServiceError::Model(ModelError::Fields(map)) => Some(map),
            _ => None,
        }
    }

    /// Map a unique-index violation to `Conflict(msg)`, anything else to `Db`.
    pub fn from_unique(e: DbErr, msg: &str) -> Self {
        match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => ServiceError::Conflict(msg.to_string()),
            _ => ServiceError::Db(e.to_string()),
        }
    }
}

impl From<DbErr> for ServiceError {
    fn from(e: DbErr) -> Self {
        ServiceError::Db(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_message_hides_db_details() {
        let e = ServiceError::Db("relation \"customer\" does not exist".into());
        assert_eq!(e.public_message(), "Internal server error.");
        let e = ServiceError::conflict("Mechanic already assigned to this ticket.");
        assert_eq!(e.public_message(), "Mechanic already assigned to this ticket.");
    }

    #[test]
    fn model_field_errors_surface() {
        let mut map = BTreeMap::new();
        map.insert("email".to_string(), vec!["Not a valid email address.".to_string()]);
        let e: ServiceError = ModelError::Fields(map).into();
        assert!(e.field_errors().is_some_and(|m| m.contains_key("email")));
    }
}
