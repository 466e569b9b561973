use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("validation error: {0}")]
    Validation(String),
    /// Field-keyed validation messages, e.g. `{"email": ["Not a valid email address."]}`.
    #[error("validation error on fields: {}", .0.keys().cloned().collect::<Vec<_>>().join(", "))]
    Fields(BTreeMap<String, Vec<String>>),
    #[error("database error: {0}")]
    Db(String),
}

impl From<sea_orm::DbErr> for ModelError {
    fn from(e: sea_orm::DbErr) -> Self {
        ModelError::Db(e.to_string())
    }
}
