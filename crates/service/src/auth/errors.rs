use thiserror::Error;

/// Business errors for auth workflows. Display text is what clients see.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),
    #[error("Invalid email or password!")]
    Unauthorized,
    #[error("Token is missing!")]
    MissingToken,
    #[error("Token has expired!")]
    Expired,
    #[error("Invalid token!")]
    InvalidToken,
    #[error("You do not have permission to access this resource.")]
    Forbidden,
    #[error("hashing error: {0}")]
    HashError(String),
    #[error("token error: {0}")]
    TokenError(String),
    #[error("repository error: {0}")]
    Repository(String),
}

impl AuthError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            AuthError::Validation(_) => 1001,
            AuthError::Unauthorized => 1004,
            AuthError::MissingToken => 1005,
            AuthError::Expired => 1006,
            AuthError::InvalidToken => 1007,
            AuthError::Forbidden => 1008,
            AuthError::HashError(_) => 1101,
            AuthError::TokenError(_) => 1102,
            AuthError::Repository(_) => 1200,
        }
    }

    /// Internal failures are not the caller's fault.
    pub fn is_internal(&self) -> bool {
        matches!(self, AuthError::HashError(_) | AuthError::TokenError(_) | AuthError::Repository(_))
    }
}
