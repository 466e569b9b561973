use std::fmt;

use serde::{Deserialize, Serialize};

/// Who a token was issued to. Customers carry `user`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Mechanic,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Mechanic => "mechanic",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JWT payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

/// Authenticated subject bound into the request context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub id: i32,
    pub role: Role,
}

/// Login input
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Business view of a login-capable account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthAccount {
    pub id: i32,
    pub email: String,
    pub name: String,
    pub role: Role,
}

/// Stored credentials (hashed)
#[derive(Debug, Clone)]
pub struct Credentials {
    pub account_id: i32,
    pub password_hash: String,
}

/// Login result (session)
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    pub account: AuthAccount,
    pub token: String,
    pub expires_in: u64,
}
