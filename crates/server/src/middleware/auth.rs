//! Access gate: resolves the bearer token (header, then `auth_token` cookie)
//! into a [`Principal`] and checks its role before the handler runs.
use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::warn;

use service::auth::errors::AuthError;
use service::auth::{Principal, Role};

use crate::errors::JsonApiError;
use crate::state::ServerState;

pub const AUTH_COOKIE: &str = "auth_token";

fn bearer_token(headers: &HeaderMap) -> Result<String, AuthError> {
    if let Some(value) = headers.get(AUTHORIZATION) {
        let value = value.to_str().map_err(|_| AuthError::InvalidToken)?;
        let token = value.strip_prefix("Bearer ").ok_or(AuthError::InvalidToken)?.trim();
        if token.is_empty() {
            return Err(AuthError::MissingToken);
        }
        return Ok(token.to_string());
    }
    CookieJar::from_headers(headers)
        .get(AUTH_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::MissingToken)
}

async fn gate(state: &ServerState, role: Role, mut req: Request, next: Next) -> Result<Response, JsonApiError> {
    let path = req.uri().path().to_owned();
    let principal = bearer_token(req.headers())
        .and_then(|token| state.auth.verify_token(&token))
        .inspect_err(|e| warn!(%path, error = %e, "token rejected"))?;
    if principal.role != role {
        warn!(%path, subject = principal.id, have = %principal.role, need = %role, "role mismatch");
        return Err(AuthError::Forbidden.into());
    }
    req.extensions_mut().insert::<Principal>(principal);
    Ok(next.run(req).await)
}

/// Only tokens issued to customers pass.
pub async fn require_customer(State(state): State<ServerState>, req: Request, next: Next) -> Result<Response, JsonApiError> {
    gate(&state, Role::User, req, next).await
}

/// Only tokens issued to mechanics pass.
pub async fn require_mechanic(State(state): State<ServerState>, req: Request, next: Next) -> Result<Response, JsonApiError> {
    gate(&state, Role::Mechanic, req, next).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn header_wins_over_cookie() {
        let mut h = HeaderMap::new();
        h.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        h.insert("cookie", HeaderValue::from_static("auth_token=zzz"));
        assert_eq!(bearer_token(&h).unwrap(), "abc");
    }

    #[test]
    fn cookie_fallback_and_missing() {
        let mut h = HeaderMap::new();
        h.insert("cookie", HeaderValue::from_static("theme=dark; auth_token=zzz"));
        assert_eq!(bearer_token(&h).unwrap(), "zzz");
        assert!(matches!(bearer_token(&HeaderMap::new()), Err(AuthError::MissingToken)));
    }

    #[test]
    fn non_bearer_scheme_is_invalid() {
        let mut h = HeaderMap::new();
        h.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwdw=="));
        assert!(matches!(bearer_token(&h), Err(AuthError::InvalidToken)));
    }
}
