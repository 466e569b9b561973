use std::sync::Arc;

use chrono::Utc;
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header as JwtHeader, Validation};
use tracing::{debug, info, instrument, warn};

use super::domain::{AuthSession, Claims, LoginInput, Principal, Role};
use super::errors::AuthError;
use super::password::verify_password;
use super::repository::AuthRepository;

/// Auth service configuration
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_secs: u64,
}

/// Auth business service independent of web framework
pub struct AuthService<R: AuthRepository> {
    repo: Arc<R>,
    cfg: AuthConfig,
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl<R: AuthRepository> AuthService<R> {
    pub fn new(repo: Arc<R>, cfg: AuthConfig) -> Self {
        let encoding = EncodingKey::from_secret(cfg.jwt_secret.as_bytes());
        let decoding = DecodingKey::from_secret(cfg.jwt_secret.as_bytes());
        Self { repo, cfg, encoding, decoding }
    }

    pub fn token_ttl_secs(&self) -> u64 { self.cfg.token_ttl_secs }

    /// Authenticate an account of `role` and issue a bearer token.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use service::auth::domain::{LoginInput, Role};
    /// use service::auth::password::hash_password;
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// repo.insert(Role::Mechanic, 7, "max@shop.example", "Max", hash_password("Passw0rd").unwrap()).unwrap();
    /// let svc = AuthService::new(repo, AuthConfig { jwt_secret: "a-long-enough-test-secret".into(), token_ttl_secs: 3600 });
    /// let session = tokio_test::block_on(svc.login(Role::Mechanic, LoginInput { email: "max@shop.example".into(), password: "Passw0rd".into() })).unwrap();
    /// assert_eq!(session.account.id, 7);
    /// let who = svc.verify_token(&session.token).unwrap();
    /// assert_eq!(who.role, Role::Mechanic);
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email, role = %role))]
    pub async fn login(&self, role: Role, input: LoginInput) -> Result<AuthSession, AuthError> {
        let email = input.email.trim();
        if email.is_empty() || input.password.is_empty() {
            return Err(AuthError::Unauthorized);
        }
        let account = match self.repo.find_account_by_email(role, email).await? {
            Some(a) => a,
            None => {
                debug!("no such account");
                return Err(AuthError::Unauthorized);
            }
        };
        let cred = self.repo.get_credentials(role, account.id).await?.ok_or(AuthError::Unauthorized)?;
        if !verify_password(&input.password, &cred.password_hash)? {
            warn!(account_id = account.id, "password mismatch");
            return Err(AuthError::Unauthorized);
        }

        let token = self.issue_token(account.id, role)?;
        info!(account_id = account.id, "login_succeeded");
        Ok(AuthSession { account, token, expires_in: self.cfg.token_ttl_secs })
    }

    /// Sign an HS256 token for `(id, role)` valid for the configured lifetime.
    pub fn issue_token(&self, id: i32, role: Role) -> Result<String, AuthError> {
        let iat = Utc::now().timestamp();
        let ttl = i64::try_from(self.cfg.token_ttl_secs).unwrap_or(i64::MAX);
        let claims = Claims { sub: id.to_string(), role, iat, exp: iat.saturating_add(ttl) };
        self.sign(&claims)
    }

    pub(crate) fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(&JwtHeader::new(Algorithm::HS256), claims, &self.encoding).map_err(|e| AuthError::TokenError(e.to_string()))
    }

    /// Decode and check signature and expiry, returning the subject.
    pub fn verify_token(&self, token: &str) -> Result<Principal, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::Expired,
            _ => AuthError::InvalidToken,
        })?;
        let id = data.claims.sub.parse::<i32>().map_err(|_| AuthError::InvalidToken)?;
        Ok(Principal { id, role: data.claims.role })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::hash_password;
    use crate::auth::repository::mock::MockAuthRepository;

    fn svc() -> AuthService<MockAuthRepository> {
        let repo = Arc::new(MockAuthRepository::default());
        repo.insert(Role::User, 1, "ann@shop.example", "Ann", hash_password("pw-ann-123").unwrap()).unwrap();
        AuthService::new(repo, AuthConfig { jwt_secret: "unit-test-secret-0123456789".into(), token_ttl_secs: 3600 })
    }

    #[tokio::test]
    async fn login_issues_verifiable_token() {
        let s = svc();
        let session = s
            .login(Role::User, LoginInput { email: "ann@shop.example".into(), password: "pw-ann-123".into() })
            .await
            .unwrap();
        assert_eq!(session.expires_in, 3600);
        assert_eq!(s.verify_token(&session.token).unwrap(), Principal { id: 1, role: Role::User });
    }

    #[tokio::test]
    async fn wrong_password_and_wrong_role_are_unauthorized() {
        let s = svc();
        let bad = s.login(Role::User, LoginInput { email: "ann@shop.example".into(), password: "nope".into() }).await;
        assert!(matches!(bad, Err(AuthError::Unauthorized)));
        let other_table = s.login(Role::Mechanic, LoginInput { email: "ann@shop.example".into(), password: "pw-ann-123".into() }).await;
        assert!(matches!(other_table, Err(AuthError::Unauthorized)));
    }

    #[test]
    fn expired_token_is_reported() {
        let s = svc();
        let now = Utc::now().timestamp();
        let token = s.sign(&Claims { sub: "1".into(), role: Role::User, iat: now - 7200, exp: now - 3600 }).unwrap();
        assert!(matches!(s.verify_token(&token), Err(AuthError::Expired)));
    }

    #[test]
    fn tampered_or_foreign_tokens_are_invalid() {
        let s = svc();
        let token = s.issue_token(1, Role::User).unwrap();
        let mut tampered = token.clone();
        tampered.push('x');
        assert!(matches!(s.verify_token(&tampered), Err(AuthError::InvalidToken)));
        assert!(matches!(s.verify_token("not.a.jwt"), Err(AuthError::InvalidToken)));

        let other = AuthService::new(
            Arc::new(MockAuthRepository::default()),
            AuthConfig { jwt_secret: "some-other-secret-abcdefgh".into(), token_ttl_secs: 60 },
        );
        assert!(matches!(other.verify_token(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn non_numeric_subject_rejected() {
        let s = svc();
        let now = Utc::now().timestamp();
        let token = s.sign(&Claims { sub: "ann".into(), role: Role::User, iat: now, exp: now + 60 }).unwrap();
        assert!(matches!(s.verify_token(&token), Err(AuthError::InvalidToken)));
    }
}
