use std::sync::Arc;
use std::time::Duration;

use sea_orm::DatabaseConnection;

use configs::AppConfig;
use service::auth::repo::seaorm::SeaOrmAuthRepository;
use service::auth::service::{AuthConfig, AuthService};
use service::inventory::cache::InventoryCache;

use crate::middleware::rate_limit::RateLimiter;

#[derive(Clone)]
pub struct ServerState {
    pub db: DatabaseConnection,
    pub auth: Arc<AuthService<SeaOrmAuthRepository>>,
    pub inventory: InventoryCache,
    pub limiter: RateLimiter,
}

impl ServerState {
    pub fn new(db: DatabaseConnection, cfg: &AppConfig) -> Self {
        let repo = Arc::new(SeaOrmAuthRepository::new(db.clone()));
        let auth = AuthService::new(
            repo,
            AuthConfig { jwt_secret: cfg.auth.jwt_secret.clone(), token_ttl_secs: cfg.auth.token_ttl_secs },
        );
        Self {
            db,
            auth: Arc::new(auth),
            inventory: InventoryCache::new(Duration::from_secs(cfg.inventory.cache_ttl_secs)),
            limiter: RateLimiter::from_config(&cfg.rate_limit),
        }
    }
}
