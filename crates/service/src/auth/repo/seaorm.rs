use sea_orm::{DatabaseConnection, EntityTrait};

use models::{customer, mechanic};

use crate::auth::domain::{AuthAccount, Credentials, Role};
use crate::auth::errors::AuthError;
use crate::auth::repository::AuthRepository;

/// Reads login accounts from the `customer` and `mechanic` tables.
#[derive(Clone)]
pub struct SeaOrmAuthRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmAuthRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

#[async_trait::async_trait]
impl AuthRepository for SeaOrmAuthRepository {
    async fn find_account_by_email(&self, role: Role, email: &str) -> Result<Option<AuthAccount>, AuthError> {
        let account = match role {
            Role::User => customer::find_by_email(&self.db, email)
                .await
                .map_err(|e| AuthError::Repository(e.to_string()))?
                .map(|c| AuthAccount { id: c.id, email: c.email, name: c.name, role }),
            Role::Mechanic => mechanic::find_by_email(&self.db, email)
                .await
                .map_err(|e| AuthError::Repository(e.to_string()))?
                .map(|m| AuthAccount { id: m.id, email: m.email, name: m.name, role }),
        };
        Ok(account)
    }

    async fn get_credentials(&self, role: Role, account_id: i32) -> Result<Option<Credentials>, AuthError> {
        let hash = match role {
            Role::User => customer::Entity::find_by_id(account_id)
                .one(&self.db)
                .await
                .map_err(|e| AuthError::Repository(e.to_string()))?
                .map(|c| c.password_hash),
            Role::Mechanic => mechanic::Entity::find_by_id(account_id)
                .one(&self.db)
                .await
                .map_err(|e| AuthError::Repository(e.to_string()))?
                .map(|m| m.password_hash),
        };
        Ok(hash.map(|password_hash| Credentials { account_id, password_hash }))
    }
}
