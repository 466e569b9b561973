use async_trait::async_trait;

use super::domain::{AuthAccount, Credentials, Role};
use super::errors::AuthError;

/// Repository abstraction for auth-related persistence.
#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn find_account_by_email(&self, role: Role, email: &str) -> Result<Option<AuthAccount>, AuthError>;
    async fn get_credentials(&self, role: Role, account_id: i32) -> Result<Option<Credentials>, AuthError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockAuthRepository {
        accounts: Mutex<HashMap<(Role, String), AuthAccount>>, // key: (role, email)
        creds: Mutex<HashMap<(Role, i32), Credentials>>,       // key: (role, id)
    }

    impl MockAuthRepository {
        /// Register an account with an already-hashed password.
        pub fn insert(&self, role: Role, id: i32, email: &str, name: &str, password_hash: String) -> Result<(), AuthError> {
            let mut accounts = self.accounts.lock().map_err(|e| AuthError::Repository(e.to_string()))?;
            let mut creds = self.creds.lock().map_err(|e| AuthError::Repository(e.to_string()))?;
            accounts.insert((role, email.to_string()), AuthAccount { id, email: email.to_string(), name: name.to_string(), role });
            creds.insert((role, id), Credentials { account_id: id, password_hash });
            Ok(())
        }
    }

    #[async_trait]
    impl AuthRepository for MockAuthRepository {
        async fn find_account_by_email(&self, role: Role, email: &str) -> Result<Option<AuthAccount>, AuthError> {
            let accounts = self.accounts.lock().map_err(|e| AuthError::Repository(e.to_string()))?;
            Ok(accounts.get(&(role, email.to_string())).cloned())
        }

        async fn get_credentials(&self, role: Role, account_id: i32) -> Result<Option<Credentials>, AuthError> {
            let creds = self.creds.lock().map_err(|e| AuthError::Repository(e.to_string()))?;
            Ok(creds.get(&(role, account_id)).cloned())
        }
    }
}
