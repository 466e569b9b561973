use argon2::{password_hash::{PasswordHasher, PasswordVerifier, SaltString}, Argon2, PasswordHash};
use rand::rngs::OsRng;

use super::errors::AuthError;

/// Argon2id PHC string with a fresh random salt.
pub fn hash_password(plain: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| AuthError::HashError(e.to_string()))?
        .to_string();
    Ok(hash)
}

pub fn verify_password(plain: &str, stored: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(stored).map_err(|e| AuthError::HashError(e.to_string()))?;
    Ok(Argon2::default().verify_password(plain.as_bytes(), &parsed).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let h = hash_password("hunter22").unwrap();
        assert!(h.starts_with("$argon2"));
        assert!(verify_password("hunter22", &h).unwrap());
        assert!(!verify_password("hunter23", &h).unwrap());
    }

    #[test]
    fn salts_differ() {
        assert_ne!(hash_password("same").unwrap(), hash_password("same").unwrap());
    }

    #[test]
    fn garbage_hash_is_an_error() {
        assert!(matches!(verify_password("x", "not-a-phc-string"), Err(AuthError::HashError(_))));
    }
}
