//! Argon2id password hashing.
//!
//! Hashes are stored as PHC strings (`$argon2id$v=19$...`), which carry
//! their own salt and parameters.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

use crate::error::TradeHubError;

/// Hashes `password` with a fresh random salt.
///
/// # Errors
///
/// Returns [`TradeHubError::Internal`] if the hasher rejects its input.
pub fn hash_password(password: &str) -> Result<String, TradeHubError> {
    let salt = SaltString::encode_b64(uuid::Uuid::new_v4().as_bytes())
        .map_err(|e| TradeHubError::Internal(format!("salt generation failed: {e}")))?;
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| TradeHubError::Internal(format!("password hashing failed: {e}")))
}

/// Checks `password` against a stored PHC string.
///
/// # Errors
///
/// Returns [`TradeHubError::Internal`] if `stored` is not a valid PHC
/// string. A wrong password is `Ok(false)`, not an error.
pub fn verify_password(password: &str, stored: &str) -> Result<bool, TradeHubError> {
    let parsed = PasswordHash::new(stored)
        .map_err(|e| TradeHubError::Internal(format!("stored password hash is invalid: {e}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let Ok(hash) = hash_password("correct horse") else {
            panic!("hashing failed");
        };
        assert!(hash.starts_with("$argon2id$"));
        assert!(matches!(verify_password("correct horse", &hash), Ok(true)));
        assert!(matches!(verify_password("wrong horse", &hash), Ok(false)));
    }

    #[test]
    fn salts_differ() {
        let (Ok(a), Ok(b)) = (hash_password("same"), hash_password("same")) else {
            panic!("hashing failed");
        };
        assert_ne!(a, b);
    }

    #[test]
    fn garbage_hash_is_error() {
        assert!(verify_password("x", "not-a-phc-string").is_err());
    }
}
