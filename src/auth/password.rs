use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};

use crate::error::{AppError, AuthError};
use crate::Result;

/// Hash a password with Argon2id and a fresh random salt, producing a PHC
/// string. Verification reads the parameters back out of the string, so
/// both stores and the workflow share one algorithm.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Auth(AuthError::HashFormat(e.to_string())))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored PHC string. A malformed stored hash
/// is an internal failure, not a credential mismatch.
pub fn verify_password(password_hash: &str, password: &str) -> Result<bool> {
    let parsed = PasswordHash::new(password_hash)
        .map_err(|e| AppError::Auth(AuthError::HashFormat(e.to_string())))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
