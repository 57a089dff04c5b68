//! Argon2id password hashing.
//!
//! Hashes are stored as PHC strings (`$argon2id$v=19$...`), so parameters and
//! salt travel with the hash.

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use rand::rngs::OsRng;
use std::sync::LazyLock;
use thiserror::Error;

// Stand-in hash checked when no account matches, so unknown usernames cost the
// same Argon2 work as known ones.
static DUMMY_HASH: LazyLock<String> =
    LazyLock::new(|| hash_password("core-service-unknown-account").unwrap_or_default());

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("failed to hash password")]
    Hash,
    #[error("stored password hash is malformed")]
    MalformedHash,
}

/// Hash a plaintext password with a fresh random salt.
///
/// # Errors
/// Returns [`PasswordError::Hash`] if Argon2 rejects the input.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| PasswordError::Hash)
}

/// Check a plaintext password against a stored PHC hash.
///
/// # Errors
/// Returns [`PasswordError::MalformedHash`] if `stored_hash` is not a PHC string.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|_| PasswordError::MalformedHash)?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Run a full verification against a throwaway hash and reject.
///
/// Used on the login path when the username is unknown. Always `false`.
pub fn verify_dummy_password(password: &str) -> bool {
    let _ = verify_password(password, &DUMMY_HASH);
    false
}
