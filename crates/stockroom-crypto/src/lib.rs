//! Secret hashing for stockroom principals.
//!
//! Argon2id with per-secret random salts, stored as PHC strings. Callers hash
//! once at registration (or secret change) and verify at login; plaintext
//! secrets never reach storage.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand_core::OsRng;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HashError {
    #[error("secret hashing failed")]
    Hash(argon2::password_hash::Error),
    #[error("stored digest is malformed")]
    MalformedDigest(argon2::password_hash::Error),
}

/// Hash a raw secret into a PHC-format Argon2id digest.
pub fn hash_secret(plain: &str) -> Result<String, HashError> {
    let salt = SaltString::generate(&mut OsRng);
    let digest = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(HashError::Hash)?;
    Ok(digest.to_string())
}

/// Verify a raw secret against a stored PHC digest.
///
/// A mismatch is `Ok(false)`; only a malformed digest is an error.
pub fn verify_secret(plain: &str, digest: &str) -> Result<bool, HashError> {
    let parsed = PasswordHash::new(digest).map_err(HashError::MalformedDigest)?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}
