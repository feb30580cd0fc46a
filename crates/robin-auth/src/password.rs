//! Password hashing and verification.
//!
//! Two stored formats are understood: legacy records hold the lowercase
//! hex SHA-256 digest of the password (the bootstrap default is one of
//! these); records created by registration hold an Argon2id PHC string.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use sha2::{Digest, Sha256};

use crate::error::AuthError;

/// Hash a new password with Argon2id.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Crypto(format!("hash password: {e}")))
}

/// Lowercase hex SHA-256 digest, the legacy stored format.
pub fn legacy_digest(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

/// Verify a plaintext password against a stored hash of either format.
///
/// Returns `Ok(false)` on mismatch and `Err(AuthError::Crypto)` if the
/// stored value is in neither format.
pub fn verify_password(password: &str, stored: &str) -> Result<bool, AuthError> {
    if stored.starts_with("$argon2") {
        let parsed = PasswordHash::new(stored)
            .map_err(|e| AuthError::Crypto(format!("invalid hash format: {e}")))?;
        return match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AuthError::Crypto(format!("verify error: {e}"))),
        };
    }

    if stored.len() == 64 && stored.bytes().all(|b| b.is_ascii_hexdigit()) {
        let computed = legacy_digest(password);
        return Ok(constant_time_eq(
            computed.as_bytes(),
            stored.to_ascii_lowercase().as_bytes(),
        ));
    }

    Err(AuthError::Crypto("unrecognized password hash format".into()))
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}
