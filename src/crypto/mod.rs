//! Password hashing for stored user credentials.
//!
//! New passwords are stored as Argon2 PHC strings. Stores written before
//! hashing was introduced hold plaintext values; those still verify, using a
//! constant-time comparison, so existing `users.json` files keep working.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use subtle::ConstantTimeEq;

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Check whether a stored value parses as a PHC hash rather than legacy plaintext
pub fn is_hashed(stored: &str) -> bool {
    PasswordHash::new(stored).is_ok()
}

/// Verify a candidate password against a stored value (hash or plaintext).
/// Anything that does not parse as a PHC string is compared as plaintext.
pub fn verify_password(password: &str, stored: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed_hash) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok(),
        Err(_) => bool::from(password.as_bytes().ct_eq(stored.as_bytes())),
    }
}
