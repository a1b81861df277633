//! Argon2id password hashing and verification.

use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher as _, PasswordVerifier as _};

use crate::error::{ShopError, ShopResult};

/// One-way adaptive password hasher.
///
/// Produces PHC-format strings (`$argon2id$...`) with a fresh random salt on
/// every call, so hashing the same plaintext twice yields different values.
/// Verification recomputes with the salt and parameters embedded in the
/// stored string and compares in constant time.
#[derive(Debug, Clone, Copy, Default)]
pub struct PasswordHasher;

impl PasswordHasher {
    pub fn new() -> Self {
        Self
    }

    /// Hash a plaintext password with a fresh salt.
    pub fn hash(&self, plaintext: &str) -> ShopResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| ShopError::Hashing(e.to_string()))
    }

    /// Verify a plaintext password against a stored PHC string.
    ///
    /// Never errors: a malformed stored hash verifies as `false`.
    pub fn verify(&self, plaintext: &str, stored: &str) -> bool {
        match PasswordHash::new(stored) {
            Ok(parsed) => Argon2::default()
                .verify_password(plaintext.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }
}
