//! Salted password hashing.
//!
//! Argon2id with a fresh random salt per hash; verification runs in time
//! independent of where a mismatch occurs.

use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};

/// Hash a raw password into a PHC string with an embedded fresh salt.
///
/// # Errors
///
/// Returns an error if the hasher rejects its parameters or the salt.
pub fn hash(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hashed| hashed.to_string())
}

/// Check a raw password against a stored PHC string.
///
/// Malformed stored values verify as `false` rather than erroring; a
/// corrupted row must never let a login through.
#[must_use]
pub fn verify(password: &str, stored: &str) -> bool {
    PasswordHash::new(stored)
        .ok()
        .as_ref()
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_round_trips() {
        let stored = hash("hunter2's horse battery").unwrap();
        assert!(verify("hunter2's horse battery", &stored));
        assert!(!verify("hunter2", &stored));
    }

    #[test]
    fn same_password_hashes_differently() {
        let first = hash("pw1").unwrap();
        let second = hash("pw1").unwrap();
        assert_ne!(first, second);
        assert!(verify("pw1", &first));
        assert!(verify("pw1", &second));
    }

    #[test]
    fn hash_never_contains_the_raw_password() {
        let stored = hash("super-secret-phrase").unwrap();
        assert!(!stored.contains("super-secret-phrase"));
        assert!(stored.starts_with("$argon2"));
    }

    #[test]
    fn malformed_stored_hash_fails_closed() {
        assert!(!verify("anything", "not-a-phc-string"));
        assert!(!verify("anything", ""));
    }
}
