//! Password hashing and verification
//!
//! Hashes use Argon2id with a random salt, stored in PHC string format so
//! the parameters travel with the hash. Plaintext passwords never leave this
//! module's function boundaries.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

/// Hash a password for storage
pub fn hash(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2.hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a password against a stored PHC hash string
///
/// Returns false both for a wrong password and for an unparseable hash; the
/// caller cannot distinguish the two, which keeps login failures uniform.
pub fn verify(password: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_round_trip() {
        let hashed = hash("password123").expect("Failed to hash password");
        assert!(verify("password123", &hashed));
    }

    #[test]
    fn test_verify_rejects_wrong_password() {
        let hashed = hash("password123").expect("Failed to hash password");
        assert!(!verify("wrongpassword", &hashed));
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash("password123").expect("Failed to hash password");
        let b = hash("password123").expect("Failed to hash password");
        assert_ne!(a, b);
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        assert!(!verify("password123", "not-a-phc-string"));
    }
}
