//! Session token generation
//!
//! Tokens are 24-character alphanumeric strings drawn from the operating
//! system RNG. The raw token is handed to the client once and stored
//! verbatim; revocation works by deleting the session row.

use rand::Rng;
use rand::distributions::Alphanumeric;
use rand::rngs::OsRng;

/// Length of a session token in characters
pub const TOKEN_LENGTH: usize = 24;

/// Generate a fresh session token
pub fn generate() -> String {
    OsRng
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Check whether a string has the shape of a session token
///
/// Used to distinguish a structurally invalid bearer credential (rejected as
/// unauthorized) from a well-formed token that simply no longer exists
/// (logout of which is idempotent).
pub fn is_well_formed(token: &str) -> bool {
    token.len() == TOKEN_LENGTH && token.bytes().all(|b| b.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_tokens_have_expected_shape() {
        for _ in 0..100 {
            let token = generate();
            assert_eq!(token.len(), TOKEN_LENGTH);
            assert!(token.bytes().all(|b| b.is_ascii_alphanumeric()));
            assert!(is_well_formed(&token));
        }
    }

    #[test]
    fn test_generated_tokens_are_unique() {
        let a = generate();
        let b = generate();
        assert_ne!(a, b);
    }

    #[test]
    fn test_is_well_formed_rejects_bad_shapes() {
        assert!(!is_well_formed(""));
        assert!(!is_well_formed("short"));
        assert!(!is_well_formed("invalid_token"));
        assert!(!is_well_formed("with spaces in this token"));
        assert!(!is_well_formed(&"x".repeat(TOKEN_LENGTH + 1)));
    }
}
