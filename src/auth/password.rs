//! Argon2id password hashing and verification.
//!
//! Hashes are stored as PHC strings so that the algorithm parameters and salt
//! travel with the hash.

use crate::error::{AppError, AppResult};
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

/// Well-formed hash with the default parameters that no password matches
const DUMMY_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$Y4C+MHyIeTzd8JTrB0Ob0Q$PcmUWU+fnMl4IgH92+pepZSWuIlECS/jBPklAyllHjw";

/// Hash a plaintext password using Argon2id with a random salt.
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::PasswordHash(e.to_string()))
}

/// Verify a plaintext password against a stored hash.
///
/// A stored value that is not a PHC string never matches.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let parsed = match PasswordHash::new(stored_hash) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::warn!(error = %e, "stored password hash is not a PHC string");
            return false;
        }
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Run a full verification against a hash that never matches.
///
/// Used when the account does not exist, so a miss costs as much as a wrong password.
pub fn verify_dummy(password: &str) {
    let _ = verify_password(password, DUMMY_HASH);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("warden2024").expect("hashing should succeed");
        assert!(hash.starts_with("$argon2id$"), "expected argon2id PHC prefix");
        assert!(verify_password("warden2024", &hash));
        assert!(!verify_password("warden2025", &hash));
    }

    #[test]
    fn test_foreign_hash_format_never_matches() {
        assert!(!verify_password("anything1", "pbkdf2:sha256:260000$salt$digest"));
    }

    #[test]
    fn test_dummy_hash_matches_default_parameters() {
        let dummy = PasswordHash::new(DUMMY_HASH).expect("dummy hash should parse");
        let real_hash = hash_password("warden2024").expect("hashing should succeed");
        let real = PasswordHash::new(&real_hash).expect("real hash should parse");

        assert_eq!(dummy.algorithm, real.algorithm);
        assert_eq!(dummy.params.to_string(), real.params.to_string());
        assert!(!verify_password("warden2024", DUMMY_HASH));
    }
}
