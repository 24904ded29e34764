//! Password hashing and verification (bcrypt)

use bcrypt::{hash, verify, DEFAULT_COST};

use crate::error::AuthError;

const MIN_PASSWORD_LENGTH: usize = 8;

/// Hash a password for storage.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    hash(password, DEFAULT_COST)
        .map_err(|e| AuthError::Configuration(format!("Password hashing failed: {e}")))
}

/// Verify a candidate password against a stored hash.
///
/// Malformed stored hashes count as a failed verification, not an error.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    verify(password, password_hash).unwrap_or(false)
}

/// Minimum strength check applied when accounts are created or passwords set.
pub fn validate_password_strength(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::PasswordPolicy(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters long"
        )));
    }
    if !password.chars().any(|c| c.is_ascii_alphabetic()) {
        return Err(AuthError::PasswordPolicy(
            "Password must contain at least one letter".to_string(),
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(AuthError::PasswordPolicy(
            "Password must contain at least one digit".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_round_trip() {
        let hash = hash_password("correct horse 1").unwrap();
        assert!(verify_password("correct horse 1", &hash));
        assert!(!verify_password("wrong password 1", &hash));
    }

    #[test]
    fn test_malformed_hash_fails_verification() {
        assert!(!verify_password("anything1", "not-a-bcrypt-hash"));
    }

    #[test]
    fn test_password_strength() {
        assert!(validate_password_strength("abcdef12").is_ok());
        assert!(validate_password_strength("short1").is_err());
        assert!(validate_password_strength("12345678").is_err());
        assert!(validate_password_strength("abcdefgh").is_err());
    }
}
