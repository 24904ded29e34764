//! Token and credential generation

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::distributions::Alphanumeric;
use rand::Rng;

const TOKEN_BYTES: usize = 32;
const TEMP_PASSWORD_LENGTH: usize = 12;

/// Generate a URL-safe one-time invitation token (32 random bytes).
pub fn generate_invitation_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    // getrandom only fails when the OS entropy source is unavailable;
    // fall back to the thread RNG in that case.
    if getrandom::getrandom(&mut bytes).is_err() {
        rand::thread_rng().fill(&mut bytes);
    }
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Generate a temporary password for auto-created accounts.
/// Always satisfies the letter + digit policy.
pub fn generate_temp_password() -> String {
    let mut rng = rand::thread_rng();
    let base: String = (&mut rng)
        .sample_iter(&Alphanumeric)
        .take(TEMP_PASSWORD_LENGTH - 2)
        .map(char::from)
        .collect();
    let letter = rng.gen_range(b'a'..=b'z') as char;
    let digit = rng.gen_range(b'0'..=b'9') as char;
    format!("{base}{letter}{digit}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_are_url_safe_and_distinct() {
        let a = generate_invitation_token();
        let b = generate_invitation_token();
        assert_ne!(a, b);
        assert!(a
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        // 32 bytes base64url without padding is 43 characters
        assert_eq!(a.len(), 43);
    }

    #[test]
    fn test_temp_password_satisfies_policy() {
        for _ in 0..20 {
            let password = generate_temp_password();
            assert_eq!(password.len(), TEMP_PASSWORD_LENGTH);
            assert!(password.chars().any(|c| c.is_ascii_alphabetic()));
            assert!(password.chars().any(|c| c.is_ascii_digit()));
        }
    }
}
