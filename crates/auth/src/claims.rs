//! JWT claim structures for locally issued tokens

use serde::{Deserialize, Serialize};

use crate::types::UserRole;

/// Discriminates access tokens from refresh tokens.
///
/// A refresh token presented where an access token is expected (or vice
/// versa) is rejected even if its signature and expiry are valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    Access,
    Refresh,
}

/// Claims carried by every locally issued token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user's email address
    pub sub: String,
    /// Role snapshot at issue time (authorization re-checks the DB)
    pub role: UserRole,
    /// Access or refresh
    #[serde(rename = "type")]
    pub token_type: TokenType,
    /// Issued-at (unix seconds)
    pub iat: i64,
    /// Expiry (unix seconds)
    pub exp: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_serialize_type_tag() {
        let claims = Claims {
            sub: "coach@club.example".to_string(),
            role: UserRole::Coach,
            token_type: TokenType::Access,
            iat: 1_700_000_000,
            exp: 1_700_001_800,
        };
        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["type"], "access");
        assert_eq!(json["role"], "coach");
        assert_eq!(json["sub"], "coach@club.example");
    }
}
