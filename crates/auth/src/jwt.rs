//! Issuing and validation of locally signed JWTs (HS256)

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

use crate::claims::{Claims, TokenType};
use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::types::{TokenPair, UserRole};

/// Issue a single token of the given type for a user.
pub fn issue_token(
    config: &AuthConfig,
    email: &str,
    role: UserRole,
    token_type: TokenType,
) -> Result<String, AuthError> {
    let now = Utc::now();
    let ttl = match token_type {
        TokenType::Access => Duration::minutes(config.access_ttl_minutes),
        TokenType::Refresh => Duration::days(config.refresh_ttl_days),
    };

    let claims = Claims {
        sub: email.to_string(),
        role,
        token_type,
        iat: now.timestamp(),
        exp: (now + ttl).timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|_| AuthError::InvalidToken)
}

/// Issue a fresh access + refresh pair for a user.
pub fn issue_token_pair(
    config: &AuthConfig,
    email: &str,
    role: UserRole,
) -> Result<TokenPair, AuthError> {
    let access = issue_token(config, email, role, TokenType::Access)?;
    let refresh = issue_token(config, email, role, TokenType::Refresh)?;
    Ok(TokenPair::new(access, refresh))
}

/// Validate signature and expiry, then require the expected token type.
pub fn validate_token(
    config: &AuthConfig,
    token: &str,
    expected: TokenType,
) -> Result<Claims, AuthError> {
    let mut validation = Validation::default();
    validation.validate_exp = true;

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    )
    .map_err(|_| AuthError::InvalidToken)?;

    if data.claims.token_type != expected {
        return Err(AuthError::WrongTokenType);
    }

    Ok(data.claims)
}

/// Pull the raw token out of an `Authorization: Bearer <token>` header value.
pub fn extract_bearer_token(header_value: &str) -> Result<&str, AuthError> {
    let token = header_value
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidAuthorizationHeader)?
        .trim();
    if token.is_empty() {
        return Err(AuthError::InvalidAuthorizationHeader);
    }
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "unit-test-secret".to_string(),
            access_ttl_minutes: 30,
            refresh_ttl_days: 7,
            google_client_id: None,
            apple_client_id: None,
        }
    }

    #[test]
    fn test_issue_and_validate_access_token() {
        let config = test_config();
        let token =
            issue_token(&config, "coach@club.example", UserRole::Coach, TokenType::Access).unwrap();

        let claims = validate_token(&config, &token, TokenType::Access).unwrap();
        assert_eq!(claims.sub, "coach@club.example");
        assert_eq!(claims.role, UserRole::Coach);
        assert_eq!(claims.token_type, TokenType::Access);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_refresh_token_rejected_as_access() {
        let config = test_config();
        let refresh =
            issue_token(&config, "p@club.example", UserRole::Player, TokenType::Refresh).unwrap();

        let err = validate_token(&config, &refresh, TokenType::Access).unwrap_err();
        assert!(matches!(err, AuthError::WrongTokenType));
    }

    #[test]
    fn test_tampered_token_rejected() {
        let config = test_config();
        let token =
            issue_token(&config, "a@club.example", UserRole::Admin, TokenType::Access).unwrap();

        let other = AuthConfig {
            jwt_secret: "different-secret".to_string(),
            ..test_config()
        };
        let err = validate_token(&other, &token, TokenType::Access).unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken));
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc.def.ghi").unwrap(), "abc.def.ghi");
        assert!(extract_bearer_token("Basic abc").is_err());
        assert!(extract_bearer_token("Bearer ").is_err());
        assert!(extract_bearer_token("").is_err());
    }

    #[test]
    fn test_token_pair_shape() {
        let config = test_config();
        let pair = issue_token_pair(&config, "x@club.example", UserRole::Parent).unwrap();
        assert_eq!(pair.token_type, "bearer");
        assert_ne!(pair.access_token, pair.refresh_token);
    }
}
