//! Authentication configuration loaded from the environment

use std::env;

use crate::error::AuthError;

const DEFAULT_ACCESS_TTL_MINUTES: i64 = 30;
const DEFAULT_REFRESH_TTL_DAYS: i64 = 7;

/// Runtime configuration for token issuing and OAuth verification.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HS256 signing secret for locally issued tokens
    pub jwt_secret: String,

    /// Access token lifetime in minutes
    pub access_ttl_minutes: i64,

    /// Refresh token lifetime in days
    pub refresh_ttl_days: i64,

    /// Expected audience for Google ID tokens (unset disables Google login)
    pub google_client_id: Option<String>,

    /// Expected audience for Apple ID tokens (unset disables Apple login)
    pub apple_client_id: Option<String>,
}

impl AuthConfig {
    /// Load from environment variables. `JWT_SECRET` is required.
    pub fn from_env() -> Result<Self, AuthError> {
        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| AuthError::Configuration("JWT_SECRET is required".to_string()))?;

        Ok(Self {
            jwt_secret,
            access_ttl_minutes: env_i64("ACCESS_TOKEN_EXPIRE_MINUTES", DEFAULT_ACCESS_TTL_MINUTES),
            refresh_ttl_days: env_i64("REFRESH_TOKEN_EXPIRE_DAYS", DEFAULT_REFRESH_TTL_DAYS),
            google_client_id: env::var("GOOGLE_CLIENT_ID").ok().filter(|v| !v.is_empty()),
            apple_client_id: env::var("APPLE_CLIENT_ID").ok().filter(|v| !v.is_empty()),
        })
    }
}

fn env_i64(name: &str, default: i64) -> i64 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "test-secret".to_string(),
            access_ttl_minutes: DEFAULT_ACCESS_TTL_MINUTES,
            refresh_ttl_days: DEFAULT_REFRESH_TTL_DAYS,
            google_client_id: None,
            apple_client_id: None,
        }
    }

    #[test]
    fn test_defaults() {
        let config = test_config();
        assert_eq!(config.access_ttl_minutes, 30);
        assert_eq!(config.refresh_ttl_days, 7);
    }
}
