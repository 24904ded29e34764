//! Authentication and authorization errors

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Errors surfaced by the auth layer.
///
/// Every credential failure maps to the same 401 body so callers cannot
/// probe which accounts exist or why a token was rejected.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Missing Authorization header")]
    MissingCredentials,

    #[error("Invalid Authorization header format")]
    InvalidAuthorizationHeader,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Wrong token type")]
    WrongTokenType,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account is deactivated")]
    AccountInactive,

    #[error("Insufficient permissions")]
    Forbidden,

    #[error("OAuth provider not configured: {0}")]
    ProviderNotConfigured(String),

    #[error("{0}")]
    PasswordPolicy(String),

    #[error("OAuth verification failed: {0}")]
    OAuthVerification(String),

    #[error("Auth configuration error: {0}")]
    Configuration(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingCredentials
            | AuthError::InvalidAuthorizationHeader
            | AuthError::InvalidToken
            | AuthError::WrongTokenType
            | AuthError::InvalidCredentials
            | AuthError::AccountInactive
            | AuthError::OAuthVerification(_) => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden => StatusCode::FORBIDDEN,
            AuthError::ProviderNotConfigured(_) | AuthError::PasswordPolicy(_) => {
                StatusCode::BAD_REQUEST
            }
            AuthError::Configuration(_) | AuthError::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingCredentials
            | AuthError::InvalidAuthorizationHeader
            | AuthError::InvalidToken
            | AuthError::WrongTokenType
            | AuthError::InvalidCredentials
            | AuthError::AccountInactive
            | AuthError::OAuthVerification(_) => "UNAUTHORIZED",
            AuthError::Forbidden => "FORBIDDEN",
            AuthError::ProviderNotConfigured(_) | AuthError::PasswordPolicy(_) => {
                "VALIDATION_ERROR"
            }
            AuthError::Configuration(_) | AuthError::Database(_) => "INTERNAL_ERROR",
        }
    }

    /// Public message. Credential failures all read the same on purpose.
    fn public_message(&self) -> String {
        match self.status_code() {
            StatusCode::UNAUTHORIZED => "Could not validate credentials".to_string(),
            StatusCode::INTERNAL_SERVER_ERROR => "An internal error occurred".to_string(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "auth layer error");
        } else {
            tracing::debug!(error = %self, "auth rejection");
        }

        let body = Json(json!({
            "error": {
                "code": self.error_code(),
                "message": self.public_message(),
            }
        }));
        (status, body).into_response()
    }
}

impl From<AuthError> for clubdesk_common::Error {
    fn from(err: AuthError) -> Self {
        match err.status_code() {
            StatusCode::UNAUTHORIZED => {
                clubdesk_common::Error::Authentication(err.public_message())
            }
            StatusCode::FORBIDDEN => clubdesk_common::Error::Authorization(err.to_string()),
            StatusCode::BAD_REQUEST => clubdesk_common::Error::Validation(err.to_string()),
            _ => clubdesk_common::Error::Internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_failures_share_message() {
        let variants = [
            AuthError::MissingCredentials,
            AuthError::InvalidToken,
            AuthError::WrongTokenType,
            AuthError::InvalidCredentials,
            AuthError::AccountInactive,
        ];
        for err in variants {
            assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
            assert_eq!(err.public_message(), "Could not validate credentials");
        }
    }

    #[test]
    fn test_forbidden_maps_to_403() {
        assert_eq!(AuthError::Forbidden.status_code(), StatusCode::FORBIDDEN);
    }
}
