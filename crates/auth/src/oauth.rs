//! OAuth federation: verification of Google and Apple ID tokens
//!
//! The client obtains an ID token from the provider's native SDK and posts
//! it to us. We verify the token signature against the provider's published
//! JWKS, check issuer and audience, and hand back a normalized
//! [`OAuthUserInfo`] for account lookup or creation.

use jsonwebtoken::{decode, decode_header, jwk::JwkSet, Algorithm, DecodingKey, Validation};
use serde::Deserialize;

use crate::config::AuthConfig;
use crate::error::AuthError;

const GOOGLE_JWKS_URI: &str = "https://www.googleapis.com/oauth2/v3/certs";
const APPLE_JWKS_URI: &str = "https://appleid.apple.com/auth/keys";

/// Supported identity providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "oauth_provider", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OAuthProvider {
    Google,
    Apple,
}

impl OAuthProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            OAuthProvider::Google => "google",
            OAuthProvider::Apple => "apple",
        }
    }

    fn jwks_uri(&self) -> &'static str {
        match self {
            OAuthProvider::Google => GOOGLE_JWKS_URI,
            OAuthProvider::Apple => APPLE_JWKS_URI,
        }
    }

    /// Issuer values the provider is known to emit.
    fn issuers(&self) -> &'static [&'static str] {
        match self {
            OAuthProvider::Google => &["https://accounts.google.com", "accounts.google.com"],
            OAuthProvider::Apple => &["https://appleid.apple.com"],
        }
    }
}

impl std::fmt::Display for OAuthProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized identity extracted from a verified provider token.
#[derive(Debug, Clone)]
pub struct OAuthUserInfo {
    pub provider: OAuthProvider,
    /// Provider-scoped stable account id (the token's `sub`)
    pub account_id: String,
    pub email: String,
    pub email_verified: bool,
    /// Google carries names in the ID token; Apple does not
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Raw claims we read out of provider ID tokens.
///
/// Apple encodes `email_verified` as the string "true"/"false" in some
/// responses, so it is accepted as either a bool or a string.
#[derive(Debug, Deserialize)]
struct ProviderClaims {
    sub: String,
    email: Option<String>,
    #[serde(default, deserialize_with = "bool_or_string")]
    email_verified: bool,
    given_name: Option<String>,
    family_name: Option<String>,
}

fn bool_or_string<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrString {
        Bool(bool),
        Str(String),
    }

    Ok(match Option::<BoolOrString>::deserialize(deserializer)? {
        Some(BoolOrString::Bool(b)) => b,
        Some(BoolOrString::Str(s)) => s == "true",
        None => false,
    })
}

/// Verifies provider ID tokens against the provider JWKS.
#[derive(Debug, Clone)]
pub struct OAuthVerifier {
    http: reqwest::Client,
    google_client_id: Option<String>,
    apple_client_id: Option<String>,
}

impl OAuthVerifier {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            google_client_id: config.google_client_id.clone(),
            apple_client_id: config.apple_client_id.clone(),
        }
    }

    /// Verify an ID token and return the normalized user identity.
    pub async fn verify(
        &self,
        provider: OAuthProvider,
        id_token: &str,
    ) -> Result<OAuthUserInfo, AuthError> {
        let audience = match provider {
            OAuthProvider::Google => self.google_client_id.as_deref(),
            OAuthProvider::Apple => self.apple_client_id.as_deref(),
        }
        .ok_or_else(|| AuthError::ProviderNotConfigured(provider.to_string()))?;

        let header = decode_header(id_token)
            .map_err(|e| AuthError::OAuthVerification(format!("Malformed token header: {e}")))?;
        let kid = header
            .kid
            .ok_or_else(|| AuthError::OAuthVerification("Token header missing kid".to_string()))?;

        let jwks = self.fetch_jwks(provider).await?;
        let jwk = jwks.find(&kid).ok_or_else(|| {
            AuthError::OAuthVerification(format!("No signing key matches kid {kid}"))
        })?;
        let key = DecodingKey::from_jwk(jwk)
            .map_err(|e| AuthError::OAuthVerification(format!("Unusable signing key: {e}")))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[audience]);
        validation.set_issuer(provider.issuers());

        let data = decode::<ProviderClaims>(id_token, &key, &validation)
            .map_err(|e| AuthError::OAuthVerification(format!("Token rejected: {e}")))?;

        claims_to_user_info(provider, data.claims)
    }

    async fn fetch_jwks(&self, provider: OAuthProvider) -> Result<JwkSet, AuthError> {
        let response = self
            .http
            .get(provider.jwks_uri())
            .send()
            .await
            .map_err(|e| AuthError::OAuthVerification(format!("JWKS fetch failed: {e}")))?;

        response
            .error_for_status()
            .map_err(|e| AuthError::OAuthVerification(format!("JWKS fetch failed: {e}")))?
            .json::<JwkSet>()
            .await
            .map_err(|e| AuthError::OAuthVerification(format!("Invalid JWKS document: {e}")))
    }
}

fn claims_to_user_info(
    provider: OAuthProvider,
    claims: ProviderClaims,
) -> Result<OAuthUserInfo, AuthError> {
    let email = claims
        .email
        .filter(|e| !e.is_empty())
        .ok_or_else(|| AuthError::OAuthVerification("Token carries no email".to_string()))?;

    Ok(OAuthUserInfo {
        provider,
        account_id: claims.sub,
        email,
        email_verified: claims.email_verified,
        first_name: claims.given_name,
        last_name: claims.family_name,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_verified_accepts_bool_and_string() {
        let claims: ProviderClaims = serde_json::from_value(serde_json::json!({
            "sub": "123",
            "email": "a@example.com",
            "email_verified": true,
        }))
        .unwrap();
        assert!(claims.email_verified);

        let claims: ProviderClaims = serde_json::from_value(serde_json::json!({
            "sub": "123",
            "email": "a@example.com",
            "email_verified": "true",
        }))
        .unwrap();
        assert!(claims.email_verified);

        let claims: ProviderClaims = serde_json::from_value(serde_json::json!({
            "sub": "123",
            "email": "a@example.com",
        }))
        .unwrap();
        assert!(!claims.email_verified);
    }

    #[test]
    fn test_missing_email_rejected() {
        let claims = ProviderClaims {
            sub: "apple-sub".to_string(),
            email: None,
            email_verified: false,
            given_name: None,
            family_name: None,
        };
        let err = claims_to_user_info(OAuthProvider::Apple, claims).unwrap_err();
        assert!(matches!(err, AuthError::OAuthVerification(_)));
    }

    #[test]
    fn test_google_claims_carry_names() {
        let claims = ProviderClaims {
            sub: "google-sub".to_string(),
            email: Some("user@gmail.example".to_string()),
            email_verified: true,
            given_name: Some("Alex".to_string()),
            family_name: Some("Berg".to_string()),
        };
        let info = claims_to_user_info(OAuthProvider::Google, claims).unwrap();
        assert_eq!(info.account_id, "google-sub");
        assert_eq!(info.first_name.as_deref(), Some("Alex"));
        assert_eq!(info.last_name.as_deref(), Some("Berg"));
    }
}
