//! `AuthBackend`: credential verification and token-to-user resolution
//!
//! All auth reads go through runtime queries against the users table so the
//! backend stays decoupled from the domain repositories. Deactivated
//! accounts fail authentication immediately regardless of token validity.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::claims::TokenType;
use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::jwt;
use crate::oauth::{OAuthProvider, OAuthUserInfo, OAuthVerifier};
use crate::password;
use crate::scope::VisibilityScope;
use crate::types::{AuthIdentity, TokenPair, UserRole};

/// Internal row shape for credential checks.
#[derive(Debug, sqlx::FromRow)]
struct CredentialsRow {
    id: Uuid,
    email: String,
    first_name: String,
    last_name: String,
    role: UserRole,
    is_active: bool,
    password_hash: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<CredentialsRow> for AuthIdentity {
    fn from(row: CredentialsRow) -> Self {
        AuthIdentity {
            id: row.id,
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            role: row.role,
            is_active: row.is_active,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PlayerScopeRow {
    id: Uuid,
    team_id: Option<Uuid>,
}

/// Authentication backend shared by extractors, handlers and the
/// WebSocket endpoint.
#[derive(Debug, Clone)]
pub struct AuthBackend {
    pool: PgPool,
    config: AuthConfig,
    verifier: OAuthVerifier,
}

impl AuthBackend {
    pub fn new(pool: PgPool, config: AuthConfig) -> Self {
        let verifier = OAuthVerifier::new(&config);
        Self {
            pool,
            config,
            verifier,
        }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Verify an email/password pair and issue tokens.
    ///
    /// Unknown email, OAuth-only account (no password hash) and wrong
    /// password are indistinguishable to the caller.
    pub async fn login(
        &self,
        email: &str,
        candidate_password: &str,
    ) -> Result<(AuthIdentity, TokenPair), AuthError> {
        let row = self
            .credentials_by_email(email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let hash = row
            .password_hash
            .as_deref()
            .ok_or(AuthError::InvalidCredentials)?;
        if !password::verify_password(candidate_password, hash) {
            return Err(AuthError::InvalidCredentials);
        }
        if !row.is_active {
            return Err(AuthError::AccountInactive);
        }

        let identity = AuthIdentity::from(row);
        let pair = jwt::issue_token_pair(&self.config, &identity.email, identity.role)?;
        self.record_activity(identity.id, "login").await;
        Ok((identity, pair))
    }

    /// Resolve an access token to the current active user.
    pub async fn authenticate(&self, token: &str) -> Result<AuthIdentity, AuthError> {
        let claims = jwt::validate_token(&self.config, token, TokenType::Access)?;
        let identity = self
            .identity_by_email(&claims.sub)
            .await?
            .ok_or(AuthError::InvalidToken)?;
        if !identity.is_active {
            return Err(AuthError::AccountInactive);
        }
        Ok(identity)
    }

    /// Exchange a refresh token for a fresh pair.
    ///
    /// The new tokens carry the user's current role, so role changes
    /// propagate on refresh even before the old access token expires.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let claims = jwt::validate_token(&self.config, refresh_token, TokenType::Refresh)?;
        let identity = self
            .identity_by_email(&claims.sub)
            .await?
            .ok_or(AuthError::InvalidToken)?;
        if !identity.is_active {
            return Err(AuthError::AccountInactive);
        }
        self.record_activity(identity.id, "token_refresh").await;
        jwt::issue_token_pair(&self.config, &identity.email, identity.role)
    }

    /// Issue a token pair for an already verified identity (OAuth login,
    /// invitation acceptance).
    pub fn issue_for(&self, identity: &AuthIdentity) -> Result<TokenPair, AuthError> {
        jwt::issue_token_pair(&self.config, &identity.email, identity.role)
    }

    /// Verify a provider ID token. Account lookup is left to the caller.
    pub async fn verify_oauth_token(
        &self,
        provider: OAuthProvider,
        id_token: &str,
    ) -> Result<OAuthUserInfo, AuthError> {
        self.verifier.verify(provider, id_token).await
    }

    pub async fn identity_by_email(
        &self,
        email: &str,
    ) -> Result<Option<AuthIdentity>, AuthError> {
        let identity = sqlx::query_as::<_, AuthIdentity>(
            "SELECT id, email, first_name, last_name, role, is_active, created_at
             FROM users
             WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(identity)
    }

    async fn credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<CredentialsRow>, AuthError> {
        let row = sqlx::query_as::<_, CredentialsRow>(
            "SELECT id, email, first_name, last_name, role, is_active, password_hash, created_at
             FROM users
             WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Derive the caller's visibility scope from current DB state.
    pub async fn scope_for(&self, identity: &AuthIdentity) -> Result<VisibilityScope, AuthError> {
        match identity.role {
            UserRole::Admin | UserRole::Supervisor => {
                Ok(VisibilityScope::all(identity.role))
            }
            UserRole::Coach => {
                let team_ids: Vec<Uuid> =
                    sqlx::query_scalar("SELECT id FROM teams WHERE coach_id = $1")
                        .bind(identity.id)
                        .fetch_all(&self.pool)
                        .await?;
                Ok(VisibilityScope::coached_teams(team_ids))
            }
            UserRole::Player => {
                let row = sqlx::query_as::<_, PlayerScopeRow>(
                    "SELECT id, team_id FROM players WHERE user_id = $1",
                )
                .bind(identity.id)
                .fetch_optional(&self.pool)
                .await?;
                Ok(match row {
                    Some(player) => VisibilityScope::own_player(player.id, player.team_id),
                    None => VisibilityScope::none(UserRole::Player),
                })
            }
            UserRole::Parent => {
                let children = sqlx::query_as::<_, PlayerScopeRow>(
                    "SELECT p.id, p.team_id
                     FROM players p
                     JOIN parent_children pc ON pc.child_id = p.id
                     WHERE pc.parent_id = $1",
                )
                .bind(identity.id)
                .fetch_all(&self.pool)
                .await?;
                if children.is_empty() {
                    return Ok(VisibilityScope::none(UserRole::Parent));
                }
                let player_ids = children.iter().map(|c| c.id).collect();
                let mut team_ids: Vec<Uuid> =
                    children.iter().filter_map(|c| c.team_id).collect();
                team_ids.sort_unstable();
                team_ids.dedup();
                Ok(VisibilityScope::children(player_ids, team_ids))
            }
        }
    }

    /// Best-effort activity log write. Failures are logged, never surfaced.
    pub async fn record_activity(&self, user_id: Uuid, activity_type: &str) {
        let result = sqlx::query(
            "INSERT INTO user_activities (id, user_id, activity_type, created_at)
             VALUES ($1, $2, $3::activity_type, NOW())",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(activity_type)
        .execute(&self.pool)
        .await;

        if let Err(e) = result {
            tracing::warn!(%user_id, activity_type, error = %e, "failed to record user activity");
        }
    }
}
