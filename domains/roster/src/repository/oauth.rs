//! OAuth account repository

use sqlx::PgPool;
use uuid::Uuid;

use clubdesk_auth::OAuthProvider;
use clubdesk_common::RepositoryError;

use crate::domain::entities::OAuthAccount;
use crate::repository::map_insert_error;

#[derive(Clone)]
pub struct OAuthAccountRepository {
    pool: PgPool,
}

impl OAuthAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Look up a federated identity by its provider-scoped account id.
    pub async fn find_by_provider_account(
        &self,
        provider: OAuthProvider,
        provider_account_id: &str,
    ) -> Result<Option<OAuthAccount>, RepositoryError> {
        let account = sqlx::query_as::<_, OAuthAccount>(
            "SELECT * FROM oauth_accounts
             WHERE provider = $1 AND provider_account_id = $2",
        )
        .bind(provider)
        .bind(provider_account_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(account)
    }

    /// Link a federated identity to a user. One link per (provider, account).
    pub async fn create(
        &self,
        user_id: Uuid,
        provider: OAuthProvider,
        provider_account_id: &str,
        email: Option<&str>,
    ) -> Result<OAuthAccount, RepositoryError> {
        sqlx::query_as::<_, OAuthAccount>(
            "INSERT INTO oauth_accounts (id, user_id, provider, provider_account_id, email, created_at)
             VALUES ($1, $2, $3, $4, $5, NOW())
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(provider)
        .bind(provider_account_id)
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(map_insert_error)
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<OAuthAccount>, RepositoryError> {
        let accounts = sqlx::query_as::<_, OAuthAccount>(
            "SELECT * FROM oauth_accounts WHERE user_id = $1 ORDER BY created_at",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(accounts)
    }
}
