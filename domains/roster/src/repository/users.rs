//! User repository

use sqlx::PgPool;
use uuid::Uuid;

use clubdesk_auth::UserRole;
use clubdesk_common::RepositoryError;

use crate::domain::entities::User;
use crate::repository::map_insert_error;

const USER_COLUMNS: &str = "id, email, password_hash, first_name, last_name, phone, role, \
                            role_selected, is_active, is_verified, is_oauth_only, \
                            created_at, updated_at";

/// Fields for creating a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub role: UserRole,
    pub role_selected: bool,
    pub is_verified: bool,
    pub is_oauth_only: bool,
}

/// Partial update; `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub role: Option<UserRole>,
    pub is_active: Option<bool>,
}

#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a user. Duplicate email maps to `AlreadyExists`.
    pub async fn create(&self, new_user: NewUser) -> Result<User, RepositoryError> {
        let query = format!(
            "INSERT INTO users (id, email, password_hash, first_name, last_name, phone, role, \
                                role_selected, is_active, is_verified, is_oauth_only, \
                                created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, TRUE, $9, $10, NOW(), NOW())
             RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(Uuid::new_v4())
            .bind(&new_user.email)
            .bind(&new_user.password_hash)
            .bind(&new_user.first_name)
            .bind(&new_user.last_name)
            .bind(&new_user.phone)
            .bind(new_user.role)
            .bind(new_user.role_selected)
            .bind(new_user.is_verified)
            .bind(new_user.is_oauth_only)
            .fetch_one(&self.pool)
            .await
            .map_err(map_insert_error)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepositoryError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let user = sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// List users, optionally filtered by role. Inactive accounts are
    /// included only when requested.
    pub async fn list(
        &self,
        role: Option<UserRole>,
        include_inactive: bool,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<User>, RepositoryError> {
        let query = format!(
            "SELECT {USER_COLUMNS} FROM users
             WHERE ($1::user_role IS NULL OR role = $1)
               AND ($2 OR is_active)
             ORDER BY last_name, first_name
             OFFSET $3 LIMIT $4"
        );
        let users = sqlx::query_as::<_, User>(&query)
            .bind(role)
            .bind(include_inactive)
            .bind(offset)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    /// Apply a partial update. Returns `NotFound` for unknown ids.
    pub async fn update(&self, id: Uuid, changes: UserChanges) -> Result<User, RepositoryError> {
        let query = format!(
            "UPDATE users SET
                first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                phone = COALESCE($4, phone),
                role = COALESCE($5, role),
                is_active = COALESCE($6, is_active),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(&changes.first_name)
            .bind(&changes.last_name)
            .bind(&changes.phone)
            .bind(changes.role)
            .bind(changes.is_active)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Set a role chosen after OAuth sign-up and mark it as confirmed.
    pub async fn set_role(&self, id: Uuid, role: UserRole) -> Result<User, RepositoryError> {
        let query = format!(
            "UPDATE users SET role = $2, role_selected = TRUE, updated_at = NOW()
             WHERE id = $1
             RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(role)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Soft delete: the account stays for history, authentication fails.
    pub async fn deactivate(&self, id: Uuid) -> Result<User, RepositoryError> {
        let query = format!(
            "UPDATE users SET is_active = FALSE, updated_at = NOW()
             WHERE id = $1
             RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }
}
