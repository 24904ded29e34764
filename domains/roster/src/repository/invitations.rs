//! Invitation repository

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use clubdesk_common::RepositoryError;

use crate::domain::entities::{Invitation, InvitationStatus};
use crate::repository::map_insert_error;

#[derive(Clone)]
pub struct InvitationRepository {
    pool: PgPool,
}

impl InvitationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Persist a new invitation. A second pending invitation for the same
    /// email maps to `AlreadyExists` via the partial unique index.
    pub async fn create(&self, invitation: &Invitation) -> Result<Invitation, RepositoryError> {
        sqlx::query_as::<_, Invitation>(
            "INSERT INTO invitations
                 (id, email, first_name, last_name, role, team_id, token, status, invited_by,
                  expires_at, accepted_at, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
             RETURNING *",
        )
        .bind(invitation.id)
        .bind(&invitation.email)
        .bind(&invitation.first_name)
        .bind(&invitation.last_name)
        .bind(invitation.role)
        .bind(invitation.team_id)
        .bind(&invitation.token)
        .bind(invitation.status)
        .bind(invitation.invited_by)
        .bind(invitation.expires_at)
        .bind(invitation.accepted_at)
        .bind(invitation.created_at)
        .bind(invitation.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_insert_error)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Invitation>, RepositoryError> {
        let invitation = sqlx::query_as::<_, Invitation>("SELECT * FROM invitations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(invitation)
    }

    pub async fn find_by_token(&self, token: &str) -> Result<Option<Invitation>, RepositoryError> {
        let invitation =
            sqlx::query_as::<_, Invitation>("SELECT * FROM invitations WHERE token = $1")
                .bind(token)
                .fetch_optional(&self.pool)
                .await?;
        Ok(invitation)
    }

    /// The pending invitation for an email, if any. The row may be past
    /// its expiry; expiring it is the caller's concern.
    pub async fn find_pending_for_email(
        &self,
        email: &str,
    ) -> Result<Option<Invitation>, RepositoryError> {
        let invitation = sqlx::query_as::<_, Invitation>(
            "SELECT * FROM invitations WHERE email = $1 AND status = 'pending'",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(invitation)
    }

    /// Invitations sent by a specific user, or all when `invited_by` is
    /// `None` (admin view). Newest first.
    pub async fn list_sent(
        &self,
        invited_by: Option<Uuid>,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Invitation>, RepositoryError> {
        let invitations = sqlx::query_as::<_, Invitation>(
            "SELECT * FROM invitations
             WHERE ($1::uuid IS NULL OR invited_by = $1)
             ORDER BY created_at DESC
             OFFSET $2 LIMIT $3",
        )
        .bind(invited_by)
        .bind(offset)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(invitations)
    }

    pub async fn list_for_team(&self, team_id: Uuid) -> Result<Vec<Invitation>, RepositoryError> {
        let invitations = sqlx::query_as::<_, Invitation>(
            "SELECT * FROM invitations WHERE team_id = $1 ORDER BY created_at DESC",
        )
        .bind(team_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(invitations)
    }

    /// Flip the stored status. Used for lazy expiry and revocation.
    pub async fn set_status(
        &self,
        id: Uuid,
        status: InvitationStatus,
    ) -> Result<Invitation, RepositoryError> {
        sqlx::query_as::<_, Invitation>(
            "UPDATE invitations SET status = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Resend: fresh token, fresh expiry, back to pending.
    pub async fn refresh_for_resend(
        &self,
        id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<Invitation, RepositoryError> {
        sqlx::query_as::<_, Invitation>(
            "UPDATE invitations
             SET token = $2, expires_at = $3, status = 'pending', updated_at = NOW()
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(token)
        .bind(expires_at)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }
}
