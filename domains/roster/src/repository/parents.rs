//! Parent-child link repository

use sqlx::PgPool;
use uuid::Uuid;

use clubdesk_common::RepositoryError;

use crate::domain::entities::ParentChild;
use crate::repository::map_insert_error;
use crate::repository::players::PlayerWithUser;

#[derive(Clone)]
pub struct ParentRepository {
    pool: PgPool,
}

impl ParentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Link a parent to a child's player profile. Duplicate links map to
    /// `AlreadyExists`.
    pub async fn link(
        &self,
        parent_id: Uuid,
        child_id: Uuid,
    ) -> Result<ParentChild, RepositoryError> {
        sqlx::query_as::<_, ParentChild>(
            "INSERT INTO parent_children (id, parent_id, child_id, created_at)
             VALUES ($1, $2, $3, NOW())
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(parent_id)
        .bind(child_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_insert_error)
    }

    /// Remove a link. `NotFound` when no such link exists.
    pub async fn unlink(&self, parent_id: Uuid, child_id: Uuid) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "DELETE FROM parent_children WHERE parent_id = $1 AND child_id = $2",
        )
        .bind(parent_id)
        .bind(child_id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// The parent's children that have player profiles.
    pub async fn children_of(
        &self,
        parent_id: Uuid,
    ) -> Result<Vec<PlayerWithUser>, RepositoryError> {
        let children = sqlx::query_as::<_, PlayerWithUser>(
            "SELECT p.id, p.user_id, p.team_id, p.date_of_birth, p.position, p.jersey_number,
                    p.emergency_contact_name, p.emergency_contact_phone,
                    p.games_played, p.goals_scored, p.assists, p.notes,
                    u.email, u.first_name, u.last_name, u.is_active
             FROM parent_children pc
             JOIN players p ON p.id = pc.child_id
             JOIN users u ON u.id = p.user_id
             WHERE pc.parent_id = $1
             ORDER BY u.last_name, u.first_name",
        )
        .bind(parent_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(children)
    }

    pub async fn link_exists(
        &self,
        parent_id: Uuid,
        child_id: Uuid,
    ) -> Result<bool, RepositoryError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM parent_children WHERE parent_id = $1 AND child_id = $2)",
        )
        .bind(parent_id)
        .bind(child_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }
}
