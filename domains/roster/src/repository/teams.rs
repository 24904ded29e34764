//! Team repository

use sqlx::PgPool;
use uuid::Uuid;

use clubdesk_common::RepositoryError;

use crate::domain::entities::Team;
use crate::repository::map_insert_error;

/// Fields for creating a team.
#[derive(Debug, Clone)]
pub struct NewTeam {
    pub name: String,
    pub age_group: Option<String>,
    pub season: Option<String>,
    pub description: Option<String>,
    pub coach_id: Option<Uuid>,
}

/// Partial update; `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct TeamChanges {
    pub name: Option<String>,
    pub age_group: Option<String>,
    pub season: Option<String>,
    pub description: Option<String>,
    pub coach_id: Option<Uuid>,
}

#[derive(Clone)]
pub struct TeamRepository {
    pool: PgPool,
}

impl TeamRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, new_team: NewTeam) -> Result<Team, RepositoryError> {
        sqlx::query_as::<_, Team>(
            "INSERT INTO teams (id, name, age_group, season, description, coach_id, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, NOW(), NOW())
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&new_team.name)
        .bind(&new_team.age_group)
        .bind(&new_team.season)
        .bind(&new_team.description)
        .bind(new_team.coach_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_insert_error)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Team>, RepositoryError> {
        let team = sqlx::query_as::<_, Team>("SELECT * FROM teams WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(team)
    }

    /// List teams within a visibility scope. A `None` filter lists all.
    pub async fn list(
        &self,
        team_filter: Option<&[Uuid]>,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Team>, RepositoryError> {
        let teams = sqlx::query_as::<_, Team>(
            "SELECT * FROM teams
             WHERE ($1::uuid[] IS NULL OR id = ANY($1))
             ORDER BY name
             OFFSET $2 LIMIT $3",
        )
        .bind(team_filter)
        .bind(offset)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(teams)
    }

    pub async fn update(&self, id: Uuid, changes: TeamChanges) -> Result<Team, RepositoryError> {
        sqlx::query_as::<_, Team>(
            "UPDATE teams SET
                name = COALESCE($2, name),
                age_group = COALESCE($3, age_group),
                season = COALESCE($4, season),
                description = COALESCE($5, description),
                coach_id = COALESCE($6, coach_id),
                updated_at = NOW()
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(&changes.name)
        .bind(&changes.age_group)
        .bind(&changes.season)
        .bind(&changes.description)
        .bind(changes.coach_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a team. Players on the roster are unassigned, not deleted.
    pub async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("UPDATE players SET team_id = NULL, updated_at = NOW() WHERE team_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM teams WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        tx.commit().await?;
        Ok(())
    }

    /// Put a player on this team's roster.
    pub async fn assign_player(&self, team_id: Uuid, player_id: Uuid) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE players SET team_id = $1, updated_at = NOW() WHERE id = $2",
        )
        .bind(team_id)
        .bind(player_id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Take a player off this team's roster. `NotFound` when the player
    /// is not on the given team.
    pub async fn remove_player(&self, team_id: Uuid, player_id: Uuid) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE players SET team_id = NULL, updated_at = NOW()
             WHERE id = $1 AND team_id = $2",
        )
        .bind(player_id)
        .bind(team_id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
