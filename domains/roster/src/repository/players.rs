//! Player repository

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use clubdesk_common::RepositoryError;

use crate::domain::entities::{Position, User};
use crate::repository::map_insert_error;

/// A player row joined with its backing user account.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PlayerWithUser {
    pub id: Uuid,
    pub user_id: Uuid,
    pub team_id: Option<Uuid>,
    pub date_of_birth: Option<NaiveDate>,
    pub position: Option<Position>,
    pub jersey_number: Option<i32>,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_phone: Option<String>,
    /// Cumulative stats, maintained by the scoring workflow
    pub games_played: i32,
    pub goals_scored: i32,
    pub assists: i32,
    pub notes: Option<String>,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
}

const PLAYER_WITH_USER: &str =
    "SELECT p.id, p.user_id, p.team_id, p.date_of_birth, p.position, p.jersey_number,
            p.emergency_contact_name, p.emergency_contact_phone,
            p.games_played, p.goals_scored, p.assists, p.notes,
            u.email, u.first_name, u.last_name, u.is_active
     FROM players p
     JOIN users u ON u.id = p.user_id";

/// Fields for creating a player profile.
#[derive(Debug, Clone)]
pub struct NewPlayer {
    pub user_id: Uuid,
    pub team_id: Option<Uuid>,
    pub date_of_birth: Option<NaiveDate>,
    pub position: Option<Position>,
    pub jersey_number: Option<i32>,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_phone: Option<String>,
    pub notes: Option<String>,
}

/// Partial update; `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct PlayerChanges {
    pub team_id: Option<Uuid>,
    pub date_of_birth: Option<NaiveDate>,
    pub position: Option<Position>,
    pub jersey_number: Option<i32>,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_phone: Option<String>,
    pub notes: Option<String>,
}

impl PlayerChanges {
    /// Whether the update touches fields only staff may change.
    pub fn touches_staff_fields(&self) -> bool {
        self.team_id.is_some() || self.jersey_number.is_some() || self.notes.is_some()
    }
}

#[derive(Clone)]
pub struct PlayerRepository {
    pool: PgPool,
}

impl PlayerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a player profile. One per user account.
    pub async fn create(&self, new_player: NewPlayer) -> Result<PlayerWithUser, RepositoryError> {
        let id: Uuid = sqlx::query_scalar(
            "INSERT INTO players (id, user_id, team_id, date_of_birth, position, jersey_number,
                                  emergency_contact_name, emergency_contact_phone, notes,
                                  created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, NOW(), NOW())
             RETURNING id",
        )
        .bind(Uuid::new_v4())
        .bind(new_player.user_id)
        .bind(new_player.team_id)
        .bind(new_player.date_of_birth)
        .bind(new_player.position)
        .bind(new_player.jersey_number)
        .bind(&new_player.emergency_contact_name)
        .bind(&new_player.emergency_contact_phone)
        .bind(&new_player.notes)
        .fetch_one(&self.pool)
        .await
        .map_err(map_insert_error)?;

        self.find_by_id(id).await?.ok_or(RepositoryError::NotFound)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<PlayerWithUser>, RepositoryError> {
        let query = format!("{PLAYER_WITH_USER} WHERE p.id = $1");
        let player = sqlx::query_as::<_, PlayerWithUser>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(player)
    }

    pub async fn find_by_user_id(
        &self,
        user_id: Uuid,
    ) -> Result<Option<PlayerWithUser>, RepositoryError> {
        let query = format!("{PLAYER_WITH_USER} WHERE p.user_id = $1");
        let player = sqlx::query_as::<_, PlayerWithUser>(&query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(player)
    }

    /// List players within a visibility scope: any player on a visible
    /// team, plus explicitly visible player ids (self, children).
    pub async fn list(
        &self,
        team_filter: Option<&[Uuid]>,
        extra_player_ids: &[Uuid],
        offset: i64,
        limit: i64,
    ) -> Result<Vec<PlayerWithUser>, RepositoryError> {
        let query = format!(
            "{PLAYER_WITH_USER}
             WHERE u.is_active
               AND ($1::uuid[] IS NULL OR p.team_id = ANY($1) OR p.id = ANY($2))
             ORDER BY u.last_name, u.first_name
             OFFSET $3 LIMIT $4"
        );
        let players = sqlx::query_as::<_, PlayerWithUser>(&query)
            .bind(team_filter)
            .bind(extra_player_ids)
            .bind(offset)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(players)
    }

    pub async fn update(
        &self,
        id: Uuid,
        changes: PlayerChanges,
    ) -> Result<PlayerWithUser, RepositoryError> {
        let updated: Option<Uuid> = sqlx::query_scalar(
            "UPDATE players SET
                team_id = COALESCE($2, team_id),
                date_of_birth = COALESCE($3, date_of_birth),
                position = COALESCE($4, position),
                jersey_number = COALESCE($5, jersey_number),
                emergency_contact_name = COALESCE($6, emergency_contact_name),
                emergency_contact_phone = COALESCE($7, emergency_contact_phone),
                notes = COALESCE($8, notes),
                updated_at = NOW()
             WHERE id = $1
             RETURNING id",
        )
        .bind(id)
        .bind(changes.team_id)
        .bind(changes.date_of_birth)
        .bind(changes.position)
        .bind(changes.jersey_number)
        .bind(&changes.emergency_contact_name)
        .bind(&changes.emergency_contact_phone)
        .bind(&changes.notes)
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(id) => self.find_by_id(id).await?.ok_or(RepositoryError::NotFound),
            None => Err(RepositoryError::NotFound),
        }
    }

    /// Remove a player profile. The backing user account stays.
    pub async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM players WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Parent accounts linked to this player.
    pub async fn parents_of(&self, player_id: Uuid) -> Result<Vec<User>, RepositoryError> {
        let parents = sqlx::query_as::<_, User>(
            "SELECT u.id, u.email, u.password_hash, u.first_name, u.last_name, u.phone, u.role,
                    u.role_selected, u.is_active, u.is_verified, u.is_oauth_only,
                    u.created_at, u.updated_at
             FROM users u
             JOIN parent_children pc ON pc.parent_id = u.id
             WHERE pc.child_id = $1
             ORDER BY u.last_name, u.first_name",
        )
        .bind(player_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(parents)
    }
}
