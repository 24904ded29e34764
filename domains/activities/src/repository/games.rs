//! Game repository

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use clubdesk_common::RepositoryError;

use crate::domain::entities::{Game, GameStatus, GameType};
use crate::repository::map_insert_error;

/// Fields for scheduling a game.
#[derive(Debug, Clone)]
pub struct NewGame {
    pub team_id: Uuid,
    pub opponent: String,
    pub location: Option<String>,
    pub is_home: bool,
    pub game_type: GameType,
    pub scheduled_at: DateTime<Utc>,
    pub notes: Option<String>,
}

/// Partial update; `None` fields are left unchanged. Scores go through
/// `record_result`, not here.
#[derive(Debug, Clone, Default)]
pub struct GameChanges {
    pub opponent: Option<String>,
    pub location: Option<String>,
    pub is_home: Option<bool>,
    pub game_type: Option<GameType>,
    pub status: Option<GameStatus>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

#[derive(Clone)]
pub struct GameRepository {
    pool: PgPool,
}

impl GameRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, new_game: NewGame) -> Result<Game, RepositoryError> {
        sqlx::query_as::<_, Game>(
            "INSERT INTO games (id, team_id, opponent, location, is_home, game_type, status,
                                scheduled_at, notes, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, 'scheduled', $7, $8, NOW(), NOW())
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(new_game.team_id)
        .bind(&new_game.opponent)
        .bind(&new_game.location)
        .bind(new_game.is_home)
        .bind(new_game.game_type)
        .bind(new_game.scheduled_at)
        .bind(&new_game.notes)
        .fetch_one(&self.pool)
        .await
        .map_err(map_insert_error)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Game>, RepositoryError> {
        let game = sqlx::query_as::<_, Game>("SELECT * FROM games WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(game)
    }

    /// List games within a visibility scope, optionally narrowed by
    /// status or to upcoming games only.
    pub async fn list(
        &self,
        team_filter: Option<&[Uuid]>,
        status: Option<GameStatus>,
        upcoming_only: bool,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Game>, RepositoryError> {
        let games = sqlx::query_as::<_, Game>(
            "SELECT * FROM games
             WHERE ($1::uuid[] IS NULL OR team_id = ANY($1))
               AND ($2::game_status IS NULL OR status = $2)
               AND (NOT $3 OR scheduled_at >= NOW())
             ORDER BY scheduled_at
             OFFSET $4 LIMIT $5",
        )
        .bind(team_filter)
        .bind(status)
        .bind(upcoming_only)
        .bind(offset)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(games)
    }

    pub async fn update(&self, id: Uuid, changes: GameChanges) -> Result<Game, RepositoryError> {
        sqlx::query_as::<_, Game>(
            "UPDATE games SET
                opponent = COALESCE($2, opponent),
                location = COALESCE($3, location),
                is_home = COALESCE($4, is_home),
                game_type = COALESCE($5, game_type),
                status = COALESCE($6, status),
                scheduled_at = COALESCE($7, scheduled_at),
                notes = COALESCE($8, notes),
                updated_at = NOW()
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(&changes.opponent)
        .bind(&changes.location)
        .bind(changes.is_home)
        .bind(changes.game_type)
        .bind(changes.status)
        .bind(changes.scheduled_at)
        .bind(&changes.notes)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Record or correct a result. Marks the game completed.
    pub async fn record_result(
        &self,
        id: Uuid,
        home_score: i32,
        away_score: i32,
    ) -> Result<Game, RepositoryError> {
        sqlx::query_as::<_, Game>(
            "UPDATE games SET
                home_score = $2,
                away_score = $3,
                status = 'completed',
                updated_at = NOW()
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(home_score)
        .bind(away_score)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM games WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
