//! Attendance repository

use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use clubdesk_common::RepositoryError;

use crate::domain::entities::{Attendance, AttendanceStatus};
use crate::domain::validation::AttendanceTarget;
use crate::repository::map_insert_error;

/// One row in a bulk upsert.
#[derive(Debug, Clone)]
pub struct BulkAttendanceEntry {
    pub player_id: Uuid,
    pub status: AttendanceStatus,
    pub notes: Option<String>,
}

/// Aggregated response counts for a player or team.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AttendanceStats {
    pub total: i64,
    pub present: i64,
    pub absent: i64,
    pub excused: i64,
    pub pending: i64,
    /// present / answered, 0.0 when nothing has been answered yet
    pub attendance_rate: f64,
}

#[derive(Clone)]
pub struct AttendanceRepository {
    pool: PgPool,
}

impl AttendanceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a record. A duplicate (player, target) pair maps to
    /// `AlreadyExists` via the partial unique indexes.
    pub async fn create(
        &self,
        player_id: Uuid,
        target: AttendanceTarget,
        status: AttendanceStatus,
        notes: Option<&str>,
        recorded_by: Uuid,
    ) -> Result<Attendance, RepositoryError> {
        sqlx::query_as::<_, Attendance>(
            "INSERT INTO attendance (id, player_id, game_id, event_id, status, notes, recorded_by,
                                     recorded_at, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7,
                     CASE WHEN $5::attendance_status <> 'pending' THEN NOW() END,
                     NOW(), NOW())
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(player_id)
        .bind(target.game_id())
        .bind(target.event_id())
        .bind(status)
        .bind(notes)
        .bind(recorded_by)
        .fetch_one(&self.pool)
        .await
        .map_err(map_insert_error)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Attendance>, RepositoryError> {
        let record = sqlx::query_as::<_, Attendance>("SELECT * FROM attendance WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(record)
    }

    /// The team of the player behind a record. `None` covers a missing
    /// player as well as an unassigned one; visibility then falls back
    /// to the caller's explicit player list.
    pub async fn player_team(&self, player_id: Uuid) -> Result<Option<Uuid>, RepositoryError> {
        let team: Option<Option<Uuid>> =
            sqlx::query_scalar("SELECT team_id FROM players WHERE id = $1")
                .bind(player_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(team.flatten())
    }

    /// List records, optionally narrowed to a target or a player, within
    /// a visibility scope: records of players on a visible team, plus
    /// explicitly visible player ids. `None` team filter means
    /// unrestricted.
    pub async fn list(
        &self,
        game_id: Option<Uuid>,
        event_id: Option<Uuid>,
        player_id: Option<Uuid>,
        team_filter: Option<&[Uuid]>,
        extra_player_ids: &[Uuid],
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Attendance>, RepositoryError> {
        let records = sqlx::query_as::<_, Attendance>(
            "SELECT a.* FROM attendance a
             JOIN players p ON p.id = a.player_id
             WHERE ($1::uuid IS NULL OR a.game_id = $1)
               AND ($2::uuid IS NULL OR a.event_id = $2)
               AND ($3::uuid IS NULL OR a.player_id = $3)
               AND ($4::uuid[] IS NULL OR p.team_id = ANY($4) OR a.player_id = ANY($5))
             ORDER BY a.created_at DESC
             OFFSET $6 LIMIT $7",
        )
        .bind(game_id)
        .bind(event_id)
        .bind(player_id)
        .bind(team_filter)
        .bind(extra_player_ids)
        .bind(offset)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }

    /// Update status and notes; the recorder becomes the caller.
    /// `recorded_at` is stamped the first time the status leaves pending.
    pub async fn update_status(
        &self,
        id: Uuid,
        status: AttendanceStatus,
        notes: Option<&str>,
        recorded_by: Uuid,
    ) -> Result<Attendance, RepositoryError> {
        sqlx::query_as::<_, Attendance>(
            "UPDATE attendance SET
                status = $2,
                notes = COALESCE($3, notes),
                recorded_by = $4,
                recorded_at = CASE
                    WHEN $2 <> 'pending' AND recorded_at IS NULL THEN NOW()
                    ELSE recorded_at
                END,
                updated_at = NOW()
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(status)
        .bind(notes)
        .bind(recorded_by)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Upsert many records for one target in a single transaction.
    pub async fn bulk_upsert(
        &self,
        target: AttendanceTarget,
        entries: &[BulkAttendanceEntry],
        recorded_by: Uuid,
    ) -> Result<Vec<Attendance>, RepositoryError> {
        let conflict_target = match target {
            AttendanceTarget::Game(_) => "(player_id, game_id) WHERE game_id IS NOT NULL",
            AttendanceTarget::Event(_) => "(player_id, event_id) WHERE event_id IS NOT NULL",
        };
        let query = format!(
            "INSERT INTO attendance (id, player_id, game_id, event_id, status, notes, recorded_by,
                                     recorded_at, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7,
                     CASE WHEN $5::attendance_status <> 'pending' THEN NOW() END,
                     NOW(), NOW())
             ON CONFLICT {conflict_target}
             DO UPDATE SET
                status = EXCLUDED.status,
                notes = COALESCE(EXCLUDED.notes, attendance.notes),
                recorded_by = EXCLUDED.recorded_by,
                recorded_at = CASE
                    WHEN EXCLUDED.status <> 'pending' AND attendance.recorded_at IS NULL
                    THEN NOW()
                    ELSE attendance.recorded_at
                END,
                updated_at = NOW()
             RETURNING *"
        );

        let mut tx = self.pool.begin().await?;
        let mut results = Vec::with_capacity(entries.len());
        for entry in entries {
            let record = sqlx::query_as::<_, Attendance>(&query)
                .bind(Uuid::new_v4())
                .bind(entry.player_id)
                .bind(target.game_id())
                .bind(target.event_id())
                .bind(entry.status)
                .bind(&entry.notes)
                .bind(recorded_by)
                .fetch_one(&mut *tx)
                .await?;
            results.push(record);
        }
        tx.commit().await?;
        Ok(results)
    }

    /// Create pending records for every player on a team. Idempotent:
    /// existing records are left untouched.
    pub async fn initialize_for_team(
        &self,
        target: AttendanceTarget,
        team_id: Uuid,
    ) -> Result<u64, RepositoryError> {
        let conflict_target = match target {
            AttendanceTarget::Game(_) => "(player_id, game_id) WHERE game_id IS NOT NULL",
            AttendanceTarget::Event(_) => "(player_id, event_id) WHERE event_id IS NOT NULL",
        };
        let query = format!(
            "INSERT INTO attendance (id, player_id, game_id, event_id, status, created_at, updated_at)
             SELECT gen_random_uuid(), p.id, $1, $2, 'pending', NOW(), NOW()
             FROM players p
             JOIN users u ON u.id = p.user_id
             WHERE p.team_id = $3 AND u.is_active
             ON CONFLICT {conflict_target} DO NOTHING"
        );
        let result = sqlx::query(&query)
            .bind(target.game_id())
            .bind(target.event_id())
            .bind(team_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Response counts for a player, a team, or the caller's visible
    /// players. The scope filter applies the same team-or-player rule
    /// as `list`.
    pub async fn stats(
        &self,
        player_id: Option<Uuid>,
        team_id: Option<Uuid>,
        team_filter: Option<&[Uuid]>,
        extra_player_ids: &[Uuid],
    ) -> Result<AttendanceStats, RepositoryError> {
        let stats = sqlx::query_as::<_, AttendanceStats>(
            "SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE a.status = 'present') AS present,
                COUNT(*) FILTER (WHERE a.status = 'absent') AS absent,
                COUNT(*) FILTER (WHERE a.status = 'excused') AS excused,
                COUNT(*) FILTER (WHERE a.status = 'pending') AS pending,
                COALESCE(
                    COUNT(*) FILTER (WHERE a.status = 'present')::float8
                        / NULLIF(COUNT(*) FILTER (WHERE a.status <> 'pending'), 0),
                    0.0
                ) AS attendance_rate
             FROM attendance a
             JOIN players p ON p.id = a.player_id
             WHERE ($1::uuid IS NULL OR a.player_id = $1)
               AND ($2::uuid IS NULL OR p.team_id = $2)
               AND ($3::uuid[] IS NULL OR p.team_id = ANY($3) OR a.player_id = ANY($4))",
        )
        .bind(player_id)
        .bind(team_id)
        .bind(team_filter)
        .bind(extra_player_ids)
        .fetch_one(&self.pool)
        .await?;
        Ok(stats)
    }
}
