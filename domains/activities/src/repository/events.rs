//! Event repository

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use clubdesk_common::RepositoryError;

use crate::domain::entities::{Event, EventType, EventVisibility};
use crate::repository::map_insert_error;

/// Fields for creating a calendar event.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub title: String,
    pub description: Option<String>,
    pub event_type: EventType,
    pub visibility: EventVisibility,
    pub team_id: Option<Uuid>,
    pub age_group: Option<String>,
    pub location: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub created_by: Uuid,
}

/// Partial update; `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct EventChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub event_type: Option<EventType>,
    pub location: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
}

#[derive(Clone)]
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, new_event: NewEvent) -> Result<Event, RepositoryError> {
        sqlx::query_as::<_, Event>(
            "INSERT INTO events (id, title, description, event_type, visibility, team_id,
                                 age_group, location, starts_at, ends_at, created_by,
                                 created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, NOW(), NOW())
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&new_event.title)
        .bind(&new_event.description)
        .bind(new_event.event_type)
        .bind(new_event.visibility)
        .bind(new_event.team_id)
        .bind(&new_event.age_group)
        .bind(&new_event.location)
        .bind(new_event.starts_at)
        .bind(new_event.ends_at)
        .bind(new_event.created_by)
        .fetch_one(&self.pool)
        .await
        .map_err(map_insert_error)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Event>, RepositoryError> {
        let event = sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(event)
    }

    /// List events visible in a scope: team events for visible teams,
    /// plus everything club-wide or age-group targeted. An optional time
    /// window narrows to a calendar range.
    pub async fn list(
        &self,
        team_filter: Option<&[Uuid]>,
        from: Option<DateTime<Utc>>,
        until: Option<DateTime<Utc>>,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Event>, RepositoryError> {
        let events = sqlx::query_as::<_, Event>(
            "SELECT * FROM events
             WHERE ($1::uuid[] IS NULL OR team_id IS NULL OR team_id = ANY($1))
               AND ($2::timestamptz IS NULL OR ends_at >= $2)
               AND ($3::timestamptz IS NULL OR starts_at <= $3)
             ORDER BY starts_at
             OFFSET $4 LIMIT $5",
        )
        .bind(team_filter)
        .bind(from)
        .bind(until)
        .bind(offset)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(events)
    }

    pub async fn update(&self, id: Uuid, changes: EventChanges) -> Result<Event, RepositoryError> {
        sqlx::query_as::<_, Event>(
            "UPDATE events SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                event_type = COALESCE($4, event_type),
                location = COALESCE($5, location),
                starts_at = COALESCE($6, starts_at),
                ends_at = COALESCE($7, ends_at),
                updated_at = NOW()
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(&changes.title)
        .bind(&changes.description)
        .bind(changes.event_type)
        .bind(&changes.location)
        .bind(changes.starts_at)
        .bind(changes.ends_at)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
