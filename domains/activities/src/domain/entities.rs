//! Activities entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "game_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum GameType {
    League,
    Cup,
    Friendly,
    Tournament,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "game_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

/// A scheduled match for a team.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Game {
    pub id: Uuid,
    pub team_id: Uuid,
    pub opponent: String,
    pub location: Option<String>,
    pub is_home: bool,
    pub game_type: GameType,
    pub status: GameStatus,
    pub scheduled_at: DateTime<Utc>,
    pub home_score: Option<i32>,
    pub away_score: Option<i32>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "event_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Training,
    Game,
    Meeting,
    Tournament,
    Other,
}

/// Who an event is aimed at. `Team` events require a team, `AgeGroup`
/// events an age group, `ClubWide` events neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "event_visibility", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EventVisibility {
    Team,
    ClubWide,
    AgeGroup,
}

/// A club calendar entry: training, meeting, social event.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Event {
    pub id: Uuid,
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
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "attendance_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Pending,
    Present,
    Absent,
    Excused,
}

/// A player's attendance record for exactly one game or one event.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Attendance {
    pub id: Uuid,
    pub player_id: Uuid,
    pub game_id: Option<Uuid>,
    pub event_id: Option<Uuid>,
    pub status: AttendanceStatus,
    pub notes: Option<String>,
    /// Who filed or last overwrote the response
    pub recorded_by: Option<Uuid>,
    /// Set the first time the status leaves `pending`
    pub recorded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A club news article. Drafts are visible to staff only until published.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct News {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    /// `None` = club-wide
    pub team_id: Option<Uuid>,
    pub author_id: Uuid,
    pub is_published: bool,
    /// Stamped on first publication and kept on re-publish
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
