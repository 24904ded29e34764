//! Attendance tracking endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use clubdesk_auth::{AuthUser, StaffUser, VisibilityScope};
use clubdesk_common::{Error, Pagination, Result, ValidatedJson};

use crate::domain::entities::AttendanceStatus;
use crate::domain::validation::AttendanceTarget;
use crate::repository::attendance::BulkAttendanceEntry;

use super::super::middleware::ActivitiesState;

/// Resolve the team behind an attendance target, verifying the target
/// exists. Club-wide events have no team.
async fn target_team(
    state: &ActivitiesState,
    target: AttendanceTarget,
) -> Result<Option<Uuid>> {
    match target {
        AttendanceTarget::Game(game_id) => {
            let game = state
                .repos
                .games
                .find_by_id(game_id)
                .await?
                .ok_or_else(|| Error::NotFound("Game not found".to_string()))?;
            Ok(Some(game.team_id))
        }
        AttendanceTarget::Event(event_id) => {
            let event = state
                .repos
                .events
                .find_by_id(event_id)
                .await?
                .ok_or_else(|| Error::NotFound("Event not found".to_string()))?;
            Ok(event.team_id)
        }
    }
}

/// Staff may manage attendance for a target when they manage its team;
/// targets without a team (club-wide events) are managed by any staff
/// with unrestricted scope, or the admin role.
fn can_manage_target(scope: &VisibilityScope, team_id: Option<Uuid>) -> bool {
    match team_id {
        Some(team_id) => scope.can_manage_team(team_id),
        None => scope.role.is_staff() && scope.is_unrestricted(),
    }
}

/// Whether a record about a player is visible to the caller, given the
/// player's team. Coaches see their teams' players, players their
/// teammates, parents their children and their children's teammates.
fn record_visible(
    scope: &VisibilityScope,
    player_id: Uuid,
    player_team_id: Option<Uuid>,
) -> bool {
    scope.allows_player(player_id, player_team_id)
}

#[derive(Debug, Deserialize)]
pub struct ListAttendanceQuery {
    pub game_id: Option<Uuid>,
    pub event_id: Option<Uuid>,
    pub player_id: Option<Uuid>,
}

/// **GET /v1/attendance**
///
/// List attendance records. Admins and supervisors see everything,
/// coaches their teams' records, players and parents the records of
/// the players they can see.
pub async fn list_attendance(
    State(state): State<ActivitiesState>,
    AuthUser(caller): AuthUser,
    Query(query): Query<ListAttendanceQuery>,
    pagination: Pagination,
) -> Result<impl IntoResponse> {
    let scope = state.auth.scope_for(&caller).await?;

    let records = state
        .repos
        .attendance
        .list(
            query.game_id,
            query.event_id,
            query.player_id,
            scope.team_ids(),
            scope.extra_player_ids(),
            pagination.offset(),
            pagination.limit(),
        )
        .await?;
    Ok(Json(records))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateAttendanceRequest {
    pub player_id: Uuid,
    pub game_id: Option<Uuid>,
    pub event_id: Option<Uuid>,
    pub status: Option<AttendanceStatus>,
    pub notes: Option<String>,
}

/// **POST /v1/attendance**
///
/// Create an attendance record for a player.
///
/// # Business Rules
/// - Exactly one of `game_id` and `event_id` must be set
/// - Staff managing the target's team; players for themselves; parents
///   for their children
/// - A duplicate (player, target) pair returns 409
pub async fn create_attendance(
    State(state): State<ActivitiesState>,
    AuthUser(caller): AuthUser,
    ValidatedJson(request): ValidatedJson<CreateAttendanceRequest>,
) -> Result<impl IntoResponse> {
    let target = AttendanceTarget::from_options(request.game_id, request.event_id)?;
    let team_id = target_team(&state, target).await?;

    let scope = state.auth.scope_for(&caller).await?;
    let manages = can_manage_target(&scope, team_id);
    let files_own = scope.extra_player_ids().contains(&request.player_id);
    if !manages && !files_own {
        return Err(Error::Authorization(
            "You cannot record attendance for this player".to_string(),
        ));
    }

    let record = state
        .repos
        .attendance
        .create(
            request.player_id,
            target,
            request.status.unwrap_or(AttendanceStatus::Pending),
            request.notes.as_deref(),
            caller.id,
        )
        .await?;

    tracing::info!(attendance_id = %record.id, player_id = %record.player_id, "attendance created");
    Ok((StatusCode::CREATED, Json(record)))
}

/// **GET /v1/attendance/{id}**
///
/// A single attendance record, if visible to the caller.
pub async fn get_attendance(
    State(state): State<ActivitiesState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let record = state
        .repos
        .attendance
        .find_by_id(id)
        .await?
        .ok_or_else(|| Error::NotFound("Attendance record not found".to_string()))?;

    let scope = state.auth.scope_for(&caller).await?;
    let player_team = state.repos.attendance.player_team(record.player_id).await?;
    if !record_visible(&scope, record.player_id, player_team) {
        return Err(Error::NotFound("Attendance record not found".to_string()));
    }
    Ok(Json(record))
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateAttendanceRequest {
    pub status: AttendanceStatus,
    pub notes: Option<String>,
}

/// **PATCH /v1/attendance/{id}**
///
/// Update an attendance response. The recorder becomes the caller.
///
/// # Business Rules
/// - Staff managing the target's team may change any record at any time
/// - Players and parents may answer only their own respectively their
///   children's records, and only while still pending
/// - `recorded_at` is stamped the first time a record leaves pending
pub async fn update_attendance(
    State(state): State<ActivitiesState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateAttendanceRequest>,
) -> Result<impl IntoResponse> {
    let record = state
        .repos
        .attendance
        .find_by_id(id)
        .await?
        .ok_or_else(|| Error::NotFound("Attendance record not found".to_string()))?;

    let target = AttendanceTarget::from_options(record.game_id, record.event_id)?;
    let team_id = target_team(&state, target).await?;

    let scope = state.auth.scope_for(&caller).await?;
    let manages = can_manage_target(&scope, team_id);
    let answers_own = scope.extra_player_ids().contains(&record.player_id);

    if !manages {
        if !answers_own {
            return Err(Error::Authorization(
                "You cannot update this record".to_string(),
            ));
        }
        if record.status != AttendanceStatus::Pending {
            return Err(Error::Validation(
                "Response already recorded; ask your coach to change it".to_string(),
            ));
        }
    }

    let record = state
        .repos
        .attendance
        .update_status(id, request.status, request.notes.as_deref(), caller.id)
        .await?;
    Ok(Json(record))
}

#[derive(Debug, Deserialize, Validate)]
pub struct BulkAttendanceRequest {
    pub game_id: Option<Uuid>,
    pub event_id: Option<Uuid>,
    #[validate(length(min = 1, message = "At least one entry is required"))]
    pub entries: Vec<BulkEntry>,
}

// Serialize: validator embeds the entries in length-violation params
#[derive(Debug, Serialize, Deserialize)]
pub struct BulkEntry {
    pub player_id: Uuid,
    pub status: AttendanceStatus,
    pub notes: Option<String>,
}

/// **POST /v1/attendance/bulk**
///
/// Upsert many records for one game or event in a single transaction.
/// Staff managing the target's team only.
pub async fn bulk_upsert(
    State(state): State<ActivitiesState>,
    StaffUser(caller): StaffUser,
    ValidatedJson(request): ValidatedJson<BulkAttendanceRequest>,
) -> Result<impl IntoResponse> {
    let target = AttendanceTarget::from_options(request.game_id, request.event_id)?;
    let team_id = target_team(&state, target).await?;

    let scope = state.auth.scope_for(&caller).await?;
    if !can_manage_target(&scope, team_id) {
        return Err(Error::Authorization(
            "You do not manage this team".to_string(),
        ));
    }

    let entries: Vec<BulkAttendanceEntry> = request
        .entries
        .into_iter()
        .map(|e| BulkAttendanceEntry {
            player_id: e.player_id,
            status: e.status,
            notes: e.notes,
        })
        .collect();

    let records = state
        .repos
        .attendance
        .bulk_upsert(target, &entries, caller.id)
        .await?;
    tracing::info!(count = records.len(), "attendance bulk upsert");
    Ok(Json(records))
}

#[derive(Debug, Deserialize, Validate)]
pub struct InitializeAttendanceRequest {
    pub game_id: Option<Uuid>,
    pub event_id: Option<Uuid>,
    /// Defaults to the game's team; required for events without a team
    pub team_id: Option<Uuid>,
}

/// **POST /v1/attendance/initialize**
///
/// Create pending records for every active player on a team. Idempotent:
/// players who already have a record are skipped.
pub async fn initialize(
    State(state): State<ActivitiesState>,
    StaffUser(caller): StaffUser,
    ValidatedJson(request): ValidatedJson<InitializeAttendanceRequest>,
) -> Result<impl IntoResponse> {
    let target = AttendanceTarget::from_options(request.game_id, request.event_id)?;
    let target_team_id = target_team(&state, target).await?;

    let team_id = request
        .team_id
        .or(target_team_id)
        .ok_or_else(|| Error::Validation("team_id is required for this target".to_string()))?;

    let scope = state.auth.scope_for(&caller).await?;
    if !scope.can_manage_team(team_id) {
        return Err(Error::Authorization(
            "You do not manage this team".to_string(),
        ));
    }

    let created = state
        .repos
        .attendance
        .initialize_for_team(target, team_id)
        .await?;
    tracing::info!(%team_id, created, "attendance initialized");
    Ok(Json(serde_json::json!({ "created": created })))
}

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub player_id: Option<Uuid>,
    pub team_id: Option<Uuid>,
}

/// **GET /v1/attendance/stats**
///
/// Aggregated response counts for a player, a team, or the caller's
/// visible players.
pub async fn stats(
    State(state): State<ActivitiesState>,
    AuthUser(caller): AuthUser,
    Query(query): Query<StatsQuery>,
) -> Result<impl IntoResponse> {
    let scope = state.auth.scope_for(&caller).await?;

    if let Some(player_id) = query.player_id {
        let player_team = state.repos.attendance.player_team(player_id).await?;
        if !record_visible(&scope, player_id, player_team) {
            return Err(Error::NotFound("Player not found".to_string()));
        }
    }
    if let Some(team_id) = query.team_id {
        if !scope.allows_team(Some(team_id)) {
            return Err(Error::NotFound("Team not found".to_string()));
        }
    }

    let stats = state
        .repos
        .attendance
        .stats(
            query.player_id,
            query.team_id,
            scope.team_ids(),
            scope.extra_player_ids(),
        )
        .await?;
    Ok(Json(stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clubdesk_auth::UserRole;

    #[test]
    fn test_coach_sees_own_team_records() {
        let team = Uuid::new_v4();
        let player = Uuid::new_v4();
        let scope = VisibilityScope::coached_teams(vec![team]);

        assert!(record_visible(&scope, player, Some(team)));
        assert!(!record_visible(&scope, player, Some(Uuid::new_v4())));
        // List filtering runs on the team list; the player list stays empty
        assert_eq!(scope.team_ids(), Some(&[team][..]));
        assert!(scope.extra_player_ids().is_empty());
    }

    #[test]
    fn test_player_sees_teammates_records() {
        let me = Uuid::new_v4();
        let my_team = Uuid::new_v4();
        let teammate = Uuid::new_v4();
        let scope = VisibilityScope::own_player(me, Some(my_team));

        assert!(record_visible(&scope, me, Some(my_team)));
        assert!(record_visible(&scope, teammate, Some(my_team)));
        assert!(!record_visible(&scope, Uuid::new_v4(), Some(Uuid::new_v4())));
    }

    #[test]
    fn test_parent_sees_child_without_team() {
        let child = Uuid::new_v4();
        let scope = VisibilityScope::children(vec![child], vec![]);

        assert!(record_visible(&scope, child, None));
        assert!(!record_visible(&scope, Uuid::new_v4(), None));
    }

    #[test]
    fn test_admin_sees_everything() {
        let scope = VisibilityScope::all(UserRole::Admin);
        assert!(record_visible(&scope, Uuid::new_v4(), None));
        assert!(scope.team_ids().is_none());
    }

    #[test]
    fn test_club_wide_target_managed_by_unrestricted_staff_only() {
        let team = Uuid::new_v4();
        assert!(can_manage_target(&VisibilityScope::all(UserRole::Supervisor), None));
        assert!(!can_manage_target(&VisibilityScope::coached_teams(vec![team]), None));
        assert!(can_manage_target(&VisibilityScope::coached_teams(vec![team]), Some(team)));
    }
}
