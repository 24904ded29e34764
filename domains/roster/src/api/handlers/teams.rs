//! Team management endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use clubdesk_auth::{AdminUser, AuthUser, CoachUser, UserRole};
use clubdesk_common::{Error, Pagination, Result, ValidatedJson};

use crate::repository::teams::{NewTeam, TeamChanges};

use super::super::middleware::RosterState;

/// **GET /v1/teams**
///
/// List teams within the caller's visibility scope: staff see all teams,
/// players their own team, parents their children's teams.
pub async fn list_teams(
    State(state): State<RosterState>,
    AuthUser(caller): AuthUser,
    pagination: Pagination,
) -> Result<impl IntoResponse> {
    let scope = state.auth.scope_for(&caller).await?;
    let teams = state
        .repos
        .teams
        .list(scope.team_ids(), pagination.offset(), pagination.limit())
        .await?;
    Ok(Json(teams))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTeamRequest {
    #[validate(length(min = 1, max = 100, message = "Team name must be 1-100 characters"))]
    pub name: String,
    pub age_group: Option<String>,
    pub season: Option<String>,
    pub description: Option<String>,
    pub coach_id: Option<Uuid>,
}

/// **POST /v1/teams**
///
/// Create a team.
///
/// # Business Rules
/// - Coaches and admins only
/// - A coach creating a team without naming a coach becomes its coach
pub async fn create_team(
    State(state): State<RosterState>,
    CoachUser(caller): CoachUser,
    ValidatedJson(request): ValidatedJson<CreateTeamRequest>,
) -> Result<impl IntoResponse> {
    let coach_id = match request.coach_id {
        Some(id) => Some(id),
        None if caller.role == UserRole::Coach => Some(caller.id),
        None => None,
    };

    let team = state
        .repos
        .teams
        .create(NewTeam {
            name: request.name,
            age_group: request.age_group,
            season: request.season,
            description: request.description,
            coach_id,
        })
        .await?;

    tracing::info!(team_id = %team.id, "team created");
    Ok((StatusCode::CREATED, Json(team)))
}

/// **GET /v1/teams/{id}**
///
/// A single team, if visible to the caller.
pub async fn get_team(
    State(state): State<RosterState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let scope = state.auth.scope_for(&caller).await?;
    if !scope.allows_team(Some(id)) {
        return Err(Error::NotFound("Team not found".to_string()));
    }

    let team = state
        .repos
        .teams
        .find_by_id(id)
        .await?
        .ok_or_else(|| Error::NotFound("Team not found".to_string()))?;
    Ok(Json(team))
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTeamRequest {
    #[validate(length(min = 1, max = 100, message = "Team name must be 1-100 characters"))]
    pub name: Option<String>,
    pub age_group: Option<String>,
    pub season: Option<String>,
    pub description: Option<String>,
    pub coach_id: Option<Uuid>,
}

/// **PATCH /v1/teams/{id}**
///
/// Update a team. Admins may update any team; coaches only their own.
pub async fn update_team(
    State(state): State<RosterState>,
    CoachUser(caller): CoachUser,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateTeamRequest>,
) -> Result<impl IntoResponse> {
    let scope = state.auth.scope_for(&caller).await?;
    if !scope.can_manage_team(id) {
        return Err(Error::Authorization(
            "You do not manage this team".to_string(),
        ));
    }

    let team = state
        .repos
        .teams
        .update(
            id,
            TeamChanges {
                name: request.name,
                age_group: request.age_group,
                season: request.season,
                description: request.description,
                coach_id: request.coach_id,
            },
        )
        .await?;
    Ok(Json(team))
}

/// **DELETE /v1/teams/{id}**
///
/// Delete a team. Players on the roster are unassigned, not removed.
pub async fn delete_team(
    State(state): State<RosterState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state.repos.teams.delete(id).await?;
    tracing::info!(team_id = %id, "team deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// **POST /v1/teams/{team_id}/players/{player_id}**
///
/// Put a player on the team roster. Managing coach or admin only.
pub async fn add_player_to_team(
    State(state): State<RosterState>,
    CoachUser(caller): CoachUser,
    Path((team_id, player_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse> {
    let scope = state.auth.scope_for(&caller).await?;
    if !scope.can_manage_team(team_id) {
        return Err(Error::Authorization(
            "You do not manage this team".to_string(),
        ));
    }
    state
        .repos
        .teams
        .find_by_id(team_id)
        .await?
        .ok_or_else(|| Error::NotFound("Team not found".to_string()))?;

    state.repos.teams.assign_player(team_id, player_id).await?;
    tracing::info!(%team_id, %player_id, "player added to roster");
    Ok(StatusCode::NO_CONTENT)
}

/// **DELETE /v1/teams/{team_id}/players/{player_id}**
///
/// Take a player off the team roster. Managing coach or admin only.
pub async fn remove_player_from_team(
    State(state): State<RosterState>,
    CoachUser(caller): CoachUser,
    Path((team_id, player_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse> {
    let scope = state.auth.scope_for(&caller).await?;
    if !scope.can_manage_team(team_id) {
        return Err(Error::Authorization(
            "You do not manage this team".to_string(),
        ));
    }

    state.repos.teams.remove_player(team_id, player_id).await?;
    tracing::info!(%team_id, %player_id, "player removed from roster");
    Ok(StatusCode::NO_CONTENT)
}
