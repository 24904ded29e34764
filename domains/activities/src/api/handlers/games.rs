//! Game scheduling and results endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use clubdesk_auth::{AuthUser, StaffUser};
use clubdesk_common::{Error, Pagination, Result, ValidatedJson};
use clubdesk_ws::WsEvent;

use crate::domain::entities::{GameStatus, GameType};
use crate::repository::games::{GameChanges, NewGame};

use super::super::middleware::ActivitiesState;

#[derive(Debug, Deserialize)]
pub struct ListGamesQuery {
    pub team_id: Option<Uuid>,
    pub status: Option<GameStatus>,
    #[serde(default)]
    pub upcoming: bool,
}

/// **GET /v1/games**
///
/// List games within the caller's visibility scope, optionally narrowed
/// to one team, a status, or upcoming games only.
pub async fn list_games(
    State(state): State<ActivitiesState>,
    AuthUser(caller): AuthUser,
    Query(query): Query<ListGamesQuery>,
    pagination: Pagination,
) -> Result<impl IntoResponse> {
    let scope = state.auth.scope_for(&caller).await?;

    let scoped_teams = scope.team_ids().map(|ids| ids.to_vec());
    let team_filter = match (query.team_id, scoped_teams) {
        (Some(team), None) => Some(vec![team]),
        (Some(team), Some(visible)) => {
            if !visible.contains(&team) {
                return Err(Error::NotFound("Team not found".to_string()));
            }
            Some(vec![team])
        }
        (None, visible) => visible,
    };

    let games = state
        .repos
        .games
        .list(
            team_filter.as_deref(),
            query.status,
            query.upcoming,
            pagination.offset(),
            pagination.limit(),
        )
        .await?;
    Ok(Json(games))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateGameRequest {
    pub team_id: Uuid,
    #[validate(length(min = 1, max = 200, message = "Opponent must be 1-200 characters"))]
    pub opponent: String,
    pub location: Option<String>,
    #[serde(default)]
    pub is_home: bool,
    pub game_type: GameType,
    pub scheduled_at: DateTime<Utc>,
    pub notes: Option<String>,
}

/// **POST /v1/games**
///
/// Schedule a game. Staff managing the team only. Subscribers of the
/// team are notified.
pub async fn create_game(
    State(state): State<ActivitiesState>,
    StaffUser(caller): StaffUser,
    ValidatedJson(request): ValidatedJson<CreateGameRequest>,
) -> Result<impl IntoResponse> {
    let scope = state.auth.scope_for(&caller).await?;
    if !scope.can_manage_team(request.team_id) {
        return Err(Error::Authorization(
            "You do not manage this team".to_string(),
        ));
    }

    let game = state
        .repos
        .games
        .create(NewGame {
            team_id: request.team_id,
            opponent: request.opponent,
            location: request.location,
            is_home: request.is_home,
            game_type: request.game_type,
            scheduled_at: request.scheduled_at,
            notes: request.notes,
        })
        .await?;

    state
        .ws
        .publish(&WsEvent::GameScheduled {
            game_id: game.id,
            team_id: Some(game.team_id),
            opponent: game.opponent.clone(),
        })
        .await;

    tracing::info!(game_id = %game.id, team_id = %game.team_id, "game scheduled");
    Ok((StatusCode::CREATED, Json(game)))
}

/// **GET /v1/games/{id}**
///
/// A single game, if its team is visible to the caller.
pub async fn get_game(
    State(state): State<ActivitiesState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let game = state
        .repos
        .games
        .find_by_id(id)
        .await?
        .ok_or_else(|| Error::NotFound("Game not found".to_string()))?;

    let scope = state.auth.scope_for(&caller).await?;
    if !scope.allows_team(Some(game.team_id)) {
        return Err(Error::NotFound("Game not found".to_string()));
    }
    Ok(Json(game))
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateGameRequest {
    #[validate(length(min = 1, max = 200, message = "Opponent must be 1-200 characters"))]
    pub opponent: Option<String>,
    pub location: Option<String>,
    pub is_home: Option<bool>,
    pub game_type: Option<GameType>,
    pub status: Option<GameStatus>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

/// **PATCH /v1/games/{id}**
///
/// Update game details. Scores are recorded via the result endpoint,
/// not here. Staff managing the team only.
pub async fn update_game(
    State(state): State<ActivitiesState>,
    StaffUser(caller): StaffUser,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateGameRequest>,
) -> Result<impl IntoResponse> {
    let game = state
        .repos
        .games
        .find_by_id(id)
        .await?
        .ok_or_else(|| Error::NotFound("Game not found".to_string()))?;

    let scope = state.auth.scope_for(&caller).await?;
    if !scope.can_manage_team(game.team_id) {
        return Err(Error::Authorization(
            "You do not manage this team".to_string(),
        ));
    }

    let game = state
        .repos
        .games
        .update(
            id,
            GameChanges {
                opponent: request.opponent,
                location: request.location,
                is_home: request.is_home,
                game_type: request.game_type,
                status: request.status,
                scheduled_at: request.scheduled_at,
                notes: request.notes,
            },
        )
        .await?;
    Ok(Json(game))
}

#[derive(Debug, Deserialize, Validate)]
pub struct RecordResultRequest {
    #[validate(range(min = 0, max = 999, message = "Score must be 0-999"))]
    pub home_score: i32,
    #[validate(range(min = 0, max = 999, message = "Score must be 0-999"))]
    pub away_score: i32,
}

/// **PATCH /v1/games/{id}/result**
///
/// Record or correct a game result. The game is marked completed and
/// the team's subscribers are notified.
///
/// # Business Rules
/// - Staff only; coaches must manage the game's team, supervisors and
///   admins may record for any team
pub async fn record_result(
    State(state): State<ActivitiesState>,
    StaffUser(caller): StaffUser,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<RecordResultRequest>,
) -> Result<impl IntoResponse> {
    let game = state
        .repos
        .games
        .find_by_id(id)
        .await?
        .ok_or_else(|| Error::NotFound("Game not found".to_string()))?;

    let scope = state.auth.scope_for(&caller).await?;
    if !scope.can_manage_team(game.team_id) {
        return Err(Error::Authorization(
            "You do not manage this team".to_string(),
        ));
    }

    let game = state
        .repos
        .games
        .record_result(id, request.home_score, request.away_score)
        .await?;

    state
        .ws
        .publish(&WsEvent::GameResultUpdated {
            game_id: game.id,
            team_id: Some(game.team_id),
            home_score: request.home_score,
            away_score: request.away_score,
        })
        .await;

    tracing::info!(game_id = %game.id, "game result recorded");
    Ok(Json(game))
}

/// **DELETE /v1/games/{id}**
///
/// Delete a game and its attendance records. Staff managing the team only.
pub async fn delete_game(
    State(state): State<ActivitiesState>,
    StaffUser(caller): StaffUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let game = state
        .repos
        .games
        .find_by_id(id)
        .await?
        .ok_or_else(|| Error::NotFound("Game not found".to_string()))?;

    let scope = state.auth.scope_for(&caller).await?;
    if !scope.can_manage_team(game.team_id) {
        return Err(Error::Authorization(
            "You do not manage this team".to_string(),
        ));
    }

    state.repos.games.delete(id).await?;
    tracing::info!(game_id = %id, "game deleted");
    Ok(StatusCode::NO_CONTENT)
}
