//! Player management endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use clubdesk_auth::{password, AdminUser, AuthUser, CoachUser};
use clubdesk_common::{Error, Pagination, Result, ValidatedJson};
use clubdesk_email::content;

use crate::domain::entities::{Position, User};
use crate::domain::validation::generate_temp_password;
use crate::repository::players::{PlayerChanges, PlayerWithUser};
use crate::repository::transactions::{
    create_parent_account_tx, create_player_account_tx, link_parent_tx, PlayerProfile,
};

use super::super::middleware::RosterState;

#[derive(Debug, Deserialize)]
pub struct ListPlayersQuery {
    pub team_id: Option<Uuid>,
}

/// **GET /v1/players**
///
/// List players within the caller's visibility scope. Staff see all,
/// players their teammates and themselves, parents their children and
/// their children's teammates.
pub async fn list_players(
    State(state): State<RosterState>,
    AuthUser(caller): AuthUser,
    Query(query): Query<ListPlayersQuery>,
    pagination: Pagination,
) -> Result<impl IntoResponse> {
    let scope = state.auth.scope_for(&caller).await?;

    // An explicit team filter narrows within the scope, never widens it.
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

    let players = state
        .repos
        .players
        .list(
            team_filter.as_deref(),
            scope.extra_player_ids(),
            pagination.offset(),
            pagination.limit(),
        )
        .await?;
    Ok(Json(players))
}

#[derive(Debug, Deserialize, Validate)]
pub struct ParentInfo {
    #[validate(email(message = "Invalid parent email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Parent first name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Parent last name is required"))]
    pub last_name: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePlayerRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    /// Omitted: a temporary password is generated
    pub password: Option<String>,
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    pub phone: Option<String>,
    pub team_id: Option<Uuid>,
    pub date_of_birth: Option<NaiveDate>,
    pub position: Option<Position>,
    pub jersey_number: Option<i32>,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_phone: Option<String>,
    #[validate(nested)]
    #[serde(default)]
    pub parents: Vec<ParentInfo>,
}

#[derive(Debug, Serialize)]
pub struct CreatePlayerResponse {
    pub player: PlayerWithUser,
    /// Parent accounts created alongside the player
    pub created_parents: Vec<User>,
}

/// **POST /v1/players**
///
/// Create a player account with its profile, optionally together with
/// parent accounts.
///
/// # Business Rules
/// - Coaches and admins only; a team assignment requires managing that team
/// - Existing parent emails are linked, new ones get generated credentials
/// - Parent credentials are delivered by email after the transaction commits
pub async fn create_player(
    State(state): State<RosterState>,
    CoachUser(caller): CoachUser,
    ValidatedJson(request): ValidatedJson<CreatePlayerRequest>,
) -> Result<impl IntoResponse> {
    if let Some(team_id) = request.team_id {
        let scope = state.auth.scope_for(&caller).await?;
        if !scope.can_manage_team(team_id) {
            return Err(Error::Authorization(
                "You do not manage this team".to_string(),
            ));
        }
    }

    let player_password = match &request.password {
        Some(p) => {
            password::validate_password_strength(p)?;
            p.clone()
        }
        None => generate_temp_password(),
    };
    let player_hash = password::hash_password(&player_password)?;
    let child_name = format!("{} {}", request.first_name, request.last_name);

    let mut tx = state.repos.begin().await.map_err(Error::Database)?;

    let profile = PlayerProfile {
        team_id: request.team_id,
        date_of_birth: request.date_of_birth,
        position: request.position,
        jersey_number: request.jersey_number,
        emergency_contact_name: request.emergency_contact_name.clone(),
        emergency_contact_phone: request.emergency_contact_phone.clone(),
    };
    let (_, player_id) = create_player_account_tx(
        &mut tx,
        &request.email,
        &player_hash,
        &request.first_name,
        &request.last_name,
        request.phone.as_deref(),
        &profile,
    )
    .await?;

    let mut created_parents = Vec::new();
    let mut credential_mail = Vec::new();
    for parent in &request.parents {
        match state.repos.users.find_by_email(&parent.email).await? {
            Some(existing) => {
                link_parent_tx(&mut tx, existing.id, player_id).await?;
            }
            None => {
                let temp_password = generate_temp_password();
                let parent_hash = password::hash_password(&temp_password)?;
                let parent_user = create_parent_account_tx(
                    &mut tx,
                    &parent.email,
                    &parent_hash,
                    &parent.first_name,
                    &parent.last_name,
                    player_id,
                )
                .await?;
                credential_mail.push((parent_user.email.clone(), temp_password));
                created_parents.push(parent_user);
            }
        }
    }

    tx.commit().await.map_err(Error::Database)?;

    // Credentials go out after commit; a mail failure must not undo accounts.
    for (email, temp_password) in credential_mail {
        let message = content::parent_credentials_email(
            &state.frontend_url,
            &email,
            &child_name,
            &temp_password,
        );
        if let Err(e) = state.email.send(message).await {
            tracing::warn!(to = %email, error = %e, "failed to send parent credentials");
        }
    }

    let player = state
        .repos
        .players
        .find_by_id(player_id)
        .await?
        .ok_or_else(|| Error::NotFound("Player not found".to_string()))?;

    tracing::info!(%player_id, parents = created_parents.len(), "player created");
    Ok((
        StatusCode::CREATED,
        Json(CreatePlayerResponse {
            player,
            created_parents,
        }),
    ))
}

#[derive(Debug, Serialize)]
pub struct PlayerDetailResponse {
    #[serde(flatten)]
    pub player: PlayerWithUser,
    pub parents: Vec<User>,
}

/// **GET /v1/players/{id}**
///
/// A single player with their linked parents, if visible to the caller.
pub async fn get_player(
    State(state): State<RosterState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let player = state
        .repos
        .players
        .find_by_id(id)
        .await?
        .ok_or_else(|| Error::NotFound("Player not found".to_string()))?;

    let scope = state.auth.scope_for(&caller).await?;
    if !scope.allows_player(player.id, player.team_id) {
        return Err(Error::NotFound("Player not found".to_string()));
    }

    let parents = state.repos.players.parents_of(id).await?;
    Ok(Json(PlayerDetailResponse { player, parents }))
}

/// **GET /v1/players/{id}/parents**
///
/// The parent accounts linked to a player.
pub async fn get_player_parents(
    State(state): State<RosterState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let player = state
        .repos
        .players
        .find_by_id(id)
        .await?
        .ok_or_else(|| Error::NotFound("Player not found".to_string()))?;

    let scope = state.auth.scope_for(&caller).await?;
    if !scope.allows_player(player.id, player.team_id) {
        return Err(Error::NotFound("Player not found".to_string()));
    }

    let parents = state.repos.players.parents_of(id).await?;
    Ok(Json(parents))
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePlayerRequest {
    pub team_id: Option<Uuid>,
    pub date_of_birth: Option<NaiveDate>,
    pub position: Option<Position>,
    pub jersey_number: Option<i32>,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_phone: Option<String>,
    pub notes: Option<String>,
}

/// **PATCH /v1/players/{id}**
///
/// Update a player profile.
///
/// # Business Rules
/// - Staff managing the player's team may change everything
/// - Players may update their own date of birth and position, never
///   team assignment, jersey number or notes
pub async fn update_player(
    State(state): State<RosterState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdatePlayerRequest>,
) -> Result<impl IntoResponse> {
    let player = state
        .repos
        .players
        .find_by_id(id)
        .await?
        .ok_or_else(|| Error::NotFound("Player not found".to_string()))?;

    let changes = PlayerChanges {
        team_id: request.team_id,
        date_of_birth: request.date_of_birth,
        position: request.position,
        jersey_number: request.jersey_number,
        emergency_contact_name: request.emergency_contact_name,
        emergency_contact_phone: request.emergency_contact_phone,
        notes: request.notes,
    };

    let scope = state.auth.scope_for(&caller).await?;
    let manages = match player.team_id {
        Some(team_id) => scope.can_manage_team(team_id),
        None => caller.role.is_staff() && scope.is_unrestricted(),
    };
    let is_self = scope.own_player_id() == Some(id);

    if manages {
        // staff path, all fields allowed
    } else if is_self {
        if changes.touches_staff_fields() {
            return Err(Error::Authorization(
                "Players cannot change team assignment, jersey number or notes".to_string(),
            ));
        }
    } else {
        return Err(Error::Authorization(
            "Insufficient permissions".to_string(),
        ));
    }

    let player = state.repos.players.update(id, changes).await?;
    Ok(Json(player))
}

/// **DELETE /v1/players/{id}**
///
/// Remove a player profile. The backing user account stays and can be
/// deactivated separately.
pub async fn delete_player(
    State(state): State<RosterState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state.repos.players.delete(id).await?;
    tracing::info!(player_id = %id, "player deleted");
    Ok(StatusCode::NO_CONTENT)
}
