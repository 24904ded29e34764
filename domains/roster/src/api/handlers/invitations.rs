//! Invitation lifecycle endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use clubdesk_auth::{jwt, password, CoachUser, TokenPair, UserRole};
use clubdesk_common::{Error, Pagination, Result, ValidatedJson};
use clubdesk_email::content;

use crate::domain::entities::{Invitation, InvitationStatus, User, INVITATION_TTL_DAYS};
use crate::domain::state::{
    InvitationEvent, InvitationGuardContext, InvitationState, InvitationStateMachine, StateError,
};
use crate::domain::validation::generate_invitation_token;
use crate::repository::transactions::accept_invitation_tx;

use super::super::middleware::RosterState;

fn map_state_error(err: StateError) -> Error {
    Error::Validation(err.to_string())
}

async fn send_invitation_email(state: &RosterState, invitation: &Invitation) {
    let team_name = match invitation.team_id {
        Some(team_id) => match state.repos.teams.find_by_id(team_id).await {
            Ok(team) => team.map(|t| t.name),
            Err(e) => {
                tracing::warn!(%team_id, error = %e, "failed to load team for invitation email");
                None
            }
        },
        None => None,
    };

    let message = content::invitation_email(
        &state.frontend_url,
        &invitation.email,
        &invitation.first_name,
        invitation.role.as_str(),
        team_name.as_deref(),
        &invitation.token,
    );
    if let Err(e) = state.email.send(message).await {
        tracing::warn!(to = %invitation.email, error = %e, "failed to send invitation email");
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateInvitationRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    pub role: UserRole,
    pub team_id: Option<Uuid>,
}

/// **POST /v1/invitations**
///
/// Invite someone to join the club.
///
/// # Business Rules
/// - Coaches and admins only; a team-bound invitation requires managing
///   that team
/// - `admin` cannot be granted by invitation
/// - An email that already has an account returns 409
/// - An email with a live pending invitation returns 409; an overdue
///   one is expired and the email becomes invitable again
pub async fn create_invitation(
    State(state): State<RosterState>,
    CoachUser(caller): CoachUser,
    ValidatedJson(request): ValidatedJson<CreateInvitationRequest>,
) -> Result<impl IntoResponse> {
    if request.role == UserRole::Admin {
        return Err(Error::Validation(
            "Admin role cannot be granted by invitation".to_string(),
        ));
    }

    if let Some(team_id) = request.team_id {
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
    }

    if state
        .repos
        .users
        .find_by_email(&request.email)
        .await?
        .is_some()
    {
        return Err(Error::Conflict(
            "A user with this email already exists".to_string(),
        ));
    }
    if let Some(existing) = state
        .repos
        .invitations
        .find_pending_for_email(&request.email)
        .await?
    {
        // An overdue row is expired here, which also frees the partial
        // unique index for the new insert
        let existing = apply_lazy_expiry(&state, existing).await?;
        if existing.status == InvitationStatus::Pending {
            return Err(Error::Conflict(
                "A pending invitation for this email already exists".to_string(),
            ));
        }
    }

    let invitation = Invitation::new(
        request.email,
        request.first_name,
        request.last_name,
        request.role,
        request.team_id,
        caller.id,
    );
    let invitation = state.repos.invitations.create(&invitation).await?;

    send_invitation_email(&state, &invitation).await;

    tracing::info!(invitation_id = %invitation.id, role = %invitation.role, "invitation sent");
    Ok((StatusCode::CREATED, Json(invitation)))
}

/// **GET /v1/invitations/sent**
///
/// Invitations the caller sent. Admins see everyone's.
pub async fn list_sent(
    State(state): State<RosterState>,
    CoachUser(caller): CoachUser,
    pagination: Pagination,
) -> Result<impl IntoResponse> {
    let invited_by = match caller.role {
        UserRole::Admin => None,
        _ => Some(caller.id),
    };
    let invitations = state
        .repos
        .invitations
        .list_sent(invited_by, pagination.offset(), pagination.limit())
        .await?;
    Ok(Json(invitations))
}

/// **GET /v1/teams/{team_id}/invitations**
///
/// Invitations bound to a team. Managing coach or admin only.
pub async fn list_for_team(
    State(state): State<RosterState>,
    CoachUser(caller): CoachUser,
    Path(team_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let scope = state.auth.scope_for(&caller).await?;
    if !scope.can_manage_team(team_id) {
        return Err(Error::Authorization(
            "You do not manage this team".to_string(),
        ));
    }

    let invitations = state.repos.invitations.list_for_team(team_id).await?;
    Ok(Json(invitations))
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_name: Option<String>,
}

impl VerifyResponse {
    fn invalid(reason: String) -> Self {
        Self {
            valid: false,
            reason: Some(reason),
            email: None,
            first_name: None,
            last_name: None,
            role: None,
            team_name: None,
        }
    }
}

/// **GET /v1/invitations/verify/{token}**
///
/// Check an invitation token before showing the acceptance form. Public.
///
/// # Business Rules
/// - Expiry is applied lazily here: a pending invitation past its expiry
///   is flipped to expired before answering
/// - Unknown tokens answer `valid: false`, not 404
pub async fn verify(
    State(state): State<RosterState>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse> {
    let Some(invitation) = state.repos.invitations.find_by_token(&token).await? else {
        return Ok(Json(VerifyResponse::invalid(
            "Invalid invitation token".to_string(),
        )));
    };

    let invitation = apply_lazy_expiry(&state, invitation).await?;

    if invitation.status != InvitationStatus::Pending {
        return Ok(Json(VerifyResponse::invalid(
            InvitationState::from(invitation.status).to_string(),
        )));
    }

    let team_name = match invitation.team_id {
        Some(team_id) => state
            .repos
            .teams
            .find_by_id(team_id)
            .await?
            .map(|t| t.name),
        None => None,
    };

    Ok(Json(VerifyResponse {
        valid: true,
        reason: None,
        email: Some(invitation.email),
        first_name: Some(invitation.first_name),
        last_name: Some(invitation.last_name),
        role: Some(invitation.role),
        team_name,
    }))
}

/// Flip a pending invitation past its expiry to expired.
async fn apply_lazy_expiry(state: &RosterState, invitation: Invitation) -> Result<Invitation> {
    if invitation.status == InvitationStatus::Pending && invitation.is_past_expiry() {
        let next = InvitationStateMachine::transition(
            InvitationState::from(invitation.status),
            InvitationEvent::Expire,
            None,
        )
        .map_err(map_state_error)?;
        let updated = state
            .repos
            .invitations
            .set_status(invitation.id, next.into())
            .await?;
        tracing::debug!(invitation_id = %updated.id, "invitation lazily expired");
        return Ok(updated);
    }
    Ok(invitation)
}

/// **POST /v1/invitations/{id}/resend**
///
/// Re-send an invitation with a fresh token and a fresh 7 day expiry.
///
/// # Business Rules
/// - Sender or admin only
/// - Allowed from pending and expired, not from accepted or revoked
pub async fn resend(
    State(state): State<RosterState>,
    CoachUser(caller): CoachUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let invitation = state
        .repos
        .invitations
        .find_by_id(id)
        .await?
        .ok_or_else(|| Error::NotFound("Invitation not found".to_string()))?;

    if caller.role != UserRole::Admin && invitation.invited_by != caller.id {
        return Err(Error::Authorization(
            "Only the sender or an admin may resend".to_string(),
        ));
    }

    InvitationStateMachine::transition(
        InvitationState::from(invitation.status),
        InvitationEvent::Resend,
        None,
    )
    .map_err(map_state_error)?;

    let token = generate_invitation_token();
    let expires_at = Utc::now() + chrono::Duration::days(INVITATION_TTL_DAYS);
    let invitation = state
        .repos
        .invitations
        .refresh_for_resend(id, &token, expires_at)
        .await?;

    send_invitation_email(&state, &invitation).await;

    tracing::info!(invitation_id = %invitation.id, "invitation resent");
    Ok(Json(invitation))
}

/// **DELETE /v1/invitations/{id}**
///
/// Revoke a pending invitation. Its token stops working immediately.
///
/// # Business Rules
/// - Sender or admin only
/// - Only pending invitations can be revoked
pub async fn revoke(
    State(state): State<RosterState>,
    CoachUser(caller): CoachUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let invitation = state
        .repos
        .invitations
        .find_by_id(id)
        .await?
        .ok_or_else(|| Error::NotFound("Invitation not found".to_string()))?;

    if caller.role != UserRole::Admin && invitation.invited_by != caller.id {
        return Err(Error::Authorization(
            "Only the sender or an admin may revoke".to_string(),
        ));
    }

    let next = InvitationStateMachine::transition(
        InvitationState::from(invitation.status),
        InvitationEvent::Revoke,
        None,
    )
    .map_err(map_state_error)?;

    state.repos.invitations.set_status(id, next.into()).await?;
    tracing::info!(invitation_id = %id, "invitation revoked");
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize, Validate)]
pub struct AcceptInvitationRequest {
    #[validate(length(min = 1, message = "Token is required"))]
    pub token: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AcceptInvitationResponse {
    #[serde(flatten)]
    pub tokens: TokenPair,
    pub user: User,
}

/// **POST /v1/invitations/accept**
///
/// Accept an invitation: create the account under the invited role and
/// log the new user in. Public.
///
/// # Business Rules
/// - Expiry is applied lazily before the acceptance guard runs
/// - A `player` invitation also creates a player profile on the
///   invitation's team
/// - The account name and email are fixed to the invited values
pub async fn accept(
    State(state): State<RosterState>,
    ValidatedJson(request): ValidatedJson<AcceptInvitationRequest>,
) -> Result<impl IntoResponse> {
    let invitation = state
        .repos
        .invitations
        .find_by_token(&request.token)
        .await?
        .ok_or_else(|| Error::NotFound("Invitation not found".to_string()))?;

    let invitation = apply_lazy_expiry(&state, invitation).await?;

    InvitationStateMachine::transition(
        InvitationState::from(invitation.status),
        InvitationEvent::Accept,
        Some(&InvitationGuardContext {
            is_expired: invitation.is_past_expiry(),
        }),
    )
    .map_err(map_state_error)?;

    if state
        .repos
        .users
        .find_by_email(&invitation.email)
        .await?
        .is_some()
    {
        return Err(Error::Conflict(
            "A user with this email already exists".to_string(),
        ));
    }

    password::validate_password_strength(&request.password)?;
    let password_hash = password::hash_password(&request.password)?;

    let mut tx = state.repos.begin().await.map_err(Error::Database)?;
    let user = accept_invitation_tx(&mut tx, &invitation, &password_hash).await?;
    tx.commit().await.map_err(Error::Database)?;

    let tokens = jwt::issue_token_pair(state.auth.config(), &user.email, user.role)?;

    tracing::info!(user_id = %user.id, invitation_id = %invitation.id, "invitation accepted");
    Ok((
        StatusCode::CREATED,
        Json(AcceptInvitationResponse { tokens, user }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending_invitation() -> Invitation {
        Invitation::new(
            "late@club.example".to_string(),
            "Kim".to_string(),
            "Aas".to_string(),
            UserRole::Player,
            None,
            Uuid::new_v4(),
        )
    }

    #[test]
    fn test_overdue_invitation_stops_blocking_reinvite() {
        let mut invitation = pending_invitation();
        invitation.expires_at = Utc::now() - chrono::Duration::hours(1);
        assert!(invitation.is_past_expiry());

        // The overdue row is expired before the uniqueness check runs,
        // so the email can be invited again
        let next = InvitationStateMachine::transition(
            InvitationState::from(invitation.status),
            InvitationEvent::Expire,
            None,
        )
        .unwrap();
        assert_eq!(InvitationStatus::from(next), InvitationStatus::Expired);
    }

    #[test]
    fn test_live_invitation_still_blocks_reinvite() {
        let invitation = pending_invitation();
        assert_eq!(invitation.status, InvitationStatus::Pending);
        assert!(!invitation.is_past_expiry());
    }

    #[test]
    fn test_invalid_verify_response_omits_invitation_fields() {
        let response = VerifyResponse::invalid("Invalid invitation token".to_string());
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["valid"], false);
        assert_eq!(json["reason"], "Invalid invitation token");
        assert!(json.get("email").is_none());
        assert!(json.get("role").is_none());
    }
}
