//! Authentication endpoints: login, refresh, profile, OAuth federation

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use clubdesk_auth::{jwt, AuthUser, OAuthProvider, OAuthUserInfo, TokenPair, UserRole};
use clubdesk_common::{Error, Result, ValidatedJson};

use crate::domain::entities::User;
use crate::repository::players::PlayerWithUser;
use crate::repository::users::NewUser;
use crate::repository::NewPlayer;

use super::super::middleware::RosterState;

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub tokens: TokenPair,
    pub user: User,
}

/// **POST /v1/auth/login**
///
/// Verify email/password credentials and issue a token pair.
///
/// # Business Rules
/// - Unknown email, OAuth-only account and wrong password return the
///   same 401 body
/// - Deactivated accounts cannot log in
pub async fn login(
    State(state): State<RosterState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<impl IntoResponse> {
    let (identity, tokens) = state.auth.login(&request.email, &request.password).await?;

    let user = state
        .repos
        .users
        .find_by_id(identity.id)
        .await?
        .ok_or_else(|| Error::NotFound("User not found".to_string()))?;

    tracing::info!(user_id = %user.id, "user logged in");
    Ok(Json(LoginResponse { tokens, user }))
}

#[derive(Debug, Deserialize, Validate)]
pub struct RefreshRequest {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

/// **POST /v1/auth/refresh**
///
/// Exchange a valid refresh token for a fresh token pair. The new pair
/// carries the user's current role.
pub async fn refresh(
    State(state): State<RosterState>,
    ValidatedJson(request): ValidatedJson<RefreshRequest>,
) -> Result<impl IntoResponse> {
    let tokens = state.auth.refresh(&request.refresh_token).await?;
    Ok(Json(tokens))
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user: User,
    /// Present when the account has a player profile
    pub player: Option<PlayerWithUser>,
}

/// **GET /v1/auth/me**
///
/// The authenticated user's own profile, with their player profile when
/// one exists.
pub async fn me(
    State(state): State<RosterState>,
    AuthUser(identity): AuthUser,
) -> Result<impl IntoResponse> {
    let user = state
        .repos
        .users
        .find_by_id(identity.id)
        .await?
        .ok_or_else(|| Error::NotFound("User not found".to_string()))?;
    let player = state.repos.players.find_by_user_id(identity.id).await?;
    Ok(Json(ProfileResponse { user, player }))
}

#[derive(Debug, Deserialize, Validate)]
pub struct OAuthLoginRequest {
    #[validate(length(min = 1, message = "id_token is required"))]
    pub id_token: String,
}

#[derive(Debug, Serialize)]
pub struct OAuthLoginResponse {
    #[serde(flatten)]
    pub tokens: TokenPair,
    pub user: User,
    /// True for accounts that still carry the provisional sign-up role
    pub needs_role_selection: bool,
}

/// **POST /v1/oauth/google**
///
/// Log in with a Google ID token. Creates an account on first login.
pub async fn oauth_google(
    State(state): State<RosterState>,
    ValidatedJson(request): ValidatedJson<OAuthLoginRequest>,
) -> Result<impl IntoResponse> {
    oauth_login(state, OAuthProvider::Google, &request.id_token).await
}

/// **POST /v1/oauth/apple**
///
/// Log in with an Apple ID token. Creates an account on first login.
pub async fn oauth_apple(
    State(state): State<RosterState>,
    ValidatedJson(request): ValidatedJson<OAuthLoginRequest>,
) -> Result<impl IntoResponse> {
    oauth_login(state, OAuthProvider::Apple, &request.id_token).await
}

/// Shared OAuth login flow.
///
/// # Business Rules
/// - Lookup order: (provider, account id), then email, then create
/// - An email match links the federated identity to the existing account
/// - New accounts start as `player` with `role_selected = false` and must
///   confirm a role before it is trusted
async fn oauth_login(
    state: RosterState,
    provider: OAuthProvider,
    id_token: &str,
) -> Result<Json<OAuthLoginResponse>> {
    let info = state.auth.verify_oauth_token(provider, id_token).await?;

    let user = match state
        .repos
        .oauth
        .find_by_provider_account(provider, &info.account_id)
        .await?
    {
        Some(account) => state
            .repos
            .users
            .find_by_id(account.user_id)
            .await?
            .ok_or_else(|| Error::NotFound("User not found".to_string()))?,
        None => link_or_create_user(&state, &info).await?,
    };

    if !user.is_active {
        return Err(Error::Authentication(
            "Could not validate credentials".to_string(),
        ));
    }

    let tokens = jwt::issue_token_pair(state.auth.config(), &user.email, user.role)
        .map_err(clubdesk_common::Error::from)?;
    state.auth.record_activity(user.id, "oauth_login").await;

    let needs_role_selection = !user.role_selected;
    Ok(Json(OAuthLoginResponse {
        tokens,
        user,
        needs_role_selection,
    }))
}

async fn link_or_create_user(state: &RosterState, info: &OAuthUserInfo) -> Result<User> {
    if let Some(existing) = state.repos.users.find_by_email(&info.email).await? {
        state
            .repos
            .oauth
            .create(
                existing.id,
                info.provider,
                &info.account_id,
                Some(&info.email),
            )
            .await?;
        tracing::info!(user_id = %existing.id, provider = %info.provider, "linked oauth account");
        return Ok(existing);
    }

    let user = state
        .repos
        .users
        .create(NewUser {
            email: info.email.clone(),
            password_hash: None,
            first_name: info.first_name.clone().unwrap_or_default(),
            last_name: info.last_name.clone().unwrap_or_default(),
            phone: None,
            role: UserRole::Player,
            role_selected: false,
            // Provider-asserted email counts as verified
            is_verified: true,
            is_oauth_only: true,
        })
        .await?;
    state
        .repos
        .oauth
        .create(user.id, info.provider, &info.account_id, Some(&info.email))
        .await?;
    tracing::info!(user_id = %user.id, provider = %info.provider, "created user via oauth");
    Ok(user)
}

#[derive(Debug, Deserialize, Validate)]
pub struct SetRoleRequest {
    pub role: UserRole,
}

/// **POST /v1/oauth/role**
///
/// Confirm the role for an OAuth-created account.
///
/// # Business Rules
/// - Only allowed while the role is still provisional
/// - `admin` cannot be self-selected
/// - Choosing `player` creates an empty player profile
/// - Returns fresh tokens because the role claim changed
pub async fn set_role(
    State(state): State<RosterState>,
    AuthUser(identity): AuthUser,
    ValidatedJson(request): ValidatedJson<SetRoleRequest>,
) -> Result<impl IntoResponse> {
    if request.role == UserRole::Admin {
        return Err(Error::Authorization(
            "Admin role cannot be self-selected".to_string(),
        ));
    }

    let user = state
        .repos
        .users
        .find_by_id(identity.id)
        .await?
        .ok_or_else(|| Error::NotFound("User not found".to_string()))?;
    if user.role_selected {
        return Err(Error::Validation("Role already selected".to_string()));
    }

    let user = state.repos.users.set_role(user.id, request.role).await?;

    if request.role == UserRole::Player
        && state.repos.players.find_by_user_id(user.id).await?.is_none()
    {
        state
            .repos
            .players
            .create(NewPlayer {
                user_id: user.id,
                team_id: None,
                date_of_birth: None,
                position: None,
                jersey_number: None,
                emergency_contact_name: None,
                emergency_contact_phone: None,
                notes: None,
            })
            .await?;
    }

    let tokens = jwt::issue_token_pair(state.auth.config(), &user.email, user.role)
        .map_err(clubdesk_common::Error::from)?;
    tracing::info!(user_id = %user.id, role = %user.role, "role selected");
    Ok((
        StatusCode::OK,
        Json(OAuthLoginResponse {
            tokens,
            user,
            needs_role_selection: false,
        }),
    ))
}
