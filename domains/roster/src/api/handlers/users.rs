//! User management endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use clubdesk_auth::{password, AdminUser, AuthUser, StaffUser, UserRole};
use clubdesk_common::{Error, Pagination, Result, ValidatedJson};

use crate::repository::users::{NewUser, UserChanges};
use crate::repository::NewPlayer;

use super::super::middleware::RosterState;

#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    pub role: Option<UserRole>,
    #[serde(default)]
    pub include_inactive: bool,
}

/// **GET /v1/users**
///
/// List user accounts. Staff only; inactive accounts on request.
pub async fn list_users(
    State(state): State<RosterState>,
    StaffUser(_staff): StaffUser,
    Query(query): Query<ListUsersQuery>,
    pagination: Pagination,
) -> Result<impl IntoResponse> {
    let users = state
        .repos
        .users
        .list(
            query.role,
            query.include_inactive,
            pagination.offset(),
            pagination.limit(),
        )
        .await?;
    Ok(Json(users))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    pub phone: Option<String>,
    pub role: UserRole,
}

/// **POST /v1/users**
///
/// Create a user account directly, bypassing the invitation flow.
///
/// # Business Rules
/// - Admin only
/// - Duplicate email returns 409
/// - Creating a `player` also creates an empty player profile
pub async fn create_user(
    State(state): State<RosterState>,
    AdminUser(_admin): AdminUser,
    ValidatedJson(request): ValidatedJson<CreateUserRequest>,
) -> Result<impl IntoResponse> {
    password::validate_password_strength(&request.password)?;
    let password_hash = password::hash_password(&request.password)?;

    let user = state
        .repos
        .users
        .create(NewUser {
            email: request.email,
            password_hash: Some(password_hash),
            first_name: request.first_name,
            last_name: request.last_name,
            phone: request.phone,
            role: request.role,
            role_selected: true,
            // Admin-created accounts skip email verification
            is_verified: true,
            is_oauth_only: false,
        })
        .await?;

    if user.role == UserRole::Player {
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

    tracing::info!(user_id = %user.id, role = %user.role, "user created");
    Ok((StatusCode::CREATED, Json(user)))
}

/// **GET /v1/users/{id}**
///
/// A single user account. Visible to staff and to the account itself.
pub async fn get_user(
    State(state): State<RosterState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    if caller.id != id && !caller.role.is_staff() {
        return Err(Error::Authorization(
            "Insufficient permissions".to_string(),
        ));
    }

    let user = state
        .repos
        .users
        .find_by_id(id)
        .await?
        .ok_or_else(|| Error::NotFound("User not found".to_string()))?;
    Ok(Json(user))
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, message = "First name cannot be empty"))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, message = "Last name cannot be empty"))]
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub role: Option<UserRole>,
    pub is_active: Option<bool>,
}

/// **PATCH /v1/users/{id}**
///
/// Update an account.
///
/// # Business Rules
/// - Users may edit their own name and phone
/// - Only admins may change roles or activation status
pub async fn update_user(
    State(state): State<RosterState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateUserRequest>,
) -> Result<impl IntoResponse> {
    let is_admin = caller.role == UserRole::Admin;
    if caller.id != id && !is_admin {
        return Err(Error::Authorization(
            "Insufficient permissions".to_string(),
        ));
    }
    if !is_admin && (request.role.is_some() || request.is_active.is_some()) {
        return Err(Error::Authorization(
            "Only admins may change roles or activation status".to_string(),
        ));
    }

    let user = state
        .repos
        .users
        .update(
            id,
            UserChanges {
                first_name: request.first_name,
                last_name: request.last_name,
                phone: request.phone,
                role: request.role,
                is_active: request.is_active,
            },
        )
        .await?;
    Ok(Json(user))
}

/// **DELETE /v1/users/{id}**
///
/// Deactivate an account. Soft delete: the row stays for history, login
/// and token resolution fail from now on.
///
/// # Business Rules
/// - Admin only; admins cannot deactivate themselves
pub async fn delete_user(
    State(state): State<RosterState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    if admin.id == id {
        return Err(Error::Validation(
            "Cannot deactivate your own account".to_string(),
        ));
    }

    state.repos.users.deactivate(id).await?;
    tracing::info!(user_id = %id, "user deactivated");
    Ok(StatusCode::NO_CONTENT)
}
