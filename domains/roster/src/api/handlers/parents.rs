//! Parent-child link endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use clubdesk_auth::{ParentUser, UserRole};
use clubdesk_common::{Error, Result, ValidatedJson};

use super::super::middleware::RosterState;

#[derive(Debug, Deserialize, Validate)]
pub struct LinkChildRequest {
    /// The child's player id
    pub child_id: Uuid,
    /// Admins may link on behalf of another parent
    pub parent_id: Option<Uuid>,
}

/// **POST /v1/parents/children**
///
/// Link a parent account to a child's player profile.
///
/// # Business Rules
/// - Parents link to themselves; only admins may set `parent_id`
/// - The child must be an existing player
/// - An existing link returns 409
pub async fn link_child(
    State(state): State<RosterState>,
    ParentUser(caller): ParentUser,
    ValidatedJson(request): ValidatedJson<LinkChildRequest>,
) -> Result<impl IntoResponse> {
    let parent_id = match request.parent_id {
        Some(id) if caller.role == UserRole::Admin => id,
        Some(id) if id != caller.id => {
            return Err(Error::Authorization(
                "Only admins may link other parents".to_string(),
            ));
        }
        _ => caller.id,
    };

    let child = state
        .repos
        .players
        .find_by_id(request.child_id)
        .await?
        .ok_or_else(|| Error::NotFound("Player not found".to_string()))?;

    if state.repos.parents.link_exists(parent_id, child.id).await? {
        return Err(Error::Conflict(
            "This child is already linked to the parent".to_string(),
        ));
    }

    let link = state.repos.parents.link(parent_id, child.id).await?;
    tracing::info!(%parent_id, child_id = %child.id, "parent linked to child");
    Ok((StatusCode::CREATED, Json(link)))
}

#[derive(Debug, Deserialize)]
pub struct UnlinkQuery {
    /// Admins may unlink on behalf of another parent
    pub parent_id: Option<Uuid>,
}

/// **DELETE /v1/parents/children/{child_id}**
///
/// Remove a parent-child link by the child's player id. Parents remove
/// their own links; admins may remove any via the `parent_id` query
/// parameter.
pub async fn unlink_child(
    State(state): State<RosterState>,
    ParentUser(caller): ParentUser,
    Path(child_id): Path<Uuid>,
    Query(query): Query<UnlinkQuery>,
) -> Result<impl IntoResponse> {
    let parent_id = match query.parent_id {
        Some(id) if caller.role == UserRole::Admin => id,
        Some(id) if id != caller.id => {
            return Err(Error::Authorization(
                "Only admins may unlink other parents".to_string(),
            ));
        }
        _ => caller.id,
    };

    state.repos.parents.unlink(parent_id, child_id).await?;
    tracing::info!(%parent_id, %child_id, "parent unlinked from child");
    Ok(StatusCode::NO_CONTENT)
}

/// **GET /v1/parents/children**
///
/// The caller's children that have player profiles.
pub async fn my_children(
    State(state): State<RosterState>,
    ParentUser(caller): ParentUser,
) -> Result<impl IntoResponse> {
    let children = state.repos.parents.children_of(caller.id).await?;
    Ok(Json(children))
}
