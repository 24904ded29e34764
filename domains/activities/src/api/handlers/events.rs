//! Calendar event endpoints

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

use clubdesk_auth::{AuthUser, StaffUser, UserRole};
use clubdesk_common::{Error, Pagination, Result, ValidatedJson};
use clubdesk_ws::WsEvent;

use crate::domain::entities::{Event, EventType, EventVisibility};
use crate::domain::validation::{validate_event_times, validate_event_visibility};
use crate::repository::events::{EventChanges, NewEvent};

use super::super::middleware::ActivitiesState;

/// Whether the caller may change or delete an event: its creator, a
/// supervisor or admin, or a coach managing the event's team.
fn can_manage_event(
    event: &Event,
    caller_id: Uuid,
    caller_role: UserRole,
    scope: &clubdesk_auth::VisibilityScope,
) -> bool {
    if matches!(caller_role, UserRole::Admin | UserRole::Supervisor)
        || event.created_by == caller_id
    {
        return true;
    }
    match event.team_id {
        Some(team_id) => scope.can_manage_team(team_id),
        None => false,
    }
}

#[derive(Debug, Deserialize)]
pub struct ListEventsQuery {
    pub from: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

/// **GET /v1/events**
///
/// List calendar events visible to the caller: team events for visible
/// teams plus all club-wide and age-group events. An optional time
/// window gives a calendar range.
pub async fn list_events(
    State(state): State<ActivitiesState>,
    AuthUser(caller): AuthUser,
    Query(query): Query<ListEventsQuery>,
    pagination: Pagination,
) -> Result<impl IntoResponse> {
    let scope = state.auth.scope_for(&caller).await?;
    let events = state
        .repos
        .events
        .list(
            scope.team_ids(),
            query.from,
            query.until,
            pagination.offset(),
            pagination.limit(),
        )
        .await?;
    Ok(Json(events))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateEventRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,
    pub description: Option<String>,
    pub event_type: EventType,
    pub visibility: EventVisibility,
    pub team_id: Option<Uuid>,
    pub age_group: Option<String>,
    pub location: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

/// **POST /v1/events**
///
/// Create a calendar event.
///
/// # Business Rules
/// - Staff only; team events require managing the team
/// - Visibility and its target field must agree
/// - The event must end after it starts
pub async fn create_event(
    State(state): State<ActivitiesState>,
    StaffUser(caller): StaffUser,
    ValidatedJson(request): ValidatedJson<CreateEventRequest>,
) -> Result<impl IntoResponse> {
    validate_event_times(request.starts_at, request.ends_at)?;
    validate_event_visibility(
        request.visibility,
        request.team_id,
        request.age_group.as_deref(),
    )?;

    if let Some(team_id) = request.team_id {
        let scope = state.auth.scope_for(&caller).await?;
        if !scope.can_manage_team(team_id) {
            return Err(Error::Authorization(
                "You do not manage this team".to_string(),
            ));
        }
    }

    let event = state
        .repos
        .events
        .create(NewEvent {
            title: request.title,
            description: request.description,
            event_type: request.event_type,
            visibility: request.visibility,
            team_id: request.team_id,
            age_group: request.age_group,
            location: request.location,
            starts_at: request.starts_at,
            ends_at: request.ends_at,
            created_by: caller.id,
        })
        .await?;

    state
        .ws
        .publish(&WsEvent::EventCreated {
            event_id: event.id,
            team_id: event.team_id,
            title: event.title.clone(),
        })
        .await;

    tracing::info!(event_id = %event.id, visibility = ?event.visibility, "event created");
    Ok((StatusCode::CREATED, Json(event)))
}

/// **GET /v1/events/{id}**
///
/// A single event, if visible to the caller. Club-wide and age-group
/// events are visible to everyone.
pub async fn get_event(
    State(state): State<ActivitiesState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let event = state
        .repos
        .events
        .find_by_id(id)
        .await?
        .ok_or_else(|| Error::NotFound("Event not found".to_string()))?;

    let scope = state.auth.scope_for(&caller).await?;
    if !scope.allows_team(event.team_id) {
        return Err(Error::NotFound("Event not found".to_string()));
    }
    Ok(Json(event))
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateEventRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub event_type: Option<EventType>,
    pub location: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
}

/// **PATCH /v1/events/{id}**
///
/// Update an event. Creator, managing coach or admin only. Times are
/// re-validated against the stored values.
pub async fn update_event(
    State(state): State<ActivitiesState>,
    StaffUser(caller): StaffUser,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateEventRequest>,
) -> Result<impl IntoResponse> {
    let event = state
        .repos
        .events
        .find_by_id(id)
        .await?
        .ok_or_else(|| Error::NotFound("Event not found".to_string()))?;

    let scope = state.auth.scope_for(&caller).await?;
    if !can_manage_event(&event, caller.id, caller.role, &scope) {
        return Err(Error::Authorization(
            "You cannot modify this event".to_string(),
        ));
    }

    let starts_at = request.starts_at.unwrap_or(event.starts_at);
    let ends_at = request.ends_at.unwrap_or(event.ends_at);
    validate_event_times(starts_at, ends_at)?;

    let event = state
        .repos
        .events
        .update(
            id,
            EventChanges {
                title: request.title,
                description: request.description,
                event_type: request.event_type,
                location: request.location,
                starts_at: request.starts_at,
                ends_at: request.ends_at,
            },
        )
        .await?;
    Ok(Json(event))
}

/// **DELETE /v1/events/{id}**
///
/// Delete an event and its attendance records. Creator, managing coach
/// or admin only.
pub async fn delete_event(
    State(state): State<ActivitiesState>,
    StaffUser(caller): StaffUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let event = state
        .repos
        .events
        .find_by_id(id)
        .await?
        .ok_or_else(|| Error::NotFound("Event not found".to_string()))?;

    let scope = state.auth.scope_for(&caller).await?;
    if !can_manage_event(&event, caller.id, caller.role, &scope) {
        return Err(Error::Authorization(
            "You cannot modify this event".to_string(),
        ));
    }

    state.repos.events.delete(id).await?;
    tracing::info!(event_id = %id, "event deleted");
    Ok(StatusCode::NO_CONTENT)
}
