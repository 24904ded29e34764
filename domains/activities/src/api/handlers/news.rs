//! Club news endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use clubdesk_auth::{AuthUser, StaffUser, UserRole};
use clubdesk_common::{Error, Pagination, Result, ValidatedJson};
use clubdesk_ws::WsEvent;

use crate::domain::entities::News;
use crate::repository::news::{NewNews, NewsChanges};

use super::super::middleware::ActivitiesState;

/// Authors manage their own articles; supervisors and admins manage any.
fn can_manage_news(article: &News, caller_id: Uuid, caller_role: UserRole) -> bool {
    matches!(caller_role, UserRole::Admin | UserRole::Supervisor)
        || article.author_id == caller_id
}

#[derive(Debug, Deserialize)]
pub struct ListNewsQuery {
    #[serde(default)]
    pub include_drafts: bool,
}

/// **GET /v1/news**
///
/// List news articles, newest first. Club-wide articles are visible to
/// everyone; team articles only within the caller's teams. Drafts only
/// to staff asking for them.
pub async fn list_news(
    State(state): State<ActivitiesState>,
    AuthUser(caller): AuthUser,
    Query(query): Query<ListNewsQuery>,
    pagination: Pagination,
) -> Result<impl IntoResponse> {
    let scope = state.auth.scope_for(&caller).await?;
    let include_drafts = query.include_drafts && caller.role.is_staff();
    let articles = state
        .repos
        .news
        .list(
            scope.team_ids(),
            include_drafts,
            pagination.offset(),
            pagination.limit(),
        )
        .await?;
    Ok(Json(articles))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateNewsRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,
    #[validate(length(min = 1, message = "Content must not be empty"))]
    pub content: String,
    /// Omit for a club-wide article
    pub team_id: Option<Uuid>,
}

/// **POST /v1/news**
///
/// Create a news article as a draft. Publishing is a separate step.
///
/// # Business Rules
/// - Staff only; coaches may target their own teams, supervisors and
///   admins any team or the whole club
pub async fn create_news(
    State(state): State<ActivitiesState>,
    StaffUser(caller): StaffUser,
    ValidatedJson(request): ValidatedJson<CreateNewsRequest>,
) -> Result<impl IntoResponse> {
    let scope = state.auth.scope_for(&caller).await?;
    let allowed = match request.team_id {
        Some(team_id) => scope.can_manage_team(team_id),
        None => scope.is_unrestricted(),
    };
    if !allowed {
        return Err(Error::Authorization(
            "You cannot publish news for this audience".to_string(),
        ));
    }

    let article = state
        .repos
        .news
        .create(NewNews {
            title: request.title,
            content: request.content,
            team_id: request.team_id,
            author_id: caller.id,
        })
        .await?;

    tracing::info!(news_id = %article.id, "news article created");
    Ok((StatusCode::CREATED, Json(article)))
}

/// **GET /v1/news/{id}**
///
/// A single article, if its team is visible to the caller. Drafts are
/// only visible to staff.
pub async fn get_news(
    State(state): State<ActivitiesState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let article = state
        .repos
        .news
        .find_by_id(id)
        .await?
        .ok_or_else(|| Error::NotFound("Article not found".to_string()))?;

    if !article.is_published && !caller.role.is_staff() {
        return Err(Error::NotFound("Article not found".to_string()));
    }
    let scope = state.auth.scope_for(&caller).await?;
    if !scope.allows_team(article.team_id) {
        return Err(Error::NotFound("Article not found".to_string()));
    }
    Ok(Json(article))
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateNewsRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "Content must not be empty"))]
    pub content: Option<String>,
}

/// **PATCH /v1/news/{id}**
///
/// Edit an article. Author or admin only.
pub async fn update_news(
    State(state): State<ActivitiesState>,
    StaffUser(caller): StaffUser,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateNewsRequest>,
) -> Result<impl IntoResponse> {
    let article = state
        .repos
        .news
        .find_by_id(id)
        .await?
        .ok_or_else(|| Error::NotFound("Article not found".to_string()))?;

    if !can_manage_news(&article, caller.id, caller.role) {
        return Err(Error::Authorization(
            "You cannot modify this article".to_string(),
        ));
    }

    let article = state
        .repos
        .news
        .update(
            id,
            NewsChanges {
                title: request.title,
                content: request.content,
            },
        )
        .await?;
    Ok(Json(article))
}

#[derive(Debug, Deserialize, Validate)]
pub struct PublishNewsRequest {
    pub is_published: bool,
}

/// **POST /v1/news/{id}/publish**
///
/// Publish or unpublish an article. Author or admin only.
///
/// # Business Rules
/// - `published_at` is stamped the first time an article goes live and
///   kept on later re-publishes
/// - Publishing notifies the team's subscribers, or every connected
///   client for club-wide articles
pub async fn publish_news(
    State(state): State<ActivitiesState>,
    StaffUser(caller): StaffUser,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<PublishNewsRequest>,
) -> Result<impl IntoResponse> {
    let article = state
        .repos
        .news
        .find_by_id(id)
        .await?
        .ok_or_else(|| Error::NotFound("Article not found".to_string()))?;

    if !can_manage_news(&article, caller.id, caller.role) {
        return Err(Error::Authorization(
            "You cannot modify this article".to_string(),
        ));
    }

    let was_published = article.is_published;
    let article = state.repos.news.set_published(id, request.is_published).await?;

    if article.is_published && !was_published {
        state
            .ws
            .publish(&WsEvent::NewsPublished {
                news_id: article.id,
                team_id: article.team_id,
                title: article.title.clone(),
            })
            .await;
        tracing::info!(news_id = %article.id, "news article published");
    }
    Ok(Json(article))
}

/// **DELETE /v1/news/{id}**
///
/// Delete an article. Author or admin only.
pub async fn delete_news(
    State(state): State<ActivitiesState>,
    StaffUser(caller): StaffUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let article = state
        .repos
        .news
        .find_by_id(id)
        .await?
        .ok_or_else(|| Error::NotFound("Article not found".to_string()))?;

    if !can_manage_news(&article, caller.id, caller.role) {
        return Err(Error::Authorization(
            "You cannot modify this article".to_string(),
        ));
    }

    state.repos.news.delete(id).await?;
    tracing::info!(news_id = %id, "news article deleted");
    Ok(StatusCode::NO_CONTENT)
}
