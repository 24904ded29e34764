//! News repository

use sqlx::PgPool;
use uuid::Uuid;

use clubdesk_common::RepositoryError;

use crate::domain::entities::News;
use crate::repository::map_insert_error;

/// Fields for drafting an article.
#[derive(Debug, Clone)]
pub struct NewNews {
    pub title: String,
    pub content: String,
    /// `None` = club-wide
    pub team_id: Option<Uuid>,
    pub author_id: Uuid,
}

/// Partial update; `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct NewsChanges {
    pub title: Option<String>,
    pub content: Option<String>,
}

#[derive(Clone)]
pub struct NewsRepository {
    pool: PgPool,
}

impl NewsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a draft. Articles start unpublished.
    pub async fn create(&self, new_news: NewNews) -> Result<News, RepositoryError> {
        sqlx::query_as::<_, News>(
            "INSERT INTO news (id, title, content, team_id, author_id, is_published, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, FALSE, NOW(), NOW())
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&new_news.title)
        .bind(&new_news.content)
        .bind(new_news.team_id)
        .bind(new_news.author_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_insert_error)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<News>, RepositoryError> {
        let article = sqlx::query_as::<_, News>("SELECT * FROM news WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(article)
    }

    /// List articles, newest first. Unpublished drafts only when asked.
    /// Club-wide articles pass any team filter.
    pub async fn list(
        &self,
        team_filter: Option<&[Uuid]>,
        include_drafts: bool,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<News>, RepositoryError> {
        let articles = sqlx::query_as::<_, News>(
            "SELECT * FROM news
             WHERE ($1::uuid[] IS NULL OR team_id IS NULL OR team_id = ANY($1))
               AND ($2 OR is_published)
             ORDER BY COALESCE(published_at, created_at) DESC
             OFFSET $3 LIMIT $4",
        )
        .bind(team_filter)
        .bind(include_drafts)
        .bind(offset)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(articles)
    }

    pub async fn update(&self, id: Uuid, changes: NewsChanges) -> Result<News, RepositoryError> {
        sqlx::query_as::<_, News>(
            "UPDATE news SET
                title = COALESCE($2, title),
                content = COALESCE($3, content),
                updated_at = NOW()
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(&changes.title)
        .bind(&changes.content)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Set publication state. `published_at` is stamped on first
    /// publication and survives later unpublish/republish cycles.
    pub async fn set_published(
        &self,
        id: Uuid,
        is_published: bool,
    ) -> Result<News, RepositoryError> {
        sqlx::query_as::<_, News>(
            "UPDATE news SET
                is_published = $2,
                published_at = CASE
                    WHEN $2 AND published_at IS NULL THEN NOW()
                    ELSE published_at
                END,
                updated_at = NOW()
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(is_published)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM news WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
