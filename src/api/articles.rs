//! Blog articles.
//!
//! The slug is derived from the title and must be unique across all authors.
//! `published_at` is stamped the first time an article is published and kept
//! if it is later unpublished and republished.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::db::{Article, ArticleFields, ArticleWithAuthor};
use crate::AppState;

use super::error::{ApiError, ValidationErrorBuilder};
use super::upload::{store_upload, FormData};
use super::validation::{slugify, validate_required};

fn parse_fields(form: &FormData) -> Result<(ArticleFields, String), ApiError> {
    let fields = ArticleFields {
        title: form.required("title"),
        content: form.required("content"),
        excerpt: form.text("excerpt"),
        published: form.flag("published"),
    };

    let mut errors = ValidationErrorBuilder::new();
    errors.check("title", validate_required(&fields.title, "Title"));
    errors.check("content", validate_required(&fields.content, "Content"));
    errors.finish()?;

    let slug = slugify(&fields.title);
    if slug.is_empty() {
        return Err(ApiError::validation_field(
            "title",
            "Title must contain at least one letter or digit",
        ));
    }

    Ok((fields, slug))
}

/// Reject a slug already used by a different article
async fn ensure_slug_free(state: &AppState, slug: &str, except_id: Option<&str>) -> Result<(), ApiError> {
    let existing: Option<(String,)> = sqlx::query_as("SELECT id FROM articles WHERE slug = ?")
        .bind(slug)
        .fetch_optional(&state.db)
        .await?;

    match existing {
        Some((id,)) if Some(id.as_str()) != except_id => {
            Err(ApiError::conflict("An article with this title already exists"))
        }
        _ => Ok(()),
    }
}

async fn fetch_owned(state: &AppState, id: &str, user_id: &str) -> Result<Article, ApiError> {
    sqlx::query_as::<_, Article>("SELECT * FROM articles WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(user_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Article not found"))
}

/// List the caller's articles, newest first
pub async fn list_articles(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
) -> Result<Json<Vec<Article>>, ApiError> {
    let articles = sqlx::query_as::<_, Article>(
        "SELECT * FROM articles WHERE user_id = ? ORDER BY created_at DESC",
    )
    .bind(&current.id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(articles))
}

/// Read one article by slug with its author. Drafts are only visible to their author.
pub async fn get_article_by_slug(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(slug): Path<String>,
) -> Result<Json<ArticleWithAuthor>, ApiError> {
    let article = sqlx::query_as::<_, ArticleWithAuthor>(
        r#"
        SELECT a.*, u.name AS author_name, p.avatar AS author_avatar
        FROM articles a
        JOIN users u ON u.id = a.user_id
        LEFT JOIN profiles p ON p.user_id = a.user_id
        WHERE a.slug = ? AND (a.published = 1 OR a.user_id = ?)
        "#,
    )
    .bind(&slug)
    .bind(&current.id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| ApiError::not_found("Article not found"))?;

    Ok(Json(article))
}

pub async fn create_article(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Article>), ApiError> {
    let mut form = FormData::read(multipart, "cover_image").await?;
    let (fields, slug) = parse_fields(&form)?;
    ensure_slug_free(&state, &slug, None).await?;

    let cover_image = match form.take_file() {
        Some(file) => Some(store_upload(&state, "article", &current.id, file).await?),
        None => None,
    };

    let id = Uuid::new_v4().to_string();
    let now = chrono::Utc::now().to_rfc3339();
    let published_at = fields.published.then(|| now.clone());

    sqlx::query(
        r#"
        INSERT INTO articles (id, user_id, title, slug, content, excerpt, cover_image, published, published_at, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&current.id)
    .bind(&fields.title)
    .bind(&slug)
    .bind(&fields.content)
    .bind(&fields.excerpt)
    .bind(&cover_image)
    .bind(fields.published)
    .bind(&published_at)
    .bind(&now)
    .bind(&now)
    .execute(&state.db)
    .await?;

    info!(article_id = %id, slug = %slug, "Created article");

    let article = fetch_owned(&state, &id, &current.id).await?;
    Ok((StatusCode::CREATED, Json(article)))
}

pub async fn update_article(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Json<Article>, ApiError> {
    let existing = fetch_owned(&state, &id, &current.id).await?;

    let mut form = FormData::read(multipart, "cover_image").await?;
    let (fields, slug) = parse_fields(&form)?;
    if slug != existing.slug {
        ensure_slug_free(&state, &slug, Some(&id)).await?;
    }

    let cover_image = match form.take_file() {
        Some(file) => Some(store_upload(&state, "article", &current.id, file).await?),
        None => None,
    };

    let now = chrono::Utc::now().to_rfc3339();
    let published_at = match existing.published_at {
        Some(at) => Some(at),
        None if fields.published => Some(now.clone()),
        None => None,
    };

    sqlx::query(
        r#"
        UPDATE articles SET
            title = ?, slug = ?, content = ?, excerpt = ?, cover_image = COALESCE(?, cover_image),
            published = ?, published_at = ?, updated_at = ?
        WHERE id = ? AND user_id = ?
        "#,
    )
    .bind(&fields.title)
    .bind(&slug)
    .bind(&fields.content)
    .bind(&fields.excerpt)
    .bind(&cover_image)
    .bind(fields.published)
    .bind(&published_at)
    .bind(&now)
    .bind(&id)
    .bind(&current.id)
    .execute(&state.db)
    .await?;

    Ok(Json(fetch_owned(&state, &id, &current.id).await?))
}

pub async fn delete_article(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let result = sqlx::query("DELETE FROM articles WHERE id = ? AND user_id = ?")
        .bind(&id)
        .bind(&current.id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Article not found"));
    }

    info!(article_id = %id, user_id = %current.id, "Deleted article");
    Ok(StatusCode::NO_CONTENT)
}
