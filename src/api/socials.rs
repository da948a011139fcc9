use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::db::{Social, SocialRequest};
use crate::AppState;

use super::error::{ApiError, ValidationErrorBuilder};
use super::validation::{validate_required, validate_url};

fn validate_request(req: &SocialRequest) -> Result<(), ApiError> {
    let mut errors = ValidationErrorBuilder::new();
    errors.check("platform", validate_required(&req.platform, "Platform"));
    errors.check("url", validate_url(req.url.trim()));
    errors.finish()
}

async fn fetch_owned(state: &AppState, id: &str, user_id: &str) -> Result<Social, ApiError> {
    sqlx::query_as::<_, Social>("SELECT * FROM socials WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(user_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Social link not found"))
}

pub async fn list_socials(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
) -> Result<Json<Vec<Social>>, ApiError> {
    let socials = sqlx::query_as::<_, Social>(
        "SELECT * FROM socials WHERE user_id = ? ORDER BY created_at ASC",
    )
    .bind(&current.id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(socials))
}

pub async fn create_social(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Json(req): Json<SocialRequest>,
) -> Result<(StatusCode, Json<Social>), ApiError> {
    validate_request(&req)?;

    let id = Uuid::new_v4().to_string();
    let now = chrono::Utc::now().to_rfc3339();

    sqlx::query(
        "INSERT INTO socials (id, user_id, platform, url, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(&current.id)
    .bind(req.platform.trim())
    .bind(req.url.trim())
    .bind(&now)
    .bind(&now)
    .execute(&state.db)
    .await?;

    let social = fetch_owned(&state, &id, &current.id).await?;
    Ok((StatusCode::CREATED, Json(social)))
}

pub async fn update_social(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(id): Path<String>,
    Json(req): Json<SocialRequest>,
) -> Result<Json<Social>, ApiError> {
    fetch_owned(&state, &id, &current.id).await?;
    validate_request(&req)?;

    sqlx::query(
        "UPDATE socials SET platform = ?, url = ?, updated_at = ? WHERE id = ? AND user_id = ?",
    )
    .bind(req.platform.trim())
    .bind(req.url.trim())
    .bind(chrono::Utc::now().to_rfc3339())
    .bind(&id)
    .bind(&current.id)
    .execute(&state.db)
    .await?;

    Ok(Json(fetch_owned(&state, &id, &current.id).await?))
}

pub async fn delete_social(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let result = sqlx::query("DELETE FROM socials WHERE id = ? AND user_id = ?")
        .bind(&id)
        .bind(&current.id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Social link not found"));
    }

    Ok(StatusCode::NO_CONTENT)
}
