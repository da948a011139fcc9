use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::db::{Experience, ExperienceRequest};
use crate::AppState;

use super::error::{ApiError, ValidationErrorBuilder};
use super::validation::{validate_date, validate_optional_date, validate_required};

fn validate_request(req: &ExperienceRequest) -> Result<(), ApiError> {
    let mut errors = ValidationErrorBuilder::new();
    errors.check("title", validate_required(&req.title, "Title"));
    errors.check("company", validate_required(&req.company, "Company"));
    errors.check("start_date", validate_date(&req.start_date, "Start date"));
    if !req.current {
        errors.check("end_date", validate_optional_date(&req.end_date, "End date"));
    }
    errors.finish()
}

/// A current position has no end date
fn end_date(req: &ExperienceRequest) -> Option<&str> {
    if req.current {
        None
    } else {
        req.end_date.as_deref().filter(|d| !d.is_empty())
    }
}

async fn fetch_owned(state: &AppState, id: &str, user_id: &str) -> Result<Experience, ApiError> {
    sqlx::query_as::<_, Experience>("SELECT * FROM experiences WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(user_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Experience not found"))
}

/// List the caller's experiences, most recent first
pub async fn list_experiences(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
) -> Result<Json<Vec<Experience>>, ApiError> {
    let experiences = sqlx::query_as::<_, Experience>(
        "SELECT * FROM experiences WHERE user_id = ? ORDER BY start_date DESC",
    )
    .bind(&current.id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(experiences))
}

pub async fn create_experience(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Json(req): Json<ExperienceRequest>,
) -> Result<(StatusCode, Json<Experience>), ApiError> {
    validate_request(&req)?;

    let id = Uuid::new_v4().to_string();
    let now = chrono::Utc::now().to_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO experiences (id, user_id, title, company, location, start_date, end_date, current, description, image, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&current.id)
    .bind(req.title.trim())
    .bind(req.company.trim())
    .bind(&req.location)
    .bind(&req.start_date)
    .bind(end_date(&req))
    .bind(req.current)
    .bind(&req.description)
    .bind(&req.image)
    .bind(&now)
    .bind(&now)
    .execute(&state.db)
    .await?;

    let experience = fetch_owned(&state, &id, &current.id).await?;
    Ok((StatusCode::CREATED, Json(experience)))
}

pub async fn update_experience(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(id): Path<String>,
    Json(req): Json<ExperienceRequest>,
) -> Result<Json<Experience>, ApiError> {
    fetch_owned(&state, &id, &current.id).await?;
    validate_request(&req)?;

    sqlx::query(
        r#"
        UPDATE experiences SET
            title = ?, company = ?, location = ?, start_date = ?, end_date = ?,
            current = ?, description = ?, image = COALESCE(?, image), updated_at = ?
        WHERE id = ? AND user_id = ?
        "#,
    )
    .bind(req.title.trim())
    .bind(req.company.trim())
    .bind(&req.location)
    .bind(&req.start_date)
    .bind(end_date(&req))
    .bind(req.current)
    .bind(&req.description)
    .bind(&req.image)
    .bind(chrono::Utc::now().to_rfc3339())
    .bind(&id)
    .bind(&current.id)
    .execute(&state.db)
    .await?;

    Ok(Json(fetch_owned(&state, &id, &current.id).await?))
}

pub async fn delete_experience(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let result = sqlx::query("DELETE FROM experiences WHERE id = ? AND user_id = ?")
        .bind(&id)
        .bind(&current.id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Experience not found"));
    }

    info!(experience_id = %id, user_id = %current.id, "Deleted experience");
    Ok(StatusCode::NO_CONTENT)
}
