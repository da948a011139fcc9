use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::db::{Skill, SkillRequest};
use crate::AppState;

use super::error::{ApiError, ValidationErrorBuilder};
use super::validation::{validate_required, validate_skill_level};

fn validate_request(req: &SkillRequest) -> Result<(), ApiError> {
    let mut errors = ValidationErrorBuilder::new();
    errors.check("name", validate_required(&req.name, "Name"));
    errors.check("level", validate_skill_level(req.level));
    errors.check("category", validate_required(&req.category, "Category"));
    errors.finish()
}

async fn fetch_owned(state: &AppState, id: &str, user_id: &str) -> Result<Skill, ApiError> {
    sqlx::query_as::<_, Skill>("SELECT * FROM skills WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(user_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Skill not found"))
}

pub async fn list_skills(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
) -> Result<Json<Vec<Skill>>, ApiError> {
    let skills = sqlx::query_as::<_, Skill>(
        "SELECT * FROM skills WHERE user_id = ? ORDER BY category ASC, name ASC",
    )
    .bind(&current.id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(skills))
}

pub async fn create_skill(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Json(req): Json<SkillRequest>,
) -> Result<(StatusCode, Json<Skill>), ApiError> {
    validate_request(&req)?;

    let id = Uuid::new_v4().to_string();
    let now = chrono::Utc::now().to_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO skills (id, user_id, name, level, category, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&current.id)
    .bind(req.name.trim())
    .bind(req.level)
    .bind(req.category.trim())
    .bind(&now)
    .bind(&now)
    .execute(&state.db)
    .await?;

    let skill = fetch_owned(&state, &id, &current.id).await?;
    Ok((StatusCode::CREATED, Json(skill)))
}

pub async fn update_skill(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(id): Path<String>,
    Json(req): Json<SkillRequest>,
) -> Result<Json<Skill>, ApiError> {
    fetch_owned(&state, &id, &current.id).await?;
    validate_request(&req)?;

    sqlx::query(
        "UPDATE skills SET name = ?, level = ?, category = ?, updated_at = ? WHERE id = ? AND user_id = ?",
    )
    .bind(req.name.trim())
    .bind(req.level)
    .bind(req.category.trim())
    .bind(chrono::Utc::now().to_rfc3339())
    .bind(&id)
    .bind(&current.id)
    .execute(&state.db)
    .await?;

    Ok(Json(fetch_owned(&state, &id, &current.id).await?))
}

pub async fn delete_skill(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let result = sqlx::query("DELETE FROM skills WHERE id = ? AND user_id = ?")
        .bind(&id)
        .bind(&current.id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Skill not found"));
    }

    Ok(StatusCode::NO_CONTENT)
}
