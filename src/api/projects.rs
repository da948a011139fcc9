//! Portfolio projects. Create and update take multipart forms with an
//! optional `image` part; `technologies` may be a JSON array or a
//! comma-separated list.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::db::{split_technologies, Project, ProjectFields, ProjectResponse};
use crate::AppState;

use super::error::{ApiError, ValidationErrorBuilder};
use super::upload::{store_upload, FormData};
use super::validation::{
    validate_date, validate_optional_date, validate_optional_url, validate_required,
};

fn parse_fields(form: &FormData) -> Result<ProjectFields, ApiError> {
    let fields = ProjectFields {
        title: form.required("title"),
        description: form.text("description"),
        link: form.text("link"),
        github_url: form.text("github_url"),
        start_date: form.required("start_date"),
        end_date: form.text("end_date"),
        technologies: split_technologies(&form.required("technologies")),
    };

    let mut errors = ValidationErrorBuilder::new();
    errors.check("title", validate_required(&fields.title, "Title"));
    errors.check("start_date", validate_date(&fields.start_date, "Start date"));
    errors.check("end_date", validate_optional_date(&fields.end_date, "End date"));
    errors.check("link", validate_optional_url(&fields.link));
    errors.check("github_url", validate_optional_url(&fields.github_url));
    errors.finish()?;

    Ok(fields)
}

fn technologies_json(fields: &ProjectFields) -> Result<String, ApiError> {
    serde_json::to_string(&fields.technologies)
        .map_err(|e| ApiError::internal(format!("Failed to encode technologies: {}", e)))
}

async fn fetch_owned(state: &AppState, id: &str, user_id: &str) -> Result<Project, ApiError> {
    sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(user_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Project not found"))
}

/// List the caller's projects, most recent first
pub async fn list_projects(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
) -> Result<Json<Vec<ProjectResponse>>, ApiError> {
    let projects = sqlx::query_as::<_, Project>(
        "SELECT * FROM projects WHERE user_id = ? ORDER BY start_date DESC",
    )
    .bind(&current.id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(projects.into_iter().map(Project::to_response).collect()))
}

pub async fn create_project(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ProjectResponse>), ApiError> {
    let mut form = FormData::read(multipart, "image").await?;
    let fields = parse_fields(&form)?;

    let image = match form.take_file() {
        Some(file) => Some(store_upload(&state, "project", &current.id, file).await?),
        None => None,
    };

    let id = Uuid::new_v4().to_string();
    let now = chrono::Utc::now().to_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO projects (id, user_id, title, description, image, link, github_url, start_date, end_date, technologies, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&current.id)
    .bind(&fields.title)
    .bind(&fields.description)
    .bind(&image)
    .bind(&fields.link)
    .bind(&fields.github_url)
    .bind(&fields.start_date)
    .bind(&fields.end_date)
    .bind(technologies_json(&fields)?)
    .bind(&now)
    .bind(&now)
    .execute(&state.db)
    .await?;

    let project = fetch_owned(&state, &id, &current.id).await?;
    Ok((StatusCode::CREATED, Json(project.to_response())))
}

pub async fn update_project(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Json<ProjectResponse>, ApiError> {
    fetch_owned(&state, &id, &current.id).await?;

    let mut form = FormData::read(multipart, "image").await?;
    let fields = parse_fields(&form)?;

    let image = match form.take_file() {
        Some(file) => Some(store_upload(&state, "project", &current.id, file).await?),
        None => None,
    };

    sqlx::query(
        r#"
        UPDATE projects SET
            title = ?, description = ?, image = COALESCE(?, image), link = ?, github_url = ?,
            start_date = ?, end_date = ?, technologies = ?, updated_at = ?
        WHERE id = ? AND user_id = ?
        "#,
    )
    .bind(&fields.title)
    .bind(&fields.description)
    .bind(&image)
    .bind(&fields.link)
    .bind(&fields.github_url)
    .bind(&fields.start_date)
    .bind(&fields.end_date)
    .bind(technologies_json(&fields)?)
    .bind(chrono::Utc::now().to_rfc3339())
    .bind(&id)
    .bind(&current.id)
    .execute(&state.db)
    .await?;

    let project = fetch_owned(&state, &id, &current.id).await?;
    Ok(Json(project.to_response()))
}

pub async fn delete_project(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let result = sqlx::query("DELETE FROM projects WHERE id = ? AND user_id = ?")
        .bind(&id)
        .bind(&current.id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Project not found"));
    }

    info!(project_id = %id, user_id = %current.id, "Deleted project");
    Ok(StatusCode::NO_CONTENT)
}
