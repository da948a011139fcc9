use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::db::{Profile, ProfileFields};
use crate::AppState;

use super::error::{ApiError, ValidationErrorBuilder};
use super::upload::{store_upload, FormData};
use super::validation::validate_optional_url;

async fn find_profile(state: &AppState, user_id: &str) -> Result<Option<Profile>, ApiError> {
    Ok(
        sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(&state.db)
            .await?,
    )
}

/// The caller's profile, or `null` when none was saved yet
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
) -> Result<Json<Option<Profile>>, ApiError> {
    Ok(Json(find_profile(&state, &current.id).await?))
}

/// Create or replace the caller's profile. Multipart; `avatar` is an optional image.
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    multipart: Multipart,
) -> Result<Json<Profile>, ApiError> {
    let mut form = FormData::read(multipart, "avatar").await?;
    let fields = ProfileFields {
        bio: form.text("bio"),
        headline: form.text("headline"),
        location: form.text("location"),
        website: form.text("website"),
    };

    let mut errors = ValidationErrorBuilder::new();
    errors.check("website", validate_optional_url(&fields.website));
    errors.finish()?;

    let avatar = match form.take_file() {
        Some(file) => Some(store_upload(&state, "avatar", &current.id, file).await?),
        None => None,
    };

    let now = chrono::Utc::now().to_rfc3339();

    // Keep the previous avatar when no new one was uploaded
    sqlx::query(
        r#"
        INSERT INTO profiles (id, user_id, bio, headline, location, website, avatar, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(user_id) DO UPDATE SET
            bio = excluded.bio,
            headline = excluded.headline,
            location = excluded.location,
            website = excluded.website,
            avatar = COALESCE(excluded.avatar, profiles.avatar),
            updated_at = excluded.updated_at
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(&current.id)
    .bind(&fields.bio)
    .bind(&fields.headline)
    .bind(&fields.location)
    .bind(&fields.website)
    .bind(&avatar)
    .bind(&now)
    .bind(&now)
    .execute(&state.db)
    .await?;

    let profile = find_profile(&state, &current.id)
        .await?
        .ok_or_else(|| ApiError::internal("Profile was not saved"))?;

    Ok(Json(profile))
}

pub async fn delete_profile(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
) -> Result<StatusCode, ApiError> {
    let result = sqlx::query("DELETE FROM profiles WHERE user_id = ?")
        .bind(&current.id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Profile not found"));
    }

    Ok(StatusCode::NO_CONTENT)
}
