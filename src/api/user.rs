use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::cookie::CookieJar;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

use crate::auth::{end_session, hash_password, verify_password, CurrentUser};
use crate::db::{
    find_user_by_id, ChangePasswordRequest, UpdateUserRequest, User, UserResponse,
};
use crate::AppState;

use super::error::ApiError;
use super::validation::validate_password;

/// Load the caller's row; a deleted account is reported as not found
pub(crate) async fn load_current(state: &AppState, current: &CurrentUser) -> Result<User, ApiError> {
    find_user_by_id(&state.db, &current.id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))
}

pub(crate) async fn set_password(state: &AppState, user_id: &str, password: &str) -> Result<(), ApiError> {
    let password_hash = hash_password(password).map_err(|e| {
        tracing::error!("Failed to hash password: {}", e);
        ApiError::internal("Internal server error")
    })?;

    sqlx::query("UPDATE users SET password_hash = ?, updated_at = ? WHERE id = ?")
        .bind(&password_hash)
        .bind(chrono::Utc::now().to_rfc3339())
        .bind(user_id)
        .execute(&state.db)
        .await?;

    Ok(())
}

/// Get the current user
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
) -> Result<Json<UserResponse>, ApiError> {
    let user = load_current(&state, &current).await?;
    Ok(Json(UserResponse::from(user)))
}

/// Update the current user's display name
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    load_current(&state, &current).await?;

    let name = req.name.as_deref().map(str::trim).filter(|n| !n.is_empty());

    sqlx::query("UPDATE users SET name = ?, updated_at = ? WHERE id = ?")
        .bind(name)
        .bind(chrono::Utc::now().to_rfc3339())
        .bind(&current.id)
        .execute(&state.db)
        .await?;

    let user = load_current(&state, &current).await?;
    Ok(Json(UserResponse::from(user)))
}

/// Delete the current account together with everything it owns
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    jar: CookieJar,
) -> Result<(CookieJar, StatusCode), ApiError> {
    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(&current.id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("User not found"));
    }

    info!(user_id = %current.id, "Deleted user account");
    Ok((end_session(jar), StatusCode::NO_CONTENT))
}

/// Change password after checking the current one
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<Json<Value>, ApiError> {
    let user = load_current(&state, &current).await?;

    if !verify_password(&req.current_password, &user.password_hash) {
        return Err(ApiError::bad_request("Current password is incorrect"));
    }

    validate_password(&req.new_password).map_err(|e| ApiError::validation_field("newPassword", e))?;

    set_password(&state, &user.id, &req.new_password).await?;

    info!(user_id = %user.id, "Password changed");
    Ok(Json(json!({ "message": "Password updated successfully" })))
}
