//! Account settings: name, email and an optional password change in one form.

use axum::{extract::State, Json};
use std::sync::Arc;
use tracing::info;

use crate::auth::{verify_password, CurrentUser};
use crate::db::{UpdateSettingsRequest, UserResponse};
use crate::AppState;

use super::error::{ApiError, ValidationErrorBuilder};
use super::user::{load_current, set_password};
use super::validation::{validate_email, validate_password};

pub async fn get_settings(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
) -> Result<Json<UserResponse>, ApiError> {
    let user = load_current(&state, &current).await?;
    Ok(Json(UserResponse::from(user)))
}

pub async fn update_settings(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Json(req): Json<UpdateSettingsRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let name = req.name.as_deref().map(str::trim).filter(|n| !n.is_empty());
    let email = req.email.as_deref().map(str::trim).filter(|e| !e.is_empty());
    let current_password = req.current_password.as_deref().filter(|p| !p.is_empty());
    let new_password = req.new_password.as_deref().filter(|p| !p.is_empty());

    let mut errors = ValidationErrorBuilder::new();
    if let Some(email) = email {
        errors.check("email", validate_email(email));
    }
    if let Some(password) = new_password {
        errors.check("newPassword", validate_password(password));
    }
    errors.finish()?;

    let user = load_current(&state, &current).await?;

    if let Some(email) = email {
        let taken: Option<(String,)> =
            sqlx::query_as("SELECT id FROM users WHERE email = ? AND id != ?")
                .bind(email)
                .bind(&user.id)
                .fetch_optional(&state.db)
                .await?;
        if taken.is_some() {
            return Err(ApiError::conflict("Email already in use"));
        }
    }

    // A password change needs both fields; the current one must match
    if let Some(new_password) = new_password {
        let current_password = current_password
            .ok_or_else(|| ApiError::validation_field("currentPassword", "Current password is required"))?;
        if !verify_password(current_password, &user.password_hash) {
            return Err(ApiError::bad_request("Current password is incorrect"));
        }
        set_password(&state, &user.id, new_password).await?;
        info!(user_id = %user.id, "Password changed from settings");
    }

    sqlx::query(
        r#"
        UPDATE users SET
            name = COALESCE(?, name),
            email = COALESCE(?, email),
            updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(name)
    .bind(email)
    .bind(chrono::Utc::now().to_rfc3339())
    .bind(&user.id)
    .execute(&state.db)
    .await?;

    let user = load_current(&state, &current).await?;
    Ok(Json(UserResponse::from(user)))
}
