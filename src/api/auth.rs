use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::cookie::CookieJar;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, warn};

use crate::auth::{end_session, start_session, verify_password, NewClaims, Role};
use crate::db::{
    create_user, find_user_by_email, AuthResponse, LoginRequest, RegisterRequest, User,
    UserResponse,
};
use crate::AppState;

use super::error::{ApiError, ValidationErrorBuilder};
use super::validation::{validate_email, validate_password};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Sign a session token for `user`
pub(crate) fn issue_session(state: &AppState, user: &User) -> Result<String, ApiError> {
    let role = user.role_enum().ok_or_else(|| {
        tracing::error!(user_id = %user.id, role = %user.role, "Stored role is not recognised");
        ApiError::internal("Internal server error")
    })?;

    state
        .tokens
        .issue(NewClaims {
            user_id: user.id.clone(),
            email: user.email.clone(),
            role,
            name: user.name.clone(),
        })
        .map_err(|e| {
            tracing::error!("Failed to issue token: {}", e);
            ApiError::internal("Internal server error")
        })
}

/// Login with email and password; sets the session cookie
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> Result<(CookieJar, Json<AuthResponse>), ApiError> {
    if request.email.is_empty() || request.password.is_empty() {
        return Err(ApiError::bad_request("Email and password are required"));
    }

    let user = find_user_by_email(&state.db, &request.email)
        .await?
        .ok_or_else(|| ApiError::unauthorized(INVALID_CREDENTIALS))?;

    if !verify_password(&request.password, &user.password_hash) {
        warn!(email = %request.email, "Failed login attempt");
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    }

    let token = issue_session(&state, &user)?;
    let jar = start_session(jar, token, state.config.server.production);

    info!(user_id = %user.id, role = %user.role, "User logged in");

    Ok((
        jar,
        Json(AuthResponse {
            message: "Login successful".to_string(),
            user: UserResponse::from(user),
        }),
    ))
}

/// Create an account. SUPER_ADMIN can not be requested here.
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let mut errors = ValidationErrorBuilder::new();
    errors.check("email", validate_email(&request.email));
    errors.check("password", validate_password(&request.password));

    let role = match request.role.as_deref() {
        None | Some("") => Role::Staff,
        Some(raw) => match raw.parse::<Role>() {
            Ok(role @ (Role::Admin | Role::Staff)) => role,
            _ => {
                errors.add("role", "Invalid role");
                Role::Staff
            }
        },
    };
    errors.finish()?;

    if find_user_by_email(&state.db, &request.email).await?.is_some() {
        return Err(ApiError::conflict("Email already registered"));
    }

    let password_hash = crate::auth::hash_password(&request.password).map_err(|e| {
        tracing::error!("Failed to hash password: {}", e);
        ApiError::internal("Internal server error")
    })?;

    let name = request
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty());

    let user = create_user(&state.db, &request.email, &password_hash, name, role).await?;

    info!(user_id = %user.id, role = %role, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "Registration successful".to_string(),
            user: UserResponse::from(user),
        }),
    ))
}

/// Drop the session cookie. The token itself stays valid until it expires.
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<Value>) {
    (end_session(jar), Json(json!({ "message": "Logged out" })))
}
