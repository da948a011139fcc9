use axum::{
    extract::State,
    http::{header::USER_AGENT, HeaderMap, StatusCode},
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::db::{ContactRequest, MessageStatus};
use crate::AppState;

use super::error::{ApiError, ValidationErrorBuilder};
use super::validation::{validate_email, validate_required};

const UNKNOWN: &str = "Unknown";

/// Client address as reported by the nearest proxy (first `x-forwarded-for` entry)
pub(crate) fn client_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .unwrap_or(UNKNOWN)
        .to_string()
}

fn user_agent(headers: &HeaderMap) -> String {
    headers
        .get(USER_AGENT)
        .and_then(|h| h.to_str().ok())
        .filter(|ua| !ua.is_empty())
        .unwrap_or(UNKNOWN)
        .to_string()
}

/// Store a contact-form message
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<ContactRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let mut errors = ValidationErrorBuilder::new();
    errors.check("name", validate_required(&req.name, "Name"));
    errors.check("email", validate_email(req.email.trim()));
    errors.check("message", validate_required(&req.message, "Message"));
    errors.finish()?;

    let id = Uuid::new_v4().to_string();
    let ip = client_ip(&headers);

    sqlx::query(
        r#"
        INSERT INTO messages (id, name, email, message, status, ip_address, user_agent, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(req.name.trim())
    .bind(req.email.trim())
    .bind(req.message.trim())
    .bind(MessageStatus::Unread.as_str())
    .bind(&ip)
    .bind(user_agent(&headers))
    .bind(chrono::Utc::now().to_rfc3339())
    .execute(&state.db)
    .await?;

    info!(message_id = %id, ip = %ip, "Contact message received");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Message sent successfully", "id": id })),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_client_ip_takes_first_forwarded_entry() {
        let mut headers = HeaderMap::new();
        assert_eq!(client_ip(&headers), "Unknown");

        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.7, 10.0.0.1"));
        assert_eq!(client_ip(&headers), "203.0.113.7");

        headers.insert("x-forwarded-for", HeaderValue::from_static(" , 10.0.0.1"));
        assert_eq!(client_ip(&headers), "Unknown");
    }

    #[test]
    fn test_user_agent_defaults() {
        let mut headers = HeaderMap::new();
        assert_eq!(user_agent(&headers), "Unknown");
        headers.insert(USER_AGENT, HeaderValue::from_static("curl/8.0"));
        assert_eq!(user_agent(&headers), "curl/8.0");
    }
}
