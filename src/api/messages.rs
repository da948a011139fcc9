//! Contact-message inbox. Only ADMIN and SUPER_ADMIN may read or triage it;
//! the role is re-read from the database rather than trusted from the token.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::auth::CurrentUser;
use crate::db::{find_user_by_id, Message, MessageStatus, UpdateMessageRequest};
use crate::AppState;

use super::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub status: Option<MessageStatus>,
}

async fn require_inbox_access(state: &AppState, current: &CurrentUser) -> Result<(), ApiError> {
    let allowed = find_user_by_id(&state.db, &current.id)
        .await?
        .and_then(|user| user.role_enum())
        .is_some_and(|role| role.can_manage_messages());

    if !allowed {
        tracing::debug!(user_id = %current.id, "Inbox access denied");
        return Err(ApiError::forbidden("Not authorized"));
    }
    Ok(())
}

/// List messages grouped by status, newest first within each, optionally filtered by status
pub async fn list_messages(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Query(query): Query<MessageQuery>,
) -> Result<Json<Vec<Message>>, ApiError> {
    require_inbox_access(&state, &current).await?;

    let messages = match query.status {
        Some(status) => {
            sqlx::query_as::<_, Message>(
                "SELECT * FROM messages WHERE status = ? ORDER BY created_at DESC",
            )
            .bind(status.as_str())
            .fetch_all(&state.db)
            .await?
        }
        None => {
            sqlx::query_as::<_, Message>("SELECT * FROM messages ORDER BY status ASC, created_at DESC")
                .fetch_all(&state.db)
                .await?
        }
    };

    Ok(Json(messages))
}

/// Set a message's status. The first transition to READ stamps `read_at`.
pub async fn update_message(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateMessageRequest>,
) -> Result<Json<Message>, ApiError> {
    require_inbox_access(&state, &current).await?;

    let result = sqlx::query(
        r#"
        UPDATE messages SET
            status = ?,
            read_at = CASE WHEN ? = 'READ' AND read_at IS NULL THEN ? ELSE read_at END
        WHERE id = ?
        "#,
    )
    .bind(req.status.as_str())
    .bind(req.status.as_str())
    .bind(chrono::Utc::now().to_rfc3339())
    .bind(&id)
    .execute(&state.db)
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Message not found"));
    }

    let message = sqlx::query_as::<_, Message>("SELECT * FROM messages WHERE id = ?")
        .bind(&id)
        .fetch_one(&state.db)
        .await?;

    Ok(Json(message))
}
