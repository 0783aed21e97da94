use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, SecondsFormat, Utc};
use tracing::{error, warn};
use uuid::Uuid;

use banter_db::models::MessageRow;
use banter_types::api::{MessageListResponse, SendMessageRequest};
use banter_types::models::MessageView;

use crate::auth::AppState;
use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthUser;

/// Persist one immutable direct message from the session user.
pub async fn send_message(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Json(req): Json<SendMessageRequest>,
) -> ApiResult<impl IntoResponse> {
    if req.receiver_id.trim().is_empty() || req.body.trim().is_empty() {
        return Err(ApiError::Validation("receiverId and body are required".into()));
    }

    let receiver_id: Uuid = req
        .receiver_id
        .trim()
        .parse()
        .map_err(|_| ApiError::Validation("receiverId must be a valid user id".into()))?;

    let message_id = Uuid::new_v4();
    let now = Utc::now();
    let ts = now.to_rfc3339_opts(SecondsFormat::Micros, true);

    // Run the blocking DB work off the async runtime
    let db = state.clone();
    let mid = message_id.to_string();
    let sid = user_id.to_string();
    let rid = receiver_id.to_string();
    let body = req.body.clone();
    tokio::task::spawn_blocking(move || {
        if db
            .db
            .get_user_by_id(&rid)
            .map_err(ApiError::Internal)?
            .is_none()
        {
            return Err(ApiError::NotFound("Receiver not found".into()));
        }
        db.db
            .insert_message(&mid, &sid, &rid, &body, &ts)
            .map_err(ApiError::Internal)
    })
    .await
    .map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        ApiError::Internal(anyhow::anyhow!("task join failed"))
    })??;

    Ok((
        StatusCode::CREATED,
        Json(MessageView {
            id: message_id,
            sender_id: user_id,
            receiver_id,
            body: req.body,
            is_sender: true,
            created_at: now,
        }),
    ))
}

/// Every message between the caller and `peer_id`, in either direction,
/// ascending by creation time, annotated from the caller's viewpoint.
pub async fn get_messages(
    State(state): State<AppState>,
    Path(peer_id): Path<Uuid>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    let db = state.clone();
    let a = user_id.to_string();
    let b = peer_id.to_string();

    let rows = tokio::task::spawn_blocking(move || db.db.get_conversation(&a, &b))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(anyhow::anyhow!("task join failed"))
        })?
        .map_err(ApiError::Internal)?;

    let messages: Vec<MessageView> = rows
        .into_iter()
        .map(|row| view_from_row(row, user_id))
        .collect();

    Ok(Json(MessageListResponse {
        success: true,
        messages,
    }))
}

fn view_from_row(row: MessageRow, caller: Uuid) -> MessageView {
    let sender_id: Uuid = row.sender_id.parse().unwrap_or_else(|e| {
        warn!("Corrupt sender_id '{}' on message '{}': {}", row.sender_id, row.id, e);
        Uuid::default()
    });
    let receiver_id: Uuid = row.receiver_id.parse().unwrap_or_else(|e| {
        warn!("Corrupt receiver_id '{}' on message '{}': {}", row.receiver_id, row.id, e);
        Uuid::default()
    });
    let created_at = row
        .created_at
        .parse::<DateTime<Utc>>()
        .unwrap_or_else(|e| {
            warn!("Corrupt created_at '{}' on message '{}': {}", row.created_at, row.id, e);
            DateTime::default()
        });
    let id: Uuid = row.id.parse().unwrap_or_else(|e| {
        warn!("Corrupt message id '{}': {}", row.id, e);
        Uuid::default()
    });

    MessageView {
        id,
        sender_id,
        receiver_id,
        body: row.body,
        is_sender: sender_id == caller,
        created_at,
    }
}
