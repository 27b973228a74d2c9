use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    /// 1 to 250 characters
    pub message: String,
    /// Omit to start a new conversation
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageResponse {
    pub reply: String,
    pub session_id: Uuid,
}

/// Send a message and get the agent's reply
#[utoipa::path(
    post,
    path = "/chat/message",
    request_body = SendMessageRequest,
    responses(
        (status = 200, description = "Agent reply", body = SendMessageResponse),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Conversation limit reached"),
        (status = 429, description = "Previous message is still processing"),
        (status = 500, description = "Internal error")
    ),
    tag = "chat"
)]
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SendMessageRequest>, JsonRejection>,
) -> ApiResult<Json<SendMessageResponse>> {
    let Json(request) = payload.map_err(|e| ApiError::InvalidInput(e.body_text()))?;

    let session_id = request
        .session_id
        .as_deref()
        .map(Uuid::parse_str)
        .transpose()
        .map_err(|_| ApiError::InvalidInput("sessionId must be a valid UUID".to_string()))?;

    let turn = state
        .coordinator
        .handle_turn(session_id, &request.message)
        .await?;

    Ok(Json(SendMessageResponse {
        reply: turn.reply,
        session_id: turn.session_id,
    }))
}
