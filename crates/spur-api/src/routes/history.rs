use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    Json,
};
use serde::Deserialize;
use spur_chat::{ChatError, HistoryPage};
use std::sync::Arc;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HistoryQuery {
    /// Id of the last message of the previous page
    pub cursor: Option<String>,
    /// Page size, 1 to 100 (default: 50)
    pub limit: Option<u32>,
}

/// Page through a conversation, newest first
#[utoipa::path(
    get,
    path = "/chat/history/{session_id}",
    params(
        ("session_id" = String, Path, description = "Session ID"),
        HistoryQuery
    ),
    responses(
        (status = 200, description = "One page of messages with an optional nextCursor"),
        (status = 400, description = "Invalid parameters"),
        (status = 500, description = "Internal error")
    ),
    tag = "chat"
)]
pub async fn get_history(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> ApiResult<Json<HistoryPage>> {
    let Query(query) = query.map_err(|e| ApiError::InvalidParameters(e.body_text()))?;

    let session_id = Uuid::parse_str(&session_id)
        .map_err(|_| ApiError::InvalidParameters("sessionId must be a valid UUID".to_string()))?;
    let cursor = query
        .cursor
        .as_deref()
        .map(Uuid::parse_str)
        .transpose()
        .map_err(|_| ApiError::InvalidParameters("cursor must be a valid UUID".to_string()))?;

    let page = state
        .history
        .get_history(session_id, cursor, query.limit)
        .await
        .map_err(|e| match e {
            ChatError::Validation(msg) => ApiError::InvalidParameters(msg),
            other => ApiError::from(other),
        })?;

    Ok(Json(page))
}
