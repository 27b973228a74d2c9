use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use spur_chat::ChatError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed chat request body
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Malformed history path or query
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Previous message is still processing")]
    TurnInProgress,

    #[error("Conversation limit reached")]
    LimitReached,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::Validation(msg) => ApiError::InvalidInput(msg),
            ChatError::TurnInProgress(_) => ApiError::TurnInProgress,
            ChatError::LimitReached { .. } => ApiError::LimitReached,
            ChatError::Persistence(_) | ChatError::Cache(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::InvalidInput(details) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Invalid input", "details": details }),
            ),
            ApiError::InvalidParameters(details) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Invalid parameters", "details": details }),
            ),
            ApiError::TurnInProgress => (
                StatusCode::TOO_MANY_REQUESTS,
                json!({
                    "error": "Too Many Requests",
                    "details": { "message": "Previous message is still processing. Please wait." }
                }),
            ),
            ApiError::LimitReached => (
                StatusCode::FORBIDDEN,
                json!({ "error": "Limit Reached", "details": "Conversation limit reached." }),
            ),
            ApiError::Internal(ref e) => {
                tracing::error!("Internal error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal Server Error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
