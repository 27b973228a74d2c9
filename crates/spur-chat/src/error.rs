use spur_cache::CacheError;
use spur_persist::PersistError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ChatError {
    /// Malformed input, nothing was touched
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Another turn holds the session lock
    #[error("A turn is already in progress for session {0}")]
    TurnInProgress(Uuid),

    #[error("Conversation limit reached ({limit} messages) for session {session_id}")]
    LimitReached { session_id: Uuid, limit: u64 },

    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),
}

pub type Result<T> = std::result::Result<T, ChatError>;
