use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{ChatMessage, MessageRole};

/// Durable, append-only message ledger
///
/// Implementations provide database-specific storage. Messages are never
/// updated or deleted through this interface.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Number of messages persisted for a session
    async fn count_messages(&self, session_id: Uuid) -> Result<u64>;

    /// Create the session record if it does not exist yet, no-op otherwise
    async fn upsert_session(&self, session_id: Uuid) -> Result<()>;

    /// Append a message to the session
    async fn create_message(
        &self,
        session_id: Uuid,
        role: MessageRole,
        content: &str,
    ) -> Result<ChatMessage>;

    /// Up to `limit` messages, newest first
    ///
    /// With `before`, only messages strictly older than that message are
    /// returned. An unknown `before` id yields an empty result.
    async fn find_messages(
        &self,
        session_id: Uuid,
        limit: usize,
        before: Option<Uuid>,
    ) -> Result<Vec<ChatMessage>>;

    /// Cheap connectivity check
    async fn ping(&self) -> Result<()>;
}
