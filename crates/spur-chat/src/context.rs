use std::sync::Arc;

use spur_llm::Message;
use spur_persist::{ChatMessage, LedgerStore, MessageRole, PersistError};
use uuid::Uuid;

/// Speaker of a context turn, in provider terms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnRole {
    User,
    Model,
}

/// One prior message as the provider sees it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextTurn {
    pub role: TurnRole,
    pub text: String,
}

impl ContextTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self { role: TurnRole::User, text: text.into() }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self { role: TurnRole::Model, text: text.into() }
    }
}

impl From<&ChatMessage> for ContextTurn {
    fn from(message: &ChatMessage) -> Self {
        let role = match message.role {
            MessageRole::Ai => TurnRole::Model,
            MessageRole::User => TurnRole::User,
        };
        Self { role, text: message.content.clone() }
    }
}

impl From<ContextTurn> for Message {
    fn from(turn: ContextTurn) -> Self {
        match turn.role {
            TurnRole::User => Message::human(turn.text),
            TurnRole::Model => Message::ai(turn.text),
        }
    }
}

/// Builds the fixed-size sliding window of prior messages for a turn
#[derive(Clone)]
pub struct ContextAssembler {
    ledger: Arc<dyn LedgerStore>,
    window: usize,
}

impl ContextAssembler {
    pub fn new(ledger: Arc<dyn LedgerStore>, window: usize) -> Self {
        Self { ledger, window }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Up to `window` most recent messages, oldest first
    ///
    /// `exclude` is the message being answered; it and anything newer stay
    /// out of the window since the new message travels separately.
    pub async fn build_window(
        &self,
        session_id: Uuid,
        exclude: Option<Uuid>,
    ) -> Result<Vec<ContextTurn>, PersistError> {
        if self.window == 0 {
            return Ok(Vec::new());
        }

        let mut recent = self
            .ledger
            .find_messages(session_id, self.window, exclude)
            .await?;
        recent.reverse();

        tracing::debug!(%session_id, turns = recent.len(), "Context window assembled");

        Ok(recent.iter().map(ContextTurn::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spur_persist::MemoryLedger;

    async fn ledger_with(count: usize) -> (Arc<MemoryLedger>, Uuid, Vec<ChatMessage>) {
        let ledger = Arc::new(MemoryLedger::new());
        let session = Uuid::new_v4();
        let mut created = Vec::new();
        for i in 0..count {
            let role = if i % 2 == 0 { MessageRole::User } else { MessageRole::Ai };
            created.push(
                ledger
                    .create_message(session, role, &format!("m{}", i))
                    .await
                    .unwrap(),
            );
        }
        (ledger, session, created)
    }

    #[tokio::test]
    async fn test_window_is_chronological_and_capped() {
        let (ledger, session, created) = ledger_with(15).await;
        let assembler = ContextAssembler::new(ledger, 10);

        let window = assembler
            .build_window(session, Some(created[14].id))
            .await
            .unwrap();

        assert_eq!(window.len(), 10);
        assert_eq!(window.first().unwrap().text, "m4");
        assert_eq!(window.last().unwrap().text, "m13");
    }

    #[tokio::test]
    async fn test_window_maps_roles() {
        let (ledger, session, created) = ledger_with(3).await;
        let assembler = ContextAssembler::new(ledger, 10);

        let window = assembler
            .build_window(session, Some(created[2].id))
            .await
            .unwrap();

        assert_eq!(window, vec![ContextTurn::user("m0"), ContextTurn::model("m1")]);
    }

    #[tokio::test]
    async fn test_first_turn_has_empty_window() {
        let (ledger, session, created) = ledger_with(1).await;
        let assembler = ContextAssembler::new(ledger, 10);

        let window = assembler
            .build_window(session, Some(created[0].id))
            .await
            .unwrap();
        assert!(window.is_empty());
    }

    #[test]
    fn test_turn_into_provider_message() {
        assert_eq!(Message::from(ContextTurn::model("hi")), Message::ai("hi"));
        assert_eq!(Message::from(ContextTurn::user("yo")), Message::human("yo"));
    }
}
