use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{self, doc},
    Client, Collection, Database, IndexModel,
};
use uuid::Uuid;

use crate::dbs::mongo::models::{MongoMessage, MongoSession};
use crate::error::{PersistError, Result};
use crate::models::{ChatMessage, MessageRole};
use crate::trait_client::LedgerStore;

/// Ledger backed by the `sessions` and `messages` collections
#[derive(Clone)]
pub struct MongoLedger {
    database: Database,
    messages: Collection<MongoMessage>,
    sessions: Collection<MongoSession>,
}

impl MongoLedger {
    /// Connect to MongoDB and make sure the history index exists
    pub async fn connect(mongodb_uri: &str, database: &str) -> Result<Self> {
        tracing::info!(database, "Connecting to MongoDB");
        let client = Client::with_uri_str(mongodb_uri)
            .await
            .map_err(|e| PersistError::Connection(e.to_string()))?;

        let ledger = Self::new(&client, database);
        ledger.ensure_indexes().await?;
        tracing::info!(database, "MongoDB ledger ready");
        Ok(ledger)
    }

    pub fn new(client: &Client, db_name: &str) -> Self {
        let database = client.database(db_name);
        Self {
            messages: database.collection("messages"),
            sessions: database.collection("sessions"),
            database,
        }
    }

    async fn ensure_indexes(&self) -> Result<()> {
        let history_index = IndexModel::builder()
            .keys(doc! { "session_id": 1, "created_at": -1, "_id": -1 })
            .build();
        let created = self.messages.create_index(history_index).await?;
        tracing::debug!(index = %created.index_name, "History index ensured");
        Ok(())
    }
}

#[async_trait]
impl LedgerStore for MongoLedger {
    async fn count_messages(&self, session_id: Uuid) -> Result<u64> {
        let count = self
            .messages
            .count_documents(doc! { "session_id": session_id.to_string() })
            .await?;
        Ok(count)
    }

    async fn upsert_session(&self, session_id: Uuid) -> Result<()> {
        self.sessions
            .update_one(
                doc! { "_id": session_id.to_string() },
                doc! { "$setOnInsert": { "created_at": bson::DateTime::now() } },
            )
            .upsert(true)
            .await?;
        Ok(())
    }

    async fn create_message(
        &self,
        session_id: Uuid,
        role: MessageRole,
        content: &str,
    ) -> Result<ChatMessage> {
        let message = ChatMessage::new(session_id, role, content);
        self.messages.insert_one(MongoMessage::from(&message)).await?;
        Ok(message)
    }

    async fn find_messages(
        &self,
        session_id: Uuid,
        limit: usize,
        before: Option<Uuid>,
    ) -> Result<Vec<ChatMessage>> {
        let session_key = session_id.to_string();

        let filter = match before {
            None => doc! { "session_id": session_key.as_str() },
            Some(cursor) => {
                let anchor = self
                    .messages
                    .find_one(doc! { "_id": cursor.to_string(), "session_id": session_key.as_str() })
                    .await?;
                let Some(anchor) = anchor else {
                    return Ok(Vec::new());
                };
                let anchor_at = bson::DateTime::from_chrono(anchor.created_at);
                doc! {
                    "session_id": session_key.as_str(),
                    "$or": [
                        { "created_at": { "$lt": anchor_at } },
                        { "created_at": anchor_at, "_id": { "$lt": anchor.id.as_str() } },
                    ],
                }
            }
        };

        let documents: Vec<MongoMessage> = self
            .messages
            .find(filter)
            .sort(doc! { "created_at": -1, "_id": -1 })
            .limit(i64::try_from(limit).unwrap_or(i64::MAX))
            .await?
            .try_collect()
            .await?;

        documents.into_iter().map(ChatMessage::try_from).collect()
    }

    async fn ping(&self) -> Result<()> {
        self.database.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }
}
