use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::PersistError;
use crate::models::{ChatMessage, MessageRole};

/// MongoDB message document
///
/// Ids are stored as hyphenated UUID strings, `created_at` as a BSON date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoMessage {
    #[serde(rename = "_id")]
    pub id: String,
    pub session_id: String,
    pub role: MessageRole,
    pub content: String,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

/// MongoDB session document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoSession {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl From<&ChatMessage> for MongoMessage {
    fn from(msg: &ChatMessage) -> Self {
        Self {
            id: msg.id.to_string(),
            session_id: msg.session_id.to_string(),
            role: msg.role,
            content: msg.content.clone(),
            created_at: msg.created_at,
        }
    }
}

impl TryFrom<MongoMessage> for ChatMessage {
    type Error = PersistError;

    fn try_from(msg: MongoMessage) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_id(&msg.id)?,
            session_id: parse_id(&msg.session_id)?,
            role: msg.role,
            content: msg.content,
            created_at: msg.created_at,
        })
    }
}

fn parse_id(raw: &str) -> Result<Uuid, PersistError> {
    Uuid::parse_str(raw).map_err(|e| PersistError::InvalidId(format!("{}: {}", raw, e)))
}
