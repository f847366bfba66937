//! Database row types. These map directly to SQLite rows and are converted
//! into parlor-types models at the store boundary.
use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};

use parlor_types::{Chat, Message};

pub struct ChatRow {
    pub id: String,
    pub title: String,
    pub created_at: i64,
    pub updated_at: i64,
}

pub struct MessageRow {
    pub id: String,
    pub chat_id: String,
    pub role: String,
    pub content: String,
    pub timestamp: i64,
}

fn millis(ms: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms).ok_or_else(|| anyhow!("Timestamp out of range: {}", ms))
}

impl TryFrom<ChatRow> for Chat {
    type Error = anyhow::Error;

    fn try_from(row: ChatRow) -> Result<Self> {
        Ok(Chat {
            id: row.id.parse()?,
            title: row.title,
            created_at: millis(row.created_at)?,
            updated_at: millis(row.updated_at)?,
        })
    }
}

impl TryFrom<MessageRow> for Message {
    type Error = anyhow::Error;

    fn try_from(row: MessageRow) -> Result<Self> {
        Ok(Message {
            id: row.id.parse()?,
            content: row.content,
            role: row.role.parse().map_err(|e: String| anyhow!(e))?,
            chat_id: row.chat_id.parse()?,
            timestamp: millis(row.timestamp)?,
        })
    }
}
