use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension};
use uuid::Uuid;

use parlor_types::{Chat, Message};

use crate::models::{ChatRow, MessageRow};
use crate::{ChatStore, SqliteStore};

impl ChatStore for SqliteStore {
    // -- Chats --

    fn create_chat(&self, chat: &Chat) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO chats (id, title, created_at, updated_at) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![
                    chat.id.to_string(),
                    chat.title,
                    chat.created_at.timestamp_millis(),
                    chat.updated_at.timestamp_millis(),
                ],
            )?;
            Ok(())
        })
    }

    fn find_chat(&self, id: Uuid) -> Result<Option<Chat>> {
        self.with_conn(|conn| query_chat(conn, &id.to_string()))
    }

    fn list_chats(&self) -> Result<Vec<Chat>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, title, created_at, updated_at FROM chats
                 ORDER BY updated_at DESC, rowid ASC",
            )?;

            let rows = stmt
                .query_map([], chat_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            rows.into_iter().map(Chat::try_from).collect()
        })
    }

    fn touch_chat(&self, id: Uuid, at: DateTime<Utc>) -> Result<Chat> {
        self.with_conn(|conn| {
            let id = id.to_string();
            let changed = conn.execute(
                "UPDATE chats SET updated_at = MAX(updated_at, ?2) WHERE id = ?1",
                rusqlite::params![id, at.timestamp_millis()],
            )?;
            if changed == 0 {
                return Err(anyhow!("Chat not found: {}", id));
            }

            query_chat(conn, &id)?.ok_or_else(|| anyhow!("Chat not found: {}", id))
        })
    }

    // -- Messages --

    fn append_message(&self, message: &Message) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO messages (id, chat_id, role, content, timestamp) VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![
                    message.id.to_string(),
                    message.chat_id.to_string(),
                    message.role.as_str(),
                    message.content,
                    message.timestamp.timestamp_millis(),
                ],
            )?;
            Ok(())
        })
    }

    fn messages_for(&self, chat_id: Uuid) -> Result<Vec<Message>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, chat_id, role, content, timestamp FROM messages
                 WHERE chat_id = ?1
                 ORDER BY rowid ASC",
            )?;

            let rows = stmt
                .query_map([chat_id.to_string()], |row| {
                    Ok(MessageRow {
                        id: row.get(0)?,
                        chat_id: row.get(1)?,
                        role: row.get(2)?,
                        content: row.get(3)?,
                        timestamp: row.get(4)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            rows.into_iter().map(Message::try_from).collect()
        })
    }
}

fn chat_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ChatRow> {
    Ok(ChatRow {
        id: row.get(0)?,
        title: row.get(1)?,
        created_at: row.get(2)?,
        updated_at: row.get(3)?,
    })
}

fn query_chat(conn: &Connection, id: &str) -> Result<Option<Chat>> {
    let row = conn
        .query_row(
            "SELECT id, title, created_at, updated_at FROM chats WHERE id = ?1",
            [id],
            chat_row,
        )
        .optional()?;

    row.map(Chat::try_from).transpose()
}
