use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};
use std::sync::Mutex;
use uuid::Uuid;

use parlor_types::{Chat, Message};

use crate::ChatStore;

/// Process-local store: two ordered vectors, looked up by linear scan.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

#[derive(Default)]
struct Tables {
    chats: Vec<Chat>,
    messages: Vec<Message>,
}

impl MemoryStore {
    fn with_tables<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Tables) -> Result<T>,
    {
        let mut tables = self
            .tables
            .lock()
            .map_err(|e| anyhow!("Store lock poisoned: {}", e))?;
        f(&mut tables)
    }
}

impl ChatStore for MemoryStore {
    fn create_chat(&self, chat: &Chat) -> Result<()> {
        self.with_tables(|t| {
            if t.chats.iter().any(|c| c.id == chat.id) {
                return Err(anyhow!("Chat already exists: {}", chat.id));
            }
            t.chats.push(chat.clone());
            Ok(())
        })
    }

    fn find_chat(&self, id: Uuid) -> Result<Option<Chat>> {
        self.with_tables(|t| Ok(t.chats.iter().find(|c| c.id == id).cloned()))
    }

    fn list_chats(&self) -> Result<Vec<Chat>> {
        self.with_tables(|t| {
            let mut chats = t.chats.clone();
            // Stable: equal timestamps stay in creation order
            chats.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
            Ok(chats)
        })
    }

    fn touch_chat(&self, id: Uuid, at: DateTime<Utc>) -> Result<Chat> {
        self.with_tables(|t| {
            let chat = t
                .chats
                .iter_mut()
                .find(|c| c.id == id)
                .ok_or_else(|| anyhow!("Chat not found: {}", id))?;
            chat.updated_at = chat.updated_at.max(at);
            Ok(chat.clone())
        })
    }

    fn append_message(&self, message: &Message) -> Result<()> {
        self.with_tables(|t| {
            if !t.chats.iter().any(|c| c.id == message.chat_id) {
                return Err(anyhow!("Chat not found: {}", message.chat_id));
            }
            t.messages.push(message.clone());
            Ok(())
        })
    }

    fn messages_for(&self, chat_id: Uuid) -> Result<Vec<Message>> {
        self.with_tables(|t| {
            Ok(t.messages
                .iter()
                .filter(|m| m.chat_id == chat_id)
                .cloned()
                .collect())
        })
    }
}
