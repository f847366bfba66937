pub mod memory;
pub mod migrations;
pub mod models;
pub mod queries;

use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use std::path::Path;
use std::sync::Mutex;
use tracing::info;
use uuid::Uuid;

use parlor_types::{Chat, Message};

pub use memory::MemoryStore;

/// Storage capability the HTTP layer depends on. Implementations are
/// synchronous; async callers run them on the blocking pool.
pub trait ChatStore: Send + Sync {
    fn create_chat(&self, chat: &Chat) -> Result<()>;

    fn find_chat(&self, id: Uuid) -> Result<Option<Chat>>;

    /// All chats, most recently updated first. Ties keep creation order.
    fn list_chats(&self) -> Result<Vec<Chat>>;

    /// Bump `updated_at` to `at` (never backwards) and return the chat.
    fn touch_chat(&self, id: Uuid, at: DateTime<Utc>) -> Result<Chat>;

    /// Fails if the message's chat does not exist.
    fn append_message(&self, message: &Message) -> Result<()>;

    /// Messages of one chat in insertion order.
    fn messages_for(&self, chat_id: Uuid) -> Result<Vec<Message>>;
}

/// SQLite-backed store for deployments that want history to survive a restart.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        conn.pragma_update(None, "journal_mode", "WAL")?;
        let store = Self::init(conn)?;

        info!("Database opened at {}", path.display());
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        migrations::run(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.conn.lock().map_err(|e| anyhow::anyhow!("DB lock poisoned: {}", e))?;
        f(&conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use parlor_types::Role;

    fn at(ms: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(ms).unwrap()
    }

    fn chat(title: &str, ms: i64) -> Chat {
        Chat::opened_by(title, at(ms))
    }

    fn stores() -> Vec<(&'static str, Box<dyn ChatStore>)> {
        vec![
            ("memory", Box::new(MemoryStore::default())),
            ("sqlite", Box::new(SqliteStore::open_in_memory().unwrap())),
        ]
    }

    #[test]
    fn create_and_find_chat() {
        for (name, store) in stores() {
            let c = chat("first", 1_000);
            store.create_chat(&c).unwrap();

            assert_eq!(store.find_chat(c.id).unwrap(), Some(c.clone()), "{name}");
            assert_eq!(store.find_chat(Uuid::new_v4()).unwrap(), None, "{name}");
        }
    }

    #[test]
    fn list_is_sorted_by_update_time_descending() {
        for (name, store) in stores() {
            let a = chat("a", 1_000);
            let b = chat("b", 2_000);
            let c = chat("c", 3_000);
            for ch in [&a, &b, &c] {
                store.create_chat(ch).unwrap();
            }

            store.touch_chat(a.id, at(5_000)).unwrap();

            let ids: Vec<Uuid> = store.list_chats().unwrap().iter().map(|c| c.id).collect();
            assert_eq!(ids, vec![a.id, c.id, b.id], "{name}");
        }
    }

    #[test]
    fn ties_keep_creation_order() {
        for (name, store) in stores() {
            let a = chat("a", 1_000);
            let b = chat("b", 1_000);
            store.create_chat(&a).unwrap();
            store.create_chat(&b).unwrap();

            let ids: Vec<Uuid> = store.list_chats().unwrap().iter().map(|c| c.id).collect();
            assert_eq!(ids, vec![a.id, b.id], "{name}");
        }
    }

    #[test]
    fn touch_never_moves_backwards() {
        for (name, store) in stores() {
            let c = chat("c", 10_000);
            store.create_chat(&c).unwrap();

            let touched = store.touch_chat(c.id, at(9_000)).unwrap();
            assert_eq!(touched.updated_at, at(10_000), "{name}");

            let touched = store.touch_chat(c.id, at(10_000) + Duration::milliseconds(5)).unwrap();
            assert_eq!(touched.updated_at, at(10_005), "{name}");
            assert_eq!(touched.created_at, at(10_000), "{name}");
        }
    }

    #[test]
    fn touch_unknown_chat_fails() {
        for (name, store) in stores() {
            assert!(store.touch_chat(Uuid::new_v4(), at(1)).is_err(), "{name}");
        }
    }

    #[test]
    fn messages_are_returned_in_insertion_order_per_chat() {
        for (name, store) in stores() {
            let one = chat("one", 1_000);
            let two = chat("two", 1_000);
            store.create_chat(&one).unwrap();
            store.create_chat(&two).unwrap();

            let m1 = Message::new(one.id, Role::User, "hi", at(2_000));
            let other = Message::new(two.id, Role::User, "elsewhere", at(2_000));
            let m2 = Message::new(one.id, Role::Assistant, "Hello!", at(2_000));
            for m in [&m1, &other, &m2] {
                store.append_message(m).unwrap();
            }

            assert_eq!(store.messages_for(one.id).unwrap(), vec![m1.clone(), m2.clone()], "{name}");
            assert_eq!(store.messages_for(two.id).unwrap(), vec![other.clone()], "{name}");
            assert!(store.messages_for(Uuid::new_v4()).unwrap().is_empty(), "{name}");
        }
    }

    #[test]
    fn message_for_unknown_chat_is_rejected() {
        for (name, store) in stores() {
            let orphan = Message::new(Uuid::new_v4(), Role::User, "lost", at(1));
            assert!(store.append_message(&orphan).is_err(), "{name}");
        }
    }

    #[test]
    fn sqlite_history_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("parlor.db");

        let c = chat("kept", 1_000);
        let m = Message::new(c.id, Role::User, "kept", at(1_000));
        {
            let store = SqliteStore::open(&path).unwrap();
            store.create_chat(&c).unwrap();
            store.append_message(&m).unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.find_chat(c.id).unwrap(), Some(c.clone()));
        assert_eq!(store.messages_for(c.id).unwrap(), vec![m]);
    }
}
