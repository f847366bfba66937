use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde_json::{Map, Value};
use tempfile::NamedTempFile;
use tracing::{debug, info};
use uuid::Uuid;

use parlor_types::api::{SendMessageRequest, SendMessageResponse};
use parlor_types::{Chat, ChatThread};

use crate::backend::ChatBackend;
use crate::error::ClientError;
use crate::remote::RemoteBackend;

/// Key under which chat records are stored.
pub const CHATS_KEY: &str = "chats";

/// File-backed key/value store standing in for browser local storage.
/// The file holds one JSON object; chats live under [`CHATS_KEY`].
#[derive(Debug, Clone)]
pub struct LocalStorage {
    path: PathBuf,
}

impl LocalStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file reads as no chats.
    pub fn load(&self) -> Result<Vec<ChatThread>, ClientError> {
        let mut entries = self.read_entries()?;
        match entries.remove(CHATS_KEY) {
            Some(chats) => Ok(serde_json::from_value(chats)?),
            None => Ok(Vec::new()),
        }
    }

    /// Replace the stored chats, leaving any other keys untouched.
    pub fn save(&self, chats: &[ChatThread]) -> Result<(), ClientError> {
        let mut entries = self.read_entries()?;
        entries.insert(CHATS_KEY.to_string(), serde_json::to_value(chats)?);

        let dir = match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => {
                std::fs::create_dir_all(parent)?;
                parent
            }
            None => Path::new("."),
        };

        // Write beside the target and rename over it so readers never see a
        // partially written file
        let mut staged = NamedTempFile::new_in(dir)?;
        staged.write_all(&serde_json::to_vec_pretty(&Value::Object(entries))?)?;
        staged.persist(&self.path).map_err(|e| e.error)?;
        debug!(path = %self.path.display(), chats = chats.len(), "Saved local chats");
        Ok(())
    }

    fn read_entries(&self) -> Result<Map<String, Value>, ClientError> {
        match std::fs::read(&self.path) {
            Ok(bytes) if bytes.is_empty() => Ok(Map::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Map::new()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Device-authoritative backend. History is read from and written to
/// [`LocalStorage`]; replies still come from the wrapped backend so the
/// server remains the only source of reply text.
pub struct LocalBackend<R = RemoteBackend> {
    replies: R,
    storage: LocalStorage,
    write_lock: Mutex<()>,
}

impl<R: ChatBackend> LocalBackend<R> {
    pub fn new(replies: R, storage: LocalStorage) -> Self {
        info!(path = %storage.path().display(), "Keeping chat history in local storage");
        Self {
            replies,
            storage,
            write_lock: Mutex::new(()),
        }
    }

    pub fn storage(&self) -> &LocalStorage {
        &self.storage
    }

    /// Bind the exchanged messages to the local chat and persist them.
    fn record(
        &self,
        local_id: Option<Uuid>,
        response: SendMessageResponse,
    ) -> Result<SendMessageResponse, ClientError> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut threads = self.storage.load()?;

        let index = match local_id.and_then(|id| threads.iter().position(|t| t.chat.id == id)) {
            Some(i) => i,
            None => {
                // New on this device: adopt the record the server opened
                threads.push(ChatThread {
                    chat: response.chat.clone(),
                    messages: Vec::new(),
                });
                threads.len() - 1
            }
        };

        let thread = &mut threads[index];
        let chat_id = thread.chat.id;
        let messages: Vec<_> = response
            .messages
            .into_iter()
            .map(|mut m| {
                m.chat_id = chat_id;
                m
            })
            .collect();
        thread.chat.updated_at = thread.chat.updated_at.max(response.chat.updated_at);
        thread.messages.extend(messages.iter().cloned());
        let chat = thread.chat.clone();

        self.storage.save(&threads)?;
        Ok(SendMessageResponse { chat, messages })
    }
}

impl<R: ChatBackend> ChatBackend for LocalBackend<R> {
    async fn list_chats(&self) -> Result<Vec<Chat>, ClientError> {
        let mut chats: Vec<Chat> = self.storage.load()?.into_iter().map(|t| t.chat).collect();
        chats.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(chats)
    }

    async fn open_chat(&self, chat_id: Uuid) -> Result<ChatThread, ClientError> {
        self.storage
            .load()?
            .into_iter()
            .find(|t| t.chat.id == chat_id)
            .ok_or(ClientError::NotFound(chat_id))
    }

    async fn send_message(&self, request: SendMessageRequest) -> Result<SendMessageResponse, ClientError> {
        let local_id = request.chat_id.as_deref().and_then(|id| id.parse().ok());
        let response = self.replies.send_message(request).await?;
        self.record(local_id, response)
    }
}
