use tokio::sync::watch;
use tracing::{error, info};
use uuid::Uuid;

use parlor_types::api::{SendMessageRequest, SendMessageResponse};
use parlor_types::{Chat, ChatThread};

use crate::backend::ChatBackend;
use crate::error::ClientError;

/// Shown to the user whenever an operation fails.
pub const FAILURE_NOTICE: &str = "Something went wrong. Please try again.";

/// Everything the presentation layer reads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatState {
    /// Most recently updated first.
    pub chats: Vec<Chat>,
    pub current: Option<ChatThread>,
    /// A message is in flight; further sends are ignored.
    pub loading: bool,
    pub notice: Option<String>,
}

/// Holds the chat list and the selected chat, and keeps them in step with
/// a [`ChatBackend`]. State changes are published on a watch channel.
pub struct ChatController<B> {
    backend: B,
    state: watch::Sender<ChatState>,
}

impl<B: ChatBackend> ChatController<B> {
    pub fn new(backend: B) -> Self {
        let (state, _) = watch::channel(ChatState::default());
        Self { backend, state }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn subscribe(&self) -> watch::Receiver<ChatState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> ChatState {
        self.state.borrow().clone()
    }

    /// Load the chat list and open the most recent chat, if any.
    pub async fn start(&self) -> Result<(), ClientError> {
        self.refresh().await?;

        let most_recent = self.state.borrow().chats.first().map(|c| c.id);
        if let Some(chat_id) = most_recent {
            self.select_chat(chat_id).await?;
        }
        Ok(())
    }

    pub async fn refresh(&self) -> Result<(), ClientError> {
        let chats = self
            .backend
            .list_chats()
            .await
            .map_err(|e| self.fail("refresh chats", e))?;
        self.state.send_modify(|s| s.chats = chats);
        Ok(())
    }

    /// Drop the selection; the next message opens a new chat.
    pub fn new_chat(&self) {
        self.state.send_modify(|s| s.current = None);
    }

    pub async fn select_chat(&self, chat_id: Uuid) -> Result<(), ClientError> {
        let thread = self
            .backend
            .open_chat(chat_id)
            .await
            .map_err(|e| self.fail("open chat", e))?;
        self.state.send_modify(|s| s.current = Some(thread));
        Ok(())
    }

    /// Send `text` in the current chat. Returns `Ok(false)` without doing
    /// anything when the text is blank or another send is in flight.
    pub async fn send_message(&self, text: &str) -> Result<bool, ClientError> {
        if text.trim().is_empty() {
            return Ok(false);
        }

        let started = self.state.send_if_modified(|s| {
            if s.loading {
                return false;
            }
            s.loading = true;
            true
        });
        if !started {
            return Ok(false);
        }

        let (sent_from, request) = {
            let state = self.state.borrow();
            let current = state.current.as_ref();
            let request = SendMessageRequest {
                message: text.to_string(),
                chat_id: current.map(|t| t.chat.id.to_string()),
                history: Some(
                    current
                        .map(|t| t.messages.iter().filter_map(|m| serde_json::to_value(m).ok()).collect())
                        .unwrap_or_default(),
                ),
            };
            (current.map(|t| t.chat.id), request)
        };

        match self.backend.send_message(request).await {
            Ok(response) => {
                info!(chat_id = %response.chat.id, "Message exchanged");
                self.state.send_modify(|s| {
                    s.loading = false;
                    apply_exchange(s, sent_from, response);
                });
                Ok(true)
            }
            Err(e) => {
                self.state.send_modify(|s| s.loading = false);
                Err(self.fail("send message", e))
            }
        }
    }

    pub fn dismiss_notice(&self) {
        self.state.send_if_modified(|s| s.notice.take().is_some());
    }

    fn fail(&self, action: &str, e: ClientError) -> ClientError {
        error!("Failed to {}: {}", action, e);
        self.state
            .send_modify(|s| s.notice = Some(FAILURE_NOTICE.to_string()));
        e
    }
}

/// Fold an exchange into the state. `sent_from` is the chat that was
/// selected when the message went out; if the user has since moved to
/// another chat, only the chat list is updated.
fn apply_exchange(state: &mut ChatState, sent_from: Option<Uuid>, response: SendMessageResponse) {
    let SendMessageResponse { chat, messages } = response;

    let viewing = state.current.as_ref().map(|t| t.chat.id);
    match &mut state.current {
        Some(thread) if thread.chat.id == chat.id => {
            thread.chat = chat.clone();
            thread.messages.extend(messages);
        }
        // Still on the chat the message was sent from, but the server opened
        // a different one (a new chat, or one it no longer knew)
        _ if viewing == sent_from => {
            state.current = Some(ChatThread {
                chat: chat.clone(),
                messages,
            });
        }
        _ => {}
    }

    state.chats.retain(|c| c.id != chat.id);
    state.chats.push(chat);
    state.chats.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
}
