use std::future::Future;

use uuid::Uuid;

use parlor_types::api::{SendMessageRequest, SendMessageResponse};
use parlor_types::{Chat, ChatThread};

use crate::error::ClientError;

/// Where the client's chat history lives. [`RemoteBackend`](crate::RemoteBackend)
/// defers everything to the server; [`LocalBackend`](crate::LocalBackend)
/// keeps history on this device and only asks the server for replies.
pub trait ChatBackend: Send + Sync {
    /// Chats ordered most recently updated first.
    fn list_chats(&self) -> impl Future<Output = Result<Vec<Chat>, ClientError>> + Send;

    fn open_chat(&self, chat_id: Uuid) -> impl Future<Output = Result<ChatThread, ClientError>> + Send;

    /// Exchange one message. The response carries the user message and the
    /// reply, both bound to the returned chat.
    fn send_message(
        &self,
        request: SendMessageRequest,
    ) -> impl Future<Output = Result<SendMessageResponse, ClientError>> + Send;
}
