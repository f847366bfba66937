use serde::{Deserialize, Serialize};

use crate::models::{Chat, Message};

// -- Exchange --

/// Body of `POST /api/chat`. `chat_id` stays a plain string: an id the
/// server does not recognise simply opens a new chat.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<String>,
    /// Prior turns, accepted as-is and never inspected by the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageResponse {
    pub chat: Chat,
    /// Always the user message followed by the assistant reply.
    pub messages: Vec<Message>,
}

// -- Chats --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatDetail {
    pub chat: Chat,
    pub messages: Vec<Message>,
}

// -- Errors --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
