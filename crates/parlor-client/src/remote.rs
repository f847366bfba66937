use serde::de::DeserializeOwned;
use tracing::debug;
use uuid::Uuid;

use parlor_types::api::{ChatDetail, ErrorBody, SendMessageRequest, SendMessageResponse};
use parlor_types::{Chat, ChatThread};

use crate::backend::ChatBackend;
use crate::error::ClientError;

/// Server-authoritative backend: every operation is an HTTP call.
#[derive(Debug, Clone)]
pub struct RemoteBackend {
    http: reqwest::Client,
    base_url: String,
}

impl RemoteBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }
}

async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ClientError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp.json().await?);
    }

    let message = resp
        .json::<ErrorBody>()
        .await
        .map(|body| body.error)
        .unwrap_or_else(|_| status.to_string());
    Err(ClientError::Status {
        status: status.as_u16(),
        message,
    })
}

impl ChatBackend for RemoteBackend {
    async fn list_chats(&self) -> Result<Vec<Chat>, ClientError> {
        let resp = self.http.get(self.url("/chats")).send().await?;
        decode(resp).await
    }

    async fn open_chat(&self, chat_id: Uuid) -> Result<ChatThread, ClientError> {
        let resp = self
            .http
            .get(self.url(&format!("/chats/{}", chat_id)))
            .send()
            .await?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(chat_id));
        }

        let detail: ChatDetail = decode(resp).await?;
        Ok(ChatThread {
            chat: detail.chat,
            messages: detail.messages,
        })
    }

    async fn send_message(&self, request: SendMessageRequest) -> Result<SendMessageResponse, ClientError> {
        debug!(chat_id = ?request.chat_id, "Sending message");
        let resp = self.http.post(self.url("/chat")).json(&request).send().await?;
        decode(resp).await
    }
}
