use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use chrono::Utc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use parlor_db::ChatStore;
use parlor_types::api::{SendMessageRequest, SendMessageResponse};
use parlor_types::{Chat, Message, Role};

use crate::error::ApiError;
use crate::responder;
use crate::state::{AppState, blocking};

/// `POST /api/chat`: store the user's message and the canned reply.
///
/// Every failure, including an unreadable body, is reported as the same
/// generic 500. Nothing is rolled back, so the user message may already be
/// stored when a later step fails.
pub async fn send_message(
    State(state): State<AppState>,
    payload: Result<Json<SendMessageRequest>, JsonRejection>,
) -> Result<Json<SendMessageResponse>, ApiError> {
    let Json(req) = payload.map_err(|e| {
        warn!("Rejected chat payload: {}", e);
        ApiError::Exchange
    })?;

    if let Some(history) = &req.history {
        debug!(turns = history.len(), "Chat request carried history");
    }

    let response = blocking(move || exchange(state.store.as_ref(), &req))
        .await
        .map_err(|e| {
            error!("Error in chat endpoint: {:#}", e);
            ApiError::Exchange
        })?;

    Ok(Json(response))
}

/// Resolve or open the chat, then append the user message and the reply.
pub fn exchange(store: &dyn ChatStore, req: &SendMessageRequest) -> anyhow::Result<SendMessageResponse> {
    let known = match req.chat_id.as_deref().and_then(|id| id.parse::<Uuid>().ok()) {
        Some(id) => store.find_chat(id)?,
        None => None,
    };

    let chat = match known {
        Some(chat) => chat,
        None => {
            let chat = Chat::opened_by(&req.message, Utc::now());
            store.create_chat(&chat)?;
            info!(chat_id = %chat.id, "Opened chat");
            chat
        }
    };

    let user_message = Message::new(chat.id, Role::User, req.message.clone(), Utc::now());
    store.append_message(&user_message)?;

    let chat = store.touch_chat(chat.id, Utc::now())?;

    let reply = responder::reply(&req.message);
    let assistant_message = Message::new(chat.id, Role::Assistant, reply, Utc::now());
    store.append_message(&assistant_message)?;

    Ok(SendMessageResponse {
        chat,
        messages: vec![user_message, assistant_message],
    })
}
