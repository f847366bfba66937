use axum::{
    Json,
    extract::{Path, State},
};
use uuid::Uuid;

use parlor_types::Chat;
use parlor_types::api::ChatDetail;

use crate::error::ApiError;
use crate::state::{AppState, blocking};

/// `GET /api/chats`: most recently updated first.
pub async fn list_chats(State(state): State<AppState>) -> Result<Json<Vec<Chat>>, ApiError> {
    let chats = blocking(move || state.store.list_chats()).await?;
    Ok(Json(chats))
}

/// `GET /api/chats/{chat_id}`. Ids that do not parse were never issued, so
/// they get the same 404 as unknown ones.
pub async fn get_chat(
    State(state): State<AppState>,
    Path(chat_id): Path<String>,
) -> Result<Json<ChatDetail>, ApiError> {
    let not_found = || ApiError::NotFound("Chat not found".to_string());
    let chat_id: Uuid = chat_id.parse().map_err(|_| not_found())?;

    let detail = blocking(move || {
        let Some(chat) = state.store.find_chat(chat_id)? else {
            return Ok(None);
        };
        let messages = state.store.messages_for(chat_id)?;
        Ok(Some(ChatDetail { chat, messages }))
    })
    .await?;

    detail.map(Json).ok_or_else(not_found)
}
