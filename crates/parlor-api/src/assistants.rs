use axum::{Json, extract::State, response::IntoResponse};

use parlor_types::Assistant;

use crate::state::AppState;

pub fn catalog() -> Vec<Assistant> {
    vec![Assistant {
        id: "assistant-1".to_string(),
        name: "General Assistant".to_string(),
        description: "A helpful AI assistant for general information and questions.".to_string(),
        icon: "🤖".to_string(),
    }]
}

pub async fn list_assistants(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.assistants.clone())
}
