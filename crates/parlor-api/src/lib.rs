pub mod assistants;
pub mod chats;
pub mod error;
pub mod messages;
pub mod responder;
pub mod state;

use axum::{
    Router,
    routing::{get, post},
};

pub use error::ApiError;
pub use state::{AppState, AppStateInner};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/chat", post(messages::send_message))
        .route("/api/chats", get(chats::list_chats))
        .route("/api/chats/{chat_id}", get(chats::get_chat))
        .route("/api/assistants", get(assistants::list_assistants))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    use anyhow::anyhow;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use chrono::{DateTime, Utc};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use uuid::Uuid;

    use parlor_db::{ChatStore, MemoryStore};
    use parlor_types::{Chat, Message};

    async fn call(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn post_chat(body: Value) -> Request<Body> {
        Request::post("/api/chat")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    fn app() -> Router {
        router(AppStateInner::new(MemoryStore::default()))
    }

    #[tokio::test]
    async fn first_message_opens_a_chat() {
        let app = app();
        let message = "hi there, this message is longer than thirty characters";

        let (status, body) = call(&app, post_chat(json!({ "message": message }))).await;
        assert_eq!(status, StatusCode::OK);

        assert_eq!(body["chat"]["title"], "hi there, this message is long");
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "user");
        assert_eq!(messages[0]["content"], message);
        assert_eq!(messages[1]["role"], "assistant");
        assert_eq!(
            messages[1]["content"],
            "Hello! I'm your AI assistant. How can I help you today?"
        );
        assert_eq!(messages[0]["chatId"], body["chat"]["id"]);
        assert_eq!(messages[1]["chatId"], body["chat"]["id"]);

        let (_, chats) = call(&app, get("/api/chats")).await;
        assert_eq!(chats.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn known_chat_id_appends_to_existing_chat() {
        let app = app();
        let (_, first) = call(&app, post_chat(json!({ "message": "what is the weather?" }))).await;
        let chat_id = first["chat"]["id"].as_str().unwrap().to_string();
        let first_update = first["chat"]["updatedAt"].as_i64().unwrap();

        let (status, second) = call(
            &app,
            post_chat(json!({
                "message": "thank you",
                "chatId": chat_id,
                "history": [{ "id": "x", "role": "user", "content": "what is the weather?", "timestamp": 1 }],
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(second["chat"]["id"], chat_id.as_str());
        assert_eq!(second["chat"]["title"], "what is the weather?");
        assert!(second["chat"]["updatedAt"].as_i64().unwrap() >= first_update);
        assert!(
            second["messages"][1]["content"]
                .as_str()
                .unwrap()
                .starts_with("You're welcome!")
        );

        let (status, detail) = call(&app, get(&format!("/api/chats/{}", chat_id))).await;
        assert_eq!(status, StatusCode::OK);
        let contents: Vec<&str> = detail["messages"]
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["content"].as_str().unwrap())
            .collect();
        assert_eq!(contents.len(), 4);
        assert_eq!(contents[0], "what is the weather?");
        assert_eq!(contents[2], "thank you");

        let (_, chats) = call(&app, get("/api/chats")).await;
        assert_eq!(chats.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unknown_or_malformed_chat_id_opens_new_chat() {
        let app = app();
        for chat_id in [Uuid::new_v4().to_string(), "1700000000000".to_string()] {
            let (status, body) =
                call(&app, post_chat(json!({ "message": "hello", "chatId": chat_id }))).await;
            assert_eq!(status, StatusCode::OK);
            assert_ne!(body["chat"]["id"], chat_id.as_str());
        }

        let (_, chats) = call(&app, get("/api/chats")).await;
        assert_eq!(chats.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn chats_are_listed_most_recent_first() {
        let app = app();
        let mut ids = Vec::new();
        for text in ["one", "two", "three"] {
            let (_, body) = call(&app, post_chat(json!({ "message": text }))).await;
            ids.push(body["chat"]["id"].as_str().unwrap().to_string());
        }

        // Revisit the oldest so it moves to the top
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        call(&app, post_chat(json!({ "message": "again", "chatId": ids[0] }))).await;

        let (status, chats) = call(&app, get("/api/chats")).await;
        assert_eq!(status, StatusCode::OK);
        let chats = chats.as_array().unwrap();
        assert_eq!(chats[0]["id"], ids[0].as_str());

        let stamps: Vec<i64> = chats.iter().map(|c| c["updatedAt"].as_i64().unwrap()).collect();
        assert!(stamps.windows(2).all(|w| w[0] >= w[1]), "{:?}", stamps);
    }

    #[tokio::test]
    async fn unknown_chat_is_not_found() {
        let app = app();
        for uri in [format!("/api/chats/{}", Uuid::new_v4()), "/api/chats/not-a-uuid".to_string()] {
            let (status, body) = call(&app, get(&uri)).await;
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(body["error"], "Chat not found");
        }
    }

    #[tokio::test]
    async fn assistants_lists_the_single_persona() {
        let (status, body) = call(&app(), get("/api/assistants")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!([{
                "id": "assistant-1",
                "name": "General Assistant",
                "description": "A helpful AI assistant for general information and questions.",
                "icon": "🤖",
            }])
        );
    }

    #[tokio::test]
    async fn missing_message_is_a_generic_failure() {
        let (status, body) = call(&app(), post_chat(json!({ "chatId": "abc" }))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to process message");
    }

    #[tokio::test]
    async fn history_entries_are_not_inspected() {
        let app = app();
        let (status, body) = call(
            &app,
            post_chat(json!({
                "message": "thank you",
                "history": [
                    { "role": "system", "content": "be brief" },
                    { "content": "no role at all" },
                    "not even an object",
                ],
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(
            body["messages"][1]["content"]
                .as_str()
                .unwrap()
                .starts_with("You're welcome!")
        );
    }

    /// Creates chats but refuses every message.
    #[derive(Default)]
    struct BrokenStore {
        inner: MemoryStore,
    }

    impl ChatStore for BrokenStore {
        fn create_chat(&self, chat: &Chat) -> anyhow::Result<()> {
            self.inner.create_chat(chat)
        }
        fn find_chat(&self, id: Uuid) -> anyhow::Result<Option<Chat>> {
            self.inner.find_chat(id)
        }
        fn list_chats(&self) -> anyhow::Result<Vec<Chat>> {
            self.inner.list_chats()
        }
        fn touch_chat(&self, id: Uuid, at: DateTime<Utc>) -> anyhow::Result<Chat> {
            self.inner.touch_chat(id, at)
        }
        fn append_message(&self, _message: &Message) -> anyhow::Result<()> {
            Err(anyhow!("disk full"))
        }
        fn messages_for(&self, chat_id: Uuid) -> anyhow::Result<Vec<Message>> {
            self.inner.messages_for(chat_id)
        }
    }

    #[tokio::test]
    async fn store_failure_is_a_generic_500_without_rollback() {
        let app = router(AppStateInner::new(BrokenStore::default()));

        let (status, body) = call(&app, post_chat(json!({ "message": "hello" }))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Failed to process message" }));

        // The chat opened before the failure is still there
        let (_, chats) = call(&app, get("/api/chats")).await;
        assert_eq!(chats.as_array().unwrap().len(), 1);
    }
}
