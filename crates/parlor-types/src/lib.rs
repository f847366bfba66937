pub mod api;
pub mod models;

pub use models::{Assistant, Chat, ChatThread, Message, Role};
