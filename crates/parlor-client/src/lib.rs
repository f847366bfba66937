pub mod backend;
pub mod controller;
pub mod error;
pub mod local;
pub mod remote;
pub mod ui;

pub use backend::ChatBackend;
pub use controller::{ChatController, ChatState};
pub use error::ClientError;
pub use local::{LocalBackend, LocalStorage};
pub use remote::RemoteBackend;
