use std::sync::Arc;

use parlor_db::ChatStore;
use parlor_types::Assistant;

use crate::assistants;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub store: Box<dyn ChatStore>,
    pub assistants: Vec<Assistant>,
}

impl AppStateInner {
    pub fn new(store: impl ChatStore + 'static) -> AppState {
        Arc::new(Self {
            store: Box::new(store),
            assistants: assistants::catalog(),
        })
    }
}

/// Run synchronous store work off the async runtime.
pub(crate) async fn blocking<F, T>(f: F) -> anyhow::Result<T>
where
    F: FnOnce() -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| anyhow::anyhow!("spawn_blocking join error: {}", e))?
}
