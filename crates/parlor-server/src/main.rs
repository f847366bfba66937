mod config;

use std::net::SocketAddr;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use parlor_api::{AppState, AppStateInner};
use parlor_db::{MemoryStore, SqliteStore};

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "parlor=debug,parlor_api=debug,parlor_db=info,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;

    let state: AppState = match &config.db_path {
        Some(path) => AppStateInner::new(SqliteStore::open(path)?),
        None => {
            info!("PARLOR_DB_PATH not set, keeping chats in memory");
            AppStateInner::new(MemoryStore::default())
        }
    };

    let app = parlor_api::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Parlor server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
