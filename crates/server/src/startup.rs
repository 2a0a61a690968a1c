use std::{net::SocketAddr, sync::Arc};

use axum::Router;
use configs::AppConfig;
use dotenvy::dotenv;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::errors::StartupError;
use crate::routes::{self, ServerState};
use service::{auth::TokenCodec, runtime, seed, storage::{JsonFileStore, RecordStore}};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Open the JSON tables named by `cfg`, creating and seeding them as configured.
pub async fn open_store(cfg: &AppConfig) -> Result<Arc<JsonFileStore>, StartupError> {
    runtime::ensure_data_dir(&cfg.storage.data_dir).await?;
    let store = Arc::new(JsonFileStore::new(cfg.storage.users_path(), cfg.storage.pets_path()));
    store.ensure_files().await?;
    if cfg.storage.seed_if_empty && seed::seed_if_empty(store.as_ref()).await? {
        info!(data_dir = %cfg.storage.data_dir, "seeded sample data");
    }
    Ok(store)
}

/// Application router over an already opened store.
pub fn build_app(store: Arc<dyn RecordStore>, cfg: &AppConfig) -> Router {
    let codec = TokenCodec::new(&cfg.auth.jwt_secret, cfg.auth.token_ttl_secs);
    let state = ServerState::new(store, codec);
    routes::build_router(state, build_cors())
}

/// Public entry: load config from file/env and run the HTTP server
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    let cfg = AppConfig::load_and_validate()?;
    run_with_config(cfg).await
}

pub async fn run_with_config(cfg: AppConfig) -> anyhow::Result<()> {
    let addr: SocketAddr = cfg
        .server
        .bind_addr()
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("bind address: {e}")))?;

    let store = open_store(&cfg).await?;
    let app = build_app(store, &cfg);

    info!(%addr, data_dir = %cfg.storage.data_dir, "starting health record server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
