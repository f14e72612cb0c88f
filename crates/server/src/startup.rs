use std::{net::SocketAddr, sync::Arc};

use axum::Router;
use configs::AppConfig;
use service::storage::{JsonFileStore, LensStorage};
use tracing::info;

use crate::cors::OriginPolicy;
use crate::errors::StartupError;
use crate::routes;
use crate::state::AppState;

/// Build the full application for a config and a storage backend
pub fn build_app(cfg: &AppConfig, storage: Arc<dyn LensStorage>) -> Result<Router, StartupError> {
    let policy = OriginPolicy::from_config(&cfg.cors)?;
    let state = AppState::new(storage);
    Ok(routes::build_router(state, policy, cfg.limits.max_body_bytes))
}

fn bind_addr(cfg: &AppConfig) -> anyhow::Result<SocketAddr> {
    Ok(format!("{}:{}", cfg.server.host, cfg.server.port).parse()?)
}

/// Public entry: build the app and run the HTTP server until the task is dropped
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    common::env::ensure_data_dir(&cfg.storage.data_file).await?;
    let storage = Arc::new(JsonFileStore::new(cfg.storage.data_file.clone()));

    let app = build_app(&cfg, storage)?;

    let addr = bind_addr(&cfg)?;
    info!(
        %addr,
        data_file = %cfg.storage.data_file.display(),
        allow_any_origin = cfg.cors.allow_any_origin,
        "lens api listening"
    );
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
