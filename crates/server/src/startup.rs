use std::net::SocketAddr;

use axum::Router;
use configs::AppConfig;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use common::admin_http::spawn_admin_server;
use service::{runtime, unlock::FileUnlockStore};

use crate::errors::StartupError;
use crate::metrics;
use crate::routes;
use crate::state::AppState;

pub fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Prepare directories, open the unlock store and assemble the router.
pub async fn build_app(cfg: &AppConfig) -> Result<Router, StartupError> {
    runtime::ensure_env(&cfg.server.public_dir, &cfg.storage.data_dir)
        .await
        .map_err(|e| StartupError::Runtime(e.to_string()))?;

    let store = FileUnlockStore::new(cfg.storage.document_path())
        .await
        .map_err(|e| StartupError::Runtime(e.to_string()))?;

    if cfg.unlock.manual_unlock_secret.is_none() {
        warn!("MANUAL_UNLOCK_SECRET not set; admin endpoints will refuse every call");
    }
    if cfg.unlock.lemon_checkout_url.is_none() {
        warn!("LEMON_CHECKOUT_URL not set; /api/checkout will answer 500");
    }

    let state = AppState::new(store, cfg.unlock.clone());
    Ok(routes::build_router(state, &cfg.server.public_dir, build_cors()))
}

/// Public entry: build the app and run the HTTP server until it stops.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let app = build_app(&cfg).await?;

    if let Some(addr) = cfg.server.metrics_addr.as_deref() {
        let addr: SocketAddr = addr
            .parse()
            .map_err(|e| StartupError::InvalidConfig(format!("metrics_addr {addr:?}: {e}")))?;
        let _admin = spawn_admin_server(addr, metrics::encode_metrics).await?;
    }

    let addr = cfg.server.bind_addr()?;
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "unlock relay listening");
    axum::serve(listener, app).await?;
    Ok(())
}
