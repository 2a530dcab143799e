use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::Router;
use configs::AppConfig;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::errors::StartupError;
use crate::routes;
use crate::state::AppState;
use service::{metrics, runtime, storage::JsonFileStore};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn parse_addr(field: &str, raw: &str) -> Result<SocketAddr, StartupError> {
    raw.parse()
        .map_err(|e| StartupError::InvalidConfig(format!("{field} {raw:?}: {e}")))
}

/// Build the application router from configuration.
pub fn build_app(cfg: &AppConfig) -> Router {
    let store = JsonFileStore::from_config(&cfg.store);
    let state = AppState::new(Arc::new(store));
    routes::build_router(state, build_cors(), Duration::from_secs(cfg.server.request_timeout_secs))
}

/// Public entry: prepare the data directory, build the app and serve until Ctrl+C.
pub async fn run(cfg: AppConfig) -> Result<(), StartupError> {
    runtime::ensure_env(&cfg.store.path)
        .await
        .map_err(|e| StartupError::Runtime(e.to_string()))?;

    if let Some(raw) = &cfg.server.admin_addr {
        let admin_addr = parse_addr("server.admin_addr", raw)?;
        common::admin_http::spawn_admin_server(admin_addr, metrics::encode_metrics);
    }

    let app = build_app(&cfg);
    let addr = parse_addr("server address", &cfg.server.bind_addr())?;
    info!(
        %addr,
        store = %cfg.store.path.display(),
        write_mode = ?cfg.store.write_mode,
        "starting user registry server"
    );
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| StartupError::Runtime(format!("bind {addr}: {e}")))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(anyhow::Error::from)?;
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("received Ctrl+C, shutting down"),
        Err(e) => {
            // no signal handler: keep serving until the process is killed
            warn!(error = %e, "cannot listen for Ctrl+C");
            std::future::pending::<()>().await
        }
    }
}
