//! Local preview server for the generated site
//!
//! Serves the site root as static files (`/api/v1/index.json`,
//! `/phenomena/{id}/`) plus a `/health` endpoint, the same URL surface the
//! published site exposes to the query layer.

use axum::{routing::get, Json, Router};
use serde::Serialize;
use std::future::Future;
use std::path::Path;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;
use wyrd_common::layout::{API_BASE_PATH, INDEX_ENDPOINT};

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
}

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        module: "wyrd-ag".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Router serving `site_root`
pub fn build_router(site_root: &Path) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .fallback_service(ServeDir::new(site_root).append_index_html_on_directories(true))
        .layer(TraceLayer::new_for_http())
}

/// Serve `site_root` on an already bound listener until `shutdown` resolves
pub async fn serve_site<F>(listener: TcpListener, site_root: &Path, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    info!("Serving {} on http://{}", site_root.display(), addr);
    info!("Catalog: http://{}{}/{}", addr, API_BASE_PATH, INDEX_ENDPOINT);

    axum::serve(listener, build_router(site_root))
        .with_graceful_shutdown(shutdown)
        .await
}

/// Resolves on Ctrl+C (and SIGTERM on unix)
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received terminate signal, shutting down"),
    }
}
