//! HTTP server setup and routing
//!
//! The HTTP surface is deliberately minimal: one explicit route serving the
//! embedded HTML entry document, plus a catch-all for static assets. There
//! are no API endpoints, no authentication, and no request-body handling;
//! all application logic runs in the workflows.

use crate::error::{Error, Result};
use axum::{response::Html, routing::get, Router};
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::info;

/// The HTML entry document, embedded at compile time
const INDEX_HTML: &str = include_str!("../static/index.html");

/// Build the router: `/` serves the entry document, everything else falls
/// through to the static asset directory
pub fn create_router(static_dir: PathBuf) -> Router {
    Router::new()
        .route("/", get(|| async { Html(INDEX_HTML) }))
        .fallback_service(ServeDir::new(static_dir))
        // Enable CORS for local access
        .layer(CorsLayer::permissive())
}

/// Bind and run the server until ctrl-c or SIGTERM
pub async fn run(port: u16, static_dir: PathBuf) -> Result<()> {
    let app = create_router(static_dir);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::Http(format!("Failed to bind to {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| Error::Http(format!("Server error: {}", e)))?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
