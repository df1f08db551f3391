//! HTTP API exposing named-query execution and schema introspection.
//!
//! Serves a small front-end-facing API: health, the raw annotated
//! queries file, run-query-by-id, and a schema description sourced from
//! the database catalog. Every request that touches the database opens
//! its own session and releases it before responding; nothing is shared
//! across requests. The cross-origin policy is deliberately permissive,
//! this is a teaching tool with no authentication.

mod api;

pub use api::ApiError;

use crate::config::{ConnectionConfig, ServerConfig, TimeoutConfig};
use crate::error::{LabError, Result};
use axum::{
    routing::{get, post},
    Extension, Router,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

/// Application state shared across all request handlers.
pub struct AppState {
    /// Connection parameters for the per-request sessions.
    pub connection: ConnectionConfig,

    /// Timeout policy applied to every session.
    pub timeouts: TimeoutConfig,

    /// Path to the annotated queries file.
    pub queries_path: PathBuf,
}

/// Builds the application router with all routes.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(api::health_handler))
        .route("/api/queries", get(api::get_queries_handler))
        .route("/api/run/query", post(api::run_query_handler))
        .route("/api/introspect", get(api::introspect_handler))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(Extension(Arc::new(state)))
}

/// Binds the listener and serves the API until shutdown.
pub async fn serve(
    config: &ServerConfig,
    connection: ConnectionConfig,
    timeouts: TimeoutConfig,
) -> Result<()> {
    let state = AppState {
        connection,
        timeouts,
        queries_path: config.queries_path.clone(),
    };
    let app = app(state);

    let addr = SocketAddr::new(config.host, config.port);
    info!(%addr, "starting sqllab server");

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| LabError::config(format!("Failed to bind {addr}: {e}")))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| LabError::internal(format!("Server error: {e}")))?;

    info!("sqllab server shut down");
    Ok(())
}

/// Waits for a SIGINT (Ctrl+C) or SIGTERM signal for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { info!("received SIGINT, shutting down"); }
        () = terminate => { info!("received SIGTERM, shutting down"); }
    }
}
