//! HTTP front end for the batch pipeline.
//!
//! `GET /extract?path=..` and `POST /extract` with `{"path": ".."}` run a
//! full extraction over the given path and answer with the run transcript.

mod routes_extract;

use anyhow::{Context, Result};
use axum::{
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

use subforge_av::ClaimedPaths;

use crate::batch::EngineSource;
use crate::config::Config;

/// Shared application context
#[derive(Clone)]
pub struct AppContext {
    pub engine: EngineSource,
    /// Containers processed concurrently per request
    pub jobs: usize,
    pub decode_timeout: Option<Duration>,
    /// Cancelled on shutdown; every request runs under a child token
    pub shutdown: CancellationToken,
    /// Output paths in flight across all requests
    pub claimed: ClaimedPaths,
}

impl AppContext {
    pub fn from_config(config: &Config) -> Self {
        Self {
            engine: EngineSource::Tools(config.tools.clone()),
            jobs: config.extract.jobs,
            decode_timeout: config.extract.decode_timeout(),
            shutdown: CancellationToken::new(),
            claimed: ClaimedPaths::new(),
        }
    }
}

/// Create the Axum router with all routes
pub fn create_router(ctx: AppContext) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .merge(routes_extract::extract_routes())
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        "Not Found. Please use the /extract endpoint.",
    )
}

/// Start the HTTP server and run until Ctrl-C or SIGTERM.
pub async fn start_server(config: Config) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let ctx = AppContext::from_config(&config);
    let shutdown = ctx.shutdown.clone();
    let app = create_router(ctx);

    tracing::info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            shutdown.cancel();
        })
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                tracing::error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
