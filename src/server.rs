//! Static file server plus the `/data` CSV endpoint.

use std::any::Any;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::ServerConfig;

pub const CSV_NOT_FOUND: &str = "CSV file not found";

pub fn build_router(config: Arc<ServerConfig>) -> Router {
    Router::new()
        .route("/data", get(serve_csv))
        .fallback_service(ServeDir::new(&config.public_dir))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .with_state(config)
}

async fn serve_csv(State(config): State<Arc<ServerConfig>>, req: Request) -> Response {
    info!(path = %config.csv_path.display(), "CSV request");

    if !tokio::fs::try_exists(&config.csv_path).await.unwrap_or(false) {
        return (StatusCode::NOT_FOUND, CSV_NOT_FOUND).into_response();
    }

    match ServeFile::new(&config.csv_path).oneshot(req).await {
        Ok(resp) => resp.into_response(),
        Err(never) => match never {},
    }
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!(detail, "Server error");
    (StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong!").into_response()
}

/// Logs what is present on disk, then serves until Ctrl+C.
pub async fn run_server(config: ServerConfig) -> Result<()> {
    let data_dir = config.csv_path.parent().map(|p| p.to_path_buf());
    info!(
        public_dir = config.public_dir.exists(),
        data_dir = data_dir.as_ref().is_some_and(|d| d.exists()),
        csv_file = config.csv_path.exists(),
        "Checking directories"
    );

    let port = config.port;
    let app = build_router(Arc::new(config));

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!("Server running at http://localhost:{port}");
    info!("Press Ctrl+C to stop the server");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}
