//! HTTP server setup

use std::future::Future;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::errors::BotError;
use crate::server::handlers::{events_handler, health_handler};
use crate::server::state::AppState;

/// Build the application router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/slack/events", post(events_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Run the HTTP server until the shutdown signal resolves
pub async fn serve(
    state: Arc<AppState>,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<(), BotError> {
    let app = router(state.clone());

    let addr = format!("{}:{}", state.settings.server.host, state.settings.server.port);
    info!("Starting HTTP server on {}", addr);

    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| BotError::ServerError(e.to_string()))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
        .map_err(|e| BotError::ServerError(e.to_string()))
}
