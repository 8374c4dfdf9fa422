//! REST API for quote generation.
//!
//! Provides three endpoints:
//! - `POST /quote`: full pipeline on a posted request
//! - `GET /verticals`: supported verticals and their profiles
//! - `GET /presets`: built-in example configurations

mod handlers;
mod types;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tracing::info;

use crate::cost::PriceTable;

/// Immutable application state shared across all request handlers.
///
/// Each quote runs on its own request snapshot, so no locks are needed.
pub struct AppState {
    /// Price snapshot used when a request carries no pricing entries.
    pub pricing: PriceTable,
}

/// Builds the axum router with all API routes.
///
/// # Arguments
///
/// * `state` - Shared application state
///
/// # Returns
///
/// Configured `Router` ready to serve.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/quote", post(handlers::post_quote))
        .route("/verticals", get(handlers::get_verticals))
        .route("/presets", get(handlers::get_presets))
        .with_state(state)
}

/// Binds to the given address and serves the API.
///
/// # Arguments
///
/// * `state` - Shared application state
/// * `addr` - Socket address to bind to
///
/// # Returns
///
/// `Ok(())` once the server shuts down.
///
/// # Errors
///
/// Returns an `io::Error` if the listener cannot bind or the server fails.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> std::io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "API server listening");
    axum::serve(listener, app).await
}
