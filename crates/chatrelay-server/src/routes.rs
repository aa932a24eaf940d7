//! Route definitions for the relay server.

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::{
    LatencyUnit,
    cors::{Any, CorsLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::handlers;
use crate::state::AppState;

/// Creates the Axum router with all routes configured.
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Every response is logged with its latency
    let trace = TraceLayer::new_for_http().on_response(
        DefaultOnResponse::new()
            .level(Level::INFO)
            .latency_unit(LatencyUnit::Millis),
    );

    Router::new()
        .route("/ask", post(handlers::ask))
        .route("/set_proxy", post(handlers::set_proxy))
        .route("/verify_key", post(handlers::verify_key))
        .route("/logout", get(handlers::logout))
        .route("/health", get(handlers::health))
        .layer(cors)
        .layer(trace)
        .with_state(state)
}
