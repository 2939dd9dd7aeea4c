//! Application State and Router

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::directory::{self, RoomRegistry};
use crate::{token, webhook};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<Config>,
    /// Room directory registry.
    pub registry: Arc<RoomRegistry>,
}

impl AppState {
    /// Build application state.
    #[must_use]
    pub fn new(config: Config, registry: RoomRegistry) -> Self {
        Self {
            config: Arc::new(config),
            registry: Arc::new(registry),
        }
    }
}

/// Build the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/get-token", post(token::handler))
        .route("/ws", get(directory::ws::handler))
        .route("/webhook", post(webhook::handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
