pub mod client;
pub mod config;
pub mod drawing;
pub mod error;
pub mod game;
pub mod gesture;
pub mod room;
pub mod websocket;

use axum::{routing::get, Router};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use config::{DEFAULT_OUTBOUND_CAPACITY, WS_PATH};
use room::Relay;

pub use error::{DrawguessError, Result};

/// Application state shared across all connections
#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<RwLock<Relay>>,
    pub outbound_capacity: usize,
}

impl AppState {
    pub fn new(relay: Relay) -> Self {
        Self {
            relay: Arc::new(RwLock::new(relay)),
            outbound_capacity: DEFAULT_OUTBOUND_CAPACITY,
        }
    }

    pub fn with_outbound_capacity(mut self, capacity: usize) -> Self {
        self.outbound_capacity = capacity.max(1);
        self
    }
}

/// Build the router: the relay endpoint plus the static browser client
pub fn app(state: AppState, static_dir: impl AsRef<Path>) -> Router {
    Router::new()
        .route(WS_PATH, get(websocket::handler::ws_handler))
        .fallback_service(ServeDir::new(static_dir.as_ref()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
