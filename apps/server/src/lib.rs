//! # Victor Server
//!
//! HTTP front door for the Victor web and mobile clients.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Victor Server                                  │
//! │                                                                         │
//! │  /api/victor/*  ──► api handlers ──► victor-db                          │
//! │                          │                                              │
//! │                          └── threats/scan ──► ThreatScanner            │
//! │                                   hit ──────► RelayHandle::broadcast    │
//! │                                                                         │
//! │  /ws            ──► victor-relay hub                                    │
//! │                                                                         │
//! │  Layers: TraceLayer (tower-http) • CorsLayer                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod extract;
pub mod scan;
pub mod voice;

use std::sync::Arc;

use axum::Router;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use victor_core::generators::DeviceVitals;
use victor_db::Database;
use victor_relay::RelayHandle;

pub use config::ServerConfig;
pub use error::{ApiError, ApiResult};

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub relay: RelayHandle,
    pub voice: Arc<dyn voice::VoiceResponder>,
    pub scanner: Arc<dyn scan::ThreatScanner>,
    pub device: Arc<Mutex<DeviceVitals>>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(
        db: Database,
        relay: RelayHandle,
        voice: Arc<dyn voice::VoiceResponder>,
        config: ServerConfig,
    ) -> Self {
        AppState {
            db,
            relay,
            voice,
            scanner: Arc::new(scan::RandomScanner),
            device: Arc::new(Mutex::new(DeviceVitals::INITIAL)),
            config: Arc::new(config),
        }
    }

    /// Replaces the random scanner, e.g. with a fixed outcome in tests.
    pub fn with_scanner(mut self, scanner: Arc<dyn scan::ThreatScanner>) -> Self {
        self.scanner = scanner;
        self
    }
}

/// Builds the full application router: REST API, socket relay and layers.
pub fn build_router(state: AppState) -> Router {
    let cors_permissive = state.config.server.cors_permissive;
    let relay_routes = state.relay.router();

    let app = Router::new()
        .nest("/api/victor", api::router())
        .route("/health", axum::routing::get(api::system::health))
        .with_state(state)
        .merge(relay_routes)
        .layer(TraceLayer::new_for_http());

    if cors_permissive {
        app.layer(CorsLayer::permissive())
    } else {
        app
    }
}
