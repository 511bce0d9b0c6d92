//! Liveness and relay status.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;
use ts_rs::TS;

use crate::AppState;

#[derive(Debug, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RelayClient {
    pub id: String,
    #[ts(as = "String")]
    pub connected_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RelayStatus {
    pub connected_clients: usize,
    pub clients: Vec<RelayClient>,
}

/// GET /relay/status
pub async fn relay_status(State(app): State<AppState>) -> Json<RelayStatus> {
    let clients: Vec<RelayClient> = app
        .relay
        .clients()
        .await
        .into_iter()
        .map(|client| RelayClient {
            id: client.id,
            connected_at: client.connected_at,
        })
        .collect();

    Json(RelayStatus {
        connected_clients: clients.len(),
        clients,
    })
}

/// GET /health
pub async fn health(State(app): State<AppState>) -> (StatusCode, &'static str) {
    if app.db.health_check().await {
        (StatusCode::OK, "OK")
    } else {
        warn!("Health check failed");
        (StatusCode::SERVICE_UNAVAILABLE, "UNAVAILABLE")
    }
}
