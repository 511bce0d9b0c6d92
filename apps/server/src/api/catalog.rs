//! Generated and fixed sample data: timelines, evolution, hologram and the
//! simulated device.

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use ts_rs::TS;

use victor_core::catalog::{evolution_report, timelines as all_timelines, EvolutionReport, Timeline};
use victor_core::generators::{hologram_snapshot, mock_location, HologramSnapshot};
use victor_core::GeoLocation;

use crate::AppState;

/// GET /timelines
pub async fn timelines() -> Json<Vec<Timeline>> {
    Json(all_timelines())
}

/// GET /evolution
pub async fn evolution() -> Json<EvolutionReport> {
    Json(evolution_report())
}

/// GET /hologram
pub async fn hologram() -> Json<HologramSnapshot> {
    Json(hologram_snapshot(&mut rand::thread_rng(), Utc::now()))
}

#[derive(Debug, Serialize, TS)]
#[ts(export)]
pub struct LocationFix {
    #[serde(flatten)]
    pub location: GeoLocation,
    #[ts(as = "String")]
    pub timestamp: DateTime<Utc>,
}

/// GET /location
///
/// Simulated device position for clients without geolocation.
pub async fn location() -> Json<LocationFix> {
    Json(LocationFix {
        location: mock_location(&mut rand::thread_rng()),
        timestamp: Utc::now(),
    })
}

#[derive(Debug, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DeviceReport {
    pub battery_level: f64,
    pub battery_status: String,
    pub signal_strength: f64,
    pub signal_quality: String,
    #[ts(as = "String")]
    pub timestamp: DateTime<Utc>,
}

/// GET /device
///
/// Advances the simulated battery/signal readings by one step per call.
pub async fn device(State(app): State<AppState>) -> Json<DeviceReport> {
    let mut vitals = app.device.lock().await;
    *vitals = vitals.step(&mut rand::thread_rng());

    Json(DeviceReport {
        battery_level: vitals.battery_level,
        battery_status: vitals.battery_status().to_string(),
        signal_strength: vitals.signal_strength,
        signal_quality: vitals.signal_quality().to_string(),
        timestamp: Utc::now(),
    })
}
