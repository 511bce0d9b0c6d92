//! `/threats`: the threat log, scans and the aggregate level.

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};
use ts_rs::TS;

use victor_core::generators::threat_level;
use victor_core::validation::{validate_new_threat, validate_threat_update};
use victor_core::{NewThreat, ThreatLog, ThreatSeverity, ThreatUpdate, THREAT_HISTORY_LIMIT};
use victor_relay::ServerEvent;

use crate::error::{ApiResult, DbResultExt};
use crate::extract::ApiJson;
use crate::AppState;

/// Severity given to REST-created threats that do not name one.
pub const REST_THREAT_SEVERITY: ThreatSeverity = ThreatSeverity::Low;

/// GET /threats
pub async fn list_threats(State(app): State<AppState>) -> ApiResult<Json<Vec<ThreatLog>>> {
    let threats = app
        .db
        .threats()
        .recent(THREAT_HISTORY_LIMIT)
        .await
        .or_fail("fetch threats")?;
    Ok(Json(threats))
}

/// POST /threats
pub async fn create_threat(
    State(app): State<AppState>,
    ApiJson(threat): ApiJson<NewThreat>,
) -> ApiResult<Json<ThreatLog>> {
    validate_new_threat(&threat)?;

    let stored = app
        .db
        .threats()
        .create(threat, REST_THREAT_SEVERITY)
        .await
        .or_fail("create threat log")?;
    Ok(Json(stored))
}

/// PUT /threats
///
/// Updates status and/or description; unknown ids are a 404.
pub async fn update_threat(
    State(app): State<AppState>,
    ApiJson(update): ApiJson<ThreatUpdate>,
) -> ApiResult<Json<ThreatLog>> {
    validate_threat_update(&update)?;

    let updated = app
        .db
        .threats()
        .update(&update)
        .await
        .or_fail("update threat")?;
    Ok(Json(updated))
}

#[derive(Debug, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    pub detected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub threat: Option<ThreatLog>,
    #[ts(as = "String")]
    pub scanned_at: DateTime<Utc>,
}

/// POST /threats/scan
///
/// Runs one scan cycle. A hit is stored and pushed to every socket client.
pub async fn scan(State(app): State<AppState>) -> ApiResult<Json<ScanResult>> {
    let Some(detected) = app.scanner.scan() else {
        return Ok(Json(ScanResult {
            detected: false,
            source: None,
            threat: None,
            scanned_at: Utc::now(),
        }));
    };

    let stored = app
        .db
        .threats()
        .create(detected.threat, REST_THREAT_SEVERITY)
        .await
        .or_fail("run threat scan")?;
    info!(
        id = %stored.id,
        threat_type = %stored.threat_type,
        severity = %stored.severity,
        source = detected.source,
        "Scan detected threat"
    );

    if let Err(e) = app
        .relay
        .broadcast(&ServerEvent::ThreatAlert(stored.clone()))
    {
        warn!(error = %e, "Failed to broadcast scanned threat");
    }

    Ok(Json(ScanResult {
        detected: true,
        source: Some(detected.source.to_string()),
        threat: Some(stored),
        scanned_at: Utc::now(),
    }))
}

#[derive(Debug, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ThreatLevel {
    pub level: f64,
    pub active_threats: usize,
}

/// GET /threats/level
pub async fn level(State(app): State<AppState>) -> ApiResult<Json<ThreatLevel>> {
    let active = app
        .db
        .threats()
        .active()
        .await
        .or_fail("compute threat level")?;

    Ok(Json(ThreatLevel {
        level: threat_level(&active),
        active_threats: active.len(),
    }))
}
