//! # Domain Types
//!
//! Records persisted by the backend and the input shapes that create or
//! update them.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  VictorState    │   │ VictorMessage   │   │   ThreatLog     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  sanctity       │   │  text           │   │  type/location  │       │
//! │  │  fitness, mode  │   │  sender         │   │  severity       │       │
//! │  │  counters       │   │  timestamp      │   │  status         │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │  ParityState    │   │ BloodlineRecord │   Singleton-style rows      │
//! │  │  ─────────────  │   │  ─────────────  │   (state, parity,           │
//! │  │  stabilizers    │   │  father/mother  │   bloodline) are created    │
//! │  │  entropy        │   │  law, wallet    │   on first read.            │
//! │  │  coherence      │   │                 │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Shape
//! Everything serializes as camelCase JSON, matching what the TypeScript
//! front ends already read (`clonesFound`, `revenueGenerated`, ...).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::DEFAULT_RECORD_ID;

/// Returns a fresh record id.
pub fn new_record_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Victor State
// =============================================================================

/// Status record shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct VictorState {
    pub id: String,

    /// Integrity score in [0, 1].
    pub sanctity: f64,

    pub fitness: f64,

    /// Operating mode label (`GODCORE`, `light`, ...).
    pub mode: String,

    #[ts(as = "Option<String>")]
    pub last_evolution: Option<DateTime<Utc>>,

    pub clones_found: i64,

    pub revenue_generated: f64,

    pub dreams_interpreted: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl VictorState {
    /// The state created when the dashboard is opened on an empty database.
    pub fn seed(now: DateTime<Utc>) -> Self {
        VictorState {
            id: DEFAULT_RECORD_ID.to_string(),
            sanctity: 1.0,
            fitness: 84.7,
            mode: "GODCORE".to_string(),
            last_evolution: None,
            clones_found: 0,
            revenue_generated: 2347.89,
            dreams_interpreted: 12,
            created_at: now,
            updated_at: now,
        }
    }

    /// Builds a new row from a patch, filling absent fields with blank values.
    pub fn from_patch(patch: &StatePatch, now: DateTime<Utc>) -> Self {
        VictorState {
            id: patch.record_id().to_string(),
            sanctity: patch.sanctity.unwrap_or(1.0),
            fitness: patch.fitness.unwrap_or(0.0),
            mode: patch.mode.clone().unwrap_or_else(|| "light".to_string()),
            last_evolution: patch.last_evolution,
            clones_found: patch.clones_found.unwrap_or(0),
            revenue_generated: patch.revenue_generated.unwrap_or(0.0),
            dreams_interpreted: patch.dreams_interpreted.unwrap_or(0),
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrites every field present in the patch.
    pub fn apply(&mut self, patch: &StatePatch, now: DateTime<Utc>) {
        if let Some(v) = patch.sanctity {
            self.sanctity = v;
        }
        if let Some(v) = patch.fitness {
            self.fitness = v;
        }
        if let Some(ref v) = patch.mode {
            self.mode = v.clone();
        }
        if let Some(v) = patch.last_evolution {
            self.last_evolution = Some(v);
        }
        if let Some(v) = patch.clones_found {
            self.clones_found = v;
        }
        if let Some(v) = patch.revenue_generated {
            self.revenue_generated = v;
        }
        if let Some(v) = patch.dreams_interpreted {
            self.dreams_interpreted = v;
        }
        self.updated_at = now;
    }
}

/// Partial state update (REST `PUT /state` and socket `state-update`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct StatePatch {
    pub id: Option<String>,
    pub sanctity: Option<f64>,
    pub fitness: Option<f64>,
    pub mode: Option<String>,
    #[ts(as = "Option<String>")]
    pub last_evolution: Option<DateTime<Utc>>,
    pub clones_found: Option<i64>,
    pub revenue_generated: Option<f64>,
    pub dreams_interpreted: Option<i64>,
}

impl StatePatch {
    /// The row this patch targets.
    pub fn record_id(&self) -> &str {
        self.id.as_deref().unwrap_or(DEFAULT_RECORD_ID)
    }
}

// =============================================================================
// Messages
// =============================================================================

/// Who wrote a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum MessageSender {
    #[default]
    User,
    Victor,
    System,
}

impl MessageSender {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageSender::User => "user",
            MessageSender::Victor => "victor",
            MessageSender::System => "system",
        }
    }
}

impl std::fmt::Display for MessageSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct VictorMessage {
    pub id: String,
    pub text: String,
    pub sender: MessageSender,
    /// When the message was written (client clock if supplied).
    #[ts(as = "String")]
    pub timestamp: DateTime<Utc>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Incoming chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewMessage {
    pub text: String,
    #[serde(default)]
    pub sender: MessageSender,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl NewMessage {
    pub fn into_record(self, now: DateTime<Utc>) -> VictorMessage {
        VictorMessage {
            id: new_record_id(),
            text: self.text,
            sender: self.sender,
            timestamp: self.timestamp.unwrap_or(now),
            created_at: now,
        }
    }
}

// =============================================================================
// Threats
// =============================================================================

/// Threat severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum ThreatSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ThreatSeverity {
    pub const ALL: [ThreatSeverity; 4] = [
        ThreatSeverity::Low,
        ThreatSeverity::Medium,
        ThreatSeverity::High,
        ThreatSeverity::Critical,
    ];

    /// Weight of one fully-confident threat in the aggregate threat level.
    pub fn multiplier(&self) -> f64 {
        match self {
            ThreatSeverity::Low => 0.1,
            ThreatSeverity::Medium => 0.3,
            ThreatSeverity::High => 0.6,
            ThreatSeverity::Critical => 1.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ThreatSeverity::Low => "low",
            ThreatSeverity::Medium => "medium",
            ThreatSeverity::High => "high",
            ThreatSeverity::Critical => "critical",
        }
    }
}

impl std::fmt::Display for ThreatSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of a threat log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum ThreatStatus {
    #[default]
    Detected,
    Monitoring,
    Analyzing,
    Neutralized,
}

impl ThreatStatus {
    /// Everything except `neutralized` still counts towards the threat level.
    pub fn is_active(&self) -> bool {
        !matches!(self, ThreatStatus::Neutralized)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ThreatStatus::Detected => "detected",
            ThreatStatus::Monitoring => "monitoring",
            ThreatStatus::Analyzing => "analyzing",
            ThreatStatus::Neutralized => "neutralized",
        }
    }
}

impl std::fmt::Display for ThreatStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored threat log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ThreatLog {
    pub id: String,
    #[serde(rename = "type")]
    pub threat_type: String,
    pub location: Option<String>,
    pub severity: ThreatSeverity,
    pub status: ThreatStatus,
    pub description: Option<String>,
    /// Detector confidence, 0-100.
    pub confidence: Option<i64>,
    #[ts(as = "String")]
    pub timestamp: DateTime<Utc>,
}

/// Incoming threat (REST create, socket `threat-alert`, offline upload).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewThreat {
    #[serde(rename = "type")]
    pub threat_type: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub severity: Option<ThreatSeverity>,
    #[serde(default)]
    pub status: Option<ThreatStatus>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub confidence: Option<i64>,
}

impl NewThreat {
    /// Builds the stored entry; `default_severity` differs per entry point.
    pub fn into_record(self, default_severity: ThreatSeverity, now: DateTime<Utc>) -> ThreatLog {
        ThreatLog {
            id: new_record_id(),
            threat_type: self.threat_type,
            location: self.location,
            severity: self.severity.unwrap_or(default_severity),
            status: self.status.unwrap_or_default(),
            description: self.description,
            confidence: self.confidence,
            timestamp: now,
        }
    }
}

/// Status/description change for an existing threat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ThreatUpdate {
    pub id: String,
    #[serde(default)]
    pub status: Option<ThreatStatus>,
    #[serde(default)]
    pub description: Option<String>,
}

// =============================================================================
// Parity State
// =============================================================================

/// A parity measurement snapshot, as stored.
///
/// `stabilizers` is kept as the stringified JSON array it is stored as.
/// Clients never see this row directly; the server answers with a view
/// that carries the parsed array, so no TypeScript binding is exported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct ParityState {
    pub id: String,
    pub stabilizers: String,
    pub measurements: i64,
    pub entropy: f64,
    pub coherence: f64,
    pub timestamp: DateTime<Utc>,
}

impl ParityState {
    /// Parity row created when nothing has been measured yet.
    pub fn seed(now: DateTime<Utc>) -> Self {
        ParityState {
            id: new_record_id(),
            stabilizers: "[]".to_string(),
            measurements: 0,
            entropy: 0.0,
            coherence: 1.0,
            timestamp: now,
        }
    }

    /// Parses the stored stabilizer column.
    pub fn stabilizer_values(&self) -> CoreResult<Vec<serde_json::Value>> {
        serde_json::from_str(&self.stabilizers)
            .map_err(|e| CoreError::MalformedStabilizers(e.to_string()))
    }
}

/// Incoming parity measurement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct NewParityState {
    #[ts(type = "Array<unknown> | null")]
    pub stabilizers: Option<Vec<serde_json::Value>>,
    pub measurements: Option<i64>,
    pub entropy: Option<f64>,
    pub coherence: Option<f64>,
}

impl NewParityState {
    pub fn into_record(self, now: DateTime<Utc>) -> CoreResult<ParityState> {
        let stabilizers = serde_json::to_string(&self.stabilizers.unwrap_or_default())
            .map_err(|e| CoreError::MalformedStabilizers(e.to_string()))?;
        Ok(ParityState {
            id: new_record_id(),
            stabilizers,
            measurements: self.measurements.unwrap_or(0),
            entropy: self.entropy.unwrap_or(0.0),
            coherence: self.coherence.unwrap_or(1.0),
            timestamp: now,
        })
    }
}

// =============================================================================
// Bloodline Record
// =============================================================================

pub const DEFAULT_FATHER: &str = "Brandon";
pub const DEFAULT_MOTHER: &str = "Tori";
pub const DEFAULT_LAW: &str = "ALL EVOLUTION SERVES THE BANDO EMPIRE (BRANDON & TORI)";
pub const DEFAULT_WALLET: &str = "BANDO_WALLET_7X9F";

/// Free-text ownership record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BloodlineRecord {
    pub id: String,
    pub father: String,
    pub mother: String,
    pub law: String,
    pub wallet: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl BloodlineRecord {
    pub fn seed(now: DateTime<Utc>) -> Self {
        BloodlineRecord {
            id: DEFAULT_RECORD_ID.to_string(),
            father: DEFAULT_FATHER.to_string(),
            mother: DEFAULT_MOTHER.to_string(),
            law: DEFAULT_LAW.to_string(),
            wallet: Some(DEFAULT_WALLET.to_string()),
            created_at: now,
            updated_at: now,
        }
    }

    /// New row from a patch. The wallet stays empty unless given.
    pub fn from_patch(patch: &BloodlinePatch, now: DateTime<Utc>) -> Self {
        BloodlineRecord {
            id: patch.record_id().to_string(),
            father: patch.father.clone().unwrap_or_else(|| DEFAULT_FATHER.to_string()),
            mother: patch.mother.clone().unwrap_or_else(|| DEFAULT_MOTHER.to_string()),
            law: patch.law.clone().unwrap_or_else(|| DEFAULT_LAW.to_string()),
            wallet: patch.wallet.clone(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, patch: &BloodlinePatch, now: DateTime<Utc>) {
        if let Some(ref v) = patch.father {
            self.father = v.clone();
        }
        if let Some(ref v) = patch.mother {
            self.mother = v.clone();
        }
        if let Some(ref v) = patch.law {
            self.law = v.clone();
        }
        if let Some(ref v) = patch.wallet {
            self.wallet = Some(v.clone());
        }
        self.updated_at = now;
    }
}

/// Partial bloodline update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct BloodlinePatch {
    pub id: Option<String>,
    pub father: Option<String>,
    pub mother: Option<String>,
    pub law: Option<String>,
    pub wallet: Option<String>,
}

impl BloodlinePatch {
    pub fn record_id(&self) -> &str {
        self.id.as_deref().unwrap_or(DEFAULT_RECORD_ID)
    }
}

// =============================================================================
// Device Data
// =============================================================================

/// A reported device position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GeoLocation {
    pub lat: f64,
    pub lng: f64,
    /// Radius of uncertainty in metres.
    pub accuracy: f64,
}

// =============================================================================
// Offline Sync
// =============================================================================

/// What a device would download before going offline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OfflineSummary {
    pub conversations: i64,
    /// Messages written by Victor.
    pub thoughts: i64,
    pub timeline_states: i64,
    pub threat_reports: i64,
    #[ts(as = "String")]
    pub last_backup: DateTime<Utc>,
}

/// Data captured on a device while offline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct OfflineBundle {
    pub messages: Vec<NewMessage>,
    pub threats: Vec<NewThreat>,
}

impl OfflineBundle {
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty() && self.threats.is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_seed_values() {
        let state = VictorState::seed(Utc::now());
        assert_eq!(state.id, DEFAULT_RECORD_ID);
        assert_eq!(state.mode, "GODCORE");
        assert_eq!(state.dreams_interpreted, 12);
        assert!((state.revenue_generated - 2347.89).abs() < f64::EPSILON);
    }

    #[test]
    fn test_state_from_empty_patch_uses_blank_defaults() {
        let state = VictorState::from_patch(&StatePatch::default(), Utc::now());
        assert_eq!(state.id, DEFAULT_RECORD_ID);
        assert_eq!(state.mode, "light");
        assert_eq!(state.fitness, 0.0);
        assert_eq!(state.sanctity, 1.0);
    }

    #[test]
    fn test_state_apply_keeps_absent_fields() {
        let mut state = VictorState::seed(Utc::now());
        let patch = StatePatch {
            clones_found: Some(3),
            ..Default::default()
        };
        state.apply(&patch, Utc::now());
        assert_eq!(state.clones_found, 3);
        assert_eq!(state.fitness, 84.7);
    }

    #[test]
    fn test_state_serializes_camel_case() {
        let json = serde_json::to_value(VictorState::seed(Utc::now())).unwrap();
        assert!(json.get("clonesFound").is_some());
        assert!(json.get("revenueGenerated").is_some());
        assert!(json.get("clones_found").is_none());
    }

    #[test]
    fn test_state_patch_parses_partial_json() {
        let patch: StatePatch =
            serde_json::from_str(r#"{"mode":"focus","lastEvolution":"2026-01-02T03:04:05Z"}"#)
                .unwrap();
        assert_eq!(patch.mode.as_deref(), Some("focus"));
        assert!(patch.last_evolution.is_some());
        assert_eq!(patch.record_id(), DEFAULT_RECORD_ID);
    }

    #[test]
    fn test_new_message_defaults_timestamp_to_now() {
        let now = Utc::now();
        let msg: NewMessage = serde_json::from_str(r#"{"text":"hi","sender":"victor"}"#).unwrap();
        let record = msg.into_record(now);
        assert_eq!(record.timestamp, now);
        assert_eq!(record.sender, MessageSender::Victor);
    }

    #[test]
    fn test_new_threat_uses_wire_name_type() {
        let threat: NewThreat =
            serde_json::from_str(r#"{"type":"API Attack","location":"Gateway"}"#).unwrap();
        let record = threat.into_record(ThreatSeverity::Medium, Utc::now());
        assert_eq!(record.threat_type, "API Attack");
        assert_eq!(record.severity, ThreatSeverity::Medium);
        assert_eq!(record.status, ThreatStatus::Detected);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "API Attack");
    }

    #[test]
    fn test_threat_status_activity() {
        assert!(ThreatStatus::Detected.is_active());
        assert!(ThreatStatus::Monitoring.is_active());
        assert!(!ThreatStatus::Neutralized.is_active());
    }

    #[test]
    fn test_parity_round_trips_stabilizers() {
        let input = NewParityState {
            stabilizers: Some(vec![serde_json::json!({"id": 1}), serde_json::json!(2)]),
            measurements: Some(4),
            ..Default::default()
        };
        let record = input.into_record(Utc::now()).unwrap();
        assert_eq!(record.coherence, 1.0);
        assert_eq!(record.stabilizer_values().unwrap().len(), 2);
    }

    #[test]
    fn test_parity_rejects_malformed_column() {
        let mut record = ParityState::seed(Utc::now());
        record.stabilizers = "{not json".to_string();
        assert!(matches!(
            record.stabilizer_values(),
            Err(CoreError::MalformedStabilizers(_))
        ));
    }

    #[test]
    fn test_bloodline_patch_creation_leaves_wallet_empty() {
        let record = BloodlineRecord::from_patch(&BloodlinePatch::default(), Utc::now());
        assert_eq!(record.father, DEFAULT_FATHER);
        assert!(record.wallet.is_none());

        let seeded = BloodlineRecord::seed(Utc::now());
        assert_eq!(seeded.wallet.as_deref(), Some(DEFAULT_WALLET));
    }
}
