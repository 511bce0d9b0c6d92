//! # Relay Protocol Events
//!
//! Event types exchanged over the `/ws` socket.
//!
//! ## Event Surface
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Inbound (client → relay)        Outbound (relay → clients)             │
//! │  ────────────────────────        ──────────────────────────             │
//! │  victor-message      ──persist──► victor-message       (all)           │
//! │  voice-command       ───────────► voice-response       (origin)        │
//! │                                   victor-activity      (others)        │
//! │  state-update        ──upsert───► state-update         (all)           │
//! │  threat-alert        ──persist──► threat-alert         (all)           │
//! │  ar-mode-toggle      ───────────► ar-mode-update       (all)           │
//! │  location-update     ───────────► location-update      (others)        │
//! │  connection-status   ───────────► connection-status    (others)        │
//! │  victor-activity     ───────────► victor-activity      (others)        │
//! │  message             ───────────► message "Echo: .."   (origin)        │
//! │  <malformed>         ───────────► error                (origin)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Format
//! Every frame is a JSON text message, adjacently tagged:
//! ```json
//! { "event": "ar-mode-toggle", "data": true }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use victor_core::{
    GeoLocation, MessageSender, NewMessage, NewThreat, StatePatch, ThreatLog, VictorState,
};

// =============================================================================
// Inbound Events
// =============================================================================

/// Events a client may send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientEvent {
    /// Chat message to persist and fan out.
    VictorMessage(NewMessage),

    /// Spoken command text.
    VoiceCommand(String),

    /// Partial status update.
    StateUpdate(StatePatch),

    /// Threat raised by a client-side detector.
    ThreatAlert(NewThreat),

    /// AR hologram mode switched on/off.
    ArModeToggle(bool),

    LocationUpdate(GeoLocation),

    /// Device went online/offline.
    ConnectionStatus(bool),

    /// Free-form activity object (`{type, ...}`) relayed untouched.
    VictorActivity(Value),

    /// Legacy echo.
    Message(EchoRequest),
}

impl ClientEvent {
    /// Wire name, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::VictorMessage(_) => "victor-message",
            ClientEvent::VoiceCommand(_) => "voice-command",
            ClientEvent::StateUpdate(_) => "state-update",
            ClientEvent::ThreatAlert(_) => "threat-alert",
            ClientEvent::ArModeToggle(_) => "ar-mode-toggle",
            ClientEvent::LocationUpdate(_) => "location-update",
            ClientEvent::ConnectionStatus(_) => "connection-status",
            ClientEvent::VictorActivity(_) => "victor-activity",
            ClientEvent::Message(_) => "message",
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EchoRequest {
    pub text: String,
    #[serde(default)]
    pub sender_id: Option<String>,
}

// =============================================================================
// Outbound Events
// =============================================================================

/// Events the relay sends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerEvent {
    VictorMessage(ChatPayload),
    VoiceResponse(VoiceResponsePayload),
    VictorActivity(Value),
    StateUpdate(VictorState),
    ThreatAlert(ThreatLog),
    ArModeUpdate(ArModePayload),
    LocationUpdate(LocationPayload),
    ConnectionStatus(ConnectionStatusPayload),
    Message(EchoReply),
    Error(ErrorPayload),
}

impl ServerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::VictorMessage(_) => "victor-message",
            ServerEvent::VoiceResponse(_) => "voice-response",
            ServerEvent::VictorActivity(_) => "victor-activity",
            ServerEvent::StateUpdate(_) => "state-update",
            ServerEvent::ThreatAlert(_) => "threat-alert",
            ServerEvent::ArModeUpdate(_) => "ar-mode-update",
            ServerEvent::LocationUpdate(_) => "location-update",
            ServerEvent::ConnectionStatus(_) => "connection-status",
            ServerEvent::Message(_) => "message",
            ServerEvent::Error(_) => "error",
        }
    }

    /// The greeting every new connection receives.
    pub fn welcome(text: &str, now: DateTime<Utc>) -> Self {
        ServerEvent::VictorMessage(ChatPayload {
            text: text.to_string(),
            sender: MessageSender::Victor,
            timestamp: now,
            id: None,
        })
    }

    pub fn error(message: impl Into<String>) -> Self {
        ServerEvent::Error(ErrorPayload {
            message: message.into(),
        })
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// A chat message as fanned out to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatPayload {
    pub text: String,
    pub sender: MessageSender,
    pub timestamp: DateTime<Utc>,
    /// Connection id of the client that sent it; absent on the welcome.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceResponsePayload {
    pub command: String,
    pub response: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArModePayload {
    pub is_active: bool,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationPayload {
    #[serde(flatten)]
    pub location: GeoLocation,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionStatusPayload {
    pub is_online: bool,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EchoReply {
    pub text: String,
    pub sender_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub message: String,
}
