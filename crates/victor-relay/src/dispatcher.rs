//! # Event Dispatcher
//!
//! Turns one inbound [`ClientEvent`] into the side effects it implies
//! (validation, persistence) and the outbound events the hub must deliver.
//!
//! The dispatcher never touches a socket. It returns a list of
//! [`Outbound`] instructions and the hub routes them, which keeps every
//! event rule testable against an in-memory database.

use chrono::Utc;
use serde_json::json;
use tracing::{debug, error, warn};

use victor_core::validation::{
    validate_location, validate_new_message, validate_new_threat, validate_state_patch,
    validate_voice_command,
};
use victor_core::ThreatSeverity;
use victor_db::Database;

use crate::error::RelayResult;
use crate::protocol::{
    ArModePayload, ChatPayload, ClientEvent, ConnectionStatusPayload, EchoReply, LocationPayload,
    ServerEvent, VoiceResponsePayload,
};

/// Severity given to socket-raised threats that do not name one.
pub const SOCKET_THREAT_SEVERITY: ThreatSeverity = ThreatSeverity::Medium;

/// Where an outbound event goes.
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    /// Only the connection that sent the inbound event.
    Origin(ServerEvent),
    /// Every connection, origin included.
    All(ServerEvent),
    /// Every connection except the origin.
    Others(ServerEvent),
}

/// Reply sent for a spoken command over the socket.
pub fn voice_ack(command: &str) -> String {
    format!("Command received: \"{}\". Processing...", command)
}

/// Handles one inbound event.
///
/// Never fails outright: any error becomes a single `error` event for the
/// origin, so the connection stays open.
pub async fn dispatch(db: &Database, origin: &str, event: ClientEvent) -> Vec<Outbound> {
    let name = event.name();
    debug!(client_id = %origin, event = name, "Dispatching client event");

    match handle(db, origin, event).await {
        Ok(outbound) => outbound,
        Err(e) => {
            if e.is_protocol_error() {
                warn!(client_id = %origin, event = name, error = %e, "Rejected client event");
            } else {
                error!(client_id = %origin, event = name, error = %e, "Failed to handle client event");
            }
            vec![Outbound::Origin(ServerEvent::error(
                e.client_message(operation(name)),
            ))]
        }
    }
}

/// Wording used in the generic failure message for each event.
fn operation(event: &str) -> &'static str {
    match event {
        "victor-message" => "process message",
        "voice-command" => "process voice command",
        "state-update" => "update state",
        "threat-alert" => "process threat alert",
        "location-update" => "update location",
        _ => "process event",
    }
}

async fn handle(db: &Database, origin: &str, event: ClientEvent) -> RelayResult<Vec<Outbound>> {
    let now = Utc::now();

    let outbound = match event {
        ClientEvent::VictorMessage(msg) => {
            validate_new_message(&msg)?;
            let stored = db.messages().create(msg).await?;
            vec![Outbound::All(ServerEvent::VictorMessage(ChatPayload {
                text: stored.text,
                sender: stored.sender,
                timestamp: stored.timestamp,
                id: Some(origin.to_string()),
            }))]
        }

        ClientEvent::VoiceCommand(command) => {
            let command = validate_voice_command(&command)?;
            vec![
                Outbound::Origin(ServerEvent::VoiceResponse(VoiceResponsePayload {
                    response: voice_ack(&command),
                    command: command.clone(),
                    timestamp: now,
                })),
                Outbound::Others(ServerEvent::VictorActivity(json!({
                    "type": "voice-command",
                    "command": command,
                    "timestamp": now,
                }))),
            ]
        }

        ClientEvent::StateUpdate(patch) => {
            validate_state_patch(&patch)?;
            let state = db.state().upsert(&patch).await?;
            vec![Outbound::All(ServerEvent::StateUpdate(state))]
        }

        ClientEvent::ThreatAlert(threat) => {
            validate_new_threat(&threat)?;
            let stored = db.threats().create(threat, SOCKET_THREAT_SEVERITY).await?;
            vec![Outbound::All(ServerEvent::ThreatAlert(stored))]
        }

        ClientEvent::ArModeToggle(is_active) => {
            vec![Outbound::All(ServerEvent::ArModeUpdate(ArModePayload {
                is_active,
                timestamp: now,
            }))]
        }

        ClientEvent::LocationUpdate(location) => {
            validate_location(&location)?;
            vec![Outbound::Others(ServerEvent::LocationUpdate(
                LocationPayload {
                    location,
                    timestamp: now,
                },
            ))]
        }

        ClientEvent::ConnectionStatus(is_online) => {
            vec![Outbound::Others(ServerEvent::ConnectionStatus(
                ConnectionStatusPayload {
                    is_online,
                    timestamp: now,
                },
            ))]
        }

        ClientEvent::VictorActivity(activity) => {
            vec![Outbound::Others(ServerEvent::VictorActivity(activity))]
        }

        ClientEvent::Message(request) => {
            vec![Outbound::Origin(ServerEvent::Message(EchoReply {
                text: format!("Echo: {}", request.text),
                sender_id: "system".to_string(),
                timestamp: now,
            }))]
        }
    };

    Ok(outbound)
}
