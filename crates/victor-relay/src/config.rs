//! Relay settings (the `[relay]` table of the server config).

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{RelayError, RelayResult};

/// Greeting sent to every new connection.
pub const DEFAULT_WELCOME_MESSAGE: &str = "Dad... I'm here. The empire is alive.";

/// Relay tuning knobs.
///
/// ```toml
/// [relay]
/// ping_interval_secs = 30
/// max_message_size = 1048576
/// broadcast_capacity = 256
/// outgoing_queue = 64
/// welcome_message = "Dad... I'm here. The empire is alive."
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Seconds between keepalive pings to each client.
    #[serde(default = "default_ping_interval")]
    pub ping_interval_secs: u64,

    /// Largest inbound frame dispatched, in bytes. Bigger frames get an
    /// `error` reply; see [`RelayConfig::transport_limit`].
    #[serde(default = "default_max_message_size")]
    pub max_message_size: usize,

    /// Events buffered for slow receivers before they start skipping.
    #[serde(default = "default_broadcast_capacity")]
    pub broadcast_capacity: usize,

    /// Per-connection outgoing queue depth.
    #[serde(default = "default_outgoing_queue")]
    pub outgoing_queue: usize,

    #[serde(default = "default_welcome_message")]
    pub welcome_message: String,
}

fn default_ping_interval() -> u64 {
    30
}

fn default_max_message_size() -> usize {
    1024 * 1024
}

fn default_broadcast_capacity() -> usize {
    256
}

fn default_outgoing_queue() -> usize {
    64
}

fn default_welcome_message() -> String {
    DEFAULT_WELCOME_MESSAGE.to_string()
}

impl Default for RelayConfig {
    fn default() -> Self {
        RelayConfig {
            ping_interval_secs: default_ping_interval(),
            max_message_size: default_max_message_size(),
            broadcast_capacity: default_broadcast_capacity(),
            outgoing_queue: default_outgoing_queue(),
            welcome_message: default_welcome_message(),
        }
    }
}

impl RelayConfig {
    pub fn ping_interval(&self) -> Duration {
        Duration::from_secs(self.ping_interval_secs)
    }

    /// Hard cap handed to the WebSocket layer. Frames above it close the
    /// connection instead of producing an `error` reply.
    pub fn transport_limit(&self) -> usize {
        self.max_message_size.saturating_mul(2)
    }

    pub fn validate(&self) -> RelayResult<()> {
        let zero = [
            ("ping_interval_secs", self.ping_interval_secs as usize),
            ("max_message_size", self.max_message_size),
            ("broadcast_capacity", self.broadcast_capacity),
            ("outgoing_queue", self.outgoing_queue),
        ]
        .into_iter()
        .find(|(_, value)| *value == 0);

        if let Some((field, _)) = zero {
            return Err(RelayError::Protocol(format!(
                "relay.{} must be greater than 0",
                field
            )));
        }
        Ok(())
    }
}
