//! # Relay Error Types
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  RelayError                                                             │
//! │  ├── Transport      socket send/receive failures                       │
//! │  ├── FrameTooLarge  frame over `max_message_size`                      │
//! │  ├── Protocol       malformed or unknown inbound frame                 │
//! │  ├── Serialization  outbound event could not be encoded                │
//! │  ├── Validation     inbound payload broke a domain rule                │
//! │  └── Database       persistence failed                                 │
//! │                                                                         │
//! │  Every variant ends up as an `error` event sent to the origin only.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;
use victor_core::ValidationError;
use victor_db::DbError;

/// Result type alias for relay operations.
pub type RelayResult<T> = Result<T, RelayError>;

#[derive(Debug, Error)]
pub enum RelayError {
    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// WebSocket send/receive failed.
    #[error("WebSocket error: {0}")]
    Transport(String),

    /// Frame exceeded the configured size.
    #[error("Frame too large: {size} bytes (max {max})")]
    FrameTooLarge { size: usize, max: usize },

    // =========================================================================
    // Protocol Errors
    // =========================================================================
    /// Inbound frame is not a known event.
    #[error("Invalid event: {0}")]
    Protocol(String),

    #[error("Serialization failed: {0}")]
    Serialization(String),

    // =========================================================================
    // Domain Errors
    // =========================================================================
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

impl RelayError {
    /// True for errors caused by what the client sent.
    pub fn is_protocol_error(&self) -> bool {
        matches!(
            self,
            RelayError::Protocol(_) | RelayError::FrameTooLarge { .. } | RelayError::Validation(_)
        )
    }

    /// Message sent back to the client in the `error` event.
    ///
    /// Client mistakes are described; server failures get the generic
    /// `Failed to <operation>` text and are logged instead.
    pub fn client_message(&self, operation: &str) -> String {
        if self.is_protocol_error() {
            self.to_string()
        } else {
            format!("Failed to {}", operation)
        }
    }
}

impl From<serde_json::Error> for RelayError {
    fn from(err: serde_json::Error) -> Self {
        RelayError::Serialization(err.to_string())
    }
}
