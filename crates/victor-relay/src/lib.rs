//! # victor-relay: Real-Time Event Relay
//!
//! WebSocket fan-out between every open Victor client: chat, voice
//! commands, status changes, threat alerts, AR mode and location.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Relay Architecture                             │
//! │                                                                         │
//! │   Web client ──┐                                     ┌── Web client     │
//! │                │        ┌────────────────────┐       │                  │
//! │   Mobile app ──┼──/ws──►│   hub (RelayHandle)│──────►┼── Mobile app     │
//! │                │        └─────────┬──────────┘       │                  │
//! │                                   │ ClientEvent                         │
//! │                         ┌─────────▼──────────┐                          │
//! │                         │     dispatcher     │──► victor-db             │
//! │                         └─────────┬──────────┘                          │
//! │                                   │ Outbound { Origin | All | Others }  │
//! │                                   ▼                                     │
//! │                           broadcast channel                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`config`] - Relay tuning (`[relay]` table)
//! - [`dispatcher`] - Inbound event rules
//! - [`error`] - Relay error types
//! - [`hub`] - Socket endpoint and broadcast fan-out
//! - [`protocol`] - Wire events
//!
//! ## Usage
//!
//! ```rust,ignore
//! use victor_relay::{RelayConfig, RelayHandle};
//!
//! let relay = RelayHandle::new(RelayConfig::default(), database.clone());
//! let app = api_router.merge(relay.router());
//!
//! // REST handlers can push events too
//! relay.broadcast(&ServerEvent::ThreatAlert(threat))?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod hub;
pub mod protocol;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::RelayConfig;
pub use error::{RelayError, RelayResult};
pub use hub::RelayHandle;
pub use protocol::{ClientEvent, ServerEvent};
