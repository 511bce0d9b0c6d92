//! # victor-core: Domain Records for the Victor Backend
//!
//! This crate holds everything the backend knows about its data without
//! touching a database or a socket.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Victor Backend Architecture                        │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │            Web / Mobile front ends (TypeScript)                 │   │
//! │  │     Chat ──► Dashboard ──► Security ──► AR hologram            │   │
//! │  └──────────────┬─────────────────────────────┬────────────────────┘   │
//! │                 │ REST (/api/victor/*)         │ WebSocket (/ws)        │
//! │  ┌──────────────▼──────────────┐  ┌────────────▼───────────────────┐   │
//! │  │        apps/server          │  │        victor-relay            │   │
//! │  └──────────────┬──────────────┘  └────────────┬───────────────────┘   │
//! │                 │                              │                        │
//! │  ┌──────────────▼──────────────────────────────▼───────────────────┐   │
//! │  │               ★ victor-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌────────────┐  ┌────────────┐  ┌──────────┐  │   │
//! │  │   │   types   │  │ validation │  │ generators │  │ catalog  │  │   │
//! │  │   │  records  │  │   rules    │  │  hologram  │  │ timelines│  │   │
//! │  │   │  patches  │  │            │  │  threats   │  │ evolution│  │   │
//! │  │   └───────────┘  └────────────┘  └────────────┘  └──────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK                             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                 │                                       │
//! │  ┌──────────────────────────────▼──────────────────────────────────┐   │
//! │  │                   victor-db (Database Layer)                    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Persisted records and the patches that create/update them
//! - [`error`] - Domain error types
//! - [`validation`] - Input rules applied before anything is stored
//! - [`generators`] - Random hologram snapshots and threat scans
//! - [`catalog`] - Fixed timelines and evolution report
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::Utc;
//! use victor_core::types::{StatePatch, VictorState};
//!
//! let mut state = VictorState::seed(Utc::now());
//! assert_eq!(state.mode, "GODCORE");
//!
//! let patch = StatePatch { fitness: Some(90.0), ..Default::default() };
//! state.apply(&patch, Utc::now());
//! assert_eq!(state.fitness, 90.0);
//! assert_eq!(state.mode, "GODCORE"); // absent fields are kept
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod error;
pub mod generators;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, ValidationError};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Record id used by upserts that arrive without an explicit id.
///
/// State and bloodline rows behave like singletons: clients normally omit
/// the id, so every such write lands on the same row.
pub const DEFAULT_RECORD_ID: &str = "default";

/// Number of messages returned by the chat history listing.
pub const MESSAGE_HISTORY_LIMIT: u32 = 50;

/// Number of threats returned by the threat log listing.
pub const THREAT_HISTORY_LIMIT: u32 = 20;
