//! # Repository Module
//!
//! One repository per table, each holding a clone of the pool.
//!
//! ```text
//!  handler ── db.threats().update(&patch) ──► ThreatRepository ──► SQL
//! ```
//!
//! ## Available Repositories
//!
//! - [`state::StateRepository`] - Status record (seed on first read, upsert)
//! - [`message::MessageRepository`] - Chat history
//! - [`threat::ThreatRepository`] - Threat log
//! - [`parity::ParityRepository`] - Append-only parity measurements
//! - [`bloodline::BloodlineRepository`] - Ownership record (seed, upsert)
//! - [`offline::OfflineRepository`] - Offline download summary and upload import

pub mod bloodline;
pub mod message;
pub mod offline;
pub mod parity;
pub mod state;
pub mod threat;
