//! # victor-db: Database Layer for the Victor Backend
//!
//! SQLite persistence for the five record kinds, using sqlx for async
//! access.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Victor Data Flow                                 │
//! │                                                                         │
//! │  REST handler / socket dispatcher                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     victor-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐   │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │   │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │   │   │
//! │  │   │               │    │ StateRepo     │    │              │   │   │
//! │  │   │ SqlitePool    │◄───│ MessageRepo   │    │ 001_initial  │   │   │
//! │  │   │               │    │ ThreatRepo    │    │   _schema    │   │   │
//! │  │   │               │    │ ParityRepo    │    │              │   │   │
//! │  │   │               │    │ BloodlineRepo │    │              │   │   │
//! │  │   │               │    │ OfflineRepo   │    │              │   │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (WAL mode)                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! use victor_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./victor.db")).await?;
//! let state = db.state().latest_or_seed().await?;
//! let history = db.messages().recent(50).await?;
//! ```

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::offline::ImportSummary;
