//! # Offline Repository
//!
//! Supports the offline-first mobile client.
//!
//! ## Sync Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Device going offline            Device back online                     │
//! │  ────────────────────            ──────────────────                     │
//! │  GET /sync/download              POST /sync/upload                      │
//! │       │                               │                                 │
//! │       ▼                               ▼                                 │
//! │  summary(): row counts           import(bundle): messages + threats     │
//! │  per table                       written in ONE transaction             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::info;
use ts_rs::TS;

use crate::error::DbResult;
use crate::repository::message::insert_message;
use crate::repository::threat::insert_threat;
use victor_core::{OfflineBundle, OfflineSummary, ThreatSeverity};

/// How many records an upload wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct ImportSummary {
    pub messages: usize,
    pub threats: usize,
}

#[derive(Debug, Clone)]
pub struct OfflineRepository {
    pool: SqlitePool,
}

impl OfflineRepository {
    pub fn new(pool: SqlitePool) -> Self {
        OfflineRepository { pool }
    }

    /// Counts what a device would cache for offline use.
    pub async fn summary(&self) -> DbResult<OfflineSummary> {
        let (conversations, thoughts, timeline_states, threat_reports): (i64, i64, i64, i64) =
            sqlx::query_as(
                r#"
                SELECT
                    (SELECT COUNT(*) FROM victor_messages),
                    (SELECT COUNT(*) FROM victor_messages WHERE sender = 'victor'),
                    (SELECT COUNT(*) FROM parity_states),
                    (SELECT COUNT(*) FROM threat_logs)
                "#,
            )
            .fetch_one(&self.pool)
            .await?;

        Ok(OfflineSummary {
            conversations,
            thoughts,
            timeline_states,
            threat_reports,
            last_backup: Utc::now(),
        })
    }

    /// Writes everything captured offline. All or nothing.
    ///
    /// Uploaded threats without a severity are stored as `low`, like REST
    /// creates.
    pub async fn import(&self, bundle: OfflineBundle) -> DbResult<ImportSummary> {
        let now = Utc::now();
        let mut summary = ImportSummary::default();
        let mut tx = self.pool.begin().await?;

        for msg in bundle.messages {
            insert_message(&mut *tx, &msg.into_record(now)).await?;
            summary.messages += 1;
        }

        for threat in bundle.threats {
            insert_threat(&mut *tx, &threat.into_record(ThreatSeverity::Low, now)).await?;
            summary.threats += 1;
        }

        tx.commit().await?;

        info!(
            messages = summary.messages,
            threats = summary.threats,
            "Imported offline data"
        );
        Ok(summary)
    }
}
