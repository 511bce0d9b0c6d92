//! # Threat Repository
//!
//! Threat log entries. Only `status` and `description` change after
//! creation.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use victor_core::{NewThreat, ThreatLog, ThreatSeverity, ThreatUpdate};

const SELECT_THREAT: &str = r#"
    SELECT
        id, threat_type, location, severity, status,
        description, confidence, timestamp
    FROM threat_logs
"#;

#[derive(Debug, Clone)]
pub struct ThreatRepository {
    pool: SqlitePool,
}

impl ThreatRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ThreatRepository { pool }
    }

    /// Stores a new threat.
    ///
    /// `default_severity` applies when the input carries none: REST creates
    /// default to `low`, socket alerts to `medium`.
    pub async fn create(
        &self,
        threat: NewThreat,
        default_severity: ThreatSeverity,
    ) -> DbResult<ThreatLog> {
        let record = threat.into_record(default_severity, Utc::now());
        let mut conn = self.pool.acquire().await?;
        insert_threat(&mut *conn, &record).await?;

        info!(
            id = %record.id,
            threat_type = %record.threat_type,
            severity = %record.severity,
            "Threat logged"
        );
        Ok(record)
    }

    /// The newest `limit` threats, newest first.
    pub async fn recent(&self, limit: u32) -> DbResult<Vec<ThreatLog>> {
        let threats = sqlx::query_as::<_, ThreatLog>(&format!(
            "{SELECT_THREAT} ORDER BY timestamp DESC, rowid DESC LIMIT ?1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(threats)
    }

    /// All threats that are not neutralized.
    pub async fn active(&self) -> DbResult<Vec<ThreatLog>> {
        let threats = sqlx::query_as::<_, ThreatLog>(&format!(
            "{SELECT_THREAT} WHERE status != 'neutralized' ORDER BY timestamp DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(threats)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<ThreatLog>> {
        let threat = sqlx::query_as::<_, ThreatLog>(&format!("{SELECT_THREAT} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(threat)
    }

    /// Changes status and/or description of an existing threat.
    ///
    /// ## Returns
    /// * `Ok(ThreatLog)` - The row after the update
    /// * `Err(DbError::NotFound)` - No threat with that id
    pub async fn update(&self, update: &ThreatUpdate) -> DbResult<ThreatLog> {
        debug!(id = %update.id, status = ?update.status, "Updating threat");

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE threat_logs SET
                status = COALESCE(?2, status),
                description = COALESCE(?3, description)
            WHERE id = ?1
            "#,
        )
        .bind(&update.id)
        .bind(update.status)
        .bind(update.description.as_deref())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Threat", &update.id));
        }

        let threat = sqlx::query_as::<_, ThreatLog>(&format!("{SELECT_THREAT} WHERE id = ?1"))
            .bind(&update.id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(threat)
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM threat_logs")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

pub(crate) async fn insert_threat(conn: &mut SqliteConnection, record: &ThreatLog) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO threat_logs (
            id, threat_type, location, severity, status,
            description, confidence, timestamp
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
    )
    .bind(&record.id)
    .bind(&record.threat_type)
    .bind(record.location.as_deref())
    .bind(record.severity)
    .bind(record.status)
    .bind(record.description.as_deref())
    .bind(record.confidence)
    .bind(record.timestamp)
    .execute(conn)
    .await?;

    Ok(())
}
