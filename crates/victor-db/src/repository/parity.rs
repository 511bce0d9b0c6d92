//! # Parity Repository
//!
//! Append-only parity measurements; the newest row is "the" parity state.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use victor_core::{NewParityState, ParityState};

const SELECT_PARITY: &str = r#"
    SELECT id, stabilizers, measurements, entropy, coherence, timestamp
    FROM parity_states
"#;

#[derive(Debug, Clone)]
pub struct ParityRepository {
    pool: SqlitePool,
}

impl ParityRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ParityRepository { pool }
    }

    pub async fn latest(&self) -> DbResult<Option<ParityState>> {
        let parity = sqlx::query_as::<_, ParityState>(&format!(
            "{SELECT_PARITY} ORDER BY timestamp DESC, rowid DESC LIMIT 1"
        ))
        .fetch_optional(&self.pool)
        .await?;

        Ok(parity)
    }

    /// Newest parity row, creating an empty measurement on a fresh database.
    ///
    /// The seed insert only fires while the table is empty, so concurrent
    /// first reads leave exactly one row.
    pub async fn latest_or_seed(&self) -> DbResult<ParityState> {
        if let Some(parity) = self.latest().await? {
            return Ok(parity);
        }

        let seed = ParityState::seed(Utc::now());
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO parity_states (id, stabilizers, measurements, entropy, coherence, timestamp)
            SELECT ?1, ?2, ?3, ?4, ?5, ?6
            WHERE NOT EXISTS (SELECT 1 FROM parity_states)
            "#,
        )
        .bind(&seed.id)
        .bind(&seed.stabilizers)
        .bind(seed.measurements)
        .bind(seed.entropy)
        .bind(seed.coherence)
        .bind(seed.timestamp)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let latest = sqlx::query_as::<_, ParityState>(&format!(
            "{SELECT_PARITY} ORDER BY timestamp DESC, rowid DESC LIMIT 1"
        ))
        .fetch_optional(&mut *tx)
        .await?;
        tx.commit().await?;

        if inserted > 0 {
            info!(id = %seed.id, "No parity state stored yet, created seed record");
        }
        latest.ok_or_else(|| DbError::not_found("ParityState", &seed.id))
    }

    /// Appends a measurement; absent fields take the empty-measurement values.
    pub async fn create(&self, input: NewParityState) -> DbResult<ParityState> {
        let record = input.into_record(Utc::now())?;
        self.insert(&record).await?;
        Ok(record)
    }

    async fn insert(&self, record: &ParityState) -> DbResult<()> {
        debug!(id = %record.id, measurements = record.measurements, "Inserting parity state");

        sqlx::query(
            r#"
            INSERT INTO parity_states (id, stabilizers, measurements, entropy, coherence, timestamp)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&record.id)
        .bind(&record.stabilizers)
        .bind(record.measurements)
        .bind(record.entropy)
        .bind(record.coherence)
        .bind(record.timestamp)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM parity_states")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
