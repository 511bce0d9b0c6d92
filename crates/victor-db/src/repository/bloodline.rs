//! # Bloodline Repository
//!
//! Same singleton shape as the status record: seeded on first read,
//! upserted by id.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use victor_core::{BloodlinePatch, BloodlineRecord, DEFAULT_RECORD_ID};

const SELECT_BLOODLINE: &str = r#"
    SELECT id, father, mother, law, wallet, created_at, updated_at
    FROM bloodline_records
"#;

const WRITE_BLOODLINE: &str = r#"
    INSERT INTO bloodline_records (id, father, mother, law, wallet, created_at, updated_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
    ON CONFLICT(id) DO UPDATE SET
        father = excluded.father,
        mother = excluded.mother,
        law = excluded.law,
        wallet = excluded.wallet,
        updated_at = excluded.updated_at
"#;

#[derive(Debug, Clone)]
pub struct BloodlineRepository {
    pool: SqlitePool,
}

impl BloodlineRepository {
    pub fn new(pool: SqlitePool) -> Self {
        BloodlineRepository { pool }
    }

    pub async fn latest(&self) -> DbResult<Option<BloodlineRecord>> {
        let record = sqlx::query_as::<_, BloodlineRecord>(&format!(
            "{SELECT_BLOODLINE} ORDER BY updated_at DESC, rowid DESC LIMIT 1"
        ))
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    pub async fn latest_or_seed(&self) -> DbResult<BloodlineRecord> {
        if let Some(record) = self.latest().await? {
            return Ok(record);
        }

        info!("No bloodline record stored yet, creating seed record");
        let seed = BloodlineRecord::seed(Utc::now());
        sqlx::query(
            r#"
            INSERT INTO bloodline_records (id, father, mother, law, wallet, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(id) DO NOTHING
            "#,
        )
        .bind(&seed.id)
        .bind(&seed.father)
        .bind(&seed.mother)
        .bind(&seed.law)
        .bind(seed.wallet.as_deref())
        .bind(seed.created_at)
        .bind(seed.updated_at)
        .execute(&self.pool)
        .await?;

        self.latest()
            .await?
            .ok_or_else(|| DbError::not_found("BloodlineRecord", DEFAULT_RECORD_ID))
    }

    /// Creates or updates the row targeted by the patch.
    pub async fn upsert(&self, patch: &BloodlinePatch) -> DbResult<BloodlineRecord> {
        let id = patch.record_id();
        debug!(id = %id, "Upserting bloodline record");

        let mut tx = self.pool.begin().await?;

        let existing =
            sqlx::query_as::<_, BloodlineRecord>(&format!("{SELECT_BLOODLINE} WHERE id = ?1"))
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        let now = Utc::now();
        let record = match existing {
            Some(mut record) => {
                record.apply(patch, now);
                record
            }
            None => BloodlineRecord::from_patch(patch, now),
        };

        sqlx::query(WRITE_BLOODLINE)
            .bind(&record.id)
            .bind(&record.father)
            .bind(&record.mother)
            .bind(&record.law)
            .bind(record.wallet.as_deref())
            .bind(record.created_at)
            .bind(record.updated_at)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(record)
    }
}
