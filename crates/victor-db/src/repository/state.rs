//! # State Repository
//!
//! The status record behaves like a singleton: reads fall back to a seeded
//! row and writes are upserts keyed by id (default `"default"`).
//!
//! ## Upsert Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN                                                                  │
//! │    SELECT row WHERE id = patch.id                                       │
//! │      ├── found   → apply patch (absent fields kept)                     │
//! │      └── missing → build from patch (absent fields blank)               │
//! │    INSERT ... ON CONFLICT(id) DO UPDATE                                 │
//! │  COMMIT                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use victor_core::{StatePatch, VictorState, DEFAULT_RECORD_ID};

const SELECT_STATE: &str = r#"
    SELECT
        id, sanctity, fitness, mode, last_evolution,
        clones_found, revenue_generated, dreams_interpreted,
        created_at, updated_at
    FROM victor_states
"#;

/// Repository for the status record.
#[derive(Debug, Clone)]
pub struct StateRepository {
    pool: SqlitePool,
}

impl StateRepository {
    pub fn new(pool: SqlitePool) -> Self {
        StateRepository { pool }
    }

    /// Most recently updated state row, if any.
    pub async fn latest(&self) -> DbResult<Option<VictorState>> {
        let state = sqlx::query_as::<_, VictorState>(&format!(
            "{SELECT_STATE} ORDER BY updated_at DESC, rowid DESC LIMIT 1"
        ))
        .fetch_optional(&self.pool)
        .await?;

        Ok(state)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<VictorState>> {
        let state = sqlx::query_as::<_, VictorState>(&format!("{SELECT_STATE} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(state)
    }

    /// Latest state, creating the seed row on an empty table.
    pub async fn latest_or_seed(&self) -> DbResult<VictorState> {
        if let Some(state) = self.latest().await? {
            return Ok(state);
        }

        info!("No state stored yet, creating seed record");
        let seed = VictorState::seed(Utc::now());
        // DO NOTHING: a concurrent first read may have won the race.
        sqlx::query(
            r#"
            INSERT INTO victor_states (
                id, sanctity, fitness, mode, last_evolution,
                clones_found, revenue_generated, dreams_interpreted,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            ON CONFLICT(id) DO NOTHING
            "#,
        )
        .bind(&seed.id)
        .bind(seed.sanctity)
        .bind(seed.fitness)
        .bind(&seed.mode)
        .bind(seed.last_evolution)
        .bind(seed.clones_found)
        .bind(seed.revenue_generated)
        .bind(seed.dreams_interpreted)
        .bind(seed.created_at)
        .bind(seed.updated_at)
        .execute(&self.pool)
        .await?;

        self.latest()
            .await?
            .ok_or_else(|| DbError::not_found("VictorState", DEFAULT_RECORD_ID))
    }

    /// Creates or updates the row targeted by the patch.
    pub async fn upsert(&self, patch: &StatePatch) -> DbResult<VictorState> {
        let id = patch.record_id();
        debug!(id = %id, "Upserting state");

        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query_as::<_, VictorState>(&format!("{SELECT_STATE} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        let now = Utc::now();
        let state = match existing {
            Some(mut state) => {
                state.apply(patch, now);
                state
            }
            None => VictorState::from_patch(patch, now),
        };

        write_state(&mut *tx, &state).await?;
        tx.commit().await?;

        Ok(state)
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM victor_states")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

async fn write_state(conn: &mut SqliteConnection, state: &VictorState) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO victor_states (
            id, sanctity, fitness, mode, last_evolution,
            clones_found, revenue_generated, dreams_interpreted,
            created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        ON CONFLICT(id) DO UPDATE SET
            sanctity = excluded.sanctity,
            fitness = excluded.fitness,
            mode = excluded.mode,
            last_evolution = excluded.last_evolution,
            clones_found = excluded.clones_found,
            revenue_generated = excluded.revenue_generated,
            dreams_interpreted = excluded.dreams_interpreted,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(&state.id)
    .bind(state.sanctity)
    .bind(state.fitness)
    .bind(&state.mode)
    .bind(state.last_evolution)
    .bind(state.clones_found)
    .bind(state.revenue_generated)
    .bind(state.dreams_interpreted)
    .bind(state.created_at)
    .bind(state.updated_at)
    .execute(conn)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::repository::test_support::memory_db;
    use victor_core::{StatePatch, DEFAULT_RECORD_ID};

    #[tokio::test]
    async fn test_first_read_seeds_exactly_one_row() {
        let db = memory_db().await;

        let first = db.state().latest_or_seed().await.unwrap();
        let second = db.state().latest_or_seed().await.unwrap();

        assert_eq!(first.id, DEFAULT_RECORD_ID);
        assert_eq!(first.mode, "GODCORE");
        assert_eq!(second.id, first.id);
        assert_eq!(db.state().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_upsert_without_id_targets_default_row() {
        let db = memory_db().await;

        let patch = StatePatch {
            mode: Some("focus".to_string()),
            ..Default::default()
        };
        let created = db.state().upsert(&patch).await.unwrap();
        assert_eq!(created.id, DEFAULT_RECORD_ID);
        assert_eq!(created.fitness, 0.0);

        let patch = StatePatch {
            fitness: Some(91.5),
            ..Default::default()
        };
        let updated = db.state().upsert(&patch).await.unwrap();
        assert_eq!(updated.mode, "focus");
        assert_eq!(updated.fitness, 91.5);
        assert_eq!(updated.created_at, created.created_at);

        assert_eq!(db.state().count().await.unwrap(), 1);
        let latest = db.state().latest().await.unwrap().unwrap();
        assert_eq!(latest.fitness, 91.5);
    }

    #[tokio::test]
    async fn test_upsert_with_explicit_id_creates_second_row() {
        let db = memory_db().await;
        db.state().latest_or_seed().await.unwrap();

        let patch = StatePatch {
            id: Some("backup".to_string()),
            sanctity: Some(0.5),
            ..Default::default()
        };
        db.state().upsert(&patch).await.unwrap();

        assert_eq!(db.state().count().await.unwrap(), 2);
        let backup = db.state().get_by_id("backup").await.unwrap().unwrap();
        assert_eq!(backup.sanctity, 0.5);
    }
}
