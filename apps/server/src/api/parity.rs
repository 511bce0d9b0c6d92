//! `/parity`: append-only parity measurements.

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use ts_rs::TS;

use victor_core::validation::validate_new_parity;
use victor_core::{NewParityState, ParityState};

use crate::error::{ApiError, ApiResult, DbResultExt};
use crate::extract::ApiJson;
use crate::AppState;

/// A parity row with its stabilizer column parsed back into JSON.
///
/// This is the shape clients see; the stored row keeps stabilizers as text.
#[derive(Debug, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ParityView {
    pub id: String,
    #[ts(type = "Array<unknown>")]
    pub stabilizers: Vec<Value>,
    pub measurements: i64,
    pub entropy: f64,
    pub coherence: f64,
    #[ts(as = "String")]
    pub timestamp: DateTime<Utc>,
}

impl ParityView {
    fn from_record(record: ParityState, operation: &str) -> ApiResult<Self> {
        let stabilizers = record
            .stabilizer_values()
            .map_err(|e| ApiError::from_core(operation, e))?;
        Ok(ParityView {
            id: record.id,
            stabilizers,
            measurements: record.measurements,
            entropy: record.entropy,
            coherence: record.coherence,
            timestamp: record.timestamp,
        })
    }
}

/// GET /parity
pub async fn get_parity(State(app): State<AppState>) -> ApiResult<Json<ParityView>> {
    const OP: &str = "fetch parity state";
    let record = app.db.parity().latest_or_seed().await.or_fail(OP)?;
    Ok(Json(ParityView::from_record(record, OP)?))
}

/// POST /parity
pub async fn create_parity(
    State(app): State<AppState>,
    ApiJson(input): ApiJson<NewParityState>,
) -> ApiResult<Json<ParityView>> {
    const OP: &str = "create parity state";
    validate_new_parity(&input)?;

    let record = app.db.parity().create(input).await.or_fail(OP)?;
    Ok(Json(ParityView::from_record(record, OP)?))
}
