//! `/bloodline`: the singleton ownership record.

use axum::extract::State;
use axum::Json;

use victor_core::validation::validate_bloodline_patch;
use victor_core::{BloodlinePatch, BloodlineRecord};

use crate::error::{ApiResult, DbResultExt};
use crate::extract::ApiJson;
use crate::AppState;

/// GET /bloodline
pub async fn get_bloodline(State(app): State<AppState>) -> ApiResult<Json<BloodlineRecord>> {
    let record = app
        .db
        .bloodline()
        .latest_or_seed()
        .await
        .or_fail("fetch bloodline")?;
    Ok(Json(record))
}

/// PUT /bloodline
pub async fn put_bloodline(
    State(app): State<AppState>,
    ApiJson(patch): ApiJson<BloodlinePatch>,
) -> ApiResult<Json<BloodlineRecord>> {
    validate_bloodline_patch(&patch)?;

    let record = app
        .db
        .bloodline()
        .upsert(&patch)
        .await
        .or_fail("update bloodline")?;
    Ok(Json(record))
}
