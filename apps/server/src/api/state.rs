//! `/state`: the singleton status record.

use axum::extract::State;
use axum::Json;
use tracing::debug;

use victor_core::validation::validate_state_patch;
use victor_core::{StatePatch, VictorState};

use crate::error::{ApiResult, DbResultExt};
use crate::extract::ApiJson;
use crate::AppState;

/// GET /state
///
/// Latest state; the first read stores the seed record.
pub async fn get_state(State(app): State<AppState>) -> ApiResult<Json<VictorState>> {
    let state = app
        .db
        .state()
        .latest_or_seed()
        .await
        .or_fail("fetch Victor state")?;
    Ok(Json(state))
}

/// PUT /state
pub async fn put_state(
    State(app): State<AppState>,
    ApiJson(patch): ApiJson<StatePatch>,
) -> ApiResult<Json<VictorState>> {
    validate_state_patch(&patch)?;
    debug!(id = %patch.record_id(), "Updating Victor state");

    let state = app
        .db
        .state()
        .upsert(&patch)
        .await
        .or_fail("update Victor state")?;
    Ok(Json(state))
}
