//! `/sync`: offline snapshot and upload.

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use tracing::debug;
use ts_rs::TS;

use victor_core::validation::{validate_new_message, validate_new_threat};
use victor_core::{OfflineBundle, OfflineSummary};
use victor_db::ImportSummary;

use crate::error::{ApiResult, DbResultExt};
use crate::extract::ApiJson;
use crate::AppState;

/// GET /sync/download
pub async fn download(State(app): State<AppState>) -> ApiResult<Json<OfflineSummary>> {
    let summary = app
        .db
        .offline()
        .summary()
        .await
        .or_fail("fetch offline data")?;
    Ok(Json(summary))
}

#[derive(Debug, Serialize, TS)]
#[ts(export)]
pub struct UploadReply {
    pub success: bool,
    pub message: String,
    pub imported: ImportSummary,
}

/// POST /sync/upload
///
/// Validates everything first, then writes it in one transaction.
pub async fn upload(
    State(app): State<AppState>,
    ApiJson(bundle): ApiJson<OfflineBundle>,
) -> ApiResult<Json<UploadReply>> {
    for msg in &bundle.messages {
        validate_new_message(msg)?;
    }
    for threat in &bundle.threats {
        validate_new_threat(threat)?;
    }

    if bundle.is_empty() {
        debug!("Empty offline upload");
        return Ok(Json(UploadReply {
            success: true,
            message: "Nothing to sync.".to_string(),
            imported: ImportSummary::default(),
        }));
    }

    let imported = app
        .db
        .offline()
        .import(bundle)
        .await
        .or_fail("sync offline data")?;

    Ok(Json(UploadReply {
        success: true,
        message: "Sync complete.".to_string(),
        imported,
    }))
}
