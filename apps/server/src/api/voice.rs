//! `/voice`: answer a spoken command.

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use ts_rs::TS;

use victor_core::validation::validate_voice_command;

use crate::error::ApiResult;
use crate::extract::ApiJson;
use crate::voice::respond_or_fallback;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct VoiceRequest {
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub context: Value,
}

#[derive(Debug, Serialize, TS)]
#[ts(export)]
pub struct VoiceReply {
    pub response: String,
    pub command: String,
    #[ts(as = "String")]
    pub timestamp: DateTime<Utc>,
}

/// POST /voice
///
/// 400 when `command` is missing or blank. A failing responder still
/// answers 200 with the fallback reply.
pub async fn voice_command(
    State(app): State<AppState>,
    ApiJson(request): ApiJson<VoiceRequest>,
) -> ApiResult<Json<VoiceReply>> {
    let command = validate_voice_command(request.command.as_deref().unwrap_or_default())?;

    let response = respond_or_fallback(app.voice.as_ref(), &command, &request.context).await;
    info!(command = %command, response = %response, "Voice command processed");

    Ok(Json(VoiceReply {
        response,
        command,
        timestamp: Utc::now(),
    }))
}
