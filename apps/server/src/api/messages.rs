//! `/messages`: chat history.

use axum::extract::State;
use axum::Json;
use tracing::debug;

use victor_core::validation::validate_new_message;
use victor_core::{NewMessage, VictorMessage, MESSAGE_HISTORY_LIMIT};

use crate::error::{ApiResult, DbResultExt};
use crate::extract::ApiJson;
use crate::AppState;

/// GET /messages
///
/// The last 50 messages, newest first.
pub async fn list_messages(State(app): State<AppState>) -> ApiResult<Json<Vec<VictorMessage>>> {
    let messages = app
        .db
        .messages()
        .recent(MESSAGE_HISTORY_LIMIT)
        .await
        .or_fail("fetch messages")?;
    Ok(Json(messages))
}

/// POST /messages
pub async fn create_message(
    State(app): State<AppState>,
    ApiJson(msg): ApiJson<NewMessage>,
) -> ApiResult<Json<VictorMessage>> {
    validate_new_message(&msg)?;

    let stored = app
        .db
        .messages()
        .create(msg)
        .await
        .or_fail("create message")?;
    debug!(id = %stored.id, sender = %stored.sender, "Message stored");
    Ok(Json(stored))
}
