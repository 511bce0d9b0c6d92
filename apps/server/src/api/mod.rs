//! REST handlers mounted under `/api/victor`.
//!
//! | Module        | Routes                                              |
//! |---------------|-----------------------------------------------------|
//! | [`state`]     | `/state`                                            |
//! | [`messages`]  | `/messages`                                         |
//! | [`threats`]   | `/threats`, `/threats/scan`, `/threats/level`       |
//! | [`catalog`]   | `/timelines`, `/evolution`, `/hologram`, `/location`,|
//! |               | `/device`                                           |
//! | [`parity`]    | `/parity`                                           |
//! | [`bloodline`] | `/bloodline`                                        |
//! | [`voice`]     | `/voice`                                            |
//! | [`sync`]      | `/sync/download`, `/sync/upload`                    |
//! | [`system`]    | `/relay/status`, `/health`                          |

pub mod bloodline;
pub mod catalog;
pub mod messages;
pub mod parity;
pub mod state;
pub mod sync;
pub mod system;
pub mod threats;
pub mod voice;

use axum::routing::{get, post};
use axum::Router;

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/state", get(state::get_state).put(state::put_state))
        .route(
            "/messages",
            get(messages::list_messages).post(messages::create_message),
        )
        .route(
            "/threats",
            get(threats::list_threats)
                .post(threats::create_threat)
                .put(threats::update_threat),
        )
        .route("/threats/scan", post(threats::scan))
        .route("/threats/level", get(threats::level))
        .route("/timelines", get(catalog::timelines))
        .route("/evolution", get(catalog::evolution))
        .route("/hologram", get(catalog::hologram))
        .route("/location", get(catalog::location))
        .route("/device", get(catalog::device))
        .route("/parity", get(parity::get_parity).post(parity::create_parity))
        .route(
            "/bloodline",
            get(bloodline::get_bloodline).put(bloodline::put_bloodline),
        )
        .route("/voice", post(voice::voice_command))
        .route("/sync/download", get(sync::download))
        .route("/sync/upload", post(sync::upload))
        .route("/relay/status", get(system::relay_status))
        .route("/health", get(system::health))
}
