//! Operational HTTP endpoints.
//!
//! - `/healthz` : liveness
//! - `/stats`   : registry sizes (JSON snapshot)

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::app_state::AppState;

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub async fn stats(State(state): State<AppState>) -> impl IntoResponse {
    let broker = state.broker();
    let mut rooms = broker.room_names();
    rooms.sort();
    Json(json!({
        "connections": broker.connection_ids().len(),
        "rooms": rooms,
    }))
}
