//! WebSocket handler.
//!
//! Responsibilities:
//! - Upgrade HTTP -> WS (frame size capped before anything is buffered)
//! - Resolve the privilege tag from the `ticket` query parameter
//! - Open the connection actor and join the default room
//! - Run the outbound pump on its own task and the inbound pump on this one

use axum::{
    extract::{ws::WebSocket, ws::WebSocketUpgrade, Query, State},
    response::Response,
};
use futures_util::StreamExt;
use serde::Deserialize;
use tracing::Instrument;

use crate::app_state::AppState;
use crate::realtime::{run_outbound, Connection};

#[derive(Debug, Default, Deserialize)]
pub struct WsQuery {
    #[serde(default)]
    pub ticket: Option<String>,
}

pub async fn ws_upgrade(
    State(app): State<AppState>,
    ws: WebSocketUpgrade,
    Query(q): Query<WsQuery>,
) -> Response {
    let max = app.pump_settings().max_frame_bytes;
    ws.max_message_size(max)
        .max_frame_size(max)
        .on_upgrade(move |socket| run_session(app, q, socket))
}

async fn run_session(app: AppState, q: WsQuery, socket: WebSocket) {
    let privilege = app.tickets().resolve(q.ticket.as_deref());
    let (mut conn, mailbox) = Connection::open(app.broker(), privilege);
    let span = tracing::info_span!("conn", id = %conn.id());
    let limits = app.pump_settings();

    let (ws_tx, ws_rx) = socket.split();
    let writer = tokio::spawn(run_outbound(mailbox, ws_tx, limits).instrument(span.clone()));

    async move {
        let default_room = conn.broker().settings().default_room.clone();
        if let Err(e) = conn.join(&default_room).await {
            tracing::warn!(room = %default_room, code = e.code().as_str(), error = %e, "default room join failed");
        }

        conn.run_inbound(ws_rx, limits, async move {
            let _ = writer.await;
        })
        .await;
    }
    .instrument(span)
    .await;
}
