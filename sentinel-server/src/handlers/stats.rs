//! Host telemetry endpoints - one-shot snapshot and live WebSocket stream

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
    Json,
};
use tokio::sync::watch;

use crate::telemetry::SystemSnapshot;
use crate::AppState;

/// One-shot snapshot of the most recent telemetry sample
pub async fn stats(State(state): State<AppState>) -> Json<SystemSnapshot> {
    Json(state.stats_rx.borrow().clone())
}

/// Upgrade to a WebSocket that streams a snapshot per collection tick
pub async fn ws_stats(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    let rx = state.stats_rx.clone();
    ws.on_upgrade(move |socket| stream_stats(socket, rx))
}

async fn stream_stats(mut socket: WebSocket, mut rx: watch::Receiver<SystemSnapshot>) {
    tracing::debug!("telemetry subscriber connected");

    loop {
        // Wait for the collector's next publish; a closed channel means the
        // collector task died and there is nothing left to stream.
        if rx.changed().await.is_err() {
            break;
        }

        let snapshot = rx.borrow_and_update().clone();
        let payload = match serde_json::to_string(&snapshot) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!("could not serialize telemetry snapshot: {}", e);
                continue;
            }
        };

        if socket.send(Message::Text(payload)).await.is_err() {
            // Client went away; dropping the receiver detaches cleanly
            break;
        }
    }

    tracing::debug!("telemetry subscriber disconnected");
}
