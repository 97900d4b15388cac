use axum::{
    extract::{State, WebSocketUpgrade},
    response::Response,
};

use crate::AppState;
use crate::ws;

/// Chat WebSocket handler - one connection per chat client
pub async fn chat_websocket_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    let room = state.room.clone();
    let metrics = state.metrics.clone();
    let send_queue = state.config.send_queue;

    ws.on_upgrade(move |socket| ws::handle_chat_ws(socket, room, metrics, send_queue))
}
