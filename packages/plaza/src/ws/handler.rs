//! WebSocket connection handler.

use axum::extract::ws::{Message, WebSocket};
use futures::{sink::SinkExt, stream::StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use plaza_chat::{ChatRoom, ClientEvent, ServerEvent};

use super::dispatch::dispatch_client_event;
use crate::metrics::ServerMetrics;

/// Handle one chat WebSocket connection from upgrade to teardown.
///
/// The connection gets a server-assigned id, an outbound queue drained by a
/// writer task, and a reader task that dispatches inbound frames in receipt
/// order. Whichever task ends first (client close, transport error, or the
/// queue receiver going away) tears the connection down; registry and typing
/// cleanup runs unconditionally afterwards.
pub async fn handle_chat_ws(
    socket: WebSocket,
    room: Arc<ChatRoom>,
    metrics: Arc<ServerMetrics>,
    send_queue: usize,
) {
    let connection_id = uuid::Uuid::new_v4().to_string();
    info!(conn_id = %connection_id, "New chat WebSocket connection");
    metrics.connection_opened();

    let (mut ws_sender, mut ws_receiver) = socket.split();

    // Channel for sending events to the WebSocket
    let (tx, mut rx) = mpsc::channel::<ServerEvent>(send_queue);
    room.attach(&connection_id, tx).await;

    // Task to send events to the WebSocket
    let sender_task = async move {
        while let Some(event) = rx.recv().await {
            let json = match serde_json::to_string(&event) {
                Ok(j) => j,
                Err(e) => {
                    error!("Failed to serialize event: {}", e);
                    continue;
                }
            };
            if ws_sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    };

    // Task to handle incoming frames
    let room_input = room.clone();
    let metrics_input = metrics.clone();
    let conn_input = connection_id.clone();
    let input_task = async move {
        while let Some(msg) = ws_receiver.next().await {
            match msg {
                Ok(Message::Text(text)) => match serde_json::from_str::<ClientEvent>(&text) {
                    Ok(event) => {
                        metrics_input.event_received();
                        dispatch_client_event(&room_input, &conn_input, event, &metrics_input)
                            .await;
                    }
                    Err(e) => {
                        warn!(conn_id = %conn_input, "Dropping malformed frame: {}", e);
                    }
                },
                Ok(Message::Close(_)) => {
                    debug!(conn_id = %conn_input, "Client closed connection");
                    break;
                }
                Err(e) => {
                    error!(conn_id = %conn_input, "WebSocket error: {}", e);
                    break;
                }
                _ => {}
            }
        }
    };

    tokio::select! {
        _ = sender_task => debug!(conn_id = %connection_id, "Sender task ended"),
        _ = input_task => debug!(conn_id = %connection_id, "Input task ended"),
    }

    // Registry and typing cleanup must run even when the transport drops
    // without a Close frame.
    match room.disconnect(&connection_id).await {
        Some(display_name) => {
            metrics.participant_left();
            info!(conn_id = %connection_id, participant = %display_name, "Participant left the chat");
        }
        None => debug!(conn_id = %connection_id, "Unjoined connection closed"),
    }
    metrics.connection_closed();
}
