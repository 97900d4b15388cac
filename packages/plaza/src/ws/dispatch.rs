//! Client event dispatcher.
//!
//! One function handles every `ClientEvent` variant for a connection, in
//! receipt order. Events that need a joined participant are dropped silently
//! when the connection has not joined; the client sees nothing.

use plaza_chat::{ChatRoom, ClientEvent};
use tracing::{info, warn};

use crate::metrics::ServerMetrics;

pub(crate) async fn dispatch_client_event(
    room: &ChatRoom,
    connection_id: &str,
    event: ClientEvent,
    metrics: &ServerMetrics,
) {
    match event {
        ClientEvent::Join { display_name } => {
            let display_name = display_name.trim();
            if display_name.is_empty() {
                warn!(conn_id = %connection_id, "Dropping join with empty display name");
                return;
            }
            let rejoin = room.resolve(connection_id).await.is_some();
            room.join(connection_id, display_name).await;
            if !rejoin {
                metrics.participant_joined();
            }
            info!(conn_id = %connection_id, participant = %display_name, "Participant joined the chat");
        }
        ClientEvent::Chat { body } => {
            if room.relay(connection_id, &body).await {
                metrics.message_relayed();
            }
        }
        ClientEvent::TypingStart => {
            room.start_typing(connection_id).await;
        }
        ClientEvent::TypingStop => {
            room.stop_typing(connection_id).await;
        }
    }
}
