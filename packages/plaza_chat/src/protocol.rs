//! Chat Protocol Types
//!
//! Message types for client-server communication over the chat WebSocket.
//! Every frame is a JSON object tagged with a `type` field.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Messages sent FROM the client TO the server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientEvent {
    /// Enter the room under a display name.
    ///
    /// Display names are not validated for uniqueness; two connections may
    /// join under the same name. A repeated Join on the same connection
    /// overwrites the previous name (last write wins) and re-announces.
    Join { display_name: String },
    /// Send a chat message to the room. The body is opaque text.
    Chat { body: String },
    /// Start showing this participant in the typing indicator.
    TypingStart,
    /// Stop showing this participant in the typing indicator.
    TypingStop,
}

/// Messages sent FROM the server TO the client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    /// Direct greeting, delivered only to the connection that just joined.
    Welcome { greeting: String },
    /// Another participant joined the room. Never delivered to the joiner
    /// for their own join.
    ParticipantJoined { display_name: String },
    /// A participant left the room.
    ParticipantLeft { display_name: String },
    /// A relayed chat message, stamped with the sender identity and the
    /// server receipt time. Delivered to every connection including the
    /// sender; the self-echo confirms server-side delivery.
    Chat {
        sender_display_name: String,
        body: String,
        sent_at: DateTime<Utc>,
    },
    /// Current typing snapshot. Delivered to every connection except the
    /// one whose typing state changed. Order is insertion order and carries
    /// no meaning.
    TypingUpdate { typing: Vec<String> },
}
