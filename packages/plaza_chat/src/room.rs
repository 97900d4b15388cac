//! Chat Room
//!
//! One `ChatRoom` owns all process-wide chat state: the attached connection
//! set, the join registry, and the typing set. The server creates a single
//! room at startup and hands it to every connection handler via `Arc`; tests
//! construct fresh rooms per test. Nothing here is persisted; room state
//! lives exactly as long as the process.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::{RwLock, mpsc};
use tracing::{debug, warn};

use crate::protocol::ServerEvent;

/// Greeting prefix used when none is configured.
pub const DEFAULT_GREETING: &str = "Welcome to the chat";

/// Sender half of a connection's outbound event queue.
pub type RoomSender = mpsc::Sender<ServerEvent>;

/// Fan-out delivery counters. Snapshot-only view is [`FanoutSnapshot`].
#[derive(Debug, Default)]
struct FanoutStats {
    /// Events enqueued to a connection's outbound queue
    events_sent: AtomicU64,
    /// Events dropped because a queue was full or the receiver was gone
    events_dropped: AtomicU64,
}

/// Snapshot of fan-out counters (for serialization/logging)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FanoutSnapshot {
    pub events_sent: u64,
    pub events_dropped: u64,
}

/// Process-wide chat state.
pub struct ChatRoom {
    /// Greeting prefix for the direct welcome message.
    greeting: String,
    /// Every live transport connection, joined or not: connection id -> sender.
    connections: RwLock<HashMap<String, RoomSender>>,
    /// Connection registry: connection id -> joined display name.
    participants: RwLock<HashMap<String, String>>,
    /// Display names currently flagged as typing, in insertion order.
    typing: RwLock<Vec<String>>,
    stats: FanoutStats,
}

impl Default for ChatRoom {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatRoom {
    pub fn new() -> Self {
        Self::with_greeting(DEFAULT_GREETING)
    }

    pub fn with_greeting(greeting: impl Into<String>) -> Self {
        Self {
            greeting: greeting.into(),
            connections: RwLock::new(HashMap::new()),
            participants: RwLock::new(HashMap::new()),
            typing: RwLock::new(Vec::new()),
            stats: FanoutStats::default(),
        }
    }

    // =========================================================================
    // Connection set (transport lifecycle)
    // =========================================================================

    /// Attach a live connection's outbound sender. Called on transport
    /// connect, before any event from the connection is dispatched.
    pub async fn attach(&self, connection_id: &str, tx: RoomSender) {
        self.connections
            .write()
            .await
            .insert(connection_id.to_string(), tx);
    }

    /// Detach a connection's sender. Idempotent.
    pub async fn detach(&self, connection_id: &str) {
        self.connections.write().await.remove(connection_id);
    }

    /// Number of attached connections (joined or not).
    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    // =========================================================================
    // Connection registry
    // =========================================================================

    /// Insert or overwrite the display name mapping for a connection.
    /// Display names are not unique; a duplicate join is last-write-wins.
    pub async fn register(&self, connection_id: &str, display_name: &str) {
        self.participants
            .write()
            .await
            .insert(connection_id.to_string(), display_name.to_string());
    }

    /// Resolve a connection to its joined display name. `None` means the
    /// connection never joined or was already removed; callers treat that as
    /// "ignore the event silently".
    pub async fn resolve(&self, connection_id: &str) -> Option<String> {
        self.participants.read().await.get(connection_id).cloned()
    }

    /// Delete the registry mapping. Idempotent.
    pub async fn remove(&self, connection_id: &str) {
        self.participants.write().await.remove(connection_id);
    }

    /// Display names of currently joined participants, deduplicated and
    /// sorted for stable output.
    pub async fn participant_names(&self) -> Vec<String> {
        let participants = self.participants.read().await;
        let mut names: Vec<String> = participants.values().cloned().collect();
        names.sort();
        names.dedup();
        names
    }

    /// Number of joined connections (name collisions counted per connection).
    pub async fn participant_count(&self) -> usize {
        self.participants.read().await.len()
    }

    // =========================================================================
    // Typing-state tracker
    // =========================================================================

    /// Flag a display name as typing. Idempotent.
    pub async fn mark_typing(&self, display_name: &str) {
        let mut typing = self.typing.write().await;
        if !typing.iter().any(|name| name == display_name) {
            typing.push(display_name.to_string());
        }
    }

    /// Clear a display name's typing flag. Idempotent. With colliding
    /// display names this clears the indicator for every connection that
    /// joined under the name.
    pub async fn clear_typing(&self, display_name: &str) {
        self.typing
            .write()
            .await
            .retain(|name| name != display_name);
    }

    /// Current typing set in insertion order. Consumers must not depend on
    /// the order.
    pub async fn typing_snapshot(&self) -> Vec<String> {
        self.typing.read().await.clone()
    }

    // =========================================================================
    // Room operations (join / chat / typing / disconnect)
    // =========================================================================

    /// Register a connection under a display name and announce the join:
    /// a direct greeting to the joiner, and a join notice to every OTHER
    /// attached connection. The joiner is never notified of their own join.
    pub async fn join(&self, connection_id: &str, display_name: &str) {
        self.register(connection_id, display_name).await;
        self.send_to(
            connection_id,
            ServerEvent::Welcome {
                greeting: format!("{}, {}!", self.greeting, display_name),
            },
        )
        .await;
        self.broadcast_filtered(
            Some(connection_id),
            ServerEvent::ParticipantJoined {
                display_name: display_name.to_string(),
            },
        )
        .await;
    }

    /// Relay a chat message from a connection to every attached connection,
    /// including the sender. A message from an unjoined connection is
    /// dropped silently. Returns whether the message was relayed.
    pub async fn relay(&self, connection_id: &str, body: &str) -> bool {
        let Some(sender_display_name) = self.resolve(connection_id).await else {
            debug!(conn_id = %connection_id, "Dropping chat from unjoined connection");
            return false;
        };
        self.broadcast_filtered(
            None,
            ServerEvent::Chat {
                sender_display_name,
                body: body.to_string(),
                sent_at: Utc::now(),
            },
        )
        .await;
        true
    }

    /// Flag the connection's participant as typing and broadcast the updated
    /// snapshot to every other connection. Dropped silently when unjoined.
    pub async fn start_typing(&self, connection_id: &str) -> bool {
        let Some(display_name) = self.resolve(connection_id).await else {
            debug!(conn_id = %connection_id, "Dropping typing-start from unjoined connection");
            return false;
        };
        self.mark_typing(&display_name).await;
        self.broadcast_typing_update(connection_id).await;
        true
    }

    /// Clear the connection's participant typing flag and broadcast the
    /// updated snapshot to every other connection. Dropped silently when
    /// unjoined.
    pub async fn stop_typing(&self, connection_id: &str) -> bool {
        let Some(display_name) = self.resolve(connection_id).await else {
            debug!(conn_id = %connection_id, "Dropping typing-stop from unjoined connection");
            return false;
        };
        self.clear_typing(&display_name).await;
        self.broadcast_typing_update(connection_id).await;
        true
    }

    /// Tear down a connection. Steps run in a fixed order so a duplicate
    /// disconnect degrades to idempotent no-ops: resolve the display name,
    /// clear its typing entry, drop the registry entry, detach the sender,
    /// then announce the departure to the remaining connections. Detaching
    /// before the announce keeps the leaver out of the recipient set no
    /// matter what the registry held at broadcast time.
    ///
    /// Returns the display name when the connection had joined.
    pub async fn disconnect(&self, connection_id: &str) -> Option<String> {
        let display_name = self.resolve(connection_id).await;
        if let Some(ref name) = display_name {
            self.clear_typing(name).await;
        }
        self.remove(connection_id).await;
        self.detach(connection_id).await;
        if let Some(ref name) = display_name {
            self.broadcast_filtered(
                None,
                ServerEvent::ParticipantLeft {
                    display_name: name.clone(),
                },
            )
            .await;
        }
        display_name
    }

    // =========================================================================
    // Fan-out
    // =========================================================================

    /// Current fan-out counters.
    pub fn stats_snapshot(&self) -> FanoutSnapshot {
        FanoutSnapshot {
            events_sent: self.stats.events_sent.load(Ordering::Relaxed),
            events_dropped: self.stats.events_dropped.load(Ordering::Relaxed),
        }
    }

    async fn broadcast_typing_update(&self, mutator_connection_id: &str) {
        let typing = self.typing_snapshot().await;
        self.broadcast_filtered(
            Some(mutator_connection_id),
            ServerEvent::TypingUpdate { typing },
        )
        .await;
    }

    /// Send one event directly to a single connection.
    async fn send_to(&self, connection_id: &str, event: ServerEvent) {
        let tx = self.connections.read().await.get(connection_id).cloned();
        if let Some(tx) = tx {
            self.deliver(connection_id, &tx, event);
        }
    }

    /// Fan an event out to every attached connection except `skip`.
    ///
    /// The recipient list is a snapshot of the connection set taken at
    /// broadcast time, so connections that detach mid-iteration are
    /// tolerated and a handler-triggered disconnect cannot invalidate the
    /// iteration.
    async fn broadcast_filtered(&self, skip: Option<&str>, event: ServerEvent) {
        let targets: Vec<(String, RoomSender)> = {
            let connections = self.connections.read().await;
            connections
                .iter()
                .filter(|(id, _)| skip != Some(id.as_str()))
                .map(|(id, tx)| (id.clone(), tx.clone()))
                .collect()
        };
        for (connection_id, tx) in targets {
            self.deliver(&connection_id, &tx, event.clone());
        }
    }

    /// Enqueue an event on one connection's outbound queue. A full queue or
    /// a gone receiver drops the event for that recipient only; counted and
    /// logged, never fatal to the rest of the fan-out.
    fn deliver(&self, connection_id: &str, tx: &RoomSender, event: ServerEvent) {
        match tx.try_send(event) {
            Ok(()) => {
                self.stats.events_sent.fetch_add(1, Ordering::Relaxed);
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                self.stats.events_dropped.fetch_add(1, Ordering::Relaxed);
                warn!(conn_id = %connection_id, "Outbound queue full - dropping event");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.stats.events_dropped.fetch_add(1, Ordering::Relaxed);
                debug!(conn_id = %connection_id, "Connection gone mid-broadcast");
            }
        }
    }
}
