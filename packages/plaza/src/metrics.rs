//! Server metrics for observability
//!
//! Runtime counters for monitoring the chat service.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Server-wide metrics
#[derive(Debug, Default)]
pub struct ServerMetrics {
    // Connection metrics
    /// Currently active WebSocket connections
    pub active_connections: AtomicU64,
    /// Total connections since server start
    pub total_connections: AtomicU64,

    // Participant metrics
    /// Join signals accepted since server start
    pub participants_joined: AtomicU64,
    /// Joined connections that have disconnected
    pub participants_left: AtomicU64,

    // Message metrics
    /// Client frames received and parsed
    pub events_received: AtomicU64,
    /// Chat messages relayed to the room
    pub messages_relayed: AtomicU64,

    /// Server start time (for uptime calculation)
    start_time: Option<Instant>,
}

impl ServerMetrics {
    pub fn new() -> Self {
        Self {
            start_time: Some(Instant::now()),
            ..Default::default()
        }
    }

    // Connection tracking
    pub fn connection_opened(&self) {
        self.active_connections.fetch_add(1, Ordering::Relaxed);
        self.total_connections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn connection_closed(&self) {
        self.active_connections.fetch_sub(1, Ordering::Relaxed);
    }

    // Participant tracking
    pub fn participant_joined(&self) {
        self.participants_joined.fetch_add(1, Ordering::Relaxed);
    }

    pub fn participant_left(&self) {
        self.participants_left.fetch_add(1, Ordering::Relaxed);
    }

    // Message tracking
    pub fn event_received(&self) {
        self.events_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn message_relayed(&self) {
        self.messages_relayed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn uptime_secs(&self) -> u64 {
        self.start_time
            .map(|start| start.elapsed().as_secs())
            .unwrap_or(0)
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            connections: ConnectionMetrics {
                active: self.active_connections.load(Ordering::Relaxed),
                total: self.total_connections.load(Ordering::Relaxed),
            },
            participants: ParticipantMetrics {
                joined: self.participants_joined.load(Ordering::Relaxed),
                left: self.participants_left.load(Ordering::Relaxed),
            },
            messages: MessageMetrics {
                events_received: self.events_received.load(Ordering::Relaxed),
                relayed: self.messages_relayed.load(Ordering::Relaxed),
            },
            uptime_secs: self.uptime_secs(),
        }
    }
}

/// Point-in-time view of the server metrics (for serialization)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub connections: ConnectionMetrics,
    pub participants: ParticipantMetrics,
    pub messages: MessageMetrics,
    pub uptime_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionMetrics {
    pub active: u64,
    pub total: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantMetrics {
    pub joined: u64,
    pub left: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageMetrics {
    pub events_received: u64,
    pub relayed: u64,
}

/// Health summary returned by /health
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub connections: u64,
    pub participants: Vec<String>,
    pub uptime_secs: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_counters_track_open_close() {
        let metrics = ServerMetrics::new();
        metrics.connection_opened();
        metrics.connection_opened();
        metrics.connection_closed();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.connections.active, 1);
        assert_eq!(snapshot.connections.total, 2);
    }

    #[test]
    fn snapshot_serializes() {
        let metrics = ServerMetrics::new();
        metrics.event_received();
        metrics.message_relayed();
        let value = serde_json::to_value(metrics.snapshot()).unwrap();
        assert_eq!(value["messages"]["events_received"], 1);
        assert_eq!(value["messages"]["relayed"], 1);
    }
}
