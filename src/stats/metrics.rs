//! Statistics for the relay

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::registry::ConnectionRegistry;

/// Relay-wide counters
///
/// Updated without taking the relay lock; combined with registry gauges by
/// [`RelayMetrics::snapshot`].
#[derive(Debug)]
pub struct RelayMetrics {
    started_at: Instant,
    connections_total: AtomicU64,
    messages_routed: AtomicU64,
    deliveries_dropped: AtomicU64,
}

impl RelayMetrics {
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
            connections_total: AtomicU64::new(0),
            messages_routed: AtomicU64::new(0),
            deliveries_dropped: AtomicU64::new(0),
        }
    }

    /// Count an accepted connection
    pub fn record_connection(&self) {
        self.connections_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a handshake or chat message handed to a recipient
    pub fn record_routed(&self, n: u64) {
        self.messages_routed.fetch_add(n, Ordering::Relaxed);
    }

    /// Count deliveries that could not be handed off
    pub fn record_dropped(&self, n: u64) {
        self.deliveries_dropped.fetch_add(n, Ordering::Relaxed);
    }

    /// Combine counters with the registry's current gauges
    pub fn snapshot(&self, registry: &ConnectionRegistry) -> RelayStats {
        RelayStats {
            total_connections: self.connections_total.load(Ordering::Relaxed),
            active_connections: registry.connection_count() as u64,
            live_streams: registry.stream_count() as u64,
            bound_viewers: registry.binding_count() as u64,
            messages_routed: self.messages_routed.load(Ordering::Relaxed),
            deliveries_dropped: self.deliveries_dropped.load(Ordering::Relaxed),
            uptime: self.started_at.elapsed(),
        }
    }
}

impl Default for RelayMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time relay statistics
#[derive(Debug, Clone, Default)]
pub struct RelayStats {
    /// Connections accepted since start
    pub total_connections: u64,
    /// Currently registered connections
    pub active_connections: u64,
    /// Streams currently live
    pub live_streams: u64,
    /// Viewer bindings across all streams
    pub bound_viewers: u64,
    /// Offers, answers, candidates and chat lines handed to recipients
    pub messages_routed: u64,
    /// Deliveries dropped (stale target or full queue)
    pub deliveries_dropped: u64,
    /// Time since the relay was created
    pub uptime: Duration,
}
