//! Connection registry implementation
//!
//! The single owner of connection roles, live streams and viewer bindings.
//! Every operation keeps the stream viewer sets and the reverse
//! viewer → streamer map mutually consistent, so callers cannot observe one
//! without the other.

use std::collections::HashMap;

use super::entry::{Connection, JoinOutcome, Removal, Role, StreamEntry};
use super::error::RegistryError;
use super::key::ConnectionId;

/// Registry of connections, streams and viewer bindings
///
/// Not synchronized on its own; the relay keeps it behind one lock together
/// with the transport so that every event is applied atomically.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    /// All registered connections
    connections: HashMap<ConnectionId, Connection>,

    /// Streams keyed by streamer id
    streams: HashMap<ConnectionId, StreamEntry>,

    /// Streamer ids in the order their streams were created
    stream_order: Vec<ConnectionId>,

    /// Reverse binding: viewer id -> streamer id
    bindings: HashMap<ConnectionId, ConnectionId>,
}

impl ConnectionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a freshly connected transport connection as unbound
    ///
    /// Returns false if the id was already registered.
    pub fn register_connection(&mut self, id: ConnectionId) -> bool {
        if self.connections.contains_key(&id) {
            return false;
        }
        self.connections.insert(id, Connection::new(id));
        tracing::debug!(connection_id = %id, "Connection registered");
        true
    }

    /// Whether the connection is registered
    pub fn contains(&self, id: ConnectionId) -> bool {
        self.connections.contains_key(&id)
    }

    /// Role of a registered connection
    pub fn role(&self, id: ConnectionId) -> Option<Role> {
        self.connections.get(&id).map(|c| c.role)
    }

    /// Create or reactivate the stream owned by `id`
    ///
    /// Repeating the call on a live stream only reasserts `is_live`; the
    /// viewer set and the stream's position in selection order are kept.
    /// Returns true when a new stream was created.
    pub fn register_streamer_ready(&mut self, id: ConnectionId) -> Result<bool, RegistryError> {
        let conn = self
            .connections
            .get_mut(&id)
            .ok_or(RegistryError::UnknownConnection(id))?;
        conn.role = Role::Streamer;

        if let Some(entry) = self.streams.get_mut(&id) {
            entry.is_live = true;
            tracing::info!(
                streamer_id = %id,
                viewers = entry.viewer_count(),
                "Streamer ready (existing stream)"
            );
            return Ok(false);
        }

        self.streams.insert(id, StreamEntry::new(id));
        self.stream_order.push(id);

        tracing::info!(
            streamer_id = %id,
            streams = self.streams.len(),
            "Streamer ready (new stream)"
        );
        Ok(true)
    }

    /// First live stream in creation order
    pub fn find_live_stream(&self) -> Option<ConnectionId> {
        self.stream_order
            .iter()
            .copied()
            .find(|id| self.streams.get(id).is_some_and(|s| s.is_live))
    }

    /// Bind `viewer_id` to the selected live stream
    ///
    /// A viewer already bound to a different stream is unbound from it first.
    /// With first-live selection a bound viewer always re-selects its own
    /// stream; the rebind only happens once selection can reorder streams.
    pub fn join_viewer(&mut self, viewer_id: ConnectionId) -> Result<JoinOutcome, RegistryError> {
        if !self.connections.contains_key(&viewer_id) {
            return Err(RegistryError::UnknownConnection(viewer_id));
        }
        let streamer_id = self.find_live_stream().ok_or(RegistryError::NoLiveStream)?;

        let previous_streamer = match self.bindings.get(&viewer_id).copied() {
            Some(prev) if prev != streamer_id => {
                self.unbind(viewer_id);
                Some(prev)
            }
            _ => None,
        };

        let entry = self
            .streams
            .get_mut(&streamer_id)
            .ok_or(RegistryError::NoLiveStream)?;
        entry.viewers.insert(viewer_id);
        let viewer_count = entry.viewer_count();
        self.bindings.insert(viewer_id, streamer_id);

        if let Some(conn) = self.connections.get_mut(&viewer_id) {
            if conn.role == Role::Unbound {
                conn.role = Role::Viewer;
            }
        }

        tracing::info!(
            viewer_id = %viewer_id,
            streamer_id = %streamer_id,
            viewers = viewer_count,
            "Viewer joined"
        );

        Ok(JoinOutcome {
            streamer_id,
            viewer_count,
            previous_streamer,
        })
    }

    /// Remove a connection and everything that hangs off it
    ///
    /// A streamer's stream is destroyed and all its viewers are unbound; a
    /// viewer leaves its stream. Unknown ids are a no-op.
    pub fn remove_connection(&mut self, id: ConnectionId) -> Removal {
        let mut removal = Removal::default();

        let Some(conn) = self.connections.remove(&id) else {
            return removal;
        };
        tracing::debug!(
            connection_id = %id,
            connected_for = ?conn.connected_at.elapsed(),
            "Connection removed"
        );

        if let Some(entry) = self.streams.remove(&id) {
            self.stream_order.retain(|s| *s != id);
            let former: Vec<ConnectionId> = entry.viewers.into_iter().collect();
            for viewer in &former {
                self.bindings.remove(viewer);
                if let Some(conn) = self.connections.get_mut(viewer) {
                    if conn.role == Role::Viewer {
                        conn.role = Role::Unbound;
                    }
                }
            }
            tracing::info!(
                streamer_id = %id,
                viewers = former.len(),
                streams = self.streams.len(),
                live_for = ?entry.created_at.elapsed(),
                "Stream removed"
            );
            removal.former_viewers = Some(former);
        }

        removal.watched_streamer = self.unbind(id);
        removal
    }

    /// Viewer count of a stream, 0 if it does not exist
    pub fn viewer_count(&self, streamer_id: ConnectionId) -> usize {
        self.streams
            .get(&streamer_id)
            .map_or(0, StreamEntry::viewer_count)
    }

    /// Get a stream by streamer id
    pub fn stream(&self, streamer_id: ConnectionId) -> Option<&StreamEntry> {
        self.streams.get(&streamer_id)
    }

    /// Whether `id` owns a live stream
    pub fn is_live_streamer(&self, id: ConnectionId) -> bool {
        self.streams.get(&id).is_some_and(|s| s.is_live)
    }

    /// Streamer a viewer is bound to
    pub fn streamer_of(&self, viewer_id: ConnectionId) -> Option<ConnectionId> {
        self.bindings.get(&viewer_id).copied()
    }

    /// Number of registered connections
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Number of streams
    pub fn stream_count(&self) -> usize {
        self.streams.len()
    }

    /// Number of viewer bindings across all streams
    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }

    /// Check that viewer sets and reverse bindings mirror each other
    pub fn is_consistent(&self) -> bool {
        let forward_ok = self.streams.iter().all(|(streamer, entry)| {
            entry
                .viewers
                .iter()
                .all(|v| self.bindings.get(v) == Some(streamer))
        });
        let reverse_ok = self.bindings.iter().all(|(viewer, streamer)| {
            self.streams
                .get(streamer)
                .is_some_and(|s| s.viewers.contains(viewer))
        });
        let order_ok = self.stream_order.len() == self.streams.len()
            && self.stream_order.iter().all(|s| self.streams.contains_key(s));

        forward_ok && reverse_ok && order_ok
    }

    /// Move a stream to the front of selection order
    #[cfg(test)]
    pub(crate) fn promote_stream(&mut self, streamer_id: ConnectionId) {
        if let Some(pos) = self.stream_order.iter().position(|s| *s == streamer_id) {
            let id = self.stream_order.remove(pos);
            self.stream_order.insert(0, id);
        }
    }

    /// Drop a viewer's binding and its viewer-set membership
    ///
    /// Returns the streamer it was bound to, if any.
    fn unbind(&mut self, viewer_id: ConnectionId) -> Option<ConnectionId> {
        let streamer_id = self.bindings.remove(&viewer_id)?;
        if let Some(entry) = self.streams.get_mut(&streamer_id) {
            entry.viewers.remove(&viewer_id);
            tracing::info!(
                viewer_id = %viewer_id,
                streamer_id = %streamer_id,
                viewers = entry.viewer_count(),
                "Viewer left"
            );
        }
        Some(streamer_id)
    }
}

#[cfg(test)]
mod tests {
    use tokio_test::{assert_err, assert_ok};

    use super::*;

    fn id(raw: u64) -> ConnectionId {
        ConnectionId::new(raw)
    }

    fn registry_with(ids: &[u64]) -> ConnectionRegistry {
        let mut registry = ConnectionRegistry::new();
        for raw in ids {
            assert!(registry.register_connection(id(*raw)));
        }
        registry
    }

    #[test]
    fn test_register_connection_is_unbound() {
        let mut registry = registry_with(&[1]);

        assert_eq!(registry.role(id(1)), Some(Role::Unbound));
        assert!(!registry.register_connection(id(1)));
        assert_eq!(registry.connection_count(), 1);
    }

    #[test]
    fn test_ready_creates_live_stream() {
        let mut registry = registry_with(&[1]);

        let created = assert_ok!(registry.register_streamer_ready(id(1)));
        assert!(created);
        assert_eq!(registry.role(id(1)), Some(Role::Streamer));
        assert!(registry.is_live_streamer(id(1)));
        assert_eq!(registry.find_live_stream(), Some(id(1)));
    }

    #[test]
    fn test_ready_unknown_connection() {
        let mut registry = ConnectionRegistry::new();

        let err = assert_err!(registry.register_streamer_ready(id(9)));
        assert_eq!(err, RegistryError::UnknownConnection(id(9)));
        assert_eq!(registry.stream_count(), 0);
    }

    #[test]
    fn test_ready_twice_is_idempotent() {
        let mut registry = registry_with(&[1, 2]);

        registry.register_streamer_ready(id(1)).unwrap();
        registry.join_viewer(id(2)).unwrap();
        let created = registry.register_streamer_ready(id(1)).unwrap();

        assert!(!created);
        assert_eq!(registry.stream_count(), 1);
        assert_eq!(registry.viewer_count(id(1)), 1);
        assert!(registry.is_consistent());
    }

    #[test]
    fn test_first_ready_stream_wins() {
        let mut registry = registry_with(&[1, 2, 3]);

        registry.register_streamer_ready(id(2)).unwrap();
        registry.register_streamer_ready(id(1)).unwrap();

        for _ in 0..5 {
            assert_eq!(registry.find_live_stream(), Some(id(2)));
        }
        assert_eq!(registry.join_viewer(id(3)).unwrap().streamer_id, id(2));

        // Re-announcing does not move a stream to the back
        registry.register_streamer_ready(id(2)).unwrap();
        assert_eq!(registry.find_live_stream(), Some(id(2)));

        registry.remove_connection(id(2));
        assert_eq!(registry.find_live_stream(), Some(id(1)));
    }

    #[test]
    fn test_join_without_stream() {
        let mut registry = registry_with(&[1]);

        let err = assert_err!(registry.join_viewer(id(1)));
        assert_eq!(err, RegistryError::NoLiveStream);
        assert_eq!(registry.role(id(1)), Some(Role::Unbound));
        assert_eq!(registry.binding_count(), 0);
    }

    #[test]
    fn test_join_binds_both_ways() {
        let mut registry = registry_with(&[1, 2]);
        registry.register_streamer_ready(id(1)).unwrap();

        let outcome = registry.join_viewer(id(2)).unwrap();

        assert_eq!(outcome.streamer_id, id(1));
        assert_eq!(outcome.viewer_count, 1);
        assert_eq!(outcome.previous_streamer, None);
        assert_eq!(registry.streamer_of(id(2)), Some(id(1)));
        assert!(registry.stream(id(1)).unwrap().has_viewer(id(2)));
        assert_eq!(registry.role(id(2)), Some(Role::Viewer));
        assert!(registry.is_consistent());
    }

    #[test]
    fn test_rejoin_same_stream_is_idempotent() {
        let mut registry = registry_with(&[1, 2]);
        registry.register_streamer_ready(id(1)).unwrap();

        registry.join_viewer(id(2)).unwrap();
        let outcome = registry.join_viewer(id(2)).unwrap();

        assert_eq!(outcome.viewer_count, 1);
        assert_eq!(outcome.previous_streamer, None);
        assert!(registry.is_consistent());
    }

    #[test]
    fn test_rejoin_after_streamer_left() {
        let mut registry = registry_with(&[1, 2, 3]);
        registry.register_streamer_ready(id(1)).unwrap();
        registry.register_streamer_ready(id(2)).unwrap();

        registry.join_viewer(id(3)).unwrap();
        registry.remove_connection(id(1));
        assert_eq!(registry.streamer_of(id(3)), None);

        let outcome = registry.join_viewer(id(3)).unwrap();
        assert_eq!(outcome.streamer_id, id(2));
        assert!(registry.is_consistent());
    }

    #[test]
    fn test_rejoin_moves_viewer_to_selected_stream() {
        let mut registry = registry_with(&[1, 2, 3]);
        registry.register_streamer_ready(id(1)).unwrap();
        registry.register_streamer_ready(id(2)).unwrap();
        registry.join_viewer(id(3)).unwrap();

        registry.promote_stream(id(2));
        let outcome = registry.join_viewer(id(3)).unwrap();

        assert_eq!(outcome.streamer_id, id(2));
        assert_eq!(outcome.previous_streamer, Some(id(1)));
        assert_eq!(outcome.viewer_count, 1);
        assert_eq!(registry.viewer_count(id(1)), 0);
        assert_eq!(registry.streamer_of(id(3)), Some(id(2)));
        assert!(registry.is_consistent());
    }

    #[test]
    fn test_self_view_counts_streamer() {
        let mut registry = registry_with(&[1]);
        registry.register_streamer_ready(id(1)).unwrap();

        let outcome = registry.join_viewer(id(1)).unwrap();

        assert_eq!(outcome.streamer_id, id(1));
        assert_eq!(outcome.viewer_count, 1);
        assert_eq!(registry.viewer_count(id(1)), 1);
        // Streamer role is kept
        assert_eq!(registry.role(id(1)), Some(Role::Streamer));
        assert!(registry.is_consistent());
    }

    #[test]
    fn test_remove_streamer_cascades() {
        let mut registry = registry_with(&[1, 2, 3]);
        registry.register_streamer_ready(id(1)).unwrap();
        registry.join_viewer(id(2)).unwrap();
        registry.join_viewer(id(3)).unwrap();

        let removal = registry.remove_connection(id(1));

        assert!(removal.was_streamer());
        assert_eq!(removal.former_viewers, Some(vec![id(2), id(3)]));
        assert_eq!(removal.watched_streamer, None);
        assert_eq!(registry.stream_count(), 0);
        assert_eq!(registry.binding_count(), 0);
        assert_eq!(registry.streamer_of(id(2)), None);
        assert_eq!(registry.role(id(2)), Some(Role::Unbound));
        assert!(!registry.contains(id(1)));
        assert!(registry.is_consistent());
    }

    #[test]
    fn test_remove_self_viewing_streamer() {
        let mut registry = registry_with(&[1, 2]);
        registry.register_streamer_ready(id(1)).unwrap();
        registry.join_viewer(id(1)).unwrap();
        registry.join_viewer(id(2)).unwrap();

        let removal = registry.remove_connection(id(1));

        assert_eq!(removal.former_viewers, Some(vec![id(1), id(2)]));
        assert_eq!(removal.watched_streamer, None);
        assert_eq!(registry.binding_count(), 0);
        assert!(registry.is_consistent());
    }

    #[test]
    fn test_remove_viewer() {
        let mut registry = registry_with(&[1, 2]);
        registry.register_streamer_ready(id(1)).unwrap();
        registry.join_viewer(id(2)).unwrap();

        let removal = registry.remove_connection(id(2));

        assert!(!removal.was_streamer());
        assert_eq!(removal.watched_streamer, Some(id(1)));
        assert_eq!(registry.viewer_count(id(1)), 0);
        assert!(registry.is_consistent());
    }

    #[test]
    fn test_remove_unbound_and_unknown() {
        let mut registry = registry_with(&[1]);

        assert_eq!(registry.remove_connection(id(1)), Removal::default());
        assert_eq!(registry.remove_connection(id(42)), Removal::default());
        assert_eq!(registry.connection_count(), 0);
    }

    #[test]
    fn test_streamer_watching_other_stream() {
        let mut registry = registry_with(&[1, 2]);
        registry.register_streamer_ready(id(1)).unwrap();
        registry.join_viewer(id(2)).unwrap();
        registry.register_streamer_ready(id(2)).unwrap();

        let removal = registry.remove_connection(id(2));

        assert_eq!(removal.former_viewers, Some(vec![]));
        assert_eq!(removal.watched_streamer, Some(id(1)));
        assert_eq!(registry.viewer_count(id(1)), 0);
        assert!(registry.is_consistent());
    }

    #[test]
    fn test_viewer_count_tracks_survivors() {
        let mut registry = registry_with(&[1]);
        registry.register_streamer_ready(id(1)).unwrap();

        let joins = 20u64;
        for raw in 2..2 + joins {
            registry.register_connection(id(raw));
            registry.join_viewer(id(raw)).unwrap();
            // Every third viewer leaves right after the next one joins
            if raw % 3 == 0 {
                registry.remove_connection(id(raw - 1));
            }
            assert!(registry.is_consistent());
        }

        // 20 joined, 2, 5, 8, 11, 14, 17 and 20 left
        assert_eq!(registry.viewer_count(id(1)), 13);
        assert_eq!(registry.binding_count(), 13);
        for raw in 2..2 + joins {
            let expected = if raw % 3 == 2 { None } else { Some(id(1)) };
            assert_eq!(registry.streamer_of(id(raw)), expected);
        }
    }

    #[test]
    fn test_viewer_count_absent_stream() {
        let registry = ConnectionRegistry::new();
        assert_eq!(registry.viewer_count(id(7)), 0);
    }
}
