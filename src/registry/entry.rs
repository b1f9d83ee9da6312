//! Connection and stream entry types
//!
//! This module defines the per-connection and per-stream state stored in the
//! registry.

use std::collections::BTreeSet;
use std::time::Instant;

use super::key::ConnectionId;

/// Role a connection has announced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Connected, no role announced yet
    Unbound,
    /// Announced readiness to stream
    Streamer,
    /// Joined a live stream
    Viewer,
}

/// A registered transport connection
#[derive(Debug, Clone)]
pub struct Connection {
    /// Connection identifier
    pub id: ConnectionId,

    /// Current role
    pub role: Role,

    /// When the transport registered the connection
    pub connected_at: Instant,
}

impl Connection {
    pub(super) fn new(id: ConnectionId) -> Self {
        Self {
            id,
            role: Role::Unbound,
            connected_at: Instant::now(),
        }
    }
}

/// Entry for one streamer's broadcast
///
/// Keyed by the streamer's connection id, so there is at most one entry per
/// streamer.
#[derive(Debug, Clone)]
pub struct StreamEntry {
    /// The streamer's connection id, doubling as the stream identity
    pub streamer_id: ConnectionId,

    /// Whether the stream is live
    pub is_live: bool,

    /// Connections currently watching, ordered by connection id
    ///
    /// May contain the streamer itself when it joined its own stream.
    pub(super) viewers: BTreeSet<ConnectionId>,

    /// When readiness was first announced
    pub created_at: Instant,
}

impl StreamEntry {
    pub(super) fn new(streamer_id: ConnectionId) -> Self {
        Self {
            streamer_id,
            is_live: true,
            viewers: BTreeSet::new(),
            created_at: Instant::now(),
        }
    }

    /// Number of connections in the viewer set
    pub fn viewer_count(&self) -> usize {
        self.viewers.len()
    }

    /// Iterate the viewer set in connection order
    pub fn viewers(&self) -> impl Iterator<Item = ConnectionId> + '_ {
        self.viewers.iter().copied()
    }

    /// Whether `id` is in the viewer set
    pub fn has_viewer(&self, id: ConnectionId) -> bool {
        self.viewers.contains(&id)
    }
}

/// Result of a successful join
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinOutcome {
    /// Streamer the viewer is now bound to
    pub streamer_id: ConnectionId,

    /// Viewer count of that stream after the join
    pub viewer_count: usize,

    /// Streamer the viewer was bound to before, if it was a different one
    pub previous_streamer: Option<ConnectionId>,
}

/// What a connection left behind when it was removed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Removal {
    /// Former viewers of the connection's stream, if it was a streamer
    ///
    /// Their bindings have already been cleared.
    pub former_viewers: Option<Vec<ConnectionId>>,

    /// Streamer the connection was watching, if that stream still exists
    pub watched_streamer: Option<ConnectionId>,
}

impl Removal {
    /// Whether the connection owned a stream
    pub fn was_streamer(&self) -> bool {
        self.former_viewers.is_some()
    }
}
