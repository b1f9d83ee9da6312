//! Registry error types
//!
//! None of these are fatal: the session controller turns each into an
//! outbound notification or a log line.

use super::key::ConnectionId;

/// Error type for registry operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A join was requested while no stream is live
    NoLiveStream,
    /// The connection is not (or no longer) registered
    UnknownConnection(ConnectionId),
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryError::NoLiveStream => write!(f, "No live stream"),
            RegistryError::UnknownConnection(id) => write!(f, "Unknown connection: {}", id),
        }
    }
}

impl std::error::Error for RegistryError {}
