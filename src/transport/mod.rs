//! Transport abstraction
//!
//! The session controller only produces deliveries; a [`Transport`] carries
//! them out. Delivery is fire-and-forget: implementations must not block, and
//! a failed delivery is reported, never retried.

pub mod hub;

use std::fmt;

use crate::protocol::ServerMessage;
use crate::registry::ConnectionId;

pub use hub::ConnectionHub;

/// Why a single delivery did not happen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    /// No connection with that id is attached
    UnknownTarget(ConnectionId),
    /// The connection's outbound queue is full
    QueueFull(ConnectionId),
    /// The connection's writer has gone away
    Closed(ConnectionId),
    /// The message could not be serialized
    Encode(String),
}

impl fmt::Display for DeliveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryError::UnknownTarget(id) => write!(f, "Unknown target: {}", id),
            DeliveryError::QueueFull(id) => write!(f, "Outbound queue full: {}", id),
            DeliveryError::Closed(id) => write!(f, "Connection closed: {}", id),
            DeliveryError::Encode(e) => write!(f, "Failed to encode message: {}", e),
        }
    }
}

impl std::error::Error for DeliveryError {}

/// Outcome of a broadcast
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Connections the message was handed to
    pub delivered: usize,
    /// Connections the hand-off failed for
    pub dropped: usize,
}

/// Delivers outbound messages to connections
pub trait Transport {
    /// Deliver `message` to one connection
    fn send(&mut self, to: ConnectionId, message: &ServerMessage) -> Result<(), DeliveryError>;

    /// Deliver `message` to every connection not listed in `except`
    fn broadcast_except(&mut self, message: &ServerMessage, except: &[ConnectionId])
        -> BroadcastReport;

    /// Deliver `message` to every connection
    fn broadcast(&mut self, message: &ServerMessage) -> BroadcastReport {
        self.broadcast_except(message, &[])
    }

    /// Stop delivering to a connection that is being removed
    ///
    /// Called before the removal is applied. Afterwards every delivery to
    /// `id` must fail with [`DeliveryError::UnknownTarget`].
    fn release(&mut self, _id: ConnectionId) {}
}
