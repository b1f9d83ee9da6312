//! Inbound events and outbound effects of the session controller

use crate::protocol::{ClientMessage, ServerMessage};
use crate::registry::ConnectionId;

/// Event delivered by the transport
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    /// A transport connection was established
    Connected(ConnectionId),

    /// A decoded client message arrived on a connection
    Message {
        from: ConnectionId,
        message: ClientMessage,
    },

    /// A transport connection went away
    Disconnected(ConnectionId),
}

/// Delivery the transport should perform
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    /// Deliver to one connection
    Send {
        to: ConnectionId,
        message: ServerMessage,
    },

    /// Deliver to every connected party except the listed ones
    Broadcast {
        message: ServerMessage,
        except: Vec<ConnectionId>,
    },
}

impl Outbound {
    /// Deliver `message` to `to` only
    pub fn send(to: ConnectionId, message: ServerMessage) -> Self {
        Outbound::Send { to, message }
    }

    /// Deliver `message` to everyone
    pub fn broadcast(message: ServerMessage) -> Self {
        Outbound::Broadcast {
            message,
            except: Vec::new(),
        }
    }

    /// Deliver `message` to everyone not in `except`
    pub fn broadcast_except(message: ServerMessage, except: Vec<ConnectionId>) -> Self {
        Outbound::Broadcast { message, except }
    }

    /// The message carried by this effect
    pub fn message(&self) -> &ServerMessage {
        match self {
            Outbound::Send { message, .. } | Outbound::Broadcast { message, .. } => message,
        }
    }
}
