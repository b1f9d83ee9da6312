//! Signaling wire protocol
//!
//! JSON text frames exchanged over the WebSocket transport.

pub mod message;

pub use message::{ClientMessage, ServerMessage};
