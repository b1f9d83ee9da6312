//! WebSocket transport for the relay
//!
//! Accepts TCP connections, upgrades them to WebSocket, assigns each a
//! process-unique [`ConnectionId`](crate::registry::ConnectionId) and wires it
//! to the shared [`Relay`](crate::relay::Relay).

pub mod config;
pub mod connection;
pub mod listener;

pub use config::ServerConfig;
pub use connection::WsConnection;
pub use listener::RelayServer;
