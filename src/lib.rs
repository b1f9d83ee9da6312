//! WebSocket signaling relay for one-to-many WebRTC live streaming
//!
//! One connection announces itself as the streamer; any number of other
//! connections join as viewers. The relay brokers the session-description and
//! ICE-candidate exchange each viewer needs to open a direct peer link with the
//! streamer, keeps viewer counts up to date, and fans out chat. Media never
//! passes through the relay.
//!
//! # Architecture
//!
//! ```text
//!   WebSocket clients
//!        │  ▲
//!        ▼  │
//!   ┌──────────────┐   InboundEvent    ┌─────────────────────────────┐
//!   │ server::     │ ────────────────► │ Relay (one Mutex)           │
//!   │ WsConnection │                   │  ├─ SessionController       │
//!   └──────────────┘ ◄──────────────── │  │   └─ ConnectionRegistry  │
//!        per-connection outbound queue │  └─ ConnectionHub (Transport)│
//!                                      └─────────────────────────────┘
//! ```
//!
//! The controller is a pure state machine: each inbound event mutates the
//! registry and yields a list of [`Outbound`] effects, which the relay hands to
//! the transport while still holding the lock.

pub mod error;
pub mod protocol;
pub mod registry;
pub mod relay;
pub mod server;
pub mod session;
pub mod stats;
pub mod transport;

pub use error::{Error, Result};
pub use protocol::{ClientMessage, ServerMessage};
pub use registry::{ConnectionId, ConnectionRegistry, RegistryError, Role};
pub use relay::Relay;
pub use server::{RelayServer, ServerConfig};
pub use session::{InboundEvent, Outbound, SessionController};
pub use stats::RelayStats;
pub use transport::{ConnectionHub, DeliveryError, Transport};
