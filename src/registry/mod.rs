//! Connection registry
//!
//! Tracks which connections exist, which of them stream, and which viewers
//! watch which streamer.
//!
//! # Structure
//!
//! ```text
//!                     ConnectionRegistry
//!   ┌───────────────────────────────────────────────────────┐
//!   │ connections:  HashMap<ConnectionId, Connection{role}> │
//!   │ streams:      HashMap<streamer, StreamEntry{viewers}> │
//!   │ stream_order: Vec<streamer>        (selection order)  │
//!   │ bindings:     HashMap<viewer, streamer>               │
//!   └───────────────────────────────────────────────────────┘
//! ```
//!
//! `streams[s].viewers` and `bindings` describe the same relation from both
//! ends; every mutating operation updates them together.

pub mod entry;
pub mod error;
pub mod key;
pub mod store;

pub use entry::{Connection, JoinOutcome, Removal, Role, StreamEntry};
pub use error::RegistryError;
pub use key::ConnectionId;
pub use store::ConnectionRegistry;
