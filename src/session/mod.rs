//! Signaling session handling
//!
//! - `controller`: lifecycle state machine (ready / join / disconnect)
//! - `router`: offer, answer and candidate forwarding
//! - `viewer_count`: count fan-out after membership changes
//! - `chat`: chat fan-out

pub mod chat;
pub mod controller;
pub mod event;
pub mod router;
pub mod viewer_count;

pub use controller::SessionController;
pub use event::{InboundEvent, Outbound};
