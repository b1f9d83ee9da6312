//! Session lifecycle controller
//!
//! Applies one inbound event at a time to the connection registry and returns
//! the deliveries that follow from it. Holds no I/O; the relay feeds it events
//! under its lock and hands the result to the transport.
//!
//! ```text
//!   Unbound ──streamer-ready──► Streamer{live}
//!      │
//!      └────viewer-join────────► Viewer{bound to S}   (stays Unbound if no stream)
//!
//!   any ──disconnect──► removed
//! ```

use super::chat;
use super::event::{InboundEvent, Outbound};
use super::router;
use super::viewer_count::broadcast_viewer_count;
use crate::protocol::{ClientMessage, ServerMessage};
use crate::registry::{ConnectionId, ConnectionRegistry, RegistryError};

/// Per-connection signaling state machine over a shared registry
#[derive(Debug, Default)]
pub struct SessionController {
    registry: ConnectionRegistry,
}

impl SessionController {
    /// Create a controller with an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Read access to the registry
    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    /// Apply one event and return the resulting deliveries, in order
    pub fn handle(&mut self, event: InboundEvent) -> Vec<Outbound> {
        match event {
            InboundEvent::Connected(id) => self.on_connected(id),
            InboundEvent::Message { from, message } => self.on_message(from, message),
            InboundEvent::Disconnected(id) => self.on_disconnected(id),
        }
    }

    fn on_connected(&mut self, id: ConnectionId) -> Vec<Outbound> {
        if !self.registry.register_connection(id) {
            tracing::warn!(connection_id = %id, "Duplicate connect ignored");
            return Vec::new();
        }
        vec![Outbound::send(
            id,
            ServerMessage::Welcome { connection_id: id },
        )]
    }

    fn on_message(&mut self, from: ConnectionId, message: ClientMessage) -> Vec<Outbound> {
        // A message racing its own disconnect must not resurrect the connection
        if !self.registry.contains(from) {
            tracing::debug!(
                connection_id = %from,
                kind = message.kind(),
                "Message from unregistered connection dropped"
            );
            return Vec::new();
        }

        match message {
            ClientMessage::StreamerReady => self.on_ready(from),
            ClientMessage::ViewerJoin => self.on_join(from),
            ClientMessage::Offer { target, offer } => {
                match router::resolve_target(&self.registry, from, target) {
                    Some(target) => vec![router::relay_offer(from, target, offer)],
                    None => self.unroutable(from, "offer"),
                }
            }
            ClientMessage::Answer { target, answer } => {
                match router::resolve_target(&self.registry, from, target) {
                    Some(target) => vec![router::relay_answer(from, target, answer)],
                    None => self.unroutable(from, "answer"),
                }
            }
            ClientMessage::Candidate { target, candidate } => {
                let target = router::resolve_target(&self.registry, from, target);
                match router::relay_candidate(from, target, candidate) {
                    Some(out) => vec![out],
                    None => self.unroutable(from, "candidate"),
                }
            }
            ClientMessage::ChatMessage { message } => {
                vec![chat::relay_chat(from, message, chat::unix_millis())]
            }
            ClientMessage::AreYouStreamer => vec![Outbound::send(
                from,
                ServerMessage::StreamerStatus {
                    is_streamer: self.registry.is_live_streamer(from),
                },
            )],
        }
    }

    fn on_ready(&mut self, id: ConnectionId) -> Vec<Outbound> {
        if let Err(e) = self.registry.register_streamer_ready(id) {
            tracing::debug!(connection_id = %id, error = %e, "Ready ignored");
            return Vec::new();
        }

        let mut out = vec![Outbound::broadcast(ServerMessage::StreamLive {
            streamer_id: id,
            viewer_count: None,
        })];
        out.extend(broadcast_viewer_count(&self.registry, id));
        out
    }

    fn on_join(&mut self, id: ConnectionId) -> Vec<Outbound> {
        let joined = match self.registry.join_viewer(id) {
            Ok(joined) => joined,
            Err(RegistryError::NoLiveStream) => {
                tracing::debug!(connection_id = %id, "Join with no live stream");
                return vec![Outbound::send(id, ServerMessage::StreamOffline)];
            }
            Err(e) => {
                tracing::debug!(connection_id = %id, error = %e, "Join ignored");
                return Vec::new();
            }
        };

        let streamer_id = joined.streamer_id;
        let mut out = vec![Outbound::send(
            id,
            ServerMessage::StreamLive {
                streamer_id,
                viewer_count: Some(joined.viewer_count),
            },
        )];

        if streamer_id != id {
            out.push(Outbound::send(
                streamer_id,
                ServerMessage::NewViewer { viewer_id: id },
            ));
        }

        out.extend(broadcast_viewer_count(&self.registry, streamer_id));
        if let Some(previous) = joined.previous_streamer {
            out.extend(broadcast_viewer_count(&self.registry, previous));
        }
        out
    }

    fn on_disconnected(&mut self, id: ConnectionId) -> Vec<Outbound> {
        let removal = self.registry.remove_connection(id);
        let mut out = Vec::new();

        if let Some(former_viewers) = removal.former_viewers {
            let mut notified: Vec<ConnectionId> = former_viewers
                .into_iter()
                .filter(|v| *v != id)
                .collect();
            out.extend(
                notified
                    .iter()
                    .map(|v| Outbound::send(*v, ServerMessage::StreamOffline)),
            );
            // Viewers were told individually; everyone else hears it once here
            notified.push(id);
            out.push(Outbound::broadcast_except(
                ServerMessage::StreamOffline,
                notified,
            ));
            tracing::info!(streamer_id = %id, "Stream offline");
        }

        if let Some(streamer_id) = removal.watched_streamer {
            if streamer_id != id {
                out.push(Outbound::send(
                    streamer_id,
                    ServerMessage::ViewerLeft { viewer_id: id },
                ));
            }
            out.extend(broadcast_viewer_count(&self.registry, streamer_id));
        }

        out
    }

    fn unroutable(&self, from: ConnectionId, kind: &'static str) -> Vec<Outbound> {
        tracing::debug!(connection_id = %from, kind, "No target, message dropped");
        Vec::new()
    }
}
