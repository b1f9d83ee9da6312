//! Signaling message types
//!
//! Every frame is a JSON object tagged by `type`. Handshake payloads (session
//! descriptions and ICE candidates) are carried as opaque JSON values and
//! never inspected.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::registry::ConnectionId;

/// Messages sent by clients to the relay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientMessage {
    /// Announce readiness to stream
    StreamerReady,

    /// Ask to watch the live stream
    ViewerJoin,

    /// Session description offer for `target`
    Offer {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<ConnectionId>,
        #[serde(default)]
        offer: Value,
    },

    /// Session description answer for `target`
    Answer {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<ConnectionId>,
        #[serde(default)]
        answer: Value,
    },

    /// ICE candidate for `target`
    ///
    /// A viewer may omit `target` to address the streamer it watches.
    Candidate {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<ConnectionId>,
        #[serde(default)]
        candidate: Value,
    },

    /// Free-text chat line
    ChatMessage { message: String },

    /// Ask whether the sender currently has a live stream
    AreYouStreamer,
}

impl ClientMessage {
    /// Decode a text frame
    pub fn decode(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(Error::Decode)
    }

    /// Short name of the message kind, for logging
    pub fn kind(&self) -> &'static str {
        match self {
            ClientMessage::StreamerReady => "streamer-ready",
            ClientMessage::ViewerJoin => "viewer-join",
            ClientMessage::Offer { .. } => "offer",
            ClientMessage::Answer { .. } => "answer",
            ClientMessage::Candidate { .. } => "candidate",
            ClientMessage::ChatMessage { .. } => "chat-message",
            ClientMessage::AreYouStreamer => "are-you-streamer",
        }
    }
}

/// Messages sent by the relay to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    /// First message on every connection
    Welcome { connection_id: ConnectionId },

    /// A stream is live; `viewer_count` is only set in replies to a join
    StreamLive {
        streamer_id: ConnectionId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        viewer_count: Option<usize>,
    },

    /// The stream went away, or there was none to join
    StreamOffline,

    /// Sent to the streamer when a viewer joins
    NewViewer { viewer_id: ConnectionId },

    /// Sent to the streamer when a viewer disconnects
    ViewerLeft { viewer_id: ConnectionId },

    /// Current viewer count of the stream the recipient belongs to
    ViewerCount { count: usize },

    /// Forwarded offer
    Offer { from: ConnectionId, offer: Value },

    /// Forwarded answer
    Answer { from: ConnectionId, answer: Value },

    /// Forwarded ICE candidate
    Candidate { from: ConnectionId, candidate: Value },

    /// Relayed chat line; `timestamp` is milliseconds since the Unix epoch
    ChatMessage {
        from: ConnectionId,
        message: String,
        timestamp: u64,
    },

    /// Reply to `are-you-streamer`
    StreamerStatus { is_streamer: bool },
}

impl ServerMessage {
    /// Encode as a text frame
    pub fn encode(&self) -> Result<String> {
        serde_json::to_string(self).map_err(Error::Encode)
    }

    /// Short name of the message kind, for logging
    pub fn kind(&self) -> &'static str {
        match self {
            ServerMessage::Welcome { .. } => "welcome",
            ServerMessage::StreamLive { .. } => "stream-live",
            ServerMessage::StreamOffline => "stream-offline",
            ServerMessage::NewViewer { .. } => "new-viewer",
            ServerMessage::ViewerLeft { .. } => "viewer-left",
            ServerMessage::ViewerCount { .. } => "viewer-count",
            ServerMessage::Offer { .. } => "offer",
            ServerMessage::Answer { .. } => "answer",
            ServerMessage::Candidate { .. } => "candidate",
            ServerMessage::ChatMessage { .. } => "chat-message",
            ServerMessage::StreamerStatus { .. } => "streamer-status",
        }
    }
}
