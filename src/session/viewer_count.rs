//! Viewer count fan-out

use super::event::Outbound;
use crate::protocol::ServerMessage;
use crate::registry::{ConnectionId, ConnectionRegistry};

/// Push the current viewer count of `streamer_id` to its audience
///
/// Recipients are the streamer and every connection in its viewer set, each
/// once (a self-viewing streamer is not counted twice as a recipient). A stream
/// that no longer exists or is not live yields nothing.
pub fn broadcast_viewer_count(
    registry: &ConnectionRegistry,
    streamer_id: ConnectionId,
) -> Vec<Outbound> {
    let Some(stream) = registry.stream(streamer_id).filter(|s| s.is_live) else {
        return Vec::new();
    };

    let count = stream.viewer_count();
    let message = ServerMessage::ViewerCount { count };

    let mut out = Vec::with_capacity(count + 1);
    out.push(Outbound::send(streamer_id, message.clone()));
    out.extend(
        stream
            .viewers()
            .filter(|v| *v != streamer_id)
            .map(|v| Outbound::send(v, message.clone())),
    );

    tracing::debug!(
        streamer_id = %streamer_id,
        viewers = count,
        recipients = out.len(),
        "Viewer count pushed"
    );

    out
}
