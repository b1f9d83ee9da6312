//! In-process connection hub
//!
//! Maps each attached connection to the sending half of its bounded outbound
//! queue. The connection's writer task drains the queue onto the socket.

use std::collections::BTreeMap;

use tokio::sync::mpsc::{self, error::TrySendError};

use super::{BroadcastReport, DeliveryError, Transport};
use crate::protocol::ServerMessage;
use crate::registry::ConnectionId;

/// Transport over per-connection outbound queues
#[derive(Debug, Default)]
pub struct ConnectionHub {
    peers: BTreeMap<ConnectionId, mpsc::Sender<String>>,
}

impl ConnectionHub {
    /// Create an empty hub
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a connection's outbound queue
    ///
    /// Replaces any queue previously attached under the same id.
    pub fn attach(&mut self, id: ConnectionId, tx: mpsc::Sender<String>) {
        self.peers.insert(id, tx);
    }

    /// Detach a connection; its queue closes once the hub's sender is dropped
    pub fn detach(&mut self, id: ConnectionId) -> bool {
        self.peers.remove(&id).is_some()
    }

    /// Whether a connection is attached
    pub fn is_attached(&self, id: ConnectionId) -> bool {
        self.peers.contains_key(&id)
    }

    fn push(
        id: ConnectionId,
        tx: &mpsc::Sender<String>,
        text: String,
    ) -> Result<(), DeliveryError> {
        tx.try_send(text).map_err(|e| match e {
            TrySendError::Full(_) => DeliveryError::QueueFull(id),
            TrySendError::Closed(_) => DeliveryError::Closed(id),
        })
    }
}

impl Transport for ConnectionHub {
    fn send(&mut self, to: ConnectionId, message: &ServerMessage) -> Result<(), DeliveryError> {
        let tx = self
            .peers
            .get(&to)
            .ok_or(DeliveryError::UnknownTarget(to))?;
        let text = message
            .encode()
            .map_err(|e| DeliveryError::Encode(e.to_string()))?;
        Self::push(to, tx, text)
    }

    fn broadcast_except(
        &mut self,
        message: &ServerMessage,
        except: &[ConnectionId],
    ) -> BroadcastReport {
        let mut report = BroadcastReport::default();

        let text = match message.encode() {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(kind = message.kind(), error = %e, "Broadcast dropped");
                return report;
            }
        };

        for (id, tx) in self.peers.iter().filter(|(id, _)| !except.contains(*id)) {
            match Self::push(*id, tx, text.clone()) {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    tracing::warn!(
                        connection_id = %id,
                        kind = message.kind(),
                        error = %e,
                        "Broadcast delivery dropped"
                    );
                    report.dropped += 1;
                }
            }
        }

        report
    }

    fn release(&mut self, id: ConnectionId) {
        self.detach(id);
    }
}
