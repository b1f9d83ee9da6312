//! Relay: the single serialization point
//!
//! The session controller (and through it the registry) lives behind one
//! `tokio::sync::Mutex` together with the transport. Each inbound event is
//! applied and its deliveries handed to the transport before the lock is
//! released, so concurrent joins, leaves and disconnects always observe a
//! consistent registry, and a connection detached from the transport can never
//! be delivered to again.

use tokio::sync::{mpsc, Mutex};

use crate::protocol::{ClientMessage, ServerMessage};
use crate::registry::{ConnectionId, ConnectionRegistry};
use crate::session::{InboundEvent, Outbound, SessionController};
use crate::stats::{RelayMetrics, RelayStats};
use crate::transport::{ConnectionHub, Transport};

struct RelayInner<T> {
    controller: SessionController,
    transport: T,
}

/// Signaling relay over a transport
pub struct Relay<T = ConnectionHub> {
    inner: Mutex<RelayInner<T>>,
    metrics: RelayMetrics,
}

impl<T: Transport> Relay<T> {
    /// Create a relay delivering through `transport`
    pub fn with_transport(transport: T) -> Self {
        Self {
            inner: Mutex::new(RelayInner {
                controller: SessionController::new(),
                transport,
            }),
            metrics: RelayMetrics::new(),
        }
    }

    /// Apply one inbound event
    ///
    /// A disconnect releases the connection from the transport before the
    /// registry forgets it, so nothing can be delivered to it afterwards.
    pub async fn handle(&self, event: InboundEvent) {
        if matches!(event, InboundEvent::Connected(_)) {
            self.metrics.record_connection();
        }

        let mut guard = self.inner.lock().await;
        let inner = &mut *guard;
        if let InboundEvent::Disconnected(id) = event {
            inner.transport.release(id);
        }
        let out = inner.controller.handle(event);
        self.deliver(&mut inner.transport, out);
    }

    /// Apply a decoded client message from `from`
    pub async fn dispatch(&self, from: ConnectionId, message: ClientMessage) {
        tracing::debug!(connection_id = %from, kind = message.kind(), "Inbound message");
        self.handle(InboundEvent::Message { from, message }).await;
    }

    /// Current statistics
    pub async fn stats(&self) -> RelayStats {
        let inner = self.inner.lock().await;
        self.metrics.snapshot(inner.controller.registry())
    }

    /// Run `f` against the registry under the relay lock
    pub async fn inspect<R>(&self, f: impl FnOnce(&ConnectionRegistry) -> R) -> R {
        let inner = self.inner.lock().await;
        f(inner.controller.registry())
    }

    fn deliver(&self, transport: &mut T, out: Vec<Outbound>) {
        for effect in out {
            match effect {
                Outbound::Send { to, message } => match transport.send(to, &message) {
                    Ok(()) => {
                        if is_relayed(&message) {
                            self.metrics.record_routed(1);
                        }
                    }
                    Err(e) => {
                        tracing::debug!(
                            connection_id = %to,
                            kind = message.kind(),
                            error = %e,
                            "Delivery dropped"
                        );
                        self.metrics.record_dropped(1);
                    }
                },
                Outbound::Broadcast { message, except } => {
                    let report = transport.broadcast_except(&message, &except);
                    if is_relayed(&message) {
                        self.metrics.record_routed(report.delivered as u64);
                    }
                    self.metrics.record_dropped(report.dropped as u64);
                }
            }
        }
    }
}

impl Relay<ConnectionHub> {
    /// Create a relay over an empty connection hub
    pub fn new() -> Self {
        Self::with_transport(ConnectionHub::new())
    }

    /// Attach a new connection's outbound queue and register it
    pub async fn connect(&self, id: ConnectionId, tx: mpsc::Sender<String>) {
        self.metrics.record_connection();

        let mut guard = self.inner.lock().await;
        let inner = &mut *guard;
        inner.transport.attach(id, tx);
        let out = inner.controller.handle(InboundEvent::Connected(id));
        self.deliver(&mut inner.transport, out);
    }

    /// Detach a connection and reconcile everything bound to it
    pub async fn disconnect(&self, id: ConnectionId) {
        self.handle(InboundEvent::Disconnected(id)).await;
    }
}

impl Default for Relay<ConnectionHub> {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether a message is peer traffic rather than a relay notification
fn is_relayed(message: &ServerMessage) -> bool {
    matches!(
        message,
        ServerMessage::Offer { .. }
            | ServerMessage::Answer { .. }
            | ServerMessage::Candidate { .. }
            | ServerMessage::ChatMessage { .. }
    )
}
