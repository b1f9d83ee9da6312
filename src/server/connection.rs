//! Per-connection WebSocket handling
//!
//! Upgrades the socket, registers the connection with the relay, then runs a
//! writer task draining the outbound queue and a read loop feeding decoded
//! client messages to the relay. Whatever ends the read loop, the connection
//! is disconnected from the relay exactly once.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::SplitStream;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;

use crate::error::{Error, Result};
use crate::protocol::ClientMessage;
use crate::registry::ConnectionId;
use crate::relay::Relay;
use crate::server::config::ServerConfig;

/// How long the writer may keep flushing after the connection left the relay
const WRITER_DRAIN_TIMEOUT: Duration = Duration::from_secs(1);

/// One client WebSocket connection
pub struct WsConnection {
    id: ConnectionId,
    peer_addr: SocketAddr,
    config: ServerConfig,
    relay: Arc<Relay>,
}

impl WsConnection {
    pub fn new(
        id: ConnectionId,
        peer_addr: SocketAddr,
        config: ServerConfig,
        relay: Arc<Relay>,
    ) -> Self {
        Self {
            id,
            peer_addr,
            config,
            relay,
        }
    }

    /// Run the connection until the client goes away
    pub async fn run(self, socket: TcpStream) -> Result<()> {
        let ws_stream = tokio::time::timeout(
            self.config.handshake_timeout,
            tokio_tungstenite::accept_async(socket),
        )
        .await
        .map_err(|_| Error::HandshakeTimeout)??;

        tracing::info!(
            connection_id = %self.id,
            peer = %self.peer_addr,
            "WebSocket connection established"
        );

        let (mut sink, mut stream) = ws_stream.split();
        let (tx, mut rx) = mpsc::channel::<String>(self.config.outbound_queue_capacity);

        self.relay.connect(self.id, tx).await;

        let id = self.id;
        let mut writer = tokio::spawn(async move {
            while let Some(text) = rx.recv().await {
                if let Err(e) = sink.send(Message::Text(text)).await {
                    tracing::debug!(connection_id = %id, error = %e, "Send failed");
                    break;
                }
            }
            let _ = sink.close().await;
        });

        let result = self.read_loop(&mut stream).await;

        // Detaching drops the hub's sender, so the writer drains and exits
        self.relay.disconnect(self.id).await;
        if tokio::time::timeout(WRITER_DRAIN_TIMEOUT, &mut writer)
            .await
            .is_err()
        {
            writer.abort();
        }

        tracing::info!(connection_id = %self.id, peer = %self.peer_addr, "Disconnected");
        result
    }

    async fn read_loop(&self, stream: &mut SplitStream<WebSocketStream<TcpStream>>) -> Result<()> {
        while let Some(msg) = stream.next().await {
            match msg {
                Ok(Message::Text(text)) => match ClientMessage::decode(&text) {
                    Ok(message) => self.relay.dispatch(self.id, message).await,
                    Err(e) => {
                        tracing::warn!(
                            connection_id = %self.id,
                            error = %e,
                            "Undecodable frame dropped"
                        );
                    }
                },
                Ok(Message::Close(_)) => {
                    tracing::debug!(connection_id = %self.id, "Close frame received");
                    break;
                }
                Ok(_) => {} // binary/ping/pong
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}
