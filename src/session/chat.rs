//! Chat fan-out

use std::time::{SystemTime, UNIX_EPOCH};

use super::event::Outbound;
use crate::protocol::ServerMessage;
use crate::registry::ConnectionId;

/// Broadcast a chat line from `from` to every connection, sender included
pub fn relay_chat(from: ConnectionId, message: String, timestamp: u64) -> Outbound {
    Outbound::broadcast(ServerMessage::ChatMessage {
        from,
        message,
        timestamp,
    })
}

/// Wall-clock time in milliseconds since the Unix epoch
pub fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_is_broadcast_to_all() {
        let out = relay_chat(ConnectionId::new(4), "hello".into(), 1_700_000_000_000);

        assert_eq!(
            out,
            Outbound::Broadcast {
                message: ServerMessage::ChatMessage {
                    from: ConnectionId::new(4),
                    message: "hello".into(),
                    timestamp: 1_700_000_000_000,
                },
                except: vec![],
            }
        );
    }

    #[test]
    fn test_unix_millis_is_after_2020() {
        assert!(unix_millis() > 1_577_836_800_000);
    }
}
