//! Handshake message routing
//!
//! Offers, answers and candidates are forwarded to exactly one target with the
//! sender's id attached. Payloads are opaque; whether the target is still
//! connected is the transport's concern, a stale target just makes the
//! delivery fail and get logged there.

use serde_json::Value;

use super::event::Outbound;
use crate::protocol::ServerMessage;
use crate::registry::{ConnectionId, ConnectionRegistry};

/// Resolve the peer a handshake message is meant for
///
/// An explicit target always wins. Without one, a bound viewer addresses the
/// streamer it watches; anyone else has no resolvable target.
pub fn resolve_target(
    registry: &ConnectionRegistry,
    from: ConnectionId,
    target: Option<ConnectionId>,
) -> Option<ConnectionId> {
    target.or_else(|| registry.streamer_of(from))
}

/// Forward an offer to `target`
pub fn relay_offer(from: ConnectionId, target: ConnectionId, offer: Value) -> Outbound {
    Outbound::send(target, ServerMessage::Offer { from, offer })
}

/// Forward an answer to `target`
pub fn relay_answer(from: ConnectionId, target: ConnectionId, answer: Value) -> Outbound {
    Outbound::send(target, ServerMessage::Answer { from, answer })
}

/// Forward a candidate to `target`, or drop it if there is none
///
/// Each candidate is forwarded on its own, regardless of where the offer and
/// answer exchange stands.
pub fn relay_candidate(
    from: ConnectionId,
    target: Option<ConnectionId>,
    candidate: Value,
) -> Option<Outbound> {
    let target = target?;
    Some(Outbound::send(
        target,
        ServerMessage::Candidate { from, candidate },
    ))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn id(raw: u64) -> ConnectionId {
        ConnectionId::new(raw)
    }

    #[test]
    fn test_offer_goes_to_target_only() {
        let out = relay_offer(id(1), id(2), json!({"sdp": "a"}));

        assert_eq!(
            out,
            Outbound::send(
                id(2),
                ServerMessage::Offer {
                    from: id(1),
                    offer: json!({"sdp": "a"})
                }
            )
        );
    }

    #[test]
    fn test_answer_carries_sender() {
        match relay_answer(id(5), id(1), json!(null)) {
            Outbound::Send { to, message } => {
                assert_eq!(to, id(1));
                assert_eq!(
                    message,
                    ServerMessage::Answer {
                        from: id(5),
                        answer: json!(null)
                    }
                );
            }
            other => panic!("unexpected effect: {:?}", other),
        }
    }

    #[test]
    fn test_candidate_without_target_is_dropped() {
        assert!(relay_candidate(id(1), None, json!({"candidate": ""})).is_none());
        assert!(relay_candidate(id(1), Some(id(2)), json!({"candidate": ""})).is_some());
    }

    #[test]
    fn test_resolve_target() {
        let mut registry = ConnectionRegistry::new();
        for raw in 1..=3 {
            registry.register_connection(id(raw));
        }
        registry.register_streamer_ready(id(1)).unwrap();
        registry.join_viewer(id(2)).unwrap();

        // Explicit target is used as-is, even if unknown
        assert_eq!(resolve_target(&registry, id(2), Some(id(9))), Some(id(9)));
        // Bound viewer falls back to its streamer
        assert_eq!(resolve_target(&registry, id(2), None), Some(id(1)));
        // Streamer and unbound connections have nothing to fall back to
        assert_eq!(resolve_target(&registry, id(1), None), None);
        assert_eq!(resolve_target(&registry, id(3), None), None);
    }
}
