//! Crate-level error type

use std::fmt;

use tokio_tungstenite::tungstenite;

/// Errors surfaced by the relay's transport layer
#[derive(Debug)]
pub enum Error {
    /// Socket I/O failure
    Io(std::io::Error),
    /// WebSocket protocol failure
    WebSocket(tungstenite::Error),
    /// The WebSocket upgrade did not finish in time
    HandshakeTimeout,
    /// An inbound frame was not a valid client message
    Decode(serde_json::Error),
    /// An outbound message could not be serialized
    Encode(serde_json::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::WebSocket(e) => write!(f, "WebSocket error: {}", e),
            Error::HandshakeTimeout => write!(f, "WebSocket handshake timed out"),
            Error::Decode(e) => write!(f, "Invalid client message: {}", e),
            Error::Encode(e) => write!(f, "Failed to encode message: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::WebSocket(e) => Some(e),
            Error::Decode(e) | Error::Encode(e) => Some(e),
            Error::HandshakeTimeout => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<tungstenite::Error> for Error {
    fn from(e: tungstenite::Error) -> Self {
        Error::WebSocket(e)
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;
