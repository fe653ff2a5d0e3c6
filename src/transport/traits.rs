//! Transport Traits
//!
//! Core contract between the client facade and any connection mechanism.

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

/// Unique identifier for one connection, used in logs
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ConnectionId(pub String);

impl ConnectionId {
    /// Generate a new unique connection ID from a random 128-bit value
    #[must_use]
    pub fn new() -> Self {
        use rand::Rng;
        let bytes: [u8; 16] = rand::thread_rng().gen();
        Self(format!("conn_{}", hex::encode(bytes)))
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of the connection
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    /// Initial connection attempt in flight
    Connecting,
    /// Connection established; frames flow
    Open,
    /// Connection lost; retrying with backoff
    Reconnecting,
    /// No connection, and none will be attempted
    Closed,
}

impl ConnectionState {
    /// Whether frames can currently be sent
    #[must_use]
    pub fn is_open(self) -> bool {
        matches!(self, Self::Open)
    }

    /// Whether this state is terminal
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Closed)
    }
}

/// Errors that can occur during transport operations
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection to the backend failed
    #[error("connection failed: {0}")]
    ConnectionFailed(String),
    /// The connection is gone
    #[error("connection closed")]
    ConnectionClosed,
    /// A send was attempted while the connection is not open
    #[error("transport is not open")]
    NotOpen,
    /// Frame could not be delivered
    #[error("send failed: {0}")]
    SendFailed(String),
    /// IO error from the underlying socket
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Typed notifications a transport delivers to its owner
///
/// Frames and lifecycle changes share one ordered channel so the facade
/// observes them exactly in the order they happened.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransportEvent {
    /// A raw text frame arrived from the backend
    Frame(String),
    /// The connection is (re)established and ready for frames
    Opened,
    /// The connection dropped unexpectedly; a retry is scheduled
    Reconnecting {
        /// Which retry this is (1-based)
        attempt: u32,
    },
    /// The retry budget is spent; the connection is now terminally closed
    Exhausted,
}

/// Client-side transport contract
///
/// Implementations own exactly one logical connection and guarantee ordered,
/// reliable delivery of frames while [`ConnectionState::Open`].
#[async_trait]
pub trait ChatTransport: Send {
    /// Begin connecting to the backend
    ///
    /// Establishment is asynchronous: success is reported through
    /// [`TransportEvent::Opened`], failures through the reconnect events.
    ///
    /// # Errors
    ///
    /// Returns an error only if the attempt cannot even be started.
    async fn open(&mut self) -> Result<(), TransportError>;

    /// Close the connection
    ///
    /// Idempotent and reachable from every state. After an explicit close
    /// the transport is terminally [`ConnectionState::Closed`].
    async fn close(&mut self);

    /// Send a raw text frame
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::NotOpen`] when the connection is not open;
    /// nothing is queued in that case.
    async fn send(&self, payload: String) -> Result<(), TransportError>;

    /// Receive the next transport event (blocks until one is available)
    ///
    /// Returns `None` once the transport is closed and drained.
    async fn recv(&mut self) -> Option<TransportEvent>;

    /// Receive the next transport event without blocking
    fn try_recv(&mut self) -> Option<TransportEvent>;

    /// Current connection state
    fn state(&self) -> ConnectionState;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_id_unique() {
        let id1 = ConnectionId::new();
        let id2 = ConnectionId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_connection_state_predicates() {
        assert!(ConnectionState::Open.is_open());
        assert!(!ConnectionState::Connecting.is_open());
        assert!(!ConnectionState::Reconnecting.is_open());
        assert!(!ConnectionState::Closed.is_open());

        assert!(ConnectionState::Closed.is_terminal());
        assert!(!ConnectionState::Reconnecting.is_terminal());
    }

    #[test]
    fn test_transport_error_display() {
        assert_eq!(TransportError::NotOpen.to_string(), "transport is not open");
        let err = TransportError::ConnectionFailed("refused".to_string());
        assert!(err.to_string().contains("refused"));
    }
}
