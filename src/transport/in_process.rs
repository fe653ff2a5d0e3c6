//! In-Process Transport
//!
//! Direct channel-based transport for embedded operation and tests. The
//! peer side of the pair plays the backend: it reads the frames the client
//! sent and injects frames and lifecycle events of its own.
//!
//! # Usage
//!
//! ```ignore
//! let (transport, mut peer) = InProcessTransport::pair();
//! let mut client = ChatClient::with_transport(transport);
//!
//! client.connect().await?;
//! peer.push_frame(r#"{"type": "session_create", "thread_id": "t1"}"#).await;
//! client.pump().await;
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::sync::mpsc;

use super::config::TransportConfig;
use super::traits::{ChatTransport, ConnectionState, TransportError, TransportEvent};

/// Channel-backed transport with a controllable peer
pub struct InProcessTransport {
    state: Arc<RwLock<ConnectionState>>,
    outbound_tx: mpsc::Sender<String>,
    event_rx: mpsc::Receiver<TransportEvent>,
    event_tx: mpsc::Sender<TransportEvent>,
}

/// The backend side of an in-process pair
///
/// Reads frames the client sent and injects incoming frames or lifecycle
/// events, in full control of the connection state.
pub struct PeerHandle {
    state: Arc<RwLock<ConnectionState>>,
    sent_rx: mpsc::Receiver<String>,
    event_tx: mpsc::Sender<TransportEvent>,
}

impl InProcessTransport {
    /// Create a connected transport/peer pair with default capacity
    #[must_use]
    pub fn pair() -> (Self, PeerHandle) {
        Self::pair_with_config(&TransportConfig::default())
    }

    /// Create a pair with the given channel capacity
    #[must_use]
    pub fn pair_with_config(config: &TransportConfig) -> (Self, PeerHandle) {
        let (outbound_tx, sent_rx) = mpsc::channel(config.channel_capacity);
        let (event_tx, event_rx) = mpsc::channel(config.channel_capacity);
        let state = Arc::new(RwLock::new(ConnectionState::Closed));

        let transport = Self {
            state: Arc::clone(&state),
            outbound_tx,
            event_rx,
            event_tx: event_tx.clone(),
        };
        let peer = PeerHandle {
            state,
            sent_rx,
            event_tx,
        };
        (transport, peer)
    }
}

#[async_trait]
impl ChatTransport for InProcessTransport {
    async fn open(&mut self) -> Result<(), TransportError> {
        *self.state.write() = ConnectionState::Open;
        self.event_tx
            .send(TransportEvent::Opened)
            .await
            .map_err(|_| TransportError::ConnectionClosed)?;
        Ok(())
    }

    async fn close(&mut self) {
        *self.state.write() = ConnectionState::Closed;
    }

    async fn send(&self, payload: String) -> Result<(), TransportError> {
        if !self.state.read().is_open() {
            return Err(TransportError::NotOpen);
        }
        self.outbound_tx
            .send(payload)
            .await
            .map_err(|_| TransportError::SendFailed("peer hung up".to_string()))
    }

    async fn recv(&mut self) -> Option<TransportEvent> {
        self.event_rx.recv().await
    }

    fn try_recv(&mut self) -> Option<TransportEvent> {
        self.event_rx.try_recv().ok()
    }

    fn state(&self) -> ConnectionState {
        *self.state.read()
    }
}

impl PeerHandle {
    /// Inject a raw frame as if the backend had sent it
    pub async fn push_frame(&self, raw: impl Into<String>) {
        let _ = self.event_tx.send(TransportEvent::Frame(raw.into())).await;
    }

    /// Inject a lifecycle event (reconnect progress, exhaustion)
    pub async fn emit(&self, event: TransportEvent) {
        let _ = self.event_tx.send(event).await;
    }

    /// Force the connection state seen by the client
    pub fn set_state(&self, state: ConnectionState) {
        *self.state.write() = state;
    }

    /// Pop the next frame the client sent, if any
    pub fn try_sent(&mut self) -> Option<String> {
        self.sent_rx.try_recv().ok()
    }

    /// Wait for the next frame the client sends
    pub async fn next_sent(&mut self) -> Option<String> {
        self.sent_rx.recv().await
    }
}
