//! WebSocket Transport
//!
//! The production transport: one persistent WebSocket connection to the
//! backend, driven by a supervisor task that owns the socket. On unexpected
//! close the supervisor retries with linear backoff (`attempt * base_delay`)
//! up to the configured budget; each successful connect resets the attempt
//! counter. An explicit close is terminal from any state.
//!
//! Frames are JSON text; parsing belongs to the codec, not the transport.

use std::sync::Arc;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use parking_lot::RwLock;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::time::sleep;
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use super::config::TransportConfig;
use super::traits::{
    ChatTransport, ConnectionId, ConnectionState, TransportError, TransportEvent,
};

/// Commands from the transport handle to its supervisor task
enum Command {
    Send(String),
    Close,
}

/// WebSocket-backed [`ChatTransport`]
///
/// The handle is cheap state; the socket lives in a spawned supervisor task
/// so reconnection runs independently of event application.
pub struct WebSocketTransport {
    endpoint: String,
    config: TransportConfig,
    id: ConnectionId,
    state: Arc<RwLock<ConnectionState>>,
    cmd_tx: Option<mpsc::Sender<Command>>,
    event_rx: Option<mpsc::Receiver<TransportEvent>>,
}

impl WebSocketTransport {
    /// Create a transport for the given `ws://` or `wss://` endpoint
    #[must_use]
    pub fn new(endpoint: impl Into<String>, config: TransportConfig) -> Self {
        Self {
            endpoint: endpoint.into(),
            config,
            id: ConnectionId::new(),
            state: Arc::new(RwLock::new(ConnectionState::Closed)),
            cmd_tx: None,
            event_rx: None,
        }
    }

    /// The configured endpoint URL
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ChatTransport for WebSocketTransport {
    async fn open(&mut self) -> Result<(), TransportError> {
        // Re-opening replaces any previous supervisor; dropping its command
        // channel makes it shut down.
        self.cmd_tx = None;
        *self.state.write() = ConnectionState::Connecting;

        let (cmd_tx, cmd_rx) = mpsc::channel(self.config.channel_capacity);
        let (event_tx, event_rx) = mpsc::channel(self.config.channel_capacity);

        tokio::spawn(run_connection(
            self.endpoint.clone(),
            self.config.clone(),
            Arc::clone(&self.state),
            cmd_rx,
            event_tx,
            self.id.clone(),
        ));

        self.cmd_tx = Some(cmd_tx);
        self.event_rx = Some(event_rx);
        Ok(())
    }

    async fn close(&mut self) {
        if let Some(tx) = self.cmd_tx.take() {
            let _ = tx.send(Command::Close).await;
        }
        *self.state.write() = ConnectionState::Closed;
    }

    async fn send(&self, payload: String) -> Result<(), TransportError> {
        if !self.state.read().is_open() {
            return Err(TransportError::NotOpen);
        }
        let tx = self.cmd_tx.as_ref().ok_or(TransportError::NotOpen)?;
        tx.send(Command::Send(payload))
            .await
            .map_err(|_| TransportError::SendFailed("connection task ended".to_string()))
    }

    async fn recv(&mut self) -> Option<TransportEvent> {
        self.event_rx.as_mut()?.recv().await
    }

    fn try_recv(&mut self) -> Option<TransportEvent> {
        self.event_rx.as_mut()?.try_recv().ok()
    }

    fn state(&self) -> ConnectionState {
        *self.state.read()
    }
}

/// How a live connection ended
enum Shutdown {
    /// The owner asked for the close; terminal
    Explicit,
    /// The peer vanished; a reconnect may follow
    ConnectionLost,
}

/// Supervisor: connect, drive, and reconnect until closed or exhausted
async fn run_connection(
    endpoint: String,
    config: TransportConfig,
    state: Arc<RwLock<ConnectionState>>,
    mut cmd_rx: mpsc::Receiver<Command>,
    event_tx: mpsc::Sender<TransportEvent>,
    id: ConnectionId,
) {
    let mut attempt: u32 = 0;

    loop {
        let attempt_result = tokio::select! {
            cmd = cmd_rx.recv() => match cmd {
                // Sends are refused at the handle while not open; anything
                // that slips through the race is dropped here.
                Some(Command::Send(_)) => continue,
                Some(Command::Close) | None => {
                    *state.write() = ConnectionState::Closed;
                    return;
                }
            },
            result = connect_async(endpoint.as_str()) => result,
        };

        match attempt_result {
            Ok((socket, _response)) => {
                attempt = 0;
                *state.write() = ConnectionState::Open;
                info!(conn = %id, endpoint = %endpoint, "connected");
                if event_tx.send(TransportEvent::Opened).await.is_err() {
                    *state.write() = ConnectionState::Closed;
                    return;
                }
                match drive(socket, &mut cmd_rx, &event_tx, &id).await {
                    Shutdown::Explicit => {
                        *state.write() = ConnectionState::Closed;
                        debug!(conn = %id, "closed");
                        return;
                    }
                    Shutdown::ConnectionLost => {
                        warn!(conn = %id, "connection lost");
                    }
                }
            }
            Err(e) => {
                warn!(conn = %id, error = %e, "connection attempt failed");
            }
        }

        // An attempt that failed immediately still counts as one.
        attempt += 1;
        if attempt > config.max_reconnect_attempts {
            *state.write() = ConnectionState::Closed;
            warn!(
                conn = %id,
                attempts = config.max_reconnect_attempts,
                "reconnect budget exhausted"
            );
            let _ = event_tx.send(TransportEvent::Exhausted).await;
            return;
        }

        // An explicit close may have raced the failure.
        match cmd_rx.try_recv() {
            Ok(Command::Close) | Err(TryRecvError::Disconnected) => {
                *state.write() = ConnectionState::Closed;
                return;
            }
            Ok(Command::Send(_)) | Err(TryRecvError::Empty) => {}
        }

        *state.write() = ConnectionState::Reconnecting;
        let _ = event_tx.send(TransportEvent::Reconnecting { attempt }).await;

        let delay = config.reconnect_delay(attempt);
        debug!(
            conn = %id,
            attempt,
            delay_ms = delay.as_millis() as u64,
            "scheduling reconnect"
        );
        tokio::select! {
            () = sleep(delay) => {}
            cmd = cmd_rx.recv() => {
                if !matches!(cmd, Some(Command::Send(_))) {
                    *state.write() = ConnectionState::Closed;
                    return;
                }
            }
        }
    }
}

/// Pump one live socket until it closes
async fn drive(
    socket: WebSocketStream<MaybeTlsStream<TcpStream>>,
    cmd_rx: &mut mpsc::Receiver<Command>,
    event_tx: &mpsc::Sender<TransportEvent>,
    id: &ConnectionId,
) -> Shutdown {
    let (mut sink, mut stream) = socket.split();

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => match cmd {
                Some(Command::Send(text)) => {
                    if let Err(e) = sink.send(Message::Text(text)).await {
                        warn!(conn = %id, error = %e, "frame delivery failed");
                        return Shutdown::ConnectionLost;
                    }
                }
                Some(Command::Close) | None => {
                    let _ = sink.send(Message::Close(None)).await;
                    return Shutdown::Explicit;
                }
            },
            frame = stream.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    if event_tx.send(TransportEvent::Frame(text)).await.is_err() {
                        return Shutdown::Explicit;
                    }
                }
                Some(Ok(Message::Close(_))) | None => {
                    return Shutdown::ConnectionLost;
                }
                // Control traffic; tungstenite answers pings itself
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!(conn = %id, error = %e, "receive failed");
                    return Shutdown::ConnectionLost;
                }
            }
        }
    }
}
