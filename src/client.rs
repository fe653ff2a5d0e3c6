//! Client Facade
//!
//! The one surface a presentation layer touches. The facade composes the
//! transport, the codec, and the session state machine: outgoing calls are
//! encoded and handed to the transport; incoming transport events are
//! decoded and applied, strictly in arrival order. All mutation passes
//! through the facade sequentially - it is the sole synchronization point.

use std::path::Path;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::codec::{self, CodecError, Decoded};
use crate::config::ClientConfig;
use crate::intents::ClientIntent;
use crate::session::{SessionSnapshot, SessionState, ThreadId, TimelineMessage};
use crate::transport::{
    ChatTransport, ConnectionState, TransportError, TransportEvent, WebSocketTransport,
};
use crate::upload::{self, AttachmentKind, UploadError};

/// Severity of a client notice
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    /// Informational (reconnect progress)
    Info,
    /// Something was lost but the session continues (dropped send)
    Warning,
    /// The session is degraded (connectivity exhausted)
    Error,
}

/// An out-of-band signal for the presentation layer
///
/// Notices report what the timeline does not: delivery failures, reconnect
/// progress, and terminal connectivity loss.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    /// Severity
    pub level: NoticeLevel,
    /// Human-readable description
    pub message: String,
}

/// Errors surfaced by facade operations
#[derive(Debug, Error)]
pub enum ClientError {
    /// The transport refused the operation
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// An intent could not be serialized
    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// The chat client facade
///
/// Generic over the transport so tests can substitute
/// [`crate::InProcessTransport`] without touching any global state.
pub struct ChatClient<T: ChatTransport> {
    transport: T,
    session: SessionState,
    notices: Vec<Notice>,
}

impl ChatClient<WebSocketTransport> {
    /// Create a client that will speak WebSocket to the configured endpoint
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        Self::with_transport(WebSocketTransport::new(config.endpoint, config.transport))
    }
}

impl<T: ChatTransport> ChatClient<T> {
    /// Create a client over an explicit transport
    #[must_use]
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport,
            session: SessionState::new(),
            notices: Vec::new(),
        }
    }

    /// Begin connecting to the backend
    ///
    /// Once the transport reports the connection open, the client requests
    /// the thread list; the backend is the source of truth for history.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Transport`] if the connection attempt cannot
    /// be started.
    pub async fn connect(&mut self) -> Result<(), ClientError> {
        self.transport.open().await?;
        Ok(())
    }

    /// Close the connection (idempotent, terminal)
    pub async fn disconnect(&mut self) {
        self.transport.close().await;
    }

    /// Send a user text message to the active thread
    ///
    /// The timeline is not touched; the message appears when the backend
    /// echoes it back as `user_ack`.
    pub async fn send_text(&mut self, content: impl Into<String>) {
        // A fresh user turn starts a fresh assistant turn
        self.session.reset_accumulator();
        self.dispatch(ClientIntent::UserMessage {
            content: content.into(),
        })
        .await;
    }

    /// Upload an image file
    ///
    /// An optimistic message with a local preview is appended immediately;
    /// the wire send happens once the file is read and encoded.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError`] if the path is not a file or reading fails.
    /// Nothing is sent in that case.
    pub async fn send_image(&mut self, path: &Path) -> Result<(), UploadError> {
        self.send_attachment(path, AttachmentKind::Image).await
    }

    /// Upload a document file
    ///
    /// The content type is validated before any file IO or timeline change;
    /// a non-document is rejected synchronously and never reaches the wire.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::NotADocument`] for a wrong content type, plus
    /// the IO errors of [`ChatClient::send_image`].
    pub async fn send_document(&mut self, path: &Path) -> Result<(), UploadError> {
        self.send_attachment(path, AttachmentKind::Document).await
    }

    async fn send_attachment(
        &mut self,
        path: &Path,
        kind: AttachmentKind,
    ) -> Result<(), UploadError> {
        upload::validate(path, kind)?;

        // Immediate feedback; encoding may take a while for large files
        self.session.push_local(upload::placeholder(path, kind));

        let intent = upload::encode(path, kind).await?;
        self.dispatch(intent).await;
        Ok(())
    }

    /// Start an ephemeral new chat
    ///
    /// The timeline clears and the active thread becomes `None` until the
    /// backend allocates an id via `session_create`.
    pub async fn start_new_thread(&mut self) {
        self.session.begin_new_chat();
        self.dispatch(ClientIntent::SetThread { thread_id: None })
            .await;
    }

    /// Switch to an existing thread; history follows from the backend
    pub async fn switch_thread(&mut self, thread_id: ThreadId) {
        self.dispatch(ClientIntent::SetThread {
            thread_id: Some(thread_id),
        })
        .await;
    }

    /// Fetch a thread's history without activating it
    pub async fn fetch_thread(&mut self, thread_id: ThreadId) {
        self.dispatch(ClientIntent::FetchThread { thread_id }).await;
    }

    /// Ask the backend for the current thread list
    pub async fn request_thread_list(&mut self) {
        self.dispatch(ClientIntent::GetThreads).await;
    }

    /// Encode and send one intent; failures become notices, never panics
    async fn dispatch(&mut self, intent: ClientIntent) {
        let kind = intent.kind();
        let payload = match codec::encode_intent(&intent) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(intent = kind, error = %e, "intent could not be encoded");
                self.notice(
                    NoticeLevel::Error,
                    format!("internal error: {kind} could not be encoded"),
                );
                return;
            }
        };

        if let Err(e) = self.transport.send(payload).await {
            warn!(intent = kind, error = %e, "delivery failed");
            self.notice(
                NoticeLevel::Warning,
                format!("{kind} was not delivered: {e}"),
            );
        }
    }

    /// Apply everything the transport has queued, without blocking
    ///
    /// Returns the number of transport events handled. Call this once per
    /// render tick, or use [`ChatClient::drive`] for an event-driven loop.
    pub async fn pump(&mut self) -> usize {
        let mut handled = 0;
        while let Some(event) = self.transport.try_recv() {
            self.handle_transport_event(event).await;
            handled += 1;
        }
        handled
    }

    /// Wait for and apply the next transport event
    ///
    /// Returns `false` once the transport is closed and drained.
    pub async fn drive(&mut self) -> bool {
        match self.transport.recv().await {
            Some(event) => {
                self.handle_transport_event(event).await;
                true
            }
            None => false,
        }
    }

    async fn handle_transport_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Frame(raw) => match codec::decode_event(&raw) {
                Decoded::Event(event) => self.session.apply(event),
                Decoded::Unknown { kind } => {
                    // Already logged by the codec; nothing to apply
                    debug!(kind = %kind, "ignored unrecognized event");
                }
                Decoded::Malformed { detail } => {
                    self.session.record_protocol_fault(&detail);
                }
            },
            TransportEvent::Opened => {
                info!("connection open; refreshing thread list");
                self.dispatch(ClientIntent::GetThreads).await;
            }
            TransportEvent::Reconnecting { attempt } => {
                self.notice(
                    NoticeLevel::Info,
                    format!("connection lost, reconnecting (attempt {attempt})"),
                );
            }
            TransportEvent::Exhausted => {
                self.notice(
                    NoticeLevel::Error,
                    "connection lost and reconnect attempts exhausted".to_string(),
                );
            }
        }
    }

    fn notice(&mut self, level: NoticeLevel, message: String) {
        self.notices.push(Notice { level, message });
    }

    /// Current connection state
    #[must_use]
    pub fn connection_state(&self) -> ConnectionState {
        self.transport.state()
    }

    /// The active thread id, if any
    #[must_use]
    pub fn active_thread(&self) -> Option<&ThreadId> {
        self.session.active_thread()
    }

    /// Known thread ids in backend order
    #[must_use]
    pub fn thread_ids(&self) -> &[ThreadId] {
        self.session.threads()
    }

    /// The reconciled timeline for the active thread
    #[must_use]
    pub fn timeline(&self) -> &[TimelineMessage] {
        self.session.timeline()
    }

    /// Whether an assistant reply is currently streaming
    #[must_use]
    pub fn is_streaming(&self) -> bool {
        self.session.is_streaming()
    }

    /// Produce an immutable snapshot for rendering
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.session.snapshot()
    }

    /// Drain pending notices (delivery failures, reconnect signals)
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}
