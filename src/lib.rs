//! Threadline - Streaming Chat-Session Protocol Client
//!
//! This crate owns a single bidirectional WebSocket connection to a
//! conversational backend, reconciles the backend's interleaved event stream
//! into a coherent message timeline, and exposes a small imperative API to
//! whatever presentation layer sits on top (TUI, web view, native GUI, or
//! nothing at all for headless testing).
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                   Presentation Layer                      │
//! │        (renders snapshots, calls the facade API)          │
//! └────────────────────────────┬─────────────────────────────┘
//!                              │
//!                   ChatClient (facade)
//!                              │
//! ┌────────────────────────────┼─────────────────────────────┐
//! │         ┌──────────────────┴───────────────┐             │
//! │         │                                  │             │
//! │   ClientIntent ──► codec ──► ChatTransport │             │
//! │                                  │         │             │
//! │   SessionState ◄── codec ◄── TransportEvent              │
//! │         │                                                │
//! │   SessionSnapshot (immutable, read-only)                 │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`ChatClient`]: the facade; the only surface a presentation layer touches
//! - [`SessionState`]: pure state machine applying [`ServerEvent`]s in order
//! - [`ClientIntent`] / [`ServerEvent`]: the closed wire vocabulary
//! - [`ChatTransport`]: connection abstraction with a WebSocket and an
//!   in-process implementation
//!
//! # Quick Start
//!
//! ```ignore
//! use threadline::{ChatClient, ClientConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut client = ChatClient::new(ClientConfig::from_env());
//!     client.connect().await.unwrap();
//!
//!     client.send_text("hello").await;
//!
//!     loop {
//!         // Apply everything the backend sent since the last tick
//!         client.pump().await;
//!
//!         // Render the reconciled timeline
//!         for message in client.timeline() {
//!             // ...
//!         }
//!     }
//! }
//! ```
//!
//! # No UI Dependencies
//!
//! This crate has **zero** dependencies on any UI framework. Rendering is an
//! external collaborator that subscribes to snapshots and calls the facade.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod codec;
pub mod config;
pub mod events;
pub mod intents;
pub mod session;
pub mod transport;
pub mod upload;

// Re-exports for convenience
pub use client::{ChatClient, ClientError, Notice, NoticeLevel};
pub use codec::{decode_event, encode_intent, CodecError, Decoded};
pub use config::{
    default_config_path, load_config, load_config_from_path, ClientConfig, ConfigError,
};
pub use events::{HistoryEntry, ServerEvent, WireRole};
pub use intents::ClientIntent;
pub use session::{
    AttachmentPreview, Role, SessionSnapshot, SessionState, ThreadId, TimelineMessage,
};
pub use transport::{
    ChatTransport, ConnectionId, ConnectionState, InProcessTransport, PeerHandle, TransportConfig,
    TransportError, TransportEvent, WebSocketTransport,
};
pub use upload::{AttachmentKind, UploadError};
