//! Session State Machine
//!
//! Owns the client's view of one conversation session: the active thread,
//! the list of known threads, and the message timeline. Every incoming
//! [`ServerEvent`] is applied as a state transition; streamed partial
//! content is merged into the single in-flight assistant message.
//!
//! # Design Philosophy
//!
//! The state machine is a pure reducer: no I/O, no clocks beyond message
//! timestamps, no knowledge of the transport. Presentation layers read
//! immutable snapshots and never re-derive transition logic. Two invariants
//! hold in every reachable state:
//!
//! - at most one message has `in_progress = true`, and it is always the
//!   last entry in the timeline;
//! - an absent active thread implies an empty timeline.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::events::{HistoryEntry, ServerEvent};

/// Fallback text for an upload acknowledgement that carries no message.
pub const DEFAULT_UPLOAD_ACK: &str = "Image received, analyzing...";

/// Opaque backend-assigned thread identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ThreadId(pub String);

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ThreadId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ThreadId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Who a timeline message is attributed to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    /// User input (local echo or backend-confirmed)
    User,
    /// Assistant reply (streamed or final)
    Assistant,
    /// System notice, including tool-originated messages
    System,
}

/// Local-only reference to a file selected for upload
///
/// Attached to the optimistic message so the presentation layer can show a
/// preview. Never transmitted to the backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttachmentPreview {
    /// Unique preview identifier
    pub id: String,
    /// Path of the selected file on the local machine
    pub path: PathBuf,
}

impl AttachmentPreview {
    /// Create a preview reference for a local file
    #[must_use]
    pub fn for_path(path: &Path) -> Self {
        Self {
            id: format!("preview_{}", uuid::Uuid::new_v4()),
            path: path.to_path_buf(),
        }
    }
}

/// One entry in the active thread's timeline
///
/// Entries are append-only. Only the trailing in-progress assistant entry
/// is ever mutated, and only until it is finalized.
#[derive(Clone, Debug, PartialEq)]
pub struct TimelineMessage {
    /// Who sent this message
    pub role: Role,
    /// Message content (mutable only while streaming)
    pub content: String,
    /// Tool label, present only for tool-originated system messages
    pub tool: Option<String>,
    /// Whether this assistant message is still receiving chunks
    pub in_progress: bool,
    /// Whether this message reports an error
    pub is_error: bool,
    /// Local-only attachment reference (never sent to the backend)
    pub attachment: Option<AttachmentPreview>,
    /// When the entry was created (Unix timestamp ms)
    pub created_at: u64,
}

impl TimelineMessage {
    fn new(role: Role, content: String) -> Self {
        Self {
            role,
            content,
            tool: None,
            in_progress: false,
            is_error: false,
            attachment: None,
            created_at: now_ms(),
        }
    }

    /// Create a user message
    #[must_use]
    pub fn user(content: String) -> Self {
        Self::new(Role::User, content)
    }

    /// Create a finalized assistant message
    #[must_use]
    pub fn assistant(content: String) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Create a system message
    #[must_use]
    pub fn system(content: String) -> Self {
        Self::new(Role::System, content)
    }

    /// Create a system message carrying a tool label
    #[must_use]
    pub fn tool_notice(content: String, tool: String) -> Self {
        Self {
            tool: Some(tool),
            ..Self::new(Role::System, content)
        }
    }

    /// Create an error-flagged system message
    #[must_use]
    pub fn error(message: String) -> Self {
        Self {
            is_error: true,
            ..Self::new(Role::System, message)
        }
    }

    /// Create an in-progress assistant message seeded with streamed content
    #[must_use]
    pub fn streaming(seed: String) -> Self {
        Self {
            in_progress: true,
            ..Self::new(Role::Assistant, seed)
        }
    }

    /// Attach a local preview reference
    #[must_use]
    pub fn with_attachment(mut self, preview: AttachmentPreview) -> Self {
        self.attachment = Some(preview);
        self
    }

    fn from_history(entry: HistoryEntry) -> Self {
        Self {
            role: entry.role.display_role(),
            content: entry.content,
            tool: entry.tool,
            in_progress: false,
            is_error: false,
            attachment: None,
            created_at: now_ms(),
        }
    }
}

/// Immutable view of the session for presentation layers
#[derive(Clone, Debug, PartialEq)]
pub struct SessionSnapshot {
    /// Active thread, if one has been assigned
    pub active_thread: Option<ThreadId>,
    /// Known thread ids, backend order
    pub threads: Vec<ThreadId>,
    /// Timeline of the active thread
    pub timeline: Vec<TimelineMessage>,
}

/// The session state machine
///
/// Applies incoming events one at a time, in wire-arrival order. Every
/// transition either fully applies or (for malformed input, handled by the
/// caller via [`SessionState::record_protocol_fault`]) appends a visible
/// error message - state is never left half-updated.
#[derive(Debug, Default)]
pub struct SessionState {
    active_thread: Option<ThreadId>,
    threads: Vec<ThreadId>,
    timeline: Vec<TimelineMessage>,
    /// Running concatenation of streamed chunks for the current assistant
    /// turn. Cleared on finalization and on thread switches.
    accumulator: String,
}

impl SessionState {
    /// Create an empty session (no thread, no history)
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one incoming event as a state transition
    pub fn apply(&mut self, event: ServerEvent) {
        match event {
            ServerEvent::SessionCreate { thread_id } => {
                tracing::debug!(thread = %thread_id, "session created");
                self.active_thread = Some(thread_id);
                self.timeline.clear();
                self.accumulator.clear();
            }
            ServerEvent::ThreadSet { thread_id } => {
                // History arrives separately; only the identity changes here.
                tracing::debug!(thread = %thread_id, "thread activated");
                self.active_thread = Some(thread_id);
                self.accumulator.clear();
            }
            ServerEvent::ThreadsList { threads } => {
                self.threads = threads;
            }
            ServerEvent::ThreadMessages { messages, .. } => {
                self.timeline = messages
                    .into_iter()
                    .map(TimelineMessage::from_history)
                    .collect();
                self.accumulator.clear();
            }
            ServerEvent::UserAck { content } => {
                self.append(TimelineMessage::user(content));
            }
            ServerEvent::ToolMessage { content, tool } => {
                let tool = tool.unwrap_or_else(|| "tool".to_string());
                self.append(TimelineMessage::tool_notice(content, tool));
            }
            ServerEvent::AssistantChunk { content } => {
                self.accumulator.push_str(&content);
                match self.timeline.last_mut() {
                    Some(last) if last.in_progress && last.role == Role::Assistant => {
                        last.content.clone_from(&self.accumulator);
                    }
                    _ => {
                        self.timeline
                            .push(TimelineMessage::streaming(self.accumulator.clone()));
                    }
                }
            }
            ServerEvent::AssistantFinal { content } => {
                // The final payload supersedes the accumulated chunks.
                match self.timeline.last_mut() {
                    Some(last) if last.in_progress && last.role == Role::Assistant => {
                        last.content = content;
                        last.in_progress = false;
                    }
                    _ => self.timeline.push(TimelineMessage::assistant(content)),
                }
                self.accumulator.clear();
            }
            ServerEvent::UploadAck { message } => {
                let content = message.unwrap_or_else(|| DEFAULT_UPLOAD_ACK.to_string());
                self.append(TimelineMessage::system(content));
            }
            ServerEvent::ReportUploaded { content } => {
                self.append(TimelineMessage::assistant(content));
            }
            ServerEvent::Error { message } => {
                tracing::warn!(message = %message, "backend reported an error");
                self.append(TimelineMessage::error(message));
            }
        }
    }

    /// Record a protocol fault (undecodable payload) as a visible message
    ///
    /// The fault is recovered locally; no other state changes.
    pub fn record_protocol_fault(&mut self, detail: &str) {
        tracing::warn!(detail = %detail, "recovered from protocol fault");
        self.append(TimelineMessage::error(format!(
            "Error: received a malformed server event ({detail})"
        )));
    }

    /// Append a locally-originated message (optimistic echo)
    pub fn push_local(&mut self, message: TimelineMessage) {
        self.append(message);
    }

    /// Reset to an ephemeral new chat: no thread, empty timeline
    pub fn begin_new_chat(&mut self) {
        self.active_thread = None;
        self.timeline.clear();
        self.accumulator.clear();
    }

    /// Clear the chunk accumulator (called when a new user turn starts)
    pub fn reset_accumulator(&mut self) {
        self.accumulator.clear();
    }

    /// Append an immutable message, sealing the streaming tail first so
    /// the in-progress entry is always the last one.
    fn append(&mut self, message: TimelineMessage) {
        self.seal_streaming_tail();
        self.timeline.push(message);
    }

    fn seal_streaming_tail(&mut self) {
        if let Some(last) = self.timeline.last_mut() {
            if last.in_progress {
                last.in_progress = false;
            }
        }
    }

    /// The active thread id, if any
    #[must_use]
    pub fn active_thread(&self) -> Option<&ThreadId> {
        self.active_thread.as_ref()
    }

    /// Known thread ids in backend order
    #[must_use]
    pub fn threads(&self) -> &[ThreadId] {
        &self.threads
    }

    /// The reconciled timeline for the active thread
    #[must_use]
    pub fn timeline(&self) -> &[TimelineMessage] {
        &self.timeline
    }

    /// Whether an assistant reply is currently streaming
    #[must_use]
    pub fn is_streaming(&self) -> bool {
        self.timeline.last().is_some_and(|m| m.in_progress)
    }

    /// Produce an immutable snapshot for the presentation layer
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            active_thread: self.active_thread.clone(),
            threads: self.threads.clone(),
            timeline: self.timeline.clone(),
        }
    }
}

/// Get current timestamp in milliseconds
fn now_ms() -> u64 {
    u64::try_from(
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis(),
    )
    .unwrap_or(u64::MAX)
}
