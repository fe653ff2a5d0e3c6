//! Server Events
//!
//! The closed set of events the backend sends over the wire. Each event is
//! a JSON object with a `type` discriminant and a payload, e.g.
//! `{"type": "assistant_chunk", "content": "Hel"}`.
//!
//! Events are data only - what each one *means* for the session is defined
//! by [`crate::session::SessionState::apply`]. Unknown discriminants are not
//! represented here; the codec reports and drops them so that new backend
//! event types never break older clients.

use serde::{Deserialize, Serialize};

use crate::session::{Role, ThreadId};

/// Events from the backend to the client
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// A new thread was allocated; the timeline resets
    SessionCreate {
        /// The freshly assigned thread id
        thread_id: ThreadId,
    },

    /// Wholesale replacement of the known thread list
    ThreadsList {
        /// Thread ids in backend order
        threads: Vec<ThreadId>,
    },

    /// Active thread changed; history follows separately
    ThreadSet {
        /// The now-active thread id
        thread_id: ThreadId,
    },

    /// Full history for a thread; replaces the timeline wholesale
    ThreadMessages {
        /// The thread the history belongs to (informational)
        #[serde(default)]
        thread_id: Option<ThreadId>,
        /// The replayed messages, oldest first
        messages: Vec<HistoryEntry>,
    },

    /// Backend-confirmed receipt of a user message
    UserAck {
        /// The echoed message content
        content: String,
    },

    /// A tool ran on the backend; shown as a labeled system message
    ToolMessage {
        /// Tool output or status text
        content: String,
        /// Name of the tool that produced it
        #[serde(default)]
        tool: Option<String>,
    },

    /// Incremental token(s) of an in-progress assistant reply
    AssistantChunk {
        /// The streamed fragment
        content: String,
    },

    /// Terminal, authoritative content for the in-progress reply
    ///
    /// Supersedes the accumulated chunks rather than appending to them.
    AssistantFinal {
        /// The complete reply
        content: String,
    },

    /// Receipt confirmation for an uploaded attachment
    UploadAck {
        /// Optional confirmation text
        #[serde(default)]
        message: Option<String>,
    },

    /// The backend's analysis of an uploaded document
    ReportUploaded {
        /// Analysis text, displayed as ordinary assistant content
        content: String,
    },

    /// Backend-reported fault, passed through verbatim
    Error {
        /// Human-readable error description
        message: String,
    },
}

impl ServerEvent {
    /// All wire discriminants this client understands
    pub const KNOWN_TYPES: &'static [&'static str] = &[
        "session_create",
        "threads_list",
        "thread_set",
        "thread_messages",
        "user_ack",
        "tool_message",
        "assistant_chunk",
        "assistant_final",
        "upload_ack",
        "report_uploaded",
        "error",
    ];

    /// Whether a wire discriminant belongs to the known set
    #[must_use]
    pub fn is_known_type(kind: &str) -> bool {
        Self::KNOWN_TYPES.contains(&kind)
    }
}

/// One replayed message inside a `thread_messages` payload
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Role as the backend recorded it
    pub role: WireRole,
    /// Message content
    pub content: String,
    /// Tool label for tool-originated entries
    #[serde(default)]
    pub tool: Option<String>,
}

/// Role vocabulary used on the wire
///
/// The backend distinguishes `tool` from `system`; the client displays both
/// as system messages while retaining the tool label.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireRole {
    /// Human participant
    User,
    /// Model reply
    Assistant,
    /// Backend system notice
    System,
    /// Tool invocation result
    Tool,
}

impl WireRole {
    /// Map the wire role onto the display role
    #[must_use]
    pub fn display_role(self) -> Role {
        match self {
            Self::User => Role::User,
            Self::Assistant => Role::Assistant,
            Self::System | Self::Tool => Role::System,
        }
    }
}
