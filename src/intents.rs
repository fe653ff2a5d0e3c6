//! Client Intents
//!
//! Messages the client sends to the backend. Each intent serializes to a
//! JSON object with a `type` discriminant, e.g.
//! `{"type": "user_message", "content": "hi"}`.

use serde::{Deserialize, Serialize};

use crate::session::ThreadId;

/// Outgoing intents from the client to the backend
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientIntent {
    /// Request the list of known threads
    GetThreads,

    /// Submit a user message to the active thread
    UserMessage {
        /// The message content
        content: String,
    },

    /// Activate a thread, or request a fresh one
    ///
    /// A `null` thread id asks the backend to allocate a new thread; the
    /// backend answers with `session_create`.
    SetThread {
        /// Thread to activate, or `None` for a new chat
        thread_id: Option<ThreadId>,
    },

    /// Fetch a thread's history without switching to it
    FetchThread {
        /// The thread to fetch
        thread_id: ThreadId,
    },

    /// Upload an image as a base64 payload
    UploadingFile {
        /// Base64-encoded image bytes
        file: String,
    },

    /// Upload a document for direct backend processing
    UploadReportDirect {
        /// Base64-encoded document bytes
        file_base64: String,
        /// Original filename, extension included
        filename: String,
        /// Display title; the filename with its extension stripped unless
        /// supplied otherwise
        title: String,
    },
}

impl ClientIntent {
    /// Short label for logging and delivery-failure notices
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::GetThreads => "thread list request",
            Self::UserMessage { .. } => "message",
            Self::SetThread { .. } => "thread switch",
            Self::FetchThread { .. } => "thread fetch",
            Self::UploadingFile { .. } => "image upload",
            Self::UploadReportDirect { .. } => "document upload",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_get_threads_wire_format() {
        let value = serde_json::to_value(ClientIntent::GetThreads).unwrap();
        assert_eq!(value, json!({"type": "get_threads"}));
    }

    #[test]
    fn test_user_message_wire_format() {
        let value = serde_json::to_value(ClientIntent::UserMessage {
            content: "hi".to_string(),
        })
        .unwrap();
        assert_eq!(value, json!({"type": "user_message", "content": "hi"}));
    }

    #[test]
    fn test_new_chat_sends_null_thread_id() {
        let value = serde_json::to_value(ClientIntent::SetThread { thread_id: None }).unwrap();
        assert_eq!(value, json!({"type": "set_thread", "thread_id": null}));
    }

    #[test]
    fn test_switch_thread_wire_format() {
        let value = serde_json::to_value(ClientIntent::SetThread {
            thread_id: Some("t2".into()),
        })
        .unwrap();
        assert_eq!(value, json!({"type": "set_thread", "thread_id": "t2"}));
    }

    #[test]
    fn test_fetch_thread_wire_format() {
        let value = serde_json::to_value(ClientIntent::FetchThread {
            thread_id: "t3".into(),
        })
        .unwrap();
        assert_eq!(value, json!({"type": "fetch_thread", "thread_id": "t3"}));
    }

    #[test]
    fn test_document_upload_wire_format() {
        let value = serde_json::to_value(ClientIntent::UploadReportDirect {
            file_base64: "QUJD".to_string(),
            filename: "report.pdf".to_string(),
            title: "report".to_string(),
        })
        .unwrap();
        assert_eq!(
            value,
            json!({
                "type": "upload_report_direct",
                "file_base64": "QUJD",
                "filename": "report.pdf",
                "title": "report"
            })
        );
    }
}
