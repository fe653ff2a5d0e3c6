//! Wire Codec
//!
//! Serializes outgoing intents and classifies incoming frames. Decoding is
//! total: any input maps to a known event, an unknown-type report, or a
//! malformed-payload report. A decode problem is never a fatal fault -
//! unknown types are logged and dropped for forward compatibility, and
//! malformed payloads are surfaced to the session as protocol errors.

use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::events::ServerEvent;
use crate::intents::ClientIntent;

/// Errors raised while encoding outgoing intents
#[derive(Debug, Error)]
pub enum CodecError {
    /// JSON serialization failed
    #[error("failed to serialize intent: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Serialize an intent to its wire representation
///
/// # Errors
///
/// Returns [`CodecError::Encode`] if JSON serialization fails.
pub fn encode_intent(intent: &ClientIntent) -> Result<String, CodecError> {
    serde_json::to_string(intent).map_err(CodecError::Encode)
}

/// Outcome of decoding one incoming frame
#[derive(Clone, Debug, PartialEq)]
pub enum Decoded {
    /// A well-formed event from the known set
    Event(ServerEvent),
    /// A discriminant this client does not understand; logged and dropped
    Unknown {
        /// The unrecognized `type` value
        kind: String,
    },
    /// Invalid JSON, a missing discriminant, or a bad payload for a known
    /// type; converted into a visible protocol-error message
    Malformed {
        /// Description of what failed to parse
        detail: String,
    },
}

/// Classify one raw text frame from the backend
#[must_use]
pub fn decode_event(raw: &str) -> Decoded {
    let value: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            return Decoded::Malformed {
                detail: format!("invalid JSON: {e}"),
            }
        }
    };

    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .map(str::to_owned);

    match serde_json::from_value::<ServerEvent>(value) {
        Ok(event) => Decoded::Event(event),
        Err(e) => match kind {
            Some(kind) if !ServerEvent::is_known_type(&kind) => {
                warn!(kind = %kind, "dropping event of unrecognized type");
                Decoded::Unknown { kind }
            }
            Some(kind) => Decoded::Malformed {
                detail: format!("bad `{kind}` payload: {e}"),
            },
            None => Decoded::Malformed {
                detail: format!("missing event type: {e}"),
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_encode_round_trips_through_decode() {
        let raw = encode_intent(&ClientIntent::UserMessage {
            content: "hello".to_string(),
        })
        .unwrap();
        assert!(raw.contains(r#""type":"user_message""#));
    }

    #[test]
    fn test_decode_known_event() {
        let decoded = decode_event(r#"{"type": "assistant_chunk", "content": "Hel"}"#);
        assert_eq!(
            decoded,
            Decoded::Event(ServerEvent::AssistantChunk {
                content: "Hel".to_string()
            })
        );
    }

    #[test]
    fn test_decode_unknown_type_is_dropped_not_fatal() {
        let decoded = decode_event(r#"{"type": "shiny_new_feature", "payload": 1}"#);
        assert_eq!(
            decoded,
            Decoded::Unknown {
                kind: "shiny_new_feature".to_string()
            }
        );
    }

    #[test]
    fn test_decode_invalid_json_is_malformed() {
        let decoded = decode_event("{nope");
        assert!(matches!(decoded, Decoded::Malformed { .. }));
    }

    #[test]
    fn test_decode_missing_required_field_is_malformed() {
        // Known type, payload missing its required `content` field
        let decoded = decode_event(r#"{"type": "assistant_chunk"}"#);
        let Decoded::Malformed { detail } = decoded else {
            panic!("expected malformed");
        };
        assert!(detail.contains("assistant_chunk"));
    }

    #[test]
    fn test_decode_missing_type_is_malformed() {
        let decoded = decode_event(r#"{"content": "orphan"}"#);
        assert!(matches!(decoded, Decoded::Malformed { .. }));
    }

    #[test]
    fn test_decode_non_object_is_malformed() {
        assert!(matches!(decode_event("42"), Decoded::Malformed { .. }));
        assert!(matches!(decode_event("[]"), Decoded::Malformed { .. }));
    }
}
