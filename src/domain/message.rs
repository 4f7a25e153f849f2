//! Frames carried from the relay to consumer connections.
//!
//! [`Payload`] is an opaque producer message relayed verbatim.
//! [`WelcomeMessage`] is a relay-internal control frame sent once to each
//! consumer and never forwarded anywhere else. Both travel through a
//! consumer's outbound queue as an [`OutboundFrame`].

use axum::body::Bytes;
use axum::extract::ws::{Message, Utf8Bytes};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque producer payload.
///
/// Cloning is cheap (reference counted), so one inbound frame is shared by
/// every consumer it is delivered to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// UTF-8 text frame.
    Text(Utf8Bytes),
    /// Binary frame.
    Binary(Bytes),
}

impl Payload {
    /// Size of the payload in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Text(text) => text.as_str().len(),
            Self::Binary(bytes) => bytes.len(),
        }
    }

    /// Returns `true` if the payload carries no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns at most `max_chars` characters of a text payload, for logs.
    ///
    /// Binary payloads have no preview.
    #[must_use]
    pub fn preview(&self, max_chars: usize) -> Option<String> {
        match self {
            Self::Text(text) => Some(text.as_str().chars().take(max_chars).collect()),
            Self::Binary(_) => None,
        }
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Self::Text(text.into())
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Self::Text(text.into())
    }
}

impl From<Payload> for Message {
    fn from(payload: Payload) -> Self {
        match payload {
            Payload::Text(text) => Self::Text(text),
            Payload::Binary(bytes) => Self::Binary(bytes),
        }
    }
}

/// Welcome frame sent to a consumer right after it connects.
///
/// Serialized as `{"type":"welcome","message":...,"timestamp":<epoch ms>}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WelcomeMessage {
    /// Always `"welcome"`.
    #[serde(rename = "type")]
    pub msg_type: String,
    /// Human-readable greeting.
    pub message: String,
    /// Registration time in milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl WelcomeMessage {
    /// Discriminator value of the `type` field.
    pub const TYPE: &'static str = "welcome";

    /// Creates a welcome frame stamped with `registered_at`.
    #[must_use]
    pub fn new(message: impl Into<String>, registered_at: DateTime<Utc>) -> Self {
        Self {
            msg_type: Self::TYPE.to_string(),
            message: message.into(),
            timestamp: registered_at.timestamp_millis(),
        }
    }

    /// Serializes the frame to its JSON wire form.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// A frame waiting in a consumer's outbound queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundFrame {
    /// One-time welcome control frame.
    Welcome(WelcomeMessage),
    /// Relayed producer payload.
    Relay(Payload),
}

impl From<OutboundFrame> for Message {
    fn from(frame: OutboundFrame) -> Self {
        match frame {
            OutboundFrame::Welcome(welcome) => Self::text(welcome.to_json()),
            OutboundFrame::Relay(payload) => payload.into(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn welcome_wire_format() {
        let Some(at) = Utc.timestamp_millis_opt(1_700_000_000_123).single() else {
            panic!("valid timestamp");
        };
        let welcome = WelcomeMessage::new("hello", at);
        let Ok(value) = serde_json::from_str::<serde_json::Value>(&welcome.to_json()) else {
            panic!("welcome must be valid JSON");
        };
        assert_eq!(
            value,
            serde_json::json!({
                "type": "welcome",
                "message": "hello",
                "timestamp": 1_700_000_000_123_i64,
            })
        );
    }

    #[test]
    fn text_payload_maps_to_text_frame() {
        let message = Message::from(OutboundFrame::Relay(Payload::from("pos:10,20")));
        let Message::Text(text) = message else {
            panic!("expected text frame");
        };
        assert_eq!(text.as_str(), "pos:10,20");
    }

    #[test]
    fn binary_payload_maps_to_binary_frame() {
        let payload = Payload::Binary(Bytes::from_static(&[1, 2, 3]));
        assert_eq!(payload.len(), 3);
        assert!(payload.preview(10).is_none());
        let Message::Binary(bytes) = Message::from(payload) else {
            panic!("expected binary frame");
        };
        assert_eq!(bytes.as_ref(), &[1, 2, 3]);
    }

    #[test]
    fn preview_truncates_on_char_boundary() {
        let payload = Payload::from("héllo wörld");
        assert_eq!(payload.preview(4).as_deref(), Some("héll"));
        assert_eq!(payload.preview(100).as_deref(), Some("héllo wörld"));
    }

    #[test]
    fn empty_payload() {
        assert!(Payload::from("").is_empty());
        assert!(!Payload::from("x").is_empty());
    }
}
