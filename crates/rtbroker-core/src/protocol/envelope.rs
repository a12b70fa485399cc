//! Message envelope (JSON text frame).
//!
//! The broker never looks inside `payload`; its meaning depends entirely on
//! `event` and belongs to the handler that receives it.

use serde::{Deserialize, Serialize};

use crate::error::{BrokerError, Result};

/// Uniform unit exchanged over the wire and between actors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Envelope {
    /// Target room name.
    #[serde(default)]
    pub room: String,
    /// Event kind tag.
    pub event: String,
    /// Opaque, application-defined payload.
    #[serde(default)]
    pub payload: String,
}

impl Envelope {
    pub fn new(
        room: impl Into<String>,
        event: impl Into<String>,
        payload: impl Into<String>,
    ) -> Self {
        Self {
            room: room.into(),
            event: event.into(),
            payload: payload.into(),
        }
    }

    /// Decode one text frame.
    pub fn decode(frame: &str) -> Result<Self> {
        if frame.trim().is_empty() {
            return Err(BrokerError::Decode("empty frame".into()));
        }
        let env: Envelope = serde_json::from_str(frame)
            .map_err(|e| BrokerError::Decode(format!("invalid envelope json: {e}")))?;
        if env.event.is_empty() {
            return Err(BrokerError::Decode("envelope event must not be empty".into()));
        }
        Ok(env)
    }

    /// Encode into the text-frame form.
    pub fn encode(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| BrokerError::Encode(format!("envelope encode failed: {e}")))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn missing_room_and_payload_default_to_empty() {
        let env = Envelope::decode(r#"{"event":"join"}"#).unwrap();
        assert_eq!(env.room, "");
        assert_eq!(env.payload, "");
    }

    #[test]
    fn empty_event_is_rejected() {
        let err = Envelope::decode(r#"{"room":"root","event":"","payload":""}"#).unwrap_err();
        assert_eq!(err.code().as_str(), "DECODE");
    }

    #[test]
    fn whitespace_frame_is_rejected() {
        assert!(Envelope::decode("   ").is_err());
    }
}
