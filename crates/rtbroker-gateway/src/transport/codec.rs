//! Decode-once codec for the transport layer.
//!
//! - Text frames => `Envelope`
//! - Binary frames => UTF-8 checked, then decoded like text
//! - Ping/Pong/Close are surfaced for lifecycle management
//!
//! The length check runs before any parsing.

use axum::extract::ws::Message;
use rtbroker_core::error::{BrokerError, Result};
use rtbroker_core::Envelope;

#[derive(Debug)]
pub enum Inbound {
    Envelope(Envelope),
    Ping,
    Pong,
    Close,
}

fn frame_len(msg: &Message) -> usize {
    match msg {
        Message::Text(s) => s.len(),
        Message::Binary(b) => b.len(),
        Message::Ping(v) | Message::Pong(v) => v.len(),
        Message::Close(_) => 0,
    }
}

pub fn decode(msg: Message, max_frame_bytes: usize) -> Result<Inbound> {
    let len = frame_len(&msg);
    if len > max_frame_bytes {
        return Err(BrokerError::PayloadTooLarge {
            len,
            max: max_frame_bytes,
        });
    }

    match msg {
        Message::Text(s) => Ok(Inbound::Envelope(Envelope::decode(&s)?)),
        Message::Binary(b) => {
            let s = std::str::from_utf8(&b)
                .map_err(|e| BrokerError::Decode(format!("binary frame is not utf-8: {e}")))?;
            Ok(Inbound::Envelope(Envelope::decode(s)?))
        }
        Message::Ping(_) => Ok(Inbound::Ping),
        Message::Pong(_) => Ok(Inbound::Pong),
        Message::Close(_) => Ok(Inbound::Close),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::panic)]

    use super::*;

    #[test]
    fn text_frame_decodes_to_envelope() {
        let msg = Message::Text(r#"{"room":"root","event":"chat","payload":"hi"}"#.into());
        match decode(msg, 4096).unwrap() {
            Inbound::Envelope(env) => assert_eq!(env, Envelope::new("root", "chat", "hi")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn oversized_frame_is_fatal() {
        let msg = Message::Text("x".repeat(100));
        let err = decode(msg, 64).unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(err.code().as_str(), "PAYLOAD_TOO_LARGE");
    }

    #[test]
    fn malformed_frame_is_not_fatal() {
        let err = decode(Message::Text("{".into()), 64).unwrap_err();
        assert!(!err.is_fatal());
    }

    #[test]
    fn control_frames_surface() {
        assert!(matches!(decode(Message::Pong(vec![]), 64).unwrap(), Inbound::Pong));
        assert!(matches!(decode(Message::Close(None), 64).unwrap(), Inbound::Close));
    }
}
