//! Wire formats.
//!
//! - `envelope`: the `(room, event, payload)` unit carried in every text frame.
//! - `payload`: structured payloads nested (as JSON strings) inside `payload`
//!   for the built-in events.
//! - `events`: event kinds the broker understands or emits itself.
//!
//! Decoders never index raw input and never fall back to defaults for a
//! missing frame: empty or truncated input is a `BrokerError::Decode`.

pub mod envelope;
pub mod events;
pub mod payload;
