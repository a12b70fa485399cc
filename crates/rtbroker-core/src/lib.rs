//! rtbroker core: transport-agnostic wire types and the shared error surface.
//!
//! This crate defines the envelope exchanged between clients, connections and
//! rooms, the nested payloads of the built-in events, and the error type shared
//! by the gateway. It carries no transport or runtime dependencies.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here. Malformed input is
//! always reported as `BrokerError::Decode` so a hostile frame can never bring
//! the process down.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod protocol;

/// Shared result type.
pub use error::{BrokerError, ErrorCode, Result};
pub use protocol::envelope::Envelope;
