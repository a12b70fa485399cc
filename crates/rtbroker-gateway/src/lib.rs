//! rtbroker gateway library entry.
//!
//! This crate wires the transport, dispatcher, realtime core (rooms,
//! connections, registries) and built-in handlers into a realtime broker. It
//! is consumed by the binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod dispatch;
pub mod infra;
pub mod ops;
pub mod realtime;
pub mod router;
pub mod services;
pub mod transport;
