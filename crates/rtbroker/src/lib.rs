//! Top-level facade crate for rtbroker.
//!
//! Re-exports the wire types and the broker gateway so users can depend on a single crate.

pub mod core {
    pub use rtbroker_core::*;
}

pub mod gateway {
    pub use rtbroker_gateway::*;
}
