//! In-process stand-ins for the broker's external collaborators.
//!
//! The broker only depends on the traits; the in-memory implementations are
//! what the binary wires up from config.

pub mod store;
pub mod tickets;
pub mod views;

pub use store::{MemoryStore, ObjectStore};
pub use tickets::{StaticTicketStore, TicketStore};
pub use views::{RenderedView, RouteTable, ViewRenderer};
