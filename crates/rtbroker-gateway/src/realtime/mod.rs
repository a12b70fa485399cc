//! Realtime runtime for the broker.
//!
//! Rooms and connections are actors: each runs its own task and talks to the
//! others only through bounded queues. See `core` for the actors themselves.

pub mod core;
pub mod types;

pub use self::core::{
    mailbox, run_outbound, BrokerContext, Connection, ConnectionHandle, DeliverError, Mailbox,
    MailboxSender, Member, RoomHandle,
};
pub use types::{BrokerSettings, ConnId, PreparedMsg, PumpSettings};
