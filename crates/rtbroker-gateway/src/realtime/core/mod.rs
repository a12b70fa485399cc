//! Realtime core components for the broker runtime.
//!
//! Broker context (registries), room actors, connection actors and the
//! mailboxes between them.

mod broker;
mod connection;
mod mailbox;
mod room;

pub use broker::{BrokerContext, ConnectionHandle};
pub use connection::{run_outbound, Connection};
pub use mailbox::{mailbox, DeliverError, Mailbox, MailboxSender};
pub use room::{Member, RoomHandle};
