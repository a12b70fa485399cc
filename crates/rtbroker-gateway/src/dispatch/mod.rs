//! Inbound dispatch: the event-kind handler table and the event hub behind it.

pub mod dispatcher;
pub mod hub;

pub use dispatcher::{Dispatcher, EventHandler};
pub use hub::{EventHub, HubCtx, HubListener};
