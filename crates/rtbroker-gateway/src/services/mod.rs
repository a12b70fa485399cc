//! Built-in event handlers and bundled hub listeners.

mod membership;
mod objects;
mod relay;
mod view;

use std::sync::Arc;

use crate::dispatch::Dispatcher;

pub use membership::{JoinHandler, LeaveHandler};
pub use objects::{DeleteObjHandler, GetObjHandler, InsertObjHandler};
pub use relay::RoomRelay;
pub use view::RequestHandler;

pub fn register_builtins(dispatcher: &Dispatcher) {
    dispatcher.register(Arc::new(JoinHandler));
    dispatcher.register(Arc::new(LeaveHandler));
    dispatcher.register(Arc::new(RequestHandler));
    dispatcher.register(Arc::new(GetObjHandler));
    dispatcher.register(Arc::new(InsertObjHandler));
    dispatcher.register(Arc::new(DeleteObjHandler));
}
