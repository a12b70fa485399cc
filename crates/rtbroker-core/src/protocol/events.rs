//! Event kinds handled or emitted by the broker itself.
//!
//! Anything else is application-defined and goes to the event hub.

pub const JOIN: &str = "join";
pub const LEAVE: &str = "leave";
pub const REQUEST: &str = "request";

pub const GET_OBJ: &str = "getObj";
pub const INSERT_OBJ: &str = "insertObj";
pub const DELETE_OBJ: &str = "deleteObj";

/// Reply to a successful `getObj`.
pub const GOT_OBJ: &str = "gotObj";
/// Reply to a `request` (rendered view).
pub const RESPONSE: &str = "response";

/// Kinds with a built-in handler; these never reach the event hub.
pub const BUILTIN: [&str; 6] = [JOIN, LEAVE, REQUEST, GET_OBJ, INSERT_OBJ, DELETE_OBJ];
