use async_trait::async_trait;

use rtbroker_core::error::{BrokerError, Result};
use rtbroker_core::protocol::events;
use rtbroker_core::Envelope;

use crate::dispatch::EventHandler;
use crate::realtime::Connection;

/// `join`: admit the sender to `env.room`.
pub struct JoinHandler;

#[async_trait]
impl EventHandler for JoinHandler {
    fn event(&self) -> &'static str {
        events::JOIN
    }

    async fn handle(&self, conn: &mut Connection, env: Envelope) -> Result<()> {
        if env.room.is_empty() {
            return Err(BrokerError::Decode("join requires a room".into()));
        }
        conn.join(&env.room).await
    }
}

/// `leave`: remove the sender from `env.room`.
pub struct LeaveHandler;

#[async_trait]
impl EventHandler for LeaveHandler {
    fn event(&self) -> &'static str {
        events::LEAVE
    }

    async fn handle(&self, conn: &mut Connection, env: Envelope) -> Result<()> {
        conn.leave(&env.room).await
    }
}
