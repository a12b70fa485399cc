//! Privileged object operations.
//!
//! All three are gated by the dispatcher (`privileged() == true`); they never
//! run for a connection without the elevated role.

use async_trait::async_trait;

use rtbroker_core::error::Result;
use rtbroker_core::protocol::events;
use rtbroker_core::protocol::payload::StoreRequest;
use rtbroker_core::Envelope;

use crate::dispatch::EventHandler;
use crate::realtime::Connection;

pub struct GetObjHandler;

#[async_trait]
impl EventHandler for GetObjHandler {
    fn event(&self) -> &'static str {
        events::GET_OBJ
    }

    fn privileged(&self) -> bool {
        true
    }

    async fn handle(&self, conn: &mut Connection, env: Envelope) -> Result<()> {
        let req = StoreRequest::decode(&env.payload)?;
        let store = conn.broker().store(&req.db)?;
        let value = store.get(&req.table, &req.key).await?;

        let room = conn.broker().settings().default_room.clone();
        conn.reply(&Envelope::new(room, events::GOT_OBJ, value))
    }
}

pub struct InsertObjHandler;

#[async_trait]
impl EventHandler for InsertObjHandler {
    fn event(&self) -> &'static str {
        events::INSERT_OBJ
    }

    fn privileged(&self) -> bool {
        true
    }

    async fn handle(&self, conn: &mut Connection, env: Envelope) -> Result<()> {
        let req = StoreRequest::decode(&env.payload)?;
        let store = conn.broker().store(&req.db)?;
        store.insert(&req.table, &req.key, &req.data).await?;
        tracing::debug!(conn = %conn.id(), db = %req.db, table = %req.table, key = %req.key, "object inserted");
        Ok(())
    }
}

pub struct DeleteObjHandler;

#[async_trait]
impl EventHandler for DeleteObjHandler {
    fn event(&self) -> &'static str {
        events::DELETE_OBJ
    }

    fn privileged(&self) -> bool {
        true
    }

    async fn handle(&self, conn: &mut Connection, env: Envelope) -> Result<()> {
        let req = StoreRequest::decode(&env.payload)?;
        let store = conn.broker().store(&req.db)?;
        store.delete(&req.table, &req.key).await?;
        tracing::debug!(conn = %conn.id(), db = %req.db, table = %req.table, key = %req.key, "object deleted");
        Ok(())
    }
}
