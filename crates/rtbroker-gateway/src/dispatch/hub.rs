//! Application-level event hub.
//!
//! Envelopes whose event kind has no registered handler land here verbatim.
//! Applications subscribe listeners per event kind; listeners run in
//! registration order on the sending connection's inbound task.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use rtbroker_core::error::Result;
use rtbroker_core::Envelope;

use crate::realtime::{BrokerContext, Connection, ConnId};

#[async_trait]
pub trait HubListener: Send + Sync {
    async fn on_event(&self, ctx: HubCtx, env: Envelope) -> Result<()>;
}

/// What a listener knows about the sender, plus the broker to push through.
#[derive(Clone)]
pub struct HubCtx {
    conn_id: ConnId,
    privilege: Arc<str>,
    broker: Arc<BrokerContext>,
}

impl HubCtx {
    pub fn conn_id(&self) -> &ConnId {
        &self.conn_id
    }

    pub fn privilege(&self) -> &str {
        &self.privilege
    }

    pub fn broker(&self) -> &Arc<BrokerContext> {
        &self.broker
    }

    /// Broadcast to `env.room` (dropped if the room does not exist).
    pub async fn emit(&self, env: &Envelope) {
        self.broker.emit(env).await;
    }

    /// Send only to the originating connection.
    pub fn reply(&self, env: &Envelope) -> Result<()> {
        self.broker.send_to(&self.conn_id, env)
    }
}

#[derive(Default)]
pub struct EventHub {
    listeners: DashMap<String, Vec<Arc<dyn HubListener>>>,
}

impl EventHub {
    pub fn on(&self, event: impl Into<String>, listener: Arc<dyn HubListener>) {
        self.listeners.entry(event.into()).or_default().push(listener);
    }

    pub async fn emit(&self, conn: &Connection, env: Envelope) -> Result<()> {
        let listeners = self
            .listeners
            .get(env.event.as_str())
            .map(|l| l.value().clone())
            .unwrap_or_default();

        if listeners.is_empty() {
            tracing::debug!(conn = %conn.id(), event = %env.event, "no hub listener");
            return Ok(());
        }

        let ctx = HubCtx {
            conn_id: conn.id().clone(),
            privilege: Arc::from(conn.privilege()),
            broker: Arc::clone(conn.broker()),
        };
        for listener in listeners {
            listener.on_event(ctx.clone(), env.clone()).await?;
        }
        Ok(())
    }
}
