use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use rtbroker_core::error::Result;
use rtbroker_core::Envelope;

use crate::dispatch::hub::EventHub;
use crate::realtime::Connection;

/// Handler for one event kind. New kinds are added by registering another
/// handler; the dispatcher itself never changes.
#[async_trait]
pub trait EventHandler: Send + Sync {
    fn event(&self) -> &'static str;

    /// Only connections carrying the elevated role may reach `handle`.
    /// Everyone else is ignored without an error or a reply.
    fn privileged(&self) -> bool {
        false
    }

    async fn handle(&self, conn: &mut Connection, env: Envelope) -> Result<()>;
}

/// Event kind -> handler table, with the event hub as fallback.
#[derive(Default)]
pub struct Dispatcher {
    handlers: DashMap<&'static str, Arc<dyn EventHandler>>,
    hub: EventHub,
}

impl Dispatcher {
    /// Dispatcher with `join`, `leave`, `request` and the object operations.
    pub fn with_builtins() -> Self {
        let dispatcher = Self::default();
        crate::services::register_builtins(&dispatcher);
        dispatcher
    }

    pub fn register(&self, handler: Arc<dyn EventHandler>) {
        self.handlers.insert(handler.event(), handler);
    }

    pub fn hub(&self) -> &EventHub {
        &self.hub
    }

    pub async fn dispatch(&self, conn: &mut Connection, env: Envelope) -> Result<()> {
        let handler = self
            .handlers
            .get(env.event.as_str())
            .map(|e| e.value().clone());

        let Some(handler) = handler else {
            return self.hub.emit(conn, env).await;
        };

        if handler.privileged() && !conn.is_elevated() {
            tracing::trace!(conn = %conn.id(), event = %env.event, "privileged event ignored");
            return Ok(());
        }
        handler.handle(conn, env).await
    }
}
