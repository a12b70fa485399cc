use std::sync::Arc;

use async_trait::async_trait;

use rtbroker_core::error::{BrokerError, Result};
use rtbroker_core::protocol::events;
use rtbroker_core::protocol::payload::ViewResponse;
use rtbroker_core::Envelope;

use crate::dispatch::EventHandler;
use crate::realtime::Connection;

/// `request`: render the view for the path in `payload` and reply with a
/// `response` envelope on the default room. A route naming a table also
/// lists that table's objects into the payload.
pub struct RequestHandler;

#[async_trait]
impl EventHandler for RequestHandler {
    fn event(&self) -> &'static str {
        events::REQUEST
    }

    async fn handle(&self, conn: &mut Connection, env: Envelope) -> Result<()> {
        let broker = Arc::clone(conn.broker());
        let path = env.payload.as_str();
        let view = broker
            .views()
            .render(path)
            .ok_or_else(|| BrokerError::NotFound(format!("no route for path: {path}")))?;

        let collection = match view.table.as_deref() {
            Some(table) => {
                let records = broker.list_table(table).await;
                if records.is_none() {
                    tracing::debug!(conn = %conn.id(), %path, table, "no database declares the route table");
                }
                Some(records.unwrap_or_default())
            }
            None => None,
        };

        let body = ViewResponse {
            template: view.markup,
            controller: view.controller.unwrap_or_default(),
            collection,
        }
        .encode()?;

        let room = broker.settings().default_room.clone();
        conn.reply(&Envelope::new(room, events::RESPONSE, body))
    }
}
