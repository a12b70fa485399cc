use std::collections::BTreeMap;
use std::sync::Arc;

use dashmap::DashMap;

use rtbroker_core::error::{BrokerError, Result};
use rtbroker_core::protocol::payload::ViewRecord;
use rtbroker_core::Envelope;

use crate::dispatch::{Dispatcher, EventHub};
use crate::infra::{ObjectStore, RouteTable, ViewRenderer};
use crate::realtime::core::mailbox::{DeliverError, MailboxSender};
use crate::realtime::core::room::RoomHandle;
use crate::realtime::types::{BrokerSettings, ConnId, PreparedMsg};

/// Registry entry for a live connection.
#[derive(Clone)]
pub struct ConnectionHandle {
    pub id: ConnId,
    pub privilege: Arc<str>,
    pub mailbox: MailboxSender,
}

/// Owned broker context: registries, dispatch table and collaborators.
///
/// Passed explicitly (as `Arc<BrokerContext>`) to everything that needs it, so
/// several independent brokers can share a process. Registry access is
/// insert/lookup/delete only; DashMap guards are never held across `.await`.
pub struct BrokerContext {
    settings: BrokerSettings,
    connections: DashMap<ConnId, ConnectionHandle>,
    rooms: DashMap<String, RoomHandle>,
    dispatcher: Dispatcher,
    stores: BTreeMap<String, Arc<dyn ObjectStore>>,
    views: Arc<dyn ViewRenderer>,
}

impl BrokerContext {
    /// Broker with the built-in event handlers, no stores and no routes.
    pub fn new(settings: BrokerSettings) -> Self {
        Self {
            settings,
            connections: DashMap::new(),
            rooms: DashMap::new(),
            dispatcher: Dispatcher::with_builtins(),
            stores: BTreeMap::new(),
            views: Arc::new(RouteTable::empty()),
        }
    }

    pub fn with_store(mut self, db: impl Into<String>, store: Arc<dyn ObjectStore>) -> Self {
        self.stores.insert(db.into(), store);
        self
    }

    pub fn with_views(mut self, views: Arc<dyn ViewRenderer>) -> Self {
        self.views = views;
        self
    }

    pub fn settings(&self) -> &BrokerSettings {
        &self.settings
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn hub(&self) -> &EventHub {
        self.dispatcher.hub()
    }

    pub fn views(&self) -> &dyn ViewRenderer {
        self.views.as_ref()
    }

    /// Storage backend registered under `db`.
    pub fn store(&self, db: &str) -> Result<Arc<dyn ObjectStore>> {
        self.stores
            .get(db)
            .cloned()
            .ok_or_else(|| BrokerError::UnknownTarget(format!("database does not exist: {db}")))
    }

    /// Every object in `table`, taken from the first database (in name order)
    /// that declares it. `None` when no database does.
    pub async fn list_table(&self, table: &str) -> Option<Vec<ViewRecord>> {
        for (db, store) in &self.stores {
            let keys = match store.list(table).await {
                Ok(keys) => keys,
                Err(e) => {
                    tracing::trace!(db = %db, table, code = e.code().as_str(), "table not in database");
                    continue;
                }
            };

            let mut records = Vec::with_capacity(keys.len());
            for key in keys {
                match store.get(table, &key).await {
                    Ok(value) => records.push(ViewRecord { key, value }),
                    // deleted between list and get
                    Err(e) => tracing::debug!(db = %db, table, key = %key, error = %e, "object skipped"),
                }
            }
            return Some(records);
        }
        None
    }

    // --------------------
    // Connection registry
    // --------------------

    pub fn register_connection(&self, handle: ConnectionHandle) {
        self.connections.insert(handle.id.clone(), handle);
    }

    pub fn unregister_connection(&self, id: &ConnId) -> Option<ConnectionHandle> {
        self.connections.remove(id).map(|(_, h)| h)
    }

    pub fn connection(&self, id: &ConnId) -> Option<ConnectionHandle> {
        self.connections.get(id).map(|r| r.value().clone())
    }

    /// Snapshot of registered connection ids.
    pub fn connection_ids(&self) -> Vec<ConnId> {
        self.connections.iter().map(|r| r.key().clone()).collect()
    }

    // --------------------
    // Room registry
    // --------------------

    pub fn room(&self, name: &str) -> Option<RoomHandle> {
        self.rooms.get(name).map(|r| r.value().clone())
    }

    /// Look up `name`, starting its loop on first use.
    pub fn room_or_create(&self, name: &str) -> RoomHandle {
        if let Some(room) = self.room(name) {
            return room;
        }
        self.rooms
            .entry(name.to_string())
            .or_insert_with(|| {
                tracing::info!(room = %name, "room created");
                RoomHandle::spawn(
                    name,
                    self.settings.room_queue_capacity,
                    self.settings.slow_consumer,
                )
            })
            .value()
            .clone()
    }

    /// Snapshot of room names.
    pub fn room_names(&self) -> Vec<String> {
        self.rooms.iter().map(|r| r.key().clone()).collect()
    }

    pub fn stop_all_rooms(&self) {
        let rooms: Vec<RoomHandle> = self.rooms.iter().map(|r| r.value().clone()).collect();
        for room in rooms {
            room.stop();
        }
    }

    // --------------------
    // Server-side push
    // --------------------

    /// Broadcast to the envelope's room. Unknown rooms are silently ignored.
    pub async fn emit(&self, env: &Envelope) {
        let Some(room) = self.room(&env.room) else {
            tracing::trace!(room = %env.room, event = %env.event, "emit to unknown room dropped");
            return;
        };
        if let Err(e) = room.broadcast(env).await {
            tracing::warn!(room = %env.room, code = e.code().as_str(), error = %e, "emit failed");
        }
    }

    /// Deliver to one connection's mailbox without waiting.
    pub fn send_to(&self, id: &ConnId, env: &Envelope) -> Result<()> {
        let conn = self
            .connection(id)
            .ok_or_else(|| BrokerError::NotFound(format!("connection not registered: {id}")))?;
        let prepared = PreparedMsg::prepare(env)?;
        deliver(&conn.mailbox, prepared, id)
    }

    /// Deliver to every registered connection. Returns how many accepted it.
    pub fn broadcast_all(&self, env: &Envelope) -> Result<usize> {
        let prepared = PreparedMsg::prepare(env)?;
        let targets: Vec<ConnectionHandle> =
            self.connections.iter().map(|r| r.value().clone()).collect();

        let mut delivered = 0;
        for conn in targets {
            if deliver(&conn.mailbox, prepared.clone(), &conn.id).is_ok() {
                delivered += 1;
            }
        }
        Ok(delivered)
    }
}

fn deliver(mailbox: &MailboxSender, msg: PreparedMsg, id: &ConnId) -> Result<()> {
    mailbox.try_deliver(msg).map_err(|e| match e {
        DeliverError::Full => BrokerError::Internal(format!("mailbox full: {id}")),
        DeliverError::Closed => BrokerError::NotFound(format!("mailbox closed: {id}")),
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::realtime::core::mailbox::mailbox;

    #[tokio::test]
    async fn rooms_are_created_once() {
        let broker = BrokerContext::new(BrokerSettings::default());
        let a = broker.room_or_create("lobby");
        let b = broker.room_or_create("lobby");
        assert_eq!(a.name(), b.name());
        assert_eq!(broker.room_names(), vec!["lobby".to_string()]);
    }

    #[tokio::test]
    async fn unknown_database_is_a_routing_error() {
        let broker = BrokerContext::new(BrokerSettings::default());
        let err = broker.store("nope").err().unwrap();
        assert_eq!(err.code().as_str(), "UNKNOWN_TARGET");
    }

    #[tokio::test]
    async fn send_to_and_broadcast_all() {
        let broker = BrokerContext::new(BrokerSettings::default());
        let (tx, mut rx) = mailbox(4);
        let id = ConnId::from("c1");
        broker.register_connection(ConnectionHandle {
            id: id.clone(),
            privilege: Arc::from("user"),
            mailbox: tx,
        });

        broker.send_to(&id, &Envelope::new("root", "direct", "1")).unwrap();
        assert_eq!(broker.broadcast_all(&Envelope::new("root", "all", "2")).unwrap(), 1);

        let first = Envelope::decode(rx.recv().await.unwrap().as_str()).unwrap();
        let second = Envelope::decode(rx.recv().await.unwrap().as_str()).unwrap();
        assert_eq!(first.event, "direct");
        assert_eq!(second.event, "all");

        broker.unregister_connection(&id);
        assert!(broker.send_to(&id, &Envelope::new("root", "x", "")).is_err());
    }
}
