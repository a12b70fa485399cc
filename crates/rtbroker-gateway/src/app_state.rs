//! Shared application state for the rtbroker gateway.
//!
//! Builds the broker context (stores, routes, built-in handlers) from config
//! and carries the per-connection pump settings and the ticket store used at
//! admission.

use std::sync::Arc;

use rtbroker_core::error::Result;

use crate::config::BrokerConfig;
use crate::infra::{MemoryStore, RouteTable, StaticTicketStore, TicketStore};
use crate::realtime::{BrokerContext, BrokerSettings, PumpSettings};
use crate::services::RoomRelay;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    broker: Arc<BrokerContext>,
}

struct AppStateInner {
    cfg: BrokerConfig,
    pump: PumpSettings,
    tickets: Arc<dyn TicketStore>,
}

impl AppState {
    /// Build application state.
    /// Returns Result so main can handle errors gracefully (no panic).
    pub fn new(cfg: BrokerConfig) -> Result<Self> {
        // 1) Collaborators
        let views = RouteTable::from_config(&cfg.routes)?;
        let mut broker =
            BrokerContext::new(BrokerSettings::from(&cfg.broker)).with_views(Arc::new(views));
        for (name, db) in &cfg.databases {
            let store = MemoryStore::new(db.tables.iter().cloned());
            broker = broker.with_store(name.clone(), Arc::new(store));
        }

        let relay = Arc::new(RoomRelay);
        for event in &cfg.broker.relay_events {
            broker.hub().on(event.clone(), relay.clone());
        }

        let tickets = StaticTicketStore::new(
            cfg.sessions.tickets.clone(),
            cfg.sessions.default_privilege.clone(),
        );

        // 2) Sanity checks (warn only)
        let admin = &cfg.broker.admin_role;
        if !cfg.databases.is_empty() && !cfg.sessions.tickets.values().any(|p| p == admin) {
            tracing::warn!(admin_role = %admin, "databases configured but no ticket grants the admin role");
        }
        if cfg.sessions.default_privilege == *admin {
            tracing::warn!(admin_role = %admin, "guests get the admin role by default");
        }

        Ok(Self {
            inner: Arc::new(AppStateInner {
                pump: PumpSettings::from(&cfg.gateway),
                cfg,
                tickets: Arc::new(tickets),
            }),
            broker: Arc::new(broker),
        })
    }

    pub fn cfg(&self) -> &BrokerConfig {
        &self.inner.cfg
    }

    pub fn pump_settings(&self) -> PumpSettings {
        self.inner.pump
    }

    pub fn tickets(&self) -> &dyn TicketStore {
        self.inner.tickets.as_ref()
    }

    pub fn broker(&self) -> Arc<BrokerContext> {
        Arc::clone(&self.broker)
    }
}
