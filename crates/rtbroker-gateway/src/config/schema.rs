use std::collections::BTreeMap;
use std::net::SocketAddr;

use serde::Deserialize;
use rtbroker_core::error::{BrokerError, Result};
use rtbroker_core::protocol::events;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BrokerConfig {
    pub version: u32,

    #[serde(default)]
    pub gateway: GatewaySection,

    #[serde(default)]
    pub broker: BrokerSection,

    #[serde(default)]
    pub sessions: SessionSection,

    /// Database name -> in-memory store declaration.
    #[serde(default)]
    pub databases: BTreeMap<String, DatabaseConfig>,

    /// Path (or `^regex`) -> view route.
    #[serde(default)]
    pub routes: BTreeMap<String, RouteConfig>,
}

impl BrokerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(BrokerError::UnsupportedVersion);
        }

        self.gateway.validate()?;
        self.broker.validate()?;

        for name in self.databases.keys() {
            if name.is_empty() {
                return Err(BrokerError::Config("database names must not be empty".into()));
            }
        }

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewaySection {
    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default = "default_ws_path")]
    pub ws_path: String,

    #[serde(default = "default_ping_interval_ms")]
    pub ping_interval_ms: u64,

    #[serde(default = "default_pong_wait_ms")]
    pub pong_wait_ms: u64,

    #[serde(default = "default_write_wait_ms")]
    pub write_wait_ms: u64,

    #[serde(default = "default_max_frame_bytes")]
    pub max_frame_bytes: usize,
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            ws_path: default_ws_path(),
            ping_interval_ms: default_ping_interval_ms(),
            pong_wait_ms: default_pong_wait_ms(),
            write_wait_ms: default_write_wait_ms(),
            max_frame_bytes: default_max_frame_bytes(),
        }
    }
}

impl GatewaySection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr()?;
        if !self.ws_path.starts_with('/') {
            return Err(BrokerError::Config("gateway.ws_path must start with '/'".into()));
        }
        if !(1000..=120000).contains(&self.ping_interval_ms) {
            return Err(BrokerError::Config(
                "gateway.ping_interval_ms must be between 1000 and 120000".into(),
            ));
        }
        if self.pong_wait_ms > 600000 {
            return Err(BrokerError::Config(
                "gateway.pong_wait_ms must be at most 600000".into(),
            ));
        }
        if self.pong_wait_ms <= self.ping_interval_ms {
            return Err(BrokerError::Config(
                "gateway.pong_wait_ms must be greater than ping_interval_ms".into(),
            ));
        }
        if !(100..=60000).contains(&self.write_wait_ms) {
            return Err(BrokerError::Config(
                "gateway.write_wait_ms must be between 100 and 60000".into(),
            ));
        }
        if !(64..=1_048_576).contains(&self.max_frame_bytes) {
            return Err(BrokerError::Config(
                "gateway.max_frame_bytes must be between 64 and 1048576".into(),
            ));
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen
            .parse()
            .map_err(|e| BrokerError::Config(format!("gateway.listen is not a socket address: {e}")))
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}
fn default_ws_path() -> String {
    "/ws".into()
}
// 9/10 of the pong wait so a ping always lands before the peer is declared dead.
fn default_ping_interval_ms() -> u64 {
    54000
}
fn default_pong_wait_ms() -> u64 {
    60000
}
fn default_write_wait_ms() -> u64 {
    10000
}
fn default_max_frame_bytes() -> usize {
    4096
}

/// What a room does with a member whose mailbox is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlowConsumerPolicy {
    /// Close the member's mailbox and remove it from the room.
    #[default]
    Evict,
    /// Skip this message for that member only.
    Drop,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BrokerSection {
    #[serde(default = "default_mailbox_capacity")]
    pub mailbox_capacity: usize,

    #[serde(default = "default_room_queue_capacity")]
    pub room_queue_capacity: usize,

    #[serde(default = "default_room")]
    pub default_room: String,

    #[serde(default = "default_admin_role")]
    pub admin_role: String,

    #[serde(default)]
    pub slow_consumer: SlowConsumerPolicy,

    /// Custom event kinds rebroadcast unchanged to their room.
    #[serde(default)]
    pub relay_events: Vec<String>,
}

impl Default for BrokerSection {
    fn default() -> Self {
        Self {
            mailbox_capacity: default_mailbox_capacity(),
            room_queue_capacity: default_room_queue_capacity(),
            default_room: default_room(),
            admin_role: default_admin_role(),
            slow_consumer: SlowConsumerPolicy::default(),
            relay_events: Vec::new(),
        }
    }
}

impl BrokerSection {
    pub fn validate(&self) -> Result<()> {
        if self.mailbox_capacity == 0 {
            return Err(BrokerError::Config("broker.mailbox_capacity must be at least 1".into()));
        }
        if self.room_queue_capacity == 0 {
            return Err(BrokerError::Config(
                "broker.room_queue_capacity must be at least 1".into(),
            ));
        }
        if self.default_room.is_empty() {
            return Err(BrokerError::Config("broker.default_room must not be empty".into()));
        }
        if self.admin_role.is_empty() {
            return Err(BrokerError::Config("broker.admin_role must not be empty".into()));
        }
        for event in &self.relay_events {
            if event.is_empty() {
                return Err(BrokerError::Config("broker.relay_events entries must not be empty".into()));
            }
            if events::BUILTIN.contains(&event.as_str()) {
                return Err(BrokerError::Config(format!(
                    "broker.relay_events: {event} is a built-in event"
                )));
            }
        }
        Ok(())
    }
}

fn default_mailbox_capacity() -> usize {
    256
}
fn default_room_queue_capacity() -> usize {
    256
}
fn default_room() -> String {
    "root".into()
}
fn default_admin_role() -> String {
    "admin".into()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionSection {
    #[serde(default = "default_privilege")]
    pub default_privilege: String,

    /// Ticket -> privilege tag.
    #[serde(default)]
    pub tickets: BTreeMap<String, String>,
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            default_privilege: default_privilege(),
            tickets: BTreeMap::new(),
        }
    }
}

fn default_privilege() -> String {
    "user".into()
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub tables: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteConfig {
    pub markup: String,
    #[serde(default)]
    pub controller: Option<String>,
    /// Table listed into the `response` payload (may be `$N`).
    #[serde(default)]
    pub table: Option<String>,
}
