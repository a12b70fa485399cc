use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::Message;

use rtbroker_core::error::Result;
use rtbroker_core::Envelope;

use crate::config::{BrokerSection, GatewaySection, SlowConsumerPolicy};

/// Globally unique connection id (UUID v4), immutable once generated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnId(Arc<str>);

impl ConnId {
    pub fn generate() -> Self {
        Self(Arc::from(uuid::Uuid::new_v4().to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ConnId {
    fn from(s: &str) -> Self {
        Self(Arc::from(s))
    }
}

impl fmt::Display for ConnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Envelope serialized once and shared by every mailbox it is delivered to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedMsg(Arc<str>);

impl PreparedMsg {
    pub fn prepare(env: &Envelope) -> Result<Self> {
        Ok(Self(Arc::from(env.encode()?)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert to a transport frame.
    /// NOTE: axum's `Message::Text` owns a `String`, so each write copies once.
    pub fn to_ws_message(&self) -> Message {
        Message::Text(self.0.to_string())
    }
}

/// Broker-wide knobs, resolved from the `broker` config section.
#[derive(Debug, Clone)]
pub struct BrokerSettings {
    pub mailbox_capacity: usize,
    pub room_queue_capacity: usize,
    pub default_room: String,
    pub admin_role: String,
    pub slow_consumer: SlowConsumerPolicy,
}

impl Default for BrokerSettings {
    fn default() -> Self {
        Self::from(&BrokerSection::default())
    }
}

impl From<&BrokerSection> for BrokerSettings {
    fn from(s: &BrokerSection) -> Self {
        Self {
            mailbox_capacity: s.mailbox_capacity,
            room_queue_capacity: s.room_queue_capacity,
            default_room: s.default_room.clone(),
            admin_role: s.admin_role.clone(),
            slow_consumer: s.slow_consumer,
        }
    }
}

/// Per-connection timing and size limits for the two pumps.
#[derive(Debug, Clone, Copy)]
pub struct PumpSettings {
    /// Interval between keepalive pings.
    pub ping_every: Duration,
    /// Read deadline, refreshed on every pong.
    pub pong_wait: Duration,
    /// Deadline for a single frame write.
    pub write_wait: Duration,
    pub max_frame_bytes: usize,
}

impl Default for PumpSettings {
    fn default() -> Self {
        Self::from(&GatewaySection::default())
    }
}

impl From<&GatewaySection> for PumpSettings {
    fn from(gw: &GatewaySection) -> Self {
        Self {
            ping_every: Duration::from_millis(gw.ping_interval_ms),
            pong_wait: Duration::from_millis(gw.pong_wait_ms),
            write_wait: Duration::from_millis(gw.write_wait_ms),
            max_frame_bytes: gw.max_frame_bytes,
        }
    }
}
