//! Broker config loader (strict parsing).

pub mod schema;

use std::fs;

use rtbroker_core::error::{BrokerError, Result};

pub use schema::{
    BrokerConfig, BrokerSection, DatabaseConfig, GatewaySection, RouteConfig, SessionSection,
    SlowConsumerPolicy,
};

pub fn load_from_file(path: &str) -> Result<BrokerConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| BrokerError::Config(format!("read config {path} failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<BrokerConfig> {
    let cfg: BrokerConfig = serde_yaml::from_str(s)
        .map_err(|e| BrokerError::Config(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
