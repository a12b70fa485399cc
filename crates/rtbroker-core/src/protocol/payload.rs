//! Structured payloads nested inside `Envelope::payload`.

use serde::{Deserialize, Serialize};

use crate::error::{BrokerError, Result};

/// Payload of `getObj` / `insertObj` / `deleteObj`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreRequest {
    /// Database name (selects the storage backend).
    pub db: String,
    pub table: String,
    pub key: String,
    /// Value for `insertObj`; ignored otherwise.
    #[serde(default)]
    pub data: String,
}

impl StoreRequest {
    pub fn decode(payload: &str) -> Result<Self> {
        serde_json::from_str(payload)
            .map_err(|e| BrokerError::Decode(format!("invalid store payload: {e}")))
    }
}

/// Payload of the `response` event sent back for a `request`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewResponse {
    /// Rendered markup.
    pub template: String,
    /// Client-side controller identifier ("" when the route has none).
    pub controller: String,
    /// Objects of the route's table, when the route names one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<Vec<ViewRecord>>,
}

/// One stored object listed into a view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewRecord {
    pub key: String,
    pub value: String,
}

impl ViewResponse {
    pub fn encode(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| BrokerError::Encode(format!("view response encode failed: {e}")))
    }
}
