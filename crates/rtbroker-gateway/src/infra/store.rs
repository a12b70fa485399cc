use async_trait::async_trait;
use dashmap::DashMap;

use rtbroker_core::error::{BrokerError, Result};

/// Storage collaborator behind `getObj` / `insertObj` / `deleteObj`.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// `NotFound` when the key is absent.
    async fn get(&self, table: &str, key: &str) -> Result<String>;
    async fn insert(&self, table: &str, key: &str, value: &str) -> Result<()>;
    async fn delete(&self, table: &str, key: &str) -> Result<()>;
    /// Keys currently stored in `table`, sorted.
    async fn list(&self, table: &str) -> Result<Vec<String>>;
}

/// Table-per-DashMap store. Tables must be declared up front; `users` always is.
pub struct MemoryStore {
    tables: DashMap<String, DashMap<String, String>>,
}

impl MemoryStore {
    pub fn new<I, S>(tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let this = Self {
            tables: DashMap::new(),
        };
        this.tables.insert("users".into(), DashMap::new());
        for t in tables {
            this.tables.entry(t.into()).or_default();
        }
        this
    }

    fn missing_table(table: &str) -> BrokerError {
        BrokerError::Storage(format!("table does not exist: {table}"))
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn get(&self, table: &str, key: &str) -> Result<String> {
        let t = self.tables.get(table).ok_or_else(|| Self::missing_table(table))?;
        let value = t.get(key).map(|v| v.value().clone());
        value.ok_or_else(|| BrokerError::NotFound(format!("{table}/{key}")))
    }

    async fn insert(&self, table: &str, key: &str, value: &str) -> Result<()> {
        let t = self.tables.get(table).ok_or_else(|| Self::missing_table(table))?;
        if t.contains_key(key) {
            return Err(BrokerError::Storage(format!("duplicate key {table}/{key}")));
        }
        t.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, table: &str, key: &str) -> Result<()> {
        let t = self.tables.get(table).ok_or_else(|| Self::missing_table(table))?;
        t.remove(key);
        Ok(())
    }

    async fn list(&self, table: &str) -> Result<Vec<String>> {
        let t = self.tables.get(table).ok_or_else(|| Self::missing_table(table))?;
        let mut keys: Vec<String> = t.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        Ok(keys)
    }
}
