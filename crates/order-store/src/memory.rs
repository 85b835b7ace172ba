use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use common::UserId;
use tokio::sync::RwLock;

use crate::error::{Result, StoreError};
use crate::gateway::StoreClient;
use crate::record::OrderRecord;

#[derive(Debug, Default)]
struct InMemoryState {
    /// Records per table, in insertion order. Query order is deliberately
    /// store-defined, like the real backend.
    tables: HashMap<String, Vec<OrderRecord>>,
    fail_queries: bool,
    fail_puts: bool,
    put_delay: Option<Duration>,
}

/// In-memory store client for development and tests.
///
/// Clones share state, so a gateway rebuilding its client from a cloning
/// factory keeps its data. Failure and latency injection knobs drive the
/// pipeline tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStoreClient {
    state: Arc<RwLock<InMemoryState>>,
}

impl InMemoryStoreClient {
    /// Creates a new empty in-memory store client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures queries to fail with a transient error.
    pub async fn set_fail_queries(&self, fail: bool) {
        self.state.write().await.fail_queries = fail;
    }

    /// Configures puts to fail with a transient error.
    pub async fn set_fail_puts(&self, fail: bool) {
        self.state.write().await.fail_puts = fail;
    }

    /// Delays every put by the given duration, for timeout tests.
    pub async fn set_put_delay(&self, delay: Option<Duration>) {
        self.state.write().await.put_delay = delay;
    }

    /// Returns all records stored for a user in a table.
    pub async fn records_for(&self, table: &str, user_id: &UserId) -> Vec<OrderRecord> {
        self.state
            .read()
            .await
            .tables
            .get(table)
            .map(|records| {
                records
                    .iter()
                    .filter(|r| &r.user_id == user_id)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Total number of records across all tables.
    pub async fn record_count(&self) -> usize {
        self.state
            .read()
            .await
            .tables
            .values()
            .map(Vec::len)
            .sum()
    }

    /// Seeds a record directly, bypassing the gateway.
    pub async fn seed(&self, table: &str, record: OrderRecord) {
        self.state
            .write()
            .await
            .tables
            .entry(table.to_string())
            .or_default()
            .push(record);
    }
}

#[async_trait]
impl StoreClient for InMemoryStoreClient {
    async fn query_orders(&self, table: &str, user_id: &UserId) -> Result<Vec<OrderRecord>> {
        let state = self.state.read().await;
        if state.fail_queries {
            return Err(StoreError::Transient("simulated throttling".to_string()));
        }
        Ok(state
            .tables
            .get(table)
            .map(|records| {
                records
                    .iter()
                    .filter(|r| &r.user_id == user_id)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn put_order(&self, table: &str, record: OrderRecord) -> Result<()> {
        let delay = self.state.read().await.put_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.state.write().await;
        if state.fail_puts {
            return Err(StoreError::Transient("simulated throttling".to_string()));
        }
        let records = state.tables.entry(table.to_string()).or_default();
        // last-writer-wins on the (user_id, hash_key) key
        if let Some(existing) = records
            .iter_mut()
            .find(|r| r.user_id == record.user_id && r.hash_key == record.hash_key)
        {
            *existing = record;
        } else {
            records.push(record);
        }
        Ok(())
    }
}
