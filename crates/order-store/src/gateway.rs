//! The store gateway: narrow query/put contract plus client lifecycle.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::UserId;

use crate::error::{Result, StoreError};
use crate::record::OrderRecord;
use crate::settings::SettingsHandle;

/// Narrow contract to the key-value store.
///
/// `query` returns all records for a user in store-defined order; callers
/// must sort explicitly if they need chronological order. `put` writes one
/// record, last-writer-wins.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn query(&self, user_id: &UserId) -> Result<Vec<OrderRecord>>;
    async fn put(&self, record: OrderRecord) -> Result<()>;
}

/// A store client bound to one region.
///
/// Implementations map their transport failures into the
/// [`StoreError`] taxonomy.
#[async_trait]
pub trait StoreClient: Send + Sync {
    async fn query_orders(&self, table: &str, user_id: &UserId) -> Result<Vec<OrderRecord>>;
    async fn put_order(&self, table: &str, record: OrderRecord) -> Result<()>;
}

/// An immutable `(region, table, client)` binding.
///
/// Swapped as a unit so no caller ever observes a half-rebuilt state.
struct Connection<C> {
    region: String,
    table: String,
    client: Arc<C>,
}

/// Gateway owning the store client lifecycle.
///
/// On every invocation the gateway compares its current binding against
/// the configured settings: a region change rebuilds the client through
/// the factory, a table-only change rebinds the table and reuses the
/// client. Callers dereference the current binding once per call and
/// never cache it.
pub struct StoreGateway<C: StoreClient> {
    settings: SettingsHandle,
    factory: Box<dyn Fn(&str) -> Result<Arc<C>> + Send + Sync>,
    connection: RwLock<Option<Arc<Connection<C>>>>,
}

impl<C: StoreClient> StoreGateway<C> {
    /// Creates a gateway. The client is built lazily on first use.
    pub fn new(
        settings: SettingsHandle,
        factory: impl Fn(&str) -> Result<Arc<C>> + Send + Sync + 'static,
    ) -> Self {
        Self {
            settings,
            factory: Box::new(factory),
            connection: RwLock::new(None),
        }
    }

    /// Returns a binding matching the configured settings, rebuilding it
    /// under the write lock (double-checked) when stale.
    fn current_connection(&self) -> Result<Arc<Connection<C>>> {
        let desired = self.settings.get();

        {
            let guard = self.connection.read().unwrap();
            if let Some(conn) = guard.as_ref()
                && conn.region == desired.region
                && conn.table == desired.table
            {
                return Ok(conn.clone());
            }
        }

        let mut guard = self.connection.write().unwrap();
        // another caller may have rebuilt while we waited for the lock
        if let Some(conn) = guard.as_ref()
            && conn.region == desired.region
            && conn.table == desired.table
        {
            return Ok(conn.clone());
        }

        let client = match guard.as_ref() {
            Some(conn) if conn.region == desired.region => conn.client.clone(),
            _ => {
                tracing::info!(region = %desired.region, "building store client");
                metrics::counter!("store_client_rebuilds_total").increment(1);
                (self.factory)(&desired.region)?
            }
        };

        let conn = Arc::new(Connection {
            region: desired.region,
            table: desired.table,
            client,
        });
        *guard = Some(conn.clone());
        Ok(conn)
    }
}

#[async_trait]
impl<C: StoreClient> OrderStore for StoreGateway<C> {
    #[tracing::instrument(skip(self))]
    async fn query(&self, user_id: &UserId) -> Result<Vec<OrderRecord>> {
        let conn = self.current_connection()?;
        conn.client.query_orders(&conn.table, user_id).await
    }

    #[tracing::instrument(skip(self, record), fields(user_id = %record.user_id))]
    async fn put(&self, record: OrderRecord) -> Result<()> {
        let conn = self.current_connection()?;
        conn.client.put_order(&conn.table, record).await
    }
}
