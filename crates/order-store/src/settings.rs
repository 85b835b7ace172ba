//! Runtime-mutable store settings.

use std::sync::{Arc, RwLock};

/// The `(region, table)` pair the gateway binds its client to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSettings {
    pub region: String,
    pub table: String,
}

impl StoreSettings {
    pub fn new(region: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            table: table.into(),
        }
    }
}

/// Shared handle to the current store settings.
///
/// Writers replace the whole pair at once; readers always take a
/// consistent snapshot, never a half-updated `(region, table)`.
#[derive(Debug, Clone)]
pub struct SettingsHandle {
    inner: Arc<RwLock<StoreSettings>>,
}

impl SettingsHandle {
    pub fn new(settings: StoreSettings) -> Self {
        Self {
            inner: Arc::new(RwLock::new(settings)),
        }
    }

    /// Returns a snapshot of the current settings.
    pub fn get(&self) -> StoreSettings {
        self.inner.read().unwrap().clone()
    }

    /// Replaces the settings atomically.
    pub fn set(&self, settings: StoreSettings) {
        let mut guard = self.inner.write().unwrap();
        if *guard != settings {
            tracing::info!(
                region = %settings.region,
                table = %settings.table,
                "store settings updated"
            );
        }
        *guard = settings;
    }
}
