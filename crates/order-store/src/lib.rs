//! Key-value store gateway for order records.
//!
//! The gateway owns the store client lifecycle: the `(region, table)`
//! pair is runtime-configurable, and the underlying client is rebuilt
//! atomically whenever the configured region changes. Callers go through
//! the narrow [`OrderStore`] contract and never hold a client reference
//! across calls.

pub mod error;
pub mod gateway;
pub mod memory;
pub mod record;
pub mod settings;

pub use error::{Result, StoreError};
pub use gateway::{OrderStore, StoreClient, StoreGateway};
pub use memory::InMemoryStoreClient;
pub use record::{OrderRecord, OrderStatus};
pub use settings::{SettingsHandle, StoreSettings};
