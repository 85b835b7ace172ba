use chrono::{DateTime, Utc};
use common::{Money, UserId};
use serde::{Deserialize, Serialize};

/// Status of a persisted order.
///
/// No intermediate states are modeled; an order is written once,
/// already completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Completed,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Completed => write!(f, "COMPLETED"),
        }
    }
}

/// A persisted order, immutable once written.
///
/// Keyed by `(user_id, hash_key)`; writes are last-writer-wins with no
/// optimistic concurrency check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub user_id: UserId,
    /// Content-derived idempotency key (see the domain crate for its
    /// derivation and known weakness).
    pub hash_key: String,
    pub email: String,
    pub name: String,
    pub surname: String,
    pub address: String,
    pub tel_number: String,
    /// Order lines, serialized as text by the caller.
    pub order_list: String,
    pub total_price: Money,
    pub status: OrderStatus,
    /// Creation instant, persisted as ISO-8601 UTC.
    pub created_at: DateTime<Utc>,
}
