//! Idempotency-key derivation for submitted orders.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, SecondsFormat, Utc};
use common::UserId;
use sha2::{Digest, Sha256};

/// Fixed-length opaque token identifying a persisted order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdempotencyKey(String);

impl IdempotencyKey {
    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the key, returning the underlying string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for IdempotencyKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Derives the key for a submission: SHA-256 over the concatenation of
/// user id, serialized order lines, and the submission instant, encoded
/// as base64.
///
/// Known weakness: because the instant is part of the input, identical
/// content submitted at different instants yields different keys. The
/// key is a record identity, not a true request-idempotency token, so
/// retried submissions of a logically-complete write can create
/// duplicate records.
pub fn derive_key(user_id: &UserId, order_list: &str, now: DateTime<Utc>) -> IdempotencyKey {
    let mut hasher = Sha256::new();
    hasher.update(user_id.as_str().as_bytes());
    hasher.update(order_list.as_bytes());
    hasher.update(now.to_rfc3339_opts(SecondsFormat::AutoSi, true).as_bytes());
    IdempotencyKey(STANDARD.encode(hasher.finalize()))
}
