use thiserror::Error;

/// Errors that can occur when interacting with the order store.
///
/// Store-specific failure modes collapse into a two-member taxonomy:
/// transient failures (throttling, connectivity) are retryable, anything
/// else is fatal and surfaced as a server error.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A transient failure such as throttling or lost connectivity.
    #[error("transient store failure: {0}")]
    Transient(String),

    /// A non-transient store failure.
    #[error("store failure: {0}")]
    Fatal(String),
}

impl StoreError {
    /// Whether the failure is expected to clear on its own.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Transient(_))
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
