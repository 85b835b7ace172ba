use thiserror::Error;

/// Errors from the downstream cart service.
///
/// Both non-success responses and transport failures collapse into one
/// retryable member; the pipeline treats them identically.
#[derive(Debug, Error)]
pub enum CartError {
    /// The cart service answered with a non-success status or the call
    /// failed at the transport level.
    #[error("cart service call failed: {0}")]
    Downstream(String),
}
