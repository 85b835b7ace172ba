//! Fault classification for pipeline error handling.

/// Classifies operation failures for the pipeline.
///
/// Retryable failures (transient store errors, downstream errors,
/// timeouts) consume retry budget and feed the circuit breaker.
/// Non-retryable failures (validation, fatal store errors) short-circuit
/// out of the pipeline immediately.
pub trait Classify {
    /// Whether the failure is transient and worth retrying.
    fn retryable(&self) -> bool;
}
