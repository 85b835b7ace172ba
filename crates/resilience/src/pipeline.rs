//! The resilience pipeline composing timeout, retry, circuit breaker,
//! bulkhead, and fallback around an arbitrary async operation.

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use thiserror::Error;

use crate::breaker::{Admission, BreakerConfig, CircuitBreaker, CircuitState};
use crate::bulkhead::Bulkhead;
use crate::classify::Classify;

/// Per-operation-kind policy configuration.
#[derive(Debug, Clone)]
pub struct PolicyConfig {
    /// Per-attempt timeout. An elapsed timeout is a retryable failure.
    pub timeout: Duration,
    /// Additional attempts after the first failure.
    pub max_retries: u32,
    /// Fixed delay between attempts. Zero by default; the retry contract
    /// is bounded attempts, not a backoff schedule.
    pub retry_delay: Duration,
    /// Circuit breaker settings.
    pub breaker: BreakerConfig,
    /// Maximum concurrent in-flight invocations.
    pub bulkhead_limit: usize,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(20),
            max_retries: 3,
            retry_delay: Duration::ZERO,
            breaker: BreakerConfig::default(),
            bulkhead_limit: 5,
        }
    }
}

/// Why the pipeline served the fallback instead of a primary result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegradeReason {
    /// The bulkhead was at capacity; the operation was never invoked.
    BulkheadRejected,
    /// The circuit was open; the operation was never invoked.
    CircuitOpen,
    /// Every attempt failed or timed out.
    RetriesExhausted,
}

impl std::fmt::Display for DegradeReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DegradeReason::BulkheadRejected => write!(f, "bulkhead rejected"),
            DegradeReason::CircuitOpen => write!(f, "circuit open"),
            DegradeReason::RetriesExhausted => write!(f, "retries exhausted"),
        }
    }
}

/// Errors surfaced to the caller instead of a fallback result.
///
/// Retryable failures never appear here; they are resolved into either
/// a successful retry or the fallback value.
#[derive(Debug, Error)]
pub enum PipelineError<E> {
    /// The operation kind was never registered with the pipeline.
    #[error("operation kind `{0}` is not registered with the pipeline")]
    UnknownOperation(String),
    /// The operation failed with a non-retryable error.
    #[error("{0}")]
    Operation(E),
}

struct OperationPolicy {
    config: PolicyConfig,
    breaker: CircuitBreaker,
    bulkhead: Bulkhead,
}

/// Builder registering one policy per operation kind.
#[derive(Default)]
pub struct PipelineBuilder {
    policies: HashMap<&'static str, OperationPolicy>,
}

impl PipelineBuilder {
    /// Registers an operation kind with its policy configuration.
    ///
    /// Breaker and bulkhead state is created here, closed and empty, and
    /// lives for the lifetime of the pipeline.
    pub fn operation(mut self, op_kind: &'static str, config: PolicyConfig) -> Self {
        let policy = OperationPolicy {
            breaker: CircuitBreaker::new(op_kind, config.breaker.clone()),
            bulkhead: Bulkhead::new(config.bulkhead_limit),
            config,
        };
        self.policies.insert(op_kind, policy);
        self
    }

    pub fn build(self) -> ResiliencePipeline {
        ResiliencePipeline {
            policies: self.policies,
        }
    }
}

/// Executes caller-supplied operations under five composed policies, in
/// fixed order: timeout → retry → circuit breaker → bulkhead → fallback.
///
/// Breaker and bulkhead state is per operation kind and shared across
/// concurrent callers; the pipeline itself is cheap to share behind an
/// `Arc`.
pub struct ResiliencePipeline {
    policies: HashMap<&'static str, OperationPolicy>,
}

impl ResiliencePipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// Current breaker state for an operation kind, for observability.
    pub fn circuit_state(&self, op_kind: &str) -> Option<CircuitState> {
        self.policies.get(op_kind).map(|p| p.breaker.state())
    }

    /// Runs `operation` under the policy registered for `op_kind`.
    ///
    /// The operation is re-invoked on retry, so the closure builds a fresh
    /// future per attempt. The fallback is invoked when the bulkhead
    /// rejects, the circuit is open, or every attempt fails; it cannot
    /// fail and its value is returned as a normal `Ok`. Only non-retryable
    /// operation errors surface as `Err`.
    ///
    /// Timeout cancellation is best-effort: the attempt future is dropped
    /// at the deadline, but I/O already in flight may still complete.
    pub async fn execute<T, E, F, Fut, FB>(
        &self,
        op_kind: &str,
        mut operation: F,
        fallback: FB,
    ) -> Result<T, PipelineError<E>>
    where
        E: Classify + std::fmt::Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        FB: FnOnce(DegradeReason) -> T,
    {
        let Some(policy) = self.policies.get(op_kind) else {
            return Err(PipelineError::UnknownOperation(op_kind.to_string()));
        };

        let Some(_permit) = policy.bulkhead.try_acquire() else {
            return Ok(Self::degrade(op_kind, DegradeReason::BulkheadRejected, fallback));
        };

        let attempts = policy.config.max_retries + 1;
        for attempt in 1..=attempts {
            // held for the whole attempt; dropping it unsettled (early
            // return, cancellation) frees the half-open probe slot
            let _probe = match policy.breaker.try_acquire() {
                Admission::Allow => None,
                Admission::Probe(permit) => Some(permit),
                Admission::Reject => {
                    return Ok(Self::degrade(op_kind, DegradeReason::CircuitOpen, fallback));
                }
            };

            metrics::counter!("pipeline_attempts_total", "op_kind" => op_kind.to_string())
                .increment(1);
            match tokio::time::timeout(policy.config.timeout, operation()).await {
                Ok(Ok(value)) => {
                    policy.breaker.record_success();
                    return Ok(value);
                }
                Ok(Err(err)) if !err.retryable() => {
                    return Err(PipelineError::Operation(err));
                }
                Ok(Err(err)) => {
                    policy.breaker.record_failure();
                    tracing::warn!(op_kind, attempt, error = %err, "attempt failed");
                }
                Err(_elapsed) => {
                    policy.breaker.record_failure();
                    tracing::warn!(
                        op_kind,
                        attempt,
                        timeout_ms = policy.config.timeout.as_millis() as u64,
                        "attempt timed out"
                    );
                    metrics::counter!("pipeline_timeouts_total", "op_kind" => op_kind.to_string())
                        .increment(1);
                }
            }

            if attempt < attempts && !policy.config.retry_delay.is_zero() {
                tokio::time::sleep(policy.config.retry_delay).await;
            }
        }

        Ok(Self::degrade(op_kind, DegradeReason::RetriesExhausted, fallback))
    }

    fn degrade<T, FB>(op_kind: &str, reason: DegradeReason, fallback: FB) -> T
    where
        FB: FnOnce(DegradeReason) -> T,
    {
        tracing::warn!(op_kind, %reason, "serving fallback");
        metrics::counter!(
            "pipeline_fallbacks_total",
            "op_kind" => op_kind.to_string(),
            "reason" => reason.to_string()
        )
        .increment(1);
        fallback(reason)
    }
}
