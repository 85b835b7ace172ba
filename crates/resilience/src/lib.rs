//! Composable fault-tolerance pipeline for externally-facing operations.
//!
//! This crate provides the resilience layer wrapping every store and
//! downstream-service call:
//! - per-attempt timeout
//! - bounded retry of transient failures
//! - a rolling-window circuit breaker per operation kind
//! - a bulkhead capping concurrent in-flight invocations
//! - a fallback producing a degraded-but-valid result
//!
//! The composition order is an explicit contract (see
//! [`ResiliencePipeline::execute`]), not an artifact of middleware
//! registration order.

pub mod breaker;
pub mod bulkhead;
pub mod classify;
pub mod pipeline;

pub use breaker::{BreakerConfig, CircuitBreaker, CircuitState};
pub use bulkhead::Bulkhead;
pub use classify::Classify;
pub use pipeline::{
    DegradeReason, PipelineBuilder, PipelineError, PolicyConfig, ResiliencePipeline,
};
