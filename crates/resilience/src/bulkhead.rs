//! Concurrency-admission bulkhead, one instance per operation kind.

use tokio::sync::{Semaphore, SemaphorePermit};

/// Caps the number of concurrently in-flight invocations.
///
/// This is admission control, not a wait queue: an invocation arriving
/// at capacity is rejected immediately.
#[derive(Debug)]
pub struct Bulkhead {
    semaphore: Semaphore,
    limit: usize,
}

impl Bulkhead {
    /// Creates a bulkhead admitting up to `limit` concurrent invocations.
    pub fn new(limit: usize) -> Self {
        Self {
            semaphore: Semaphore::new(limit),
            limit,
        }
    }

    /// Tries to admit one invocation. Returns `None` at capacity.
    ///
    /// The permit spans the whole pipeline execution, retries included.
    pub fn try_acquire(&self) -> Option<SemaphorePermit<'_>> {
        self.semaphore.try_acquire().ok()
    }

    /// Configured concurrency limit.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Number of invocations that could currently be admitted.
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }
}
