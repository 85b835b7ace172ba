//! Rolling-window circuit breaker, one instance per operation kind.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;

/// Circuit breaker configuration.
#[derive(Debug, Clone)]
pub struct BreakerConfig {
    /// Number of trailing invocations considered when computing the
    /// failure ratio. The breaker only trips once the window is full.
    pub request_volume_threshold: usize,
    /// Failure ratio over the window at or above which the circuit opens.
    pub failure_ratio: f64,
    /// How long the circuit stays open before admitting a probe.
    pub open_wait: Duration,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            request_volume_threshold: 4,
            failure_ratio: 0.5,
            open_wait: Duration::from_millis(2000),
        }
    }
}

/// Observable breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Requests pass through; outcomes are tracked in the rolling window.
    Closed,
    /// Requests fail fast without invoking the operation.
    Open,
    /// A single probe request is allowed through.
    HalfOpen,
}

impl std::fmt::Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CircuitState::Closed => write!(f, "closed"),
            CircuitState::Open => write!(f, "open"),
            CircuitState::HalfOpen => write!(f, "half-open"),
        }
    }
}

/// Admission decision for a single attempt.
#[derive(Debug)]
pub enum Admission<'a> {
    /// The circuit is closed; the attempt may proceed.
    Allow,
    /// The circuit is half-open and this attempt is the probe. The slot
    /// stays occupied for as long as the permit is held.
    Probe(ProbePermit<'a>),
    /// The circuit is open (or the probe slot is taken); fail fast.
    Reject,
}

/// Held by the single half-open probe.
///
/// Dropping the permit without recording an outcome frees the slot for
/// the next caller, so an abandoned probe (non-retryable error, caller
/// cancellation) cannot wedge the circuit in half-open.
#[derive(Debug)]
pub struct ProbePermit<'a> {
    breaker: &'a CircuitBreaker,
}

impl Drop for ProbePermit<'_> {
    fn drop(&mut self) {
        let mut inner = self.breaker.inner.lock().unwrap();
        // a recorded outcome has already moved the state on; only an
        // unsettled probe still holds the slot
        if let Inner::HalfOpen { probe_in_flight } = &mut *inner {
            *probe_in_flight = false;
        }
    }
}

#[derive(Debug)]
enum Inner {
    Closed {
        /// Trailing outcomes, `true` marking a failure.
        window: VecDeque<bool>,
    },
    Open {
        opened_at: Instant,
    },
    HalfOpen {
        probe_in_flight: bool,
    },
}

/// Failure-rate-triggered fail-fast switch shared across concurrent
/// callers of one operation kind.
///
/// State transitions are guarded by a mutex; no lock is held across
/// an await point.
#[derive(Debug)]
pub struct CircuitBreaker {
    op_kind: String,
    config: BreakerConfig,
    inner: Mutex<Inner>,
}

impl CircuitBreaker {
    /// Creates a closed breaker for the given operation kind.
    pub fn new(op_kind: impl Into<String>, config: BreakerConfig) -> Self {
        Self {
            op_kind: op_kind.into(),
            config,
            inner: Mutex::new(Inner::Closed {
                window: VecDeque::new(),
            }),
        }
    }

    /// Returns the current state without mutating it.
    pub fn state(&self) -> CircuitState {
        match *self.inner.lock().unwrap() {
            Inner::Closed { .. } => CircuitState::Closed,
            Inner::Open { .. } => CircuitState::Open,
            Inner::HalfOpen { .. } => CircuitState::HalfOpen,
        }
    }

    /// Decides whether an attempt may proceed.
    ///
    /// An open circuit whose wait has elapsed transitions to half-open
    /// and admits the caller as the single probe.
    pub fn try_acquire(&self) -> Admission<'_> {
        let mut inner = self.inner.lock().unwrap();
        match &mut *inner {
            Inner::Closed { .. } => Admission::Allow,
            Inner::Open { opened_at } => {
                if opened_at.elapsed() >= self.config.open_wait {
                    *inner = Inner::HalfOpen {
                        probe_in_flight: true,
                    };
                    tracing::info!(op_kind = %self.op_kind, "circuit half-open, admitting probe");
                    Admission::Probe(ProbePermit { breaker: self })
                } else {
                    Admission::Reject
                }
            }
            Inner::HalfOpen { probe_in_flight } => {
                if *probe_in_flight {
                    Admission::Reject
                } else {
                    *probe_in_flight = true;
                    Admission::Probe(ProbePermit { breaker: self })
                }
            }
        }
    }

    /// Records a successful attempt.
    ///
    /// A successful probe closes the circuit and clears the window.
    pub fn record_success(&self) {
        let mut inner = self.inner.lock().unwrap();
        match &mut *inner {
            Inner::Closed { window } => {
                Self::push(window, false, self.config.request_volume_threshold);
            }
            Inner::HalfOpen { .. } => {
                *inner = Inner::Closed {
                    window: VecDeque::new(),
                };
                tracing::info!(op_kind = %self.op_kind, "probe succeeded, circuit closed");
                metrics::counter!("circuit_breaker_closed_total", "op_kind" => self.op_kind.clone())
                    .increment(1);
            }
            // A call admitted before the circuit opened finished late.
            Inner::Open { .. } => {}
        }
    }

    /// Records a failed attempt.
    ///
    /// A full window at or above the failure ratio opens the circuit;
    /// a failed probe re-opens it and restarts the wait.
    pub fn record_failure(&self) {
        let mut inner = self.inner.lock().unwrap();
        match &mut *inner {
            Inner::Closed { window } => {
                Self::push(window, true, self.config.request_volume_threshold);
                let failures = window.iter().filter(|failed| **failed).count();
                if window.len() >= self.config.request_volume_threshold
                    && failures as f64 / window.len() as f64 >= self.config.failure_ratio
                {
                    *inner = Inner::Open {
                        opened_at: Instant::now(),
                    };
                    tracing::warn!(
                        op_kind = %self.op_kind,
                        failures,
                        window = self.config.request_volume_threshold,
                        "failure ratio exceeded, circuit opened"
                    );
                    metrics::counter!("circuit_breaker_opened_total", "op_kind" => self.op_kind.clone())
                        .increment(1);
                }
            }
            Inner::HalfOpen { .. } => {
                *inner = Inner::Open {
                    opened_at: Instant::now(),
                };
                tracing::warn!(op_kind = %self.op_kind, "probe failed, circuit re-opened");
                metrics::counter!("circuit_breaker_opened_total", "op_kind" => self.op_kind.clone())
                    .increment(1);
            }
            Inner::Open { .. } => {}
        }
    }

    fn push(window: &mut VecDeque<bool>, failed: bool, capacity: usize) {
        window.push_back(failed);
        while window.len() > capacity {
            window.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn breaker() -> CircuitBreaker {
        CircuitBreaker::new("test", BreakerConfig::default())
    }

    #[test]
    fn starts_closed_and_allows() {
        let b = breaker();
        assert_eq!(b.state(), CircuitState::Closed);
        assert!(matches!(b.try_acquire(), Admission::Allow));
    }

    #[tokio::test(start_paused = true)]
    async fn opens_once_window_is_full_of_failures() {
        let b = breaker();
        for _ in 0..3 {
            b.record_failure();
            assert_eq!(b.state(), CircuitState::Closed);
        }
        b.record_failure();
        assert_eq!(b.state(), CircuitState::Open);
        assert!(matches!(b.try_acquire(), Admission::Reject));
    }

    #[tokio::test(start_paused = true)]
    async fn does_not_trip_below_failure_ratio() {
        let b = breaker();
        // window: success, failure, success, failure → ratio exactly 0.5 trips
        b.record_success();
        b.record_failure();
        b.record_success();
        b.record_failure();
        assert_eq!(b.state(), CircuitState::Open);

        // window: three successes and one failure stays closed
        let b = breaker();
        b.record_success();
        b.record_success();
        b.record_success();
        b.record_failure();
        assert_eq!(b.state(), CircuitState::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn successes_push_failures_out_of_the_window() {
        let b = breaker();
        b.record_failure();
        b.record_failure();
        b.record_success();
        b.record_success();
        // oldest failure evicted before the window could trip
        b.record_success();
        b.record_failure();
        assert_eq!(b.state(), CircuitState::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn admits_single_probe_after_open_wait() {
        let b = breaker();
        for _ in 0..4 {
            b.record_failure();
        }
        assert!(matches!(b.try_acquire(), Admission::Reject));

        tokio::time::advance(Duration::from_millis(2000)).await;
        let probe = b.try_acquire();
        assert!(matches!(probe, Admission::Probe(_)));
        assert_eq!(b.state(), CircuitState::HalfOpen);
        // probe slot is taken, concurrent callers are rejected
        assert!(matches!(b.try_acquire(), Admission::Reject));
    }

    #[tokio::test(start_paused = true)]
    async fn probe_success_closes_the_circuit() {
        let b = breaker();
        for _ in 0..4 {
            b.record_failure();
        }
        tokio::time::advance(Duration::from_millis(2000)).await;
        let probe = b.try_acquire();
        assert!(matches!(probe, Admission::Probe(_)));
        b.record_success();
        assert_eq!(b.state(), CircuitState::Closed);
        assert!(matches!(b.try_acquire(), Admission::Allow));
    }

    #[tokio::test(start_paused = true)]
    async fn probe_failure_reopens_and_restarts_the_wait() {
        let b = breaker();
        for _ in 0..4 {
            b.record_failure();
        }
        tokio::time::advance(Duration::from_millis(2000)).await;
        let probe = b.try_acquire();
        assert!(matches!(probe, Admission::Probe(_)));
        b.record_failure();
        assert_eq!(b.state(), CircuitState::Open);
        drop(probe);

        // wait restarted: still rejecting before the full delay elapses again
        tokio::time::advance(Duration::from_millis(1999)).await;
        assert!(matches!(b.try_acquire(), Admission::Reject));
        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(matches!(b.try_acquire(), Admission::Probe(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_permit_frees_the_probe_slot() {
        let b = breaker();
        for _ in 0..4 {
            b.record_failure();
        }
        tokio::time::advance(Duration::from_millis(2000)).await;

        // the probe ends without a recorded outcome
        let probe = b.try_acquire();
        assert!(matches!(probe, Admission::Probe(_)));
        drop(probe);

        // the slot is free again instead of rejecting forever
        assert_eq!(b.state(), CircuitState::HalfOpen);
        let probe = b.try_acquire();
        assert!(matches!(probe, Admission::Probe(_)));
        b.record_success();
        assert_eq!(b.state(), CircuitState::Closed);
    }
}
