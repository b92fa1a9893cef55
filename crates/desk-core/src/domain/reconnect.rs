//! ReconnectPolicy: the failure budget that decides when the desk's address
//! has gone stale.
//!
//! The policy holds a counter that starts at `max_errors`.  Every failed
//! dispatch decrements it; when it reaches zero the caller must invalidate
//! the current address and run address resolution again.  Once resolution
//! finishes the counter is refilled to `max_errors`.
//!
//! A successful dispatch does **not** refill the counter.  With the default
//! budget of 3, failures spread over a long session (fail, ok, fail, ok,
//! fail) still trigger re-resolution on the third failure.  This is the
//! established behaviour and is kept on purpose.
//!
//! # Concurrency
//!
//! Dispatches run as independent tasks, so failures can be reported from
//! several threads at once.  The counter and the "resolution in progress"
//! flag live behind one mutex so exactly one caller observes the transition
//! to zero and no decrement is lost.  Failures reported while a resolution
//! is already in progress are not counted; they are the expected result of
//! dispatching against an invalidated address.

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Default number of consecutive failures tolerated before re-resolving.
pub const DEFAULT_MAX_ERRORS: u32 = 3;

/// What the caller must do after reporting a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureVerdict {
    /// Budget not exhausted yet.
    Tolerated { remaining: u32 },
    /// Budget exhausted: invalidate the address, resolve, then call
    /// [`ReconnectPolicy::resolution_completed`].
    Reresolve,
    /// Another caller is already re-resolving.
    AlreadyResolving,
}

#[derive(Debug)]
struct CounterState {
    remaining: u32,
    resolving: bool,
}

/// Thread-safe failure counter.
#[derive(Debug)]
pub struct ReconnectPolicy {
    max_errors: u32,
    state: Mutex<CounterState>,
}

impl ReconnectPolicy {
    /// Creates a policy with a full budget.  A `max_errors` of 0 is treated as 1.
    pub fn new(max_errors: u32) -> Self {
        let max_errors = max_errors.max(1);
        Self {
            max_errors,
            state: Mutex::new(CounterState {
                remaining: max_errors,
                resolving: false,
            }),
        }
    }

    pub fn max_errors(&self) -> u32 {
        self.max_errors
    }

    /// Failures still tolerated before the next re-resolution.
    pub fn remaining(&self) -> u32 {
        self.lock().remaining
    }

    pub fn is_resolving(&self) -> bool {
        self.lock().resolving
    }

    /// Records a successful dispatch.  Leaves the counter unchanged.
    pub fn record_success(&self) {}

    /// Records a failed dispatch and returns what the caller must do next.
    pub fn record_failure(&self) -> FailureVerdict {
        let mut state = self.lock();
        if state.resolving {
            return FailureVerdict::AlreadyResolving;
        }
        state.remaining = state.remaining.saturating_sub(1);
        if state.remaining == 0 {
            state.resolving = true;
            FailureVerdict::Reresolve
        } else {
            FailureVerdict::Tolerated {
                remaining: state.remaining,
            }
        }
    }

    /// Refills the budget after a re-resolution finished.
    pub fn resolution_completed(&self) {
        let mut state = self.lock();
        state.remaining = self.max_errors;
        state.resolving = false;
    }

    fn lock(&self) -> MutexGuard<'_, CounterState> {
        // Every critical section leaves the state consistent, so poisoning is ignored.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ERRORS)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_new_policy_has_full_budget() {
        let policy = ReconnectPolicy::default();
        assert_eq!(policy.remaining(), DEFAULT_MAX_ERRORS);
        assert!(!policy.is_resolving());
    }

    #[test]
    fn test_third_failure_requests_reresolve() {
        // Arrange
        let policy = ReconnectPolicy::new(3);

        // Act
        let first = policy.record_failure();
        let second = policy.record_failure();
        let third = policy.record_failure();

        // Assert
        assert_eq!(first, FailureVerdict::Tolerated { remaining: 2 });
        assert_eq!(second, FailureVerdict::Tolerated { remaining: 1 });
        assert_eq!(third, FailureVerdict::Reresolve);
        assert_eq!(policy.remaining(), 0);
        assert!(policy.is_resolving());
    }

    #[test]
    fn test_failures_during_resolution_are_not_counted() {
        let policy = ReconnectPolicy::new(2);
        policy.record_failure();
        assert_eq!(policy.record_failure(), FailureVerdict::Reresolve);

        assert_eq!(policy.record_failure(), FailureVerdict::AlreadyResolving);
        assert_eq!(policy.remaining(), 0);
    }

    #[test]
    fn test_resolution_completed_refills_budget() {
        let policy = ReconnectPolicy::new(3);
        for _ in 0..3 {
            policy.record_failure();
        }

        policy.resolution_completed();

        assert_eq!(policy.remaining(), 3);
        assert!(!policy.is_resolving());
    }

    #[test]
    fn test_success_does_not_refill_budget() {
        let policy = ReconnectPolicy::new(3);
        policy.record_failure();
        policy.record_success();
        policy.record_failure();
        policy.record_success();

        assert_eq!(policy.record_failure(), FailureVerdict::Reresolve);
    }

    #[test]
    fn test_zero_max_errors_is_clamped_to_one() {
        let policy = ReconnectPolicy::new(0);
        assert_eq!(policy.max_errors(), 1);
        assert_eq!(policy.record_failure(), FailureVerdict::Reresolve);
    }

    #[test]
    fn test_concurrent_failures_trigger_exactly_one_reresolve() {
        // Arrange
        let policy = Arc::new(ReconnectPolicy::new(8));

        // Act – 32 threads each report one failure
        let handles: Vec<_> = (0..32)
            .map(|_| {
                let policy = Arc::clone(&policy);
                std::thread::spawn(move || policy.record_failure())
            })
            .collect();
        let verdicts: Vec<FailureVerdict> =
            handles.into_iter().map(|h| h.join().unwrap()).collect();

        // Assert
        let reresolves = verdicts
            .iter()
            .filter(|v| **v == FailureVerdict::Reresolve)
            .count();
        let tolerated = verdicts
            .iter()
            .filter(|v| matches!(v, FailureVerdict::Tolerated { .. }))
            .count();
        assert_eq!(reresolves, 1);
        assert_eq!(tolerated, 7);
    }
}
