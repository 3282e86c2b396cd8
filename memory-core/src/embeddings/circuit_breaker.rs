//! One-shot circuit breaker for the embedding service (spec §4.1, §9).
//!
//! Unlike a classic closed/open/half-open breaker, this one never retries on its
//! own: once model initialization fails, every subsequent call fails immediately
//! with `EmbeddingUnavailable` until something explicitly calls `reset`. Frequent
//! retries of model initialization would dominate latency, so the breaker is
//! deliberately one-shot rather than self-healing.

use std::sync::atomic::{AtomicBool, Ordering};

/// Tracks whether the embedding model is known to be unavailable.
#[derive(Debug, Default)]
pub struct CircuitBreaker {
    tripped: AtomicBool,
}

impl CircuitBreaker {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tripped: AtomicBool::new(false),
        }
    }

    /// `true` if calls should fail fast with `EmbeddingUnavailable`.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.tripped.load(Ordering::Acquire)
    }

    /// Record that model initialization or inference failed. Idempotent.
    pub fn trip(&self) {
        if !self.tripped.swap(true, Ordering::AcqRel) {
            tracing::warn!("embedding circuit breaker tripped; failing fast until reset");
        }
    }

    /// Explicitly clear the tripped state, allowing calls to reach the model again.
    pub fn reset(&self) {
        if self.tripped.swap(false, Ordering::AcqRel) {
            tracing::info!("embedding circuit breaker reset");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_closed() {
        let cb = CircuitBreaker::new();
        assert!(!cb.is_open());
    }

    #[test]
    fn trip_opens_and_stays_open_without_retry() {
        let cb = CircuitBreaker::new();
        cb.trip();
        assert!(cb.is_open());
        assert!(cb.is_open(), "no implicit recovery without reset");
    }

    #[test]
    fn reset_closes() {
        let cb = CircuitBreaker::new();
        cb.trip();
        cb.reset();
        assert!(!cb.is_open());
    }
}
