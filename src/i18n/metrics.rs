//! Direction metrics and observability.
//!
//! Counters are owned by each `DirectionManager` rather than kept in a
//! global, so independent managers (and tests) never share state.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Counters for direction reconciliation events.
#[derive(Debug, Default)]
pub struct DirectionMetrics {
    /// Startups where the stored language disagreed with the host direction
    mismatches_detected: AtomicUsize,

    /// Restarts handed to the restart primitive
    restarts_requested: AtomicUsize,

    /// Restart primitive failures
    restart_failures: AtomicUsize,

    /// Restart guards cleared at startup
    guard_clears: AtomicUsize,

    /// Startups where a guard was set but the direction was still wrong
    unverified_fixes: AtomicUsize,

    /// Preference store read or write failures (after retries)
    store_failures: AtomicUsize,
}

impl DirectionMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_mismatch(&self) {
        self.mismatches_detected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_restart_requested(&self) {
        self.restarts_requested.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_restart_failure(&self) {
        self.restart_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_guard_clear(&self) {
        self.guard_clears.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_unverified_fix(&self) {
        self.unverified_fixes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_store_failure(&self) {
        self.store_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn restarts_requested(&self) -> usize {
        self.restarts_requested.load(Ordering::Relaxed)
    }

    /// Generate a metrics report.
    pub fn report(&self) -> MetricsReport {
        let requested = self.restarts_requested();
        let failures = self.restart_failures.load(Ordering::Relaxed);
        let restart_success_rate = if requested > 0 {
            ((requested - failures.min(requested)) as f64 / requested as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            mismatches_detected: self.mismatches_detected.load(Ordering::Relaxed),
            restarts_requested: requested,
            restart_failures: failures,
            restart_success_rate,
            guard_clears: self.guard_clears.load(Ordering::Relaxed),
            unverified_fixes: self.unverified_fixes.load(Ordering::Relaxed),
            store_failures: self.store_failures.load(Ordering::Relaxed),
        }
    }
}

/// Metrics report containing current direction statistics.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub mismatches_detected: usize,
    pub restarts_requested: usize,
    pub restart_failures: usize,

    /// Share of requested restarts the primitive accepted, as a percentage (0-100)
    pub restart_success_rate: f64,

    pub guard_clears: usize,
    pub unverified_fixes: usize,
    pub store_failures: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_metrics_are_zero() {
        let report = DirectionMetrics::new().report();
        assert_eq!(report.mismatches_detected, 0);
        assert_eq!(report.restarts_requested, 0);
        assert_eq!(report.restart_success_rate, 0.0);
    }

    #[test]
    fn test_restart_success_rate() {
        let metrics = DirectionMetrics::new();
        for _ in 0..4 {
            metrics.record_restart_requested();
        }
        metrics.record_restart_failure();

        let report = metrics.report();
        assert_eq!(report.restarts_requested, 4);
        assert_eq!(report.restart_failures, 1);
        assert!((report.restart_success_rate - 75.0).abs() < 0.01);
    }

    #[test]
    fn test_counters_are_independent() {
        let metrics = DirectionMetrics::new();
        metrics.record_mismatch();
        metrics.record_guard_clear();
        metrics.record_guard_clear();
        metrics.record_unverified_fix();
        metrics.record_store_failure();

        let report = metrics.report();
        assert_eq!(report.mismatches_detected, 1);
        assert_eq!(report.guard_clears, 2);
        assert_eq!(report.unverified_fixes, 1);
        assert_eq!(report.store_failures, 1);
        assert_eq!(report.restarts_requested, 0);
    }

    #[test]
    fn test_report_serialization() {
        let metrics = DirectionMetrics::new();
        metrics.record_restart_requested();

        let json = serde_json::to_string(&metrics.report()).unwrap();
        assert!(json.contains("\"restarts_requested\":1"));
        assert!(json.contains("restart_success_rate"));
    }
}
