//! Outcome of one indexing run.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Lower bound on the throughput denominator, in seconds.
pub const MIN_THROUGHPUT_WINDOW_SECS: f64 = 1.0;

/// Maximum number of failure samples retained in a report.
pub const MAX_FAILURE_SAMPLES: usize = 10;

/// A product that could not be indexed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexingFailure {
    pub sku: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexingReport {
    pub indexed: u64,
    pub errors: u64,
    pub total: u64,
    pub duration_seconds: f64,
    pub products_per_second: f64,
    pub started_at: String,
    /// First few failures, in input order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<IndexingFailure>,
}

impl IndexingReport {
    pub fn new(
        indexed: u64,
        errors: u64,
        total: u64,
        duration: Duration,
        started_at: String,
        failures: Vec<IndexingFailure>,
    ) -> Self {
        let duration_seconds = duration.as_secs_f64();
        Self {
            indexed,
            errors,
            total,
            duration_seconds,
            products_per_second: indexed as f64
                / duration_seconds.max(MIN_THROUGHPUT_WINDOW_SECS),
            started_at,
            failures,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_throughput_uses_floor() {
        let report = IndexingReport::new(
            50,
            0,
            50,
            Duration::from_millis(10),
            String::new(),
            vec![],
        );
        assert!((report.products_per_second - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_throughput_over_long_run() {
        let report =
            IndexingReport::new(100, 2, 102, Duration::from_secs(4), String::new(), vec![]);
        assert!((report.products_per_second - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_run_has_zero_throughput() {
        let report = IndexingReport::new(0, 0, 0, Duration::ZERO, String::new(), vec![]);
        assert_eq!(report.products_per_second, 0.0);
    }
}
