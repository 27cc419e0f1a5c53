//! Pass/fail thresholds evaluated once, against the end-of-run summary.

use crate::metrics::RunSummary;

/// One pass/fail condition on an aggregate run-level statistic.
#[derive(Debug, Clone, PartialEq)]
pub enum Threshold {
    /// 95th-percentile request duration must stay below the bound.
    DurationP95Below { millis: f64 },

    /// Built-in request-failure rate must stay below the bound.
    FailureRateBelow { rate: f64 },

    /// Custom error-rate metric must stay below the bound.
    ErrorRateBelow { rate: f64 },
}

/// Verdict of one evaluated threshold.
#[derive(Debug, Clone)]
pub struct ThresholdVerdict {
    /// Human-readable description of the condition.
    pub description: String,

    /// Observed value of the statistic.
    pub actual: f64,

    /// Whether the condition held.
    pub passed: bool,
}

impl Threshold {
    /// Evaluates the condition against a run summary.
    pub fn evaluate(&self, summary: &RunSummary) -> ThresholdVerdict {
        match self {
            Threshold::DurationP95Below { millis } => ThresholdVerdict {
                description: format!("request duration: p(95) < {millis} ms"),
                actual: summary.aggregate.p95_ms,
                passed: summary.aggregate.p95_ms < *millis,
            },
            Threshold::FailureRateBelow { rate } => ThresholdVerdict {
                description: format!("request failures: rate < {:.2}%", rate * 100.0),
                actual: summary.request_failure_rate,
                passed: summary.request_failure_rate < *rate,
            },
            Threshold::ErrorRateBelow { rate } => ThresholdVerdict {
                description: format!("errors: rate < {:.2}%", rate * 100.0),
                actual: summary.error_rate,
                passed: summary.error_rate < *rate,
            },
        }
    }
}

/// Evaluates every threshold against the same summary.
pub fn evaluate_all(thresholds: &[Threshold], summary: &RunSummary) -> Vec<ThresholdVerdict> {
    thresholds.iter().map(|t| t.evaluate(summary)).collect()
}

/// Whether the run as a whole passed.
pub fn all_passed(verdicts: &[ThresholdVerdict]) -> bool {
    verdicts.iter().all(|v| v.passed)
}
