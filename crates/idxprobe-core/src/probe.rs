//! Probe definitions: one idempotent GET request plus its validation checks.

use crate::check::{Check, CheckOutcome, ProbeResponse};

/// One read-only endpoint probe.
#[derive(Debug, Clone)]
pub struct ProbeSpec {
    /// Human-readable name used for metrics attribution.
    pub name: &'static str,

    /// Request path relative to the configured base URL.
    pub path: &'static str,

    /// Ordered checks evaluated against every response.
    pub checks: Vec<Check>,
}

/// Result of evaluating all of a probe's checks against one response.
#[derive(Debug, Clone)]
pub struct ProbeOutcome {
    /// Per-check outcomes, in check order.
    pub outcomes: Vec<CheckOutcome>,

    /// Conjunction of all outcomes.
    pub all_passed: bool,
}

impl ProbeSpec {
    /// Creates a probe definition.
    pub fn new(name: &'static str, path: &'static str, checks: Vec<Check>) -> Self {
        Self { name, path, checks }
    }

    /// Evaluates every check independently; never short-circuits.
    pub fn evaluate(&self, response: &ProbeResponse) -> ProbeOutcome {
        let outcomes: Vec<CheckOutcome> = self
            .checks
            .iter()
            .map(|check| CheckOutcome {
                name: check.name,
                passed: check.condition.eval(response),
            })
            .collect();
        let all_passed = outcomes.iter().all(|outcome| outcome.passed);
        ProbeOutcome { outcomes, all_passed }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::Condition;
    use serde_json::json;

    fn sample_probe() -> ProbeSpec {
        ProbeSpec::new(
            "server_time",
            "/server_time",
            vec![
                Check::new("status is 200", Condition::StatusIs(200)),
                Check::new("has server_time", Condition::HasField("server_time")),
                Check::new("has timezone", Condition::HasField("timezone")),
            ],
        )
    }

    #[test]
    fn all_checks_pass_on_well_formed_response() {
        let response = ProbeResponse {
            status: 200,
            body: Some(json!({"server_time": 1714646400000u64, "timezone": "UTC"})),
        };
        let outcome = sample_probe().evaluate(&response);
        assert!(outcome.all_passed);
        assert_eq!(outcome.outcomes.len(), 3);
    }

    #[test]
    fn checks_are_evaluated_independently() {
        // Missing field: the status check still passes on its own merits.
        let response = ProbeResponse {
            status: 200,
            body: Some(json!({"server_time": 1714646400000u64})),
        };
        let outcome = sample_probe().evaluate(&response);
        assert!(!outcome.all_passed);
        assert!(outcome.outcomes[0].passed);
        assert!(outcome.outcomes[1].passed);
        assert!(!outcome.outcomes[2].passed);
    }
}
