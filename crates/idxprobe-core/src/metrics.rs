//! Shared metrics registry fed by every virtual caller.
//!
//! The registry is the only state shared across callers and is append-only
//! from their perspective: callers record request latencies, check outcomes
//! and error-rate samples; aggregation happens once, in [`MetricsRegistry::snapshot`].

use crate::error::{CoreError, CoreResult};
use hdrhistogram::Histogram;
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Significant figures kept by the latency histograms.
const LATENCY_SIGFIGS: u8 = 3;

/// Boolean-stream rate metric.
///
/// Each sample is a pass/fail flag; the metric aggregates to the fraction of
/// failing samples. An empty stream has rate 0.
#[derive(Debug, Default)]
pub struct RateMetric {
    hits: AtomicU64,
    total: AtomicU64,
}

impl RateMetric {
    /// Records one sample; `true` counts towards the rate.
    pub fn add(&self, flag: bool) {
        self.total.fetch_add(1, Ordering::Relaxed);
        if flag {
            self.hits.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Samples recorded so far.
    pub fn total(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }

    /// Samples that counted towards the rate.
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Fraction of `true` samples, 0.0 when empty.
    pub fn rate(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            self.hits() as f64 / total as f64
        }
    }
}

struct EndpointMetrics {
    latency: Histogram<u64>,
    requests: u64,
    failures: u64,
}

#[derive(Debug, Default, Clone, Copy)]
struct CheckCounter {
    passes: u64,
    failures: u64,
}

/// Registry shared by all virtual callers for the lifetime of one run.
pub struct MetricsRegistry {
    endpoints: Mutex<BTreeMap<String, EndpointMetrics>>,
    aggregate: Mutex<Histogram<u64>>,
    checks: Mutex<BTreeMap<String, CheckCounter>>,
    failed_requests: RateMetric,
    errors: RateMetric,
}

impl MetricsRegistry {
    /// Creates an empty registry.
    pub fn new() -> CoreResult<Self> {
        let aggregate = new_latency_histogram()?;
        Ok(Self {
            endpoints: Mutex::new(BTreeMap::new()),
            aggregate: Mutex::new(aggregate),
            checks: Mutex::new(BTreeMap::new()),
            failed_requests: RateMetric::default(),
            errors: RateMetric::default(),
        })
    }

    /// Records one request: latency under the probe's name, plus the
    /// built-in request-failure rate.
    pub fn record_request(&self, name: &str, latency: Duration, failed: bool) {
        let micros = latency.as_micros().min(u128::from(u64::MAX)) as u64;

        {
            let mut endpoints = self.endpoints.lock();
            if !endpoints.contains_key(name) {
                if let Ok(latency) = new_latency_histogram() {
                    endpoints.insert(
                        name.to_string(),
                        EndpointMetrics { latency, requests: 0, failures: 0 },
                    );
                }
            }
            if let Some(entry) = endpoints.get_mut(name) {
                entry.latency.saturating_record(micros);
                entry.requests += 1;
                if failed {
                    entry.failures += 1;
                }
            }
        }

        self.aggregate.lock().saturating_record(micros);
        self.failed_requests.add(failed);
    }

    /// Records one named check outcome.
    pub fn record_check(&self, name: &str, passed: bool) {
        let mut checks = self.checks.lock();
        let counter = checks.entry(name.to_string()).or_default();
        if passed {
            counter.passes += 1;
        } else {
            counter.failures += 1;
        }
    }

    /// Records one sample of the custom error-rate metric: `true` when a
    /// probe had at least one failed check.
    pub fn record_error(&self, had_failure: bool) {
        self.errors.add(had_failure);
    }

    /// Built-in request-failure rate metric.
    pub fn failed_requests(&self) -> &RateMetric {
        &self.failed_requests
    }

    /// Custom error-rate metric.
    pub fn errors(&self) -> &RateMetric {
        &self.errors
    }

    /// Produces an immutable aggregate view of everything recorded so far.
    pub fn snapshot(&self) -> RunSummary {
        let endpoints = self.endpoints.lock();
        let endpoint_summaries: Vec<EndpointSummary> = endpoints
            .iter()
            .map(|(name, metrics)| EndpointSummary {
                name: name.clone(),
                requests: metrics.requests,
                failures: metrics.failures,
                latency: LatencyStats::from_histogram(&metrics.latency),
            })
            .collect();

        let checks = self.checks.lock();
        let check_summaries: Vec<CheckSummary> = checks
            .iter()
            .map(|(name, counter)| CheckSummary {
                name: name.clone(),
                passes: counter.passes,
                failures: counter.failures,
            })
            .collect();

        RunSummary {
            total_requests: self.failed_requests.total(),
            failed_requests: self.failed_requests.hits(),
            request_failure_rate: self.failed_requests.rate(),
            error_rate: self.errors.rate(),
            error_samples: self.errors.total(),
            aggregate: LatencyStats::from_histogram(&self.aggregate.lock()),
            endpoints: endpoint_summaries,
            checks: check_summaries,
        }
    }
}

fn new_latency_histogram() -> CoreResult<Histogram<u64>> {
    Histogram::new(LATENCY_SIGFIGS).map_err(|err| CoreError::metrics(err.to_string()))
}

/// Latency distribution of one request stream, in milliseconds.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LatencyStats {
    pub count: u64,
    pub min_ms: f64,
    pub mean_ms: f64,
    pub p50_ms: f64,
    pub p90_ms: f64,
    pub p95_ms: f64,
    pub p99_ms: f64,
    pub max_ms: f64,
}

impl LatencyStats {
    fn from_histogram(histogram: &Histogram<u64>) -> Self {
        if histogram.is_empty() {
            return Self {
                count: 0,
                min_ms: 0.0,
                mean_ms: 0.0,
                p50_ms: 0.0,
                p90_ms: 0.0,
                p95_ms: 0.0,
                p99_ms: 0.0,
                max_ms: 0.0,
            };
        }
        let to_ms = |micros: u64| micros as f64 / 1_000.0;
        Self {
            count: histogram.len(),
            min_ms: to_ms(histogram.min()),
            mean_ms: histogram.mean() / 1_000.0,
            p50_ms: to_ms(histogram.value_at_quantile(0.50)),
            p90_ms: to_ms(histogram.value_at_quantile(0.90)),
            p95_ms: to_ms(histogram.value_at_quantile(0.95)),
            p99_ms: to_ms(histogram.value_at_quantile(0.99)),
            max_ms: to_ms(histogram.max()),
        }
    }
}

/// Aggregated request metrics for one probe.
#[derive(Debug, Clone, Serialize)]
pub struct EndpointSummary {
    pub name: String,
    pub requests: u64,
    pub failures: u64,
    pub latency: LatencyStats,
}

/// Aggregated pass/fail counts for one named check.
#[derive(Debug, Clone, Serialize)]
pub struct CheckSummary {
    pub name: String,
    pub passes: u64,
    pub failures: u64,
}

/// Immutable end-of-run view of the whole registry.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub total_requests: u64,
    pub failed_requests: u64,
    pub request_failure_rate: f64,
    pub error_rate: f64,
    pub error_samples: u64,
    pub aggregate: LatencyStats,
    pub endpoints: Vec<EndpointSummary>,
    pub checks: Vec<CheckSummary>,
}
