//! Core engine for the idxprobe load-test driver.
//!
//! This crate owns everything that is independent of any particular target
//! API: the staged concurrency profile, declarative response checks, probe
//! definitions, the shared metrics registry, run-end threshold evaluation,
//! and summary rendering. The runner service supplies the endpoint catalog
//! and the HTTP transport.

pub mod check;
pub mod error;
pub mod metrics;
pub mod probe;
pub mod profile;
pub mod report;
pub mod threshold;

pub use check::{Check, CheckOutcome, Condition, ProbeResponse};
pub use error::{CoreError, CoreResult};
pub use metrics::{MetricsRegistry, RateMetric, RunSummary};
pub use probe::{ProbeOutcome, ProbeSpec};
pub use profile::{LoadProfile, Stage};
pub use threshold::{Threshold, ThresholdVerdict};
