//! Run configuration for the idxprobe runner.
//!
//! Configuration is layered, highest priority last:
//! 1. Hardcoded defaults (the canonical 5-caller / 30-second profile)
//! 2. Optional YAML file (path taken from the `IDXPROBE_CONFIG` env var or
//!    the `--config` flag)
//! 3. `IDXPROBE__*` environment variables with `__` as the section
//!    separator, e.g. `IDXPROBE__DASHBOARD__ENABLED=true`

use config::{Config, ConfigError, Environment, File};
use idxprobe_core::{CoreResult, LoadProfile, Stage, Threshold};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Root configuration for one load-test run.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RunnerConfig {
    #[serde(default)]
    pub target: TargetConfig,

    #[serde(default)]
    pub run: RunConfig,

    #[serde(default)]
    pub thresholds: ThresholdConfig,

    #[serde(default)]
    pub dashboard: DashboardConfig,
}

impl RunnerConfig {
    /// Loads configuration from defaults, an optional file, and the
    /// environment, then validates it.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        if let Some(path) = file {
            builder = builder.add_source(File::from(path));
        } else if let Ok(path) = std::env::var("IDXPROBE_CONFIG") {
            builder = builder.add_source(File::with_name(&path).required(false));
        }

        builder = builder.add_source(
            Environment::with_prefix("IDXPROBE")
                .separator("__")
                .try_parsing(true),
        );

        let config: RunnerConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validates configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target.base_url.is_empty() {
            return Err(ConfigError::Message(
                "target.base_url cannot be empty".to_string(),
            ));
        }
        if !self.target.base_url.starts_with("http://") && !self.target.base_url.starts_with("https://")
        {
            return Err(ConfigError::Message(
                "target.base_url must start with http:// or https://".to_string(),
            ));
        }
        if !self.run.pause_secs.is_finite() || self.run.pause_secs < 0.0 {
            return Err(ConfigError::Message(
                "run.pause_secs must be non-negative".to_string(),
            ));
        }
        if self.run.stages.is_empty() {
            return Err(ConfigError::Message(
                "run.stages needs at least one stage".to_string(),
            ));
        }
        if self.thresholds.latency_p95_ms <= 0.0 {
            return Err(ConfigError::Message(
                "thresholds.latency_p95_ms must be > 0".to_string(),
            ));
        }
        for (name, rate) in [
            ("thresholds.max_failure_rate", self.thresholds.max_failure_rate),
            ("thresholds.max_error_rate", self.thresholds.max_error_rate),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(ConfigError::Message(format!("{name} must be within 0..=1")));
            }
        }
        if self.dashboard.enabled && self.dashboard.export_path.is_empty() {
            return Err(ConfigError::Message(
                "dashboard.export_path cannot be empty when the dashboard is enabled".to_string(),
            ));
        }
        Ok(())
    }

    /// Builds the load profile from the configured stages.
    pub fn profile(&self) -> CoreResult<LoadProfile> {
        LoadProfile::new(self.run.stages.clone())
    }

    /// The configured run-end thresholds.
    pub fn thresholds(&self) -> Vec<Threshold> {
        vec![
            Threshold::DurationP95Below { millis: self.thresholds.latency_p95_ms },
            Threshold::FailureRateBelow { rate: self.thresholds.max_failure_rate },
            Threshold::ErrorRateBelow { rate: self.thresholds.max_error_rate },
        ]
    }
}

/// Target API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Base URL every probe path is appended to.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Client identifier sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Skip TLS certificate validation for the test target.
    #[serde(default = "default_true")]
    pub insecure_skip_tls_verify: bool,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            insecure_skip_tls_verify: true,
        }
    }
}

/// Load-shape settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Pause between iterations, per virtual caller, in seconds.
    #[serde(default = "default_pause_secs")]
    pub pause_secs: f64,

    /// Concurrency ramp stages.
    #[serde(default = "default_stages")]
    pub stages: Vec<Stage>,
}

impl RunConfig {
    /// Pause as a [`Duration`].
    pub fn pause(&self) -> Duration {
        Duration::from_secs_f64(self.pause_secs)
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self { pause_secs: default_pause_secs(), stages: default_stages() }
    }
}

/// Run-end pass/fail bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// 95th-percentile request duration bound, milliseconds.
    #[serde(default = "default_latency_p95_ms")]
    pub latency_p95_ms: f64,

    /// Request-failure rate bound.
    #[serde(default = "default_rate_bound")]
    pub max_failure_rate: f64,

    /// Custom error-rate bound.
    #[serde(default = "default_rate_bound")]
    pub max_error_rate: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            latency_p95_ms: default_latency_p95_ms(),
            max_failure_rate: default_rate_bound(),
            max_error_rate: default_rate_bound(),
        }
    }
}

/// HTML dashboard export settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Write an HTML report at run end.
    #[serde(default)]
    pub enabled: bool,

    /// Where the report is written.
    #[serde(default = "default_export_path")]
    pub export_path: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self { enabled: false, export_path: default_export_path() }
    }
}

fn default_base_url() -> String {
    "https://indodax.com/api".to_string()
}

fn default_user_agent() -> String {
    format!("idxprobe/{}", env!("CARGO_PKG_VERSION"))
}

fn default_true() -> bool {
    true
}

fn default_pause_secs() -> f64 {
    1.0
}

fn default_stages() -> Vec<Stage> {
    vec![
        Stage { duration_secs: 0.5, target: 5 },
        Stage { duration_secs: 29.5, target: 5 },
    ]
}

fn default_latency_p95_ms() -> f64 {
    1000.0
}

fn default_rate_bound() -> f64 {
    0.05
}

fn default_export_path() -> String {
    "reports/dashboard.html".to_string()
}
