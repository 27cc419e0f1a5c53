//! Staged concurrency ramp describing how many virtual callers are active
//! over the lifetime of a run.
//!
//! A profile is an ordered list of stages. During each stage the active
//! caller count moves linearly from the previous stage's target (zero before
//! the first stage) to the stage's own target. Total run time is the sum of
//! all stage durations.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One ramp stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    /// Stage length in seconds. Fractional values are allowed.
    pub duration_secs: f64,

    /// Concurrent virtual callers at the end of the stage.
    pub target: u32,
}

impl Stage {
    /// Stage length as a [`Duration`].
    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.duration_secs)
    }
}

/// Ordered sequence of ramp stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadProfile {
    stages: Vec<Stage>,
}

impl LoadProfile {
    /// Builds a profile from stages, rejecting empty or degenerate ramps.
    pub fn new(stages: Vec<Stage>) -> CoreResult<Self> {
        if stages.is_empty() {
            return Err(CoreError::validation("load profile needs at least one stage"));
        }
        for (idx, stage) in stages.iter().enumerate() {
            if !stage.duration_secs.is_finite() || stage.duration_secs < 0.0 {
                return Err(CoreError::validation(format!(
                    "stage {idx} has invalid duration {}",
                    stage.duration_secs
                )));
            }
        }
        let profile = Self { stages };
        if profile.total_duration().is_zero() {
            return Err(CoreError::validation("load profile has zero total duration"));
        }
        Ok(profile)
    }

    /// The configured stages, in order.
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Total run time: the sum of all stage durations.
    pub fn total_duration(&self) -> Duration {
        self.stages.iter().map(Stage::duration).sum()
    }

    /// Highest caller count any stage ramps to.
    pub fn max_target(&self) -> u32 {
        self.stages.iter().map(|s| s.target).max().unwrap_or(0)
    }

    /// Desired caller count at `elapsed` time into the run.
    ///
    /// Interpolates linearly within a stage and returns 0 once the run is
    /// past its final stage. Zero-length stages take effect instantly.
    pub fn target_at(&self, elapsed: Duration) -> u32 {
        let elapsed = elapsed.as_secs_f64();
        let mut stage_start = 0.0;
        let mut previous_target = 0u32;

        for stage in &self.stages {
            let stage_end = stage_start + stage.duration_secs;
            if elapsed < stage_end {
                let from = previous_target as f64;
                let to = stage.target as f64;
                let fraction = if stage.duration_secs > 0.0 {
                    (elapsed - stage_start) / stage.duration_secs
                } else {
                    1.0
                };
                return (from + (to - from) * fraction).round() as u32;
            }
            stage_start = stage_end;
            previous_target = stage.target;
        }

        0
    }
}
