//! Run lifecycle: the setup banner, the virtual-caller scheduler, and the
//! teardown banner.
//!
//! The scheduler owns all concurrency: it keeps the pool of caller tasks
//! tracking the profile's target and stops everything at the end of the
//! final stage. Each caller is a plain sequential loop over the probe
//! catalog; a stop signal may interrupt it mid-iteration.

use crate::config::RunnerConfig;
use crate::probes::{run_iteration, ProbeClient};
use chrono::Utc;
use idxprobe_core::{LoadProfile, MetricsRegistry, ProbeSpec};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

/// How often the scheduler reconciles the caller pool with the profile.
const SCHEDULER_TICK: Duration = Duration::from_millis(100);

/// Context created by setup and handed, by value, to teardown.
#[derive(Debug, Clone)]
pub struct SetupContext {
    /// Run start timestamp, ISO-8601.
    pub start_time: String,
}

/// Runs exactly once before any caller starts. Prints the configuration
/// banner and records the start time. Performs no I/O that can fail.
pub fn setup(config: &RunnerConfig, profile: &LoadProfile, probe_count: usize) -> SetupContext {
    let ramp = profile
        .stages()
        .first()
        .map(|stage| stage.duration())
        .unwrap_or(Duration::ZERO);

    println!("========================================");
    println!("   Indodax API Load Test");
    println!("========================================");
    println!("Configuration:");
    println!("  Virtual Callers  : {}", profile.max_target());
    println!("  Ramp-up          : {:?}", ramp);
    println!("  Test Duration    : {:?}", profile.total_duration());
    println!("  Target API       : {}", config.target.base_url);
    println!("  Endpoints Tested : ALL {probe_count} endpoints per iteration");
    println!("========================================\n");

    SetupContext { start_time: Utc::now().to_rfc3339() }
}

/// Runs exactly once after every caller has finished.
pub fn teardown(ctx: SetupContext) {
    println!("\n========================================");
    println!("  Load Test Completed!");
    println!("========================================");
    println!("Start Time: {}", ctx.start_time);
    println!("End Time: {}", Utc::now().to_rfc3339());
    println!("========================================\n");
}

struct Caller {
    handle: JoinHandle<()>,
    stop: watch::Sender<bool>,
}

fn spawn_caller(
    id: u32,
    client: Arc<ProbeClient>,
    probes: Arc<Vec<ProbeSpec>>,
    pause: Duration,
    metrics: Arc<MetricsRegistry>,
) -> Caller {
    let (stop, mut stopped) = watch::channel(false);
    let handle = tokio::spawn(async move {
        debug!(caller = id, "virtual caller started");
        loop {
            tokio::select! {
                _ = stopped.changed() => break,
                _ = async {
                    run_iteration(&client, &probes, &metrics).await;
                    tokio::time::sleep(pause).await;
                } => {}
            }
        }
        debug!(caller = id, "virtual caller stopped");
    });
    Caller { handle, stop }
}

/// Drives the whole run: ramps the caller pool per the profile, then stops
/// and awaits every caller once the total duration elapses.
pub async fn run(
    client: Arc<ProbeClient>,
    probes: Arc<Vec<ProbeSpec>>,
    profile: &LoadProfile,
    pause: Duration,
    metrics: Arc<MetricsRegistry>,
) {
    let started = Instant::now();
    let total = profile.total_duration();
    let mut active: Vec<Caller> = Vec::new();
    let mut retired: Vec<JoinHandle<()>> = Vec::new();
    let mut next_id: u32 = 0;

    loop {
        let elapsed = started.elapsed();
        if elapsed >= total {
            break;
        }

        let target = profile.target_at(elapsed) as usize;
        while active.len() < target {
            next_id += 1;
            active.push(spawn_caller(
                next_id,
                client.clone(),
                probes.clone(),
                pause,
                metrics.clone(),
            ));
        }
        // Newest callers are stopped first when the profile ramps down.
        while active.len() > target {
            if let Some(caller) = active.pop() {
                let _ = caller.stop.send(true);
                retired.push(caller.handle);
            }
        }

        tokio::time::sleep(SCHEDULER_TICK.min(total - elapsed)).await;
    }

    for caller in &active {
        let _ = caller.stop.send(true);
    }
    for caller in active {
        let _ = caller.handle.await;
    }
    for handle in retired {
        let _ = handle.await;
    }
}
