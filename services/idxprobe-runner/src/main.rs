use clap::{Parser, Subcommand};
use idxprobe_core::{report, threshold, MetricsRegistry};
use idxprobe_runner::config::RunnerConfig;
use idxprobe_runner::error::RunnerResult;
use idxprobe_runner::{probes, runner};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "idxprobe")]
#[command(about = "Load-test driver for the Indodax public API", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Execute the load test against the configured target
    Run {
        /// Configuration file path (YAML)
        #[arg(long, env = "IDXPROBE_CONFIG")]
        config: Option<PathBuf>,
    },

    /// Generate a configuration file template
    GenerateConfig {
        /// Output configuration file path
        #[arg(long, default_value = "idxprobe.yaml")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    init_logging();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Run { config } => run_load_test(config.as_deref()).await,
        Commands::GenerateConfig { output } => generate_config(&output),
    };

    if let Err(err) = result {
        eprintln!("idxprobe: {err}");
        std::process::exit(1);
    }
}

async fn run_load_test(config_path: Option<&Path>) -> RunnerResult<()> {
    let config = RunnerConfig::load(config_path)?;
    let profile = config.profile()?;
    let catalog = Arc::new(probes::catalog());
    let client = Arc::new(probes::ProbeClient::new(&config.target)?);
    let metrics = Arc::new(MetricsRegistry::new()?);

    let ctx = runner::setup(&config, &profile, catalog.len());
    runner::run(client, catalog, &profile, config.run.pause(), metrics.clone()).await;
    runner::teardown(ctx);

    let summary = metrics.snapshot();
    let verdicts = threshold::evaluate_all(&config.thresholds(), &summary);
    print!("{}", report::render_text(&summary, &verdicts));

    if config.dashboard.enabled {
        report::export_html(&config.dashboard.export_path, &summary, &verdicts)?;
        println!("\nDashboard exported to: {}", config.dashboard.export_path);
    }

    if !threshold::all_passed(&verdicts) {
        println!("\nOne or more thresholds failed.");
        std::process::exit(1);
    }

    Ok(())
}

fn generate_config(output: &Path) -> RunnerResult<()> {
    let template = r#"# idxprobe load test configuration
# Values below are the defaults; delete anything you do not override.
# Every key can also be set via environment variables with the IDXPROBE
# prefix and `__` as the separator, e.g. IDXPROBE__DASHBOARD__ENABLED=true.

target:
  base_url: https://indodax.com/api
  user_agent: idxprobe/0.1.0
  insecure_skip_tls_verify: true

run:
  # Pause between iterations, per virtual caller
  pause_secs: 1.0
  # Ramp to 5 callers in 0.5s, hold for the rest of the 30s run
  stages:
    - duration_secs: 0.5
      target: 5
    - duration_secs: 29.5
      target: 5

thresholds:
  latency_p95_ms: 1000.0
  max_failure_rate: 0.05
  max_error_rate: 0.05

dashboard:
  enabled: false
  export_path: reports/dashboard.html
"#;

    std::fs::write(output, template)?;
    println!("Configuration template written to: {}", output.display());
    println!("\nRun it with:");
    println!("  idxprobe run --config {}", output.display());

    Ok(())
}

fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(env_filter).with_target(false).init();
}
