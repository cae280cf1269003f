//! worker-bench: floods a worker group and reports per-worker counters.
//!
//! Builds a group from `frog.toml` (or defaults plus `FROG_*` env vars),
//! submits a mix of normal, priority and panicking tasks, drains, joins
//! and prints one snapshot per worker.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use tracing::{info, warn};

use frog_worker::{
    FrogConfig, SelectStrategy, ShutdownMode, Task, Tier, WorkerError, WorkerGroup,
};

// ── CLI ─────────────────────────────────────────────────────────────

/// Load generator for frog worker groups.
#[derive(Parser, Debug)]
#[command(name = "worker-bench", version, about)]
struct Cli {
    /// Path to a TOML config file. Defaults plus env overrides when absent.
    #[arg(long, env = "FROG_CONFIG")]
    config: Option<PathBuf>,

    /// Number of workers (overrides the config).
    #[arg(long, env = "FROG_BENCH_WORKERS")]
    workers: Option<usize>,

    /// Select strategy: round_robin, random, least_loaded.
    #[arg(long, env = "FROG_BENCH_STRATEGY")]
    strategy: Option<SelectStrategy>,

    /// Total tasks to submit.
    #[arg(long, env = "FROG_BENCH_TASKS", default_value_t = 100_000)]
    tasks: u64,

    /// Every n-th task goes to the priority tier (0 disables).
    #[arg(long, default_value_t = 10)]
    priority_every: u64,

    /// Every n-th task panics (0 disables).
    #[arg(long, default_value_t = 0)]
    panic_every: u64,

    /// Print snapshots as JSON instead of text.
    #[arg(long)]
    json: bool,
}

fn load_config(cli: &Cli) -> Result<FrogConfig, WorkerError> {
    let mut config = match &cli.config {
        Some(path) => {
            let config = FrogConfig::from_file(path)?;
            info!(path = %path.display(), "loaded frog config");
            config
        }
        None => FrogConfig::from_env()?,
    };
    if let Some(workers) = cli.workers {
        config.group.size = workers;
    }
    if let Some(strategy) = cli.strategy {
        config.group.strategy = strategy;
    }
    config.validate()?;
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    config.log_summary();

    let group = WorkerGroup::new(&config)?;
    let executed = Arc::new(AtomicU64::new(0));
    let mut rejected = 0u64;

    let started = Instant::now();
    for n in 1..=cli.tasks {
        let executed = Arc::clone(&executed);
        let panics = cli.panic_every > 0 && n % cli.panic_every == 0;
        let task: Task = Box::new(move || {
            if panics {
                panic!("bench task {n} panicked on purpose");
            }
            executed.fetch_add(1, Ordering::Relaxed);
        });

        let tier = if cli.priority_every > 0 && n % cli.priority_every == 0 {
            Tier::Priority
        } else {
            Tier::Normal
        };
        if let Err(e) = group.next().submit_task(tier, task) {
            rejected += 1;
            warn!(error = %e, task = n, "submission failed");
        }
    }
    let submitted_in = started.elapsed();

    group.shutdown(ShutdownMode::Drain);
    group.join();
    let total = started.elapsed();

    info!(
        tasks = cli.tasks,
        executed = executed.load(Ordering::Relaxed),
        rejected,
        submit_ms = submitted_in.as_millis() as u64,
        total_ms = total.as_millis() as u64,
        "bench complete"
    );

    let snapshots = group.describe();
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&snapshots)?);
    } else {
        for snapshot in &snapshots {
            println!("{snapshot}");
        }
    }

    Ok(())
}
