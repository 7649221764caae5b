//! Command-line driver for the combat runtime.
//!
//! Loads content, plays the scripted encounter for a number of ticks, lets
//! in-flight sequences finish and prints a summary.
//! Run with: `cargo run -p combat-sim -- --ticks 60 --seed 7`
mod encounter;
mod summary;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use combat_content::{ConfigLoader, ContentFactory};
use combat_core::OverflowPolicy;
use runtime::Runtime;

use encounter::Encounter;
use summary::Summary;

const DEFAULT_SEED: u64 = 0x5eed;

/// Stacking-resource combat simulator
#[derive(Parser)]
#[command(name = "combat-sim")]
#[command(about = "Runs a scripted combat encounter and summarizes it", long_about = None)]
#[command(version)]
struct Cli {
    /// Ticks of scripted input
    #[arg(short, long, default_value_t = 60)]
    ticks: u64,

    /// Simulation seed (falls back to COMBAT_SEED, then a fixed default)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Combat tunables overriding the content's config.toml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding config.toml, ledgers.ron, effects.ron and scripts.ron
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Overflow policy overriding the loaded config
    #[arg(long, value_parser = parse_policy)]
    overflow_policy: Option<OverflowPolicy>,

    /// Extra ticks allowed for in-flight sequences after the script ends
    #[arg(long, default_value_t = 32)]
    drain: u64,

    /// Also write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Write the combat log as RON to this file
    #[arg(long)]
    combat_log: Option<PathBuf>,
}

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    let _guard = setup_logging(cli.log_file.as_deref())?;

    let mut content = match &cli.data_dir {
        Some(dir) => ContentFactory::new(dir).load()?,
        None => ContentFactory::load_embedded()?,
    };
    if let Some(path) = &cli.config {
        content.config = ConfigLoader::load(path)?;
    }
    if let Some(policy) = cli.overflow_policy {
        content.config.overflow_policy = policy;
    }

    let seed = cli.seed.or_else(seed_from_env).unwrap_or(DEFAULT_SEED);
    let mut runtime = Runtime::builder().content(content).seed(seed).build()?;
    let encounter = Encounter::spawn(&mut runtime)?;
    info!(seed, ticks = cli.ticks, ?encounter, "encounter starting");

    for tick in 1..=cli.ticks {
        runtime.submit_all(encounter.commands(tick));
        if let Err(err) = runtime.tick() {
            error!(tick, severity = err.severity().as_str(), "tick failed: {err}");
            return Err(err.into());
        }
    }
    let drained = runtime.run_until_idle(cli.drain)?;
    if !runtime.is_idle() {
        warn!(drained, "actions still pending after drain limit");
    }

    println!("{}", Summary::collect(&runtime)?);

    if let Some(path) = &cli.combat_log {
        runtime.log().write_ron(path)?;
        info!("Combat log: {}", path.display());
    }
    Ok(())
}

fn parse_policy(value: &str) -> Result<OverflowPolicy, String> {
    value
        .parse()
        .map_err(|_| format!("unknown overflow policy `{value}`, expected collapse or discard"))
}

fn seed_from_env() -> Option<u64> {
    std::env::var("COMBAT_SEED").ok()?.parse().ok()
}

/// Logs to stderr, and to `log_file` when given.
///
/// The returned guard flushes the file writer when dropped.
fn setup_logging(log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let dir = match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent,
                _ => Path::new("."),
            };
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let name = path.file_name().context("Log file path has no file name")?;
            let appender = tracing_appender::rolling::never(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    if let Some(path) = log_file {
        info!("Log file: {}", path.display());
    }
    Ok(guard)
}
