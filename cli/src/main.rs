//! `econ-sim` - run an experiment from the command line
//!
//! Loads an experiment config (or the baseline), applies overrides, runs the
//! requested number of ticks and writes the metrics export. Logs go to
//! stderr; `RUST_LOG` overrides the level chosen by `--verbose`.

use clap::Parser;
use econ_sim_core::metrics::export_json;
use econ_sim_core::orchestrator::checkpoint;
use econ_sim_core::{ExperimentConfig, Simulation};
use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Deterministic agent-based economy simulator
#[derive(Parser, Debug)]
#[command(name = "econ-sim")]
#[command(about = "Run a deterministic agent-based economy experiment", long_about = None)]
#[command(version)]
struct Cli {
    /// Experiment config (JSON); the baseline economy when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the config seed
    #[arg(short, long)]
    seed: Option<u32>,

    /// Number of ticks to run
    #[arg(short, long, default_value_t = 100)]
    ticks: u64,

    /// Override the household count
    #[arg(long)]
    households: Option<usize>,

    /// Override the firm count
    #[arg(long)]
    firms: Option<usize>,

    /// Write the metrics export here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Resume from this checkpoint instead of initializing
    #[arg(long)]
    resume: Option<PathBuf>,

    /// Save a checkpoint here after the last tick
    #[arg(long)]
    checkpoint: Option<PathBuf>,

    /// Log each phase (debug level)
    #[arg(short, long)]
    verbose: bool,
}

fn load_config(cli: &Cli) -> Result<ExperimentConfig, Box<dyn Error>> {
    let mut config = match &cli.config {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .map_err(|e| format!("failed to read config {}: {}", path.display(), e))?;
            serde_json::from_str(&raw)
                .map_err(|e| format!("invalid config {}: {}", path.display(), e))?
        }
        None => ExperimentConfig::default(),
    };

    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    if let Some(households) = cli.households {
        config.population.households = households;
    }
    if let Some(firms) = cli.firms {
        config.population.firms = firms;
    }
    Ok(config)
}

fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let config = load_config(cli)?;

    let mut sim = match &cli.resume {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .map_err(|e| format!("failed to read checkpoint {}: {}", path.display(), e))?;
            let state = if cli.config.is_some() {
                checkpoint::load_for(&raw, &config)?
            } else {
                checkpoint::load(&raw)?
            };
            info!(tick = state.tick(), "resumed from checkpoint");
            Simulation::from_state(state)
        }
        None => Simulation::new(config)?,
    };

    let mut diagnostics = 0;
    for _ in 0..cli.ticks {
        diagnostics += sim.tick()?.len();
    }
    if diagnostics > 0 {
        warn!(diagnostics, "run finished with diagnostics");
    }

    if let Some(m) = sim.latest_metrics() {
        info!(
            tick = m.tick,
            gdp = m.gdp,
            cpi = m.cpi,
            unemployment = m.unemployment_rate,
            money_supply = m.money_supply,
            active_firms = m.active_firms,
            "final metrics"
        );
    }

    let export = export_json(sim.state())?;
    match &cli.output {
        Some(path) => {
            fs::write(path, export)
                .map_err(|e| format!("failed to write {}: {}", path.display(), e))?;
            info!(path = %path.display(), "metrics written");
        }
        None => println!("{}", export),
    }

    if let Some(path) = &cli.checkpoint {
        fs::write(path, checkpoint::save(sim.state())?)
            .map_err(|e| format!("failed to write checkpoint {}: {}", path.display(), e))?;
        info!(path = %path.display(), tick = sim.state().tick(), "checkpoint written");
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
