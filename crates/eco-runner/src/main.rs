//! Headless driver for the Ecologia ecosystem simulation.

mod telemetry;

use anyhow::{Context, Result};
use clap::Parser;
use eco_core::{SimulationConfig, TurnSummary, AUTORUN, STOP_AT, TIMELAPSE};
use eco_world::Simulation;
use std::path::PathBuf;
use tokio::signal;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{error, info};

#[derive(Parser)]
#[command(
    name = "ecologia",
    about = "Ecologia: a predator-prey ecosystem simulation",
    version
)]
struct Cli {
    /// Configuration file (`.json` or the sectioned `.conf` format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run this many turns, then exit
    #[arg(long)]
    autorun: Option<u64>,

    /// Stop once this turn is reached
    #[arg(long)]
    stop_at: Option<u64>,

    /// Milliseconds between turns
    #[arg(short, long)]
    timelapse: Option<u64>,

    /// Seed for a reproducible run
    #[arg(short, long)]
    seed: Option<u64>,

    /// Log filter directive, e.g. `debug` or `info,eco_world=debug`
    #[arg(long)]
    log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,

    /// Print the final turn summary as JSON on stdout
    #[arg(long)]
    summary_json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StopReason {
    TurnLimit,
    Extinct,
    Signal,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    telemetry::init_logging(cli.log_level.as_deref(), cli.json_logs)?;

    let config = load_config(&cli)?;
    let turn_limit = turn_limit(&config, &cli);
    let timelapse = config.parameters.timelapse_ms().max(1);

    let mut sim = Simulation::new(config).context("failed to create the simulation")?;
    info!(
        event = "runner_started",
        timelapse_ms = timelapse,
        turn_limit = ?turn_limit,
        "Starting Ecologia"
    );
    sim.report("Simulation is running.");
    log_news(&mut sim);

    let (summary, reason) = run(&mut sim, turn_limit, timelapse).await?;

    sim.report("Simulation has stopped.");
    log_news(&mut sim);
    info!(
        event = "runner_stopped",
        reason = ?reason,
        turn = summary.turn,
        herbivores = summary.herbivores,
        carnivores = summary.carnivores,
        highest_generation = summary.highest_generation,
        "Simulation stopped"
    );

    if cli.summary_json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }
    Ok(())
}

fn load_config(cli: &Cli) -> Result<SimulationConfig> {
    let mut config = match &cli.config {
        Some(path) => SimulationConfig::load(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => SimulationConfig::default(),
    };

    if let Some(seed) = cli.seed {
        config.seed = Some(seed);
    }
    if let Some(ms) = cli.timelapse {
        config.parameters.set(TIMELAPSE, ms as i64)?;
    }
    if let Some(turns) = cli.autorun {
        config.parameters.set(AUTORUN, turns as i64)?;
    }
    if let Some(turn) = cli.stop_at {
        config.parameters.set(STOP_AT, turn as i64)?;
    }
    Ok(config)
}

/// The earlier of the autorun length and the stop-at turn, if either is set.
fn turn_limit(config: &SimulationConfig, cli: &Cli) -> Option<u64> {
    let params = &config.parameters;
    let (autorun, stop_at) = if cli.autorun.is_some() || cli.stop_at.is_some() {
        (cli.autorun.filter(|t| *t > 0), cli.stop_at.filter(|t| *t > 0))
    } else {
        (params.autorun(), params.stop_at())
    };
    match (autorun, stop_at) {
        (Some(a), Some(s)) => Some(a.min(s)),
        (a, s) => a.or(s),
    }
}

async fn run(
    sim: &mut Simulation,
    turn_limit: Option<u64>,
    timelapse_ms: u64,
) -> Result<(TurnSummary, StopReason)> {
    let mut ticker = interval(Duration::from_millis(timelapse_ms));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    let mut summary = sim.summary();
    loop {
        if turn_limit.is_some_and(|limit| summary.turn >= limit) {
            return Ok((summary, StopReason::TurnLimit));
        }
        if summary.is_extinct() {
            return Ok((summary, StopReason::Extinct));
        }

        tokio::select! {
            _ = &mut shutdown => return Ok((summary, StopReason::Signal)),
            _ = ticker.tick() => {}
        }

        summary = match sim.step() {
            Ok(summary) => summary,
            Err(e) if e.is_fatal() => {
                error!(error = %e, turn = sim.turn(), "Simulation failed");
                return Err(e.into());
            }
            Err(e) => {
                error!(error = %e, turn = sim.turn(), "Turn aborted");
                sim.summary()
            }
        };
        info!(
            event = "turn",
            turn = summary.turn,
            average_grass_density = summary.average_grass_density,
            herbivores = summary.herbivores,
            carnivores = summary.carnivores,
            highest_generation = summary.highest_generation,
            hunt_success_rate = summary.hunt_success_rate,
            "Turn complete"
        );
        log_news(sim);
    }
}

fn log_news(sim: &mut Simulation) {
    for item in sim.drain_news() {
        info!(event = "news_item", "{}", item);
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("ecologia").chain(args.iter().copied()))
    }

    #[test]
    fn test_cli_overrides() {
        let cli = cli(&["--autorun", "25", "--seed", "9", "--timelapse", "10"]);
        let config = load_config(&cli).unwrap();
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.parameters.timelapse_ms(), 10);
        assert_eq!(turn_limit(&config, &cli), Some(25));
    }

    #[test]
    fn test_turn_limit_takes_earliest() {
        let cli = cli(&["--autorun", "40", "--stop-at", "15"]);
        let config = load_config(&cli).unwrap();
        assert_eq!(turn_limit(&config, &cli), Some(15));
    }

    #[test]
    fn test_turn_limit_from_parameters() {
        let cli = cli(&[]);
        let mut config = SimulationConfig::default();
        assert_eq!(turn_limit(&config, &cli), Some(200));
        config.parameters.set(STOP_AT, -1).unwrap();
        assert_eq!(turn_limit(&config, &cli), None);
        config.parameters.set(AUTORUN, 30).unwrap();
        assert_eq!(turn_limit(&config, &cli), Some(30));
    }

    #[tokio::test]
    async fn test_run_until_turn_limit() {
        let cli = cli(&["--seed", "3"]);
        let mut config = load_config(&cli).unwrap();
        config.parameters.set(eco_core::XSIZE, 20).unwrap();
        config.parameters.set(eco_core::YSIZE, 20).unwrap();
        let mut sim = Simulation::new(config).unwrap();
        let (summary, reason) = run(&mut sim, Some(5), 1).await.unwrap();
        assert_eq!(summary.turn, 5);
        assert_eq!(reason, StopReason::TurnLimit);
        assert!(sim.drain_news().is_empty());
    }
}
