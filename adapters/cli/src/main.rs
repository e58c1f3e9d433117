#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Archer Arena session.

mod autopilot;

use std::{fs, path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use archer_arena_core::{Event, GameConfig};
use archer_arena_simulation::{Observer, Simulation};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use self::autopilot::Autopilot;

/// Runs a scripted Archer Arena session and prints its summary.
#[derive(Debug, Parser)]
#[command(name = "archer-arena", version)]
struct Cli {
    /// TOML file overriding the default game configuration.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Session seed; overrides the configured one.
    #[arg(long)]
    seed: Option<u64>,
    /// Maximum number of simulation steps.
    #[arg(long, default_value_t = 12_000)]
    ticks: u32,
    /// Simulated milliseconds per step.
    #[arg(long = "dt-ms", default_value_t = 50)]
    dt_ms: u64,
    /// Leave level-ups unspent instead of rotating through the skills.
    #[arg(long)]
    no_upgrades: bool,
    /// Raise log verbosity; repeat for more detail.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Logs the session milestones a player would notice.
struct MilestoneLog;

impl Observer for MilestoneLog {
    fn on_event(&mut self, event: &Event) {
        match event {
            Event::LevelChanged { level } => info!(level, "entered room"),
            Event::LevelUp { level } => info!(level, "player levelled up"),
            Event::WaveCleared { level } => info!(level, "wave cleared"),
            Event::GameOver => info!("game over"),
            _ => {}
        }
    }
}

/// Entry point for the Archer Arena command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = load_config(cli.config.as_ref())?;
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    let dt = Duration::from_millis(cli.dt_ms.max(1));

    let mut simulation = Simulation::new(config).context("invalid game configuration")?;
    simulation.subscribe(Box::new(MilestoneLog));
    let mut autopilot = Autopilot::new(!cli.no_upgrades);

    for _ in 0..cli.ticks {
        autopilot.steer(&mut simulation);
        simulation.step(dt);
        autopilot.upgrade(&mut simulation);
        if simulation.summary().game_over {
            break;
        }
    }

    let summary = toml::to_string(&simulation.summary()).context("failed to render summary")?;
    print!("{summary}");
    Ok(())
}

fn load_config(path: Option<&PathBuf>) -> Result<GameConfig> {
    let Some(path) = path else {
        return Ok(GameConfig::default());
    };
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read configuration from {}", path.display()))?;
    toml::from_str(&raw)
        .with_context(|| format!("failed to parse configuration in {}", path.display()))
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn argument_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_parse() {
        let cli = Cli::try_parse_from(["archer-arena", "--seed", "9", "--dt-ms", "20", "-vv"])
            .expect("arguments parse");
        assert_eq!(cli.seed, Some(9));
        assert_eq!(cli.dt_ms, 20);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.ticks, 12_000);
        assert!(!cli.no_upgrades);
    }

    #[test]
    fn bundled_endless_config_is_valid() {
        let config: GameConfig =
            toml::from_str(include_str!("../configs/endless.toml")).expect("config parses");
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.enemies.len(), 3);
        assert!(!config.drops.use_enemy_values);
        assert!((config.drops.gold.rate - 0.7).abs() < f32::EPSILON);
    }

    #[test]
    fn missing_config_file_reports_its_path() {
        let path = PathBuf::from("/nonexistent/arena.toml");
        let error = load_config(Some(&path)).expect_err("file is missing");
        assert!(format!("{error:#}").contains("/nonexistent/arena.toml"));
    }
}
