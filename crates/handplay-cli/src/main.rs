//! handplay: drive the gesture engine from the command line
//!
//! Usage:
//!   handplay replay frames.jsonl      # feed recorded landmark frames
//!   handplay demo --rounds 5          # scripted synthetic claw session
//!   handplay config                   # print the effective configuration
//!
//! Events are written to stdout as JSON lines; logs go to stderr.

mod demo;
mod output;
mod replay;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use handplay_core::{EngineConfig, ExhibitLayout};
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "handplay",
    version,
    about = "Gesture interaction engine for camera-driven exhibits"
)]
struct Cli {
    /// Engine configuration file (default: handplay.toml in the platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Exhibit layout file with zones, dwell targets and population
    #[arg(long, global = true)]
    layout: Option<PathBuf>,

    /// Fixed placement seed for reproducible sessions
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Debug-level logging unless RUST_LOG is set
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a JSON-lines file of landmark frames ("-" for stdin)
    Replay {
        input: PathBuf,
    },
    /// Run a scripted synthetic session
    Demo {
        /// Entities to deliver
        #[arg(long, default_value_t = 5)]
        rounds: usize,
        /// Frame interval in milliseconds
        #[arg(long, default_value_t = 16)]
        tick_ms: u64,
    },
    /// Print the effective configuration and layout as TOML
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "handplay=debug,handplay_core=debug"
    } else {
        "handplay=info,handplay_core=info"
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(seed) = cli.seed {
        config.placement.seed = Some(seed);
    }
    config.validate().context("invalid configuration")?;
    let layout = load_layout(cli.layout.as_deref())?;

    match cli.command {
        Command::Replay { input } => replay::run(config, layout, &input),
        Command::Demo { rounds, tick_ms } => demo::run(config, layout, rounds, tick_ms),
        Command::Config => {
            println!("{}", config.to_toml_string()?);
            println!("{}", layout.to_toml_string()?);
            Ok(())
        }
    }
}

fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("org", "handplay", "handplay")
        .map(|dirs| dirs.config_dir().join("handplay.toml"))
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => match default_config_path() {
            Some(p) if p.exists() => p,
            _ => {
                info!("no config file, using defaults");
                return Ok(EngineConfig::default());
            }
        },
    };
    info!("loading config from {}", path.display());
    EngineConfig::load(&path).with_context(|| format!("failed to load config {}", path.display()))
}

fn load_layout(path: Option<&Path>) -> Result<ExhibitLayout> {
    match path {
        Some(p) => ExhibitLayout::load(p)
            .with_context(|| format!("failed to load layout {}", p.display())),
        None => Ok(ExhibitLayout::default()),
    }
}
