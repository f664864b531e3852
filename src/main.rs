//! Lockstone: a boulder-and-key grid puzzle in the terminal.

mod app;
mod falling;
mod grid;
mod input;
mod key;
mod level;
mod player;
mod simulation;
mod theme;
mod tile;
mod ui;

use anyhow::{Context, Result};
use app::App;
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Options derived from CLI that affect the simulation and its driver.
#[derive(Debug, Clone)]
pub struct GameConfig {
    pub tick_rate: f64,
    pub frame_rate: f64,
    pub input_order: InputOrder,
    pub no_animation: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref())?;

    let theme = theme::Theme::load(args.theme.as_deref()).unwrap_or_else(|e| {
        warn!(error = %e, "theme could not be loaded, using defaults");
        theme::Theme::default()
    });
    let level = match args.level.as_deref() {
        Some(path) => level::Level::load(path)?,
        None => level::Level::builtin()?,
    };
    let config = GameConfig {
        tick_rate: args.tick_rate,
        frame_rate: args.frame_rate,
        input_order: args.input_order,
        no_animation: args.no_animation,
    };
    info!(?config, "starting");
    let mut app = App::new(config, theme, level)?;
    app.run()?;
    Ok(())
}

/// Logs go to a file only; the terminal belongs to the UI.
fn init_logging(path: Option<&Path>) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = std::fs::File::create(path)
        .with_context(|| format!("could not create log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .compact()
        .init();
    Ok(())
}

/// Boulder-and-key grid puzzle in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "lockstone",
    version,
    about = "Grid puzzle in the terminal: push boxes, dodge falling stones, collect keys to open locks.",
    long_about = "Lockstone is a small tile puzzle. Stones and boxes fall when nothing is beneath them; \
        resting ones can be pushed sideways onto solid ground. Walking into a key opens every lock of \
        its colour.\n\n\
        CONTROLS:\n  Arrows / WASD / hjkl  Move    r  Restart level    p  Pause    q / Esc  Quit\n\n\
        LEVEL FILES: one character per cell.\n  # wall  . air  : flux  P player  o stone  O falling stone\n  \
        b box  B falling box  k key 1  K lock 1  j key 2  J lock 2"
)]
pub struct Args {
    /// Level file to play. Uses the built-in level if not set.
    #[arg(short, long, value_name = "FILE")]
    pub level: Option<PathBuf>,

    /// Path to theme file (btop-style theme[key]=\"#RRGGBB\").
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<PathBuf>,

    /// Simulation ticks per second.
    #[arg(long, default_value = "30.0", value_name = "RATE")]
    pub tick_rate: f64,

    /// Target render frames per second.
    #[arg(long, default_value = "60.0", value_name = "RATE")]
    pub frame_rate: f64,

    /// Order in which moves queued during one tick are applied.
    #[arg(long, default_value = "lifo")]
    pub input_order: InputOrder,

    /// Disable the lock-opening fade.
    #[arg(long)]
    pub no_animation: bool,

    /// Write logs to this file (filter with RUST_LOG).
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum InputOrder {
    /// Most recently queued move first.
    #[default]
    Lifo,
    /// Oldest queued move first.
    Fifo,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["lockstone"]);
        assert_eq!(args.input_order, InputOrder::Lifo);
        assert!((args.tick_rate - 30.0).abs() < f64::EPSILON);
        assert!(args.level.is_none());
        assert!(!args.no_animation);
    }

    #[test]
    fn test_args_input_order_and_level() {
        let args = Args::parse_from(["lockstone", "--input-order", "fifo", "-l", "maps/one.txt"]);
        assert_eq!(args.input_order, InputOrder::Fifo);
        assert_eq!(args.level.as_deref(), Some(Path::new("maps/one.txt")));
    }

    #[test]
    fn test_cli_is_well_formed() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
