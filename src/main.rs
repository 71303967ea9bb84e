//! Gridsim - Town Power Grid Simulator
//!
//! Loads a grid file, runs it for a number of ticks and prints load readings.
//!
//! # Usage
//!
//! ```bash
//! gridsim town.grid --ticks 120 --every 30 --toggle T1@60
//! RUST_LOG=gridsim_core=debug gridsim town.grid --format json
//! ```

use std::io;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use gridsim_core::{
    dsl,
    error::{GridError, Result},
    report::{run_plan, JsonLinesReport, ReportWriter, RunPlan, TextReport},
    Grid, GridConfig, Simulator,
};
use tracing_subscriber::EnvFilter;

/// Output format for snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Load table per reported tick
    Text,
    /// One JSON object per reported tick
    Json,
}

/// Town power grid simulator
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the grid description file
    #[arg(value_name = "GRID_FILE")]
    grid_file: PathBuf,

    /// JSON file overriding electrical constants
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Number of ticks to simulate
    #[arg(short, long, default_value_t = 0)]
    ticks: u64,

    /// Tick length in seconds (defaults to the configured tick)
    #[arg(long)]
    dt: Option<f64>,

    /// Report every N ticks (0: initial and final state only)
    #[arg(short, long, default_value_t = 0)]
    every: u64,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Flip a transistor before a tick, as NAME@TICK (repeatable)
    #[arg(long = "toggle", value_name = "NAME@TICK", value_parser = parse_toggle)]
    toggles: Vec<(u64, String)>,
}

fn parse_toggle(raw: &str) -> std::result::Result<(u64, String), String> {
    let (name, tick) = raw
        .rsplit_once('@')
        .ok_or_else(|| format!("expected NAME@TICK, got '{}'", raw))?;
    let tick: u64 = tick
        .parse()
        .map_err(|_| format!("invalid tick '{}' in '{}'", tick, raw))?;
    if name.is_empty() || tick == 0 {
        return Err(format!("expected NAME@TICK with TICK >= 1, got '{}'", raw));
    }
    Ok((tick, name.to_string()))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    // Constants: defaults, then the config file, then .param lines
    let base = match &args.config {
        Some(path) => GridConfig::load(path)?,
        None => GridConfig::default(),
    };

    let ast = dsl::parse_file(&args.grid_file)?;
    let (grid, config) = Grid::from_ast(&ast, &base)?;

    let dt = args.dt.unwrap_or(config.default_dt);
    if !dt.is_finite() || dt < 0.0 {
        return Err(GridError::invalid_config(format!(
            "tick length must be a non-negative number, got {}",
            dt
        )));
    }

    let mut simulator = Simulator::new(grid, config)?;

    let plan = RunPlan {
        ticks: args.ticks,
        dt,
        every: args.every,
        toggles: args.toggles,
    };

    let stdout = io::stdout().lock();
    let mut writer: Box<dyn ReportWriter> = match args.format {
        Format::Text => Box::new(TextReport::new(stdout)),
        Format::Json => Box::new(JsonLinesReport::new(stdout)),
    };
    run_plan(&mut simulator, &plan, writer.as_mut())?;

    Ok(())
}
