//! CLI argument definitions using clap derive
//!
//! Defines all command-line arguments and subcommands.

use crate::domain::{DriveMode, StreamKind};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

/// Sensor threshold watcher
///
/// Samples accelerometer, gyroscope or GPS readings in the background and
/// raises rate-limited alerts when a threshold is crossed.
#[derive(Parser, Debug)]
#[command(name = "sensorwatch")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "SENSORWATCH_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the sampling loop over replayed readings
    Watch(WatchArgs),

    /// Evaluate a single reading against the thresholds
    Check(CheckArgs),

    /// Show or create the configuration file
    Config(ConfigArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Options shared by commands that build a sampling configuration
#[derive(Parser, Debug, Default)]
pub struct SamplingArgs {
    /// Sensor stream
    #[arg(short, long, value_enum)]
    pub stream: Option<StreamArg>,

    /// Per-axis limit (format: AXIS=VALUE, e.g., x=12.5); repeatable
    #[arg(short, long = "threshold", value_name = "AXIS=VALUE", value_parser = parse_threshold)]
    pub thresholds: Vec<(String, f64)>,
}

/// Arguments for the watch command
#[derive(Parser, Debug)]
pub struct WatchArgs {
    #[command(flatten)]
    pub sampling: SamplingArgs,

    /// JSON-lines file with readings; stdin when omitted or "-"
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// When to evaluate
    #[arg(short, long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Evaluation period in milliseconds
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub period_millis: Option<u64>,

    /// Minimum time between two alerts in milliseconds
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub min_alert_interval_millis: Option<u64>,

    /// Delay between replayed readings in milliseconds
    #[arg(long)]
    pub pace_millis: Option<u64>,

    /// Stop after this many milliseconds instead of waiting for Ctrl-C
    #[arg(long)]
    pub run_for_millis: Option<u64>,

    /// Disable colored alert output
    #[arg(long)]
    pub no_color: bool,
}

/// Arguments for the check command
#[derive(Parser, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub sampling: SamplingArgs,

    /// Axis values in stream order (e.g., 25,0,-3)
    #[arg(long, required = true, value_delimiter = ',', allow_hyphen_values = true)]
    pub values: Vec<f64>,

    /// Earlier fix to measure movement from (GPS only, e.g., 52.5,13.4)
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub reference: Vec<f64>,
}

/// Arguments for config commands
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,

    /// Write a default configuration file
    Init {
        /// Target path (defaults to the user config directory)
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Stream argument
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamArg {
    /// Linear acceleration (x, y, z)
    Accelerometer,
    /// Angular velocity (x, y, z)
    Gyroscope,
    /// Position (latitude, longitude)
    Gps,
}

impl From<StreamArg> for StreamKind {
    fn from(arg: StreamArg) -> Self {
        match arg {
            StreamArg::Accelerometer => StreamKind::Accelerometer,
            StreamArg::Gyroscope => StreamKind::Gyroscope,
            StreamArg::Gps => StreamKind::Gps,
        }
    }
}

/// Drive mode argument
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeArg {
    /// Evaluate on a fixed period
    Periodic,
    /// Evaluate on each reading, at most once per period
    PerEvent,
}

impl From<ModeArg> for DriveMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Periodic => DriveMode::Periodic,
            ModeArg::PerEvent => DriveMode::PerEvent,
        }
    }
}

/// Output format
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format for machine parsing
    Json,
    /// Compact single-line format
    Compact,
}

/// Parse an `AXIS=VALUE` pair
fn parse_threshold(s: &str) -> Result<(String, f64), String> {
    let (axis, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected AXIS=VALUE, got '{}'", s))?;

    let axis = axis.trim();
    if axis.is_empty() {
        return Err(format!("missing axis name in '{}'", s));
    }

    let value: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid threshold value in '{}'", s))?;

    Ok((axis.to_ascii_lowercase(), value))
}

/// Generate shell completions and print to stdout
pub fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
}
