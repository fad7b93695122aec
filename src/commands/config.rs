//! Config command implementation
//!
//! Shows the effective configuration or writes a starter file.

use crate::cli::args::{ConfigArgs, ConfigCommands, OutputFormat};
use crate::cli::output::{print_output, ConfigView, Message};
use crate::config::{Config, ConfigFile};
use crate::error::{ConfigError, Result};

use std::path::Path;

/// Execute a config subcommand
pub fn run_config(args: &ConfigArgs, format: OutputFormat, config_path: Option<&str>) -> Result<()> {
    match &args.command {
        ConfigCommands::Show => {
            let view = show(config_path)?;
            print_output(&view, format)?;
        }
        ConfigCommands::Init { path, force } => {
            let target = path.clone().unwrap_or_else(ConfigFile::user_path);
            init(&target, *force)?;
            let msg = Message {
                message: format!("Wrote default configuration to {}", target.display()),
                success: true,
            };
            print_output(&msg, format)?;
        }
    }
    Ok(())
}

fn show(config_path: Option<&str>) -> Result<ConfigView> {
    let (source, config) = match config_path {
        Some(path) => (Some(path.to_string()), ConfigFile::load(path)?),
        None => match ConfigFile::find_default() {
            Some((path, config)) => (Some(path.display().to_string()), config),
            None => (None, Config::default()),
        },
    };

    let sampling = config.to_sampling_config()?;
    Ok(ConfigView {
        source,
        stream: config.sampling.stream,
        mode: config.sampling.mode,
        period_millis: sampling.period_millis,
        min_alert_interval_millis: sampling.min_alert_interval_millis,
        thresholds: sampling.thresholds,
    })
}

/// Default configuration with the threshold table spelled out
fn starter_config() -> Result<Config> {
    let mut config = Config::default();
    let thresholds = config.threshold_vector()?;
    config.thresholds = thresholds
        .iter()
        .map(|(axis, limit)| (axis.to_string(), limit))
        .collect();
    Ok(config)
}

fn init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(ConfigError::InvalidValue {
            key: path.display().to_string(),
            message: "file already exists (use --force to overwrite)".to_string(),
        }
        .into());
    }

    ConfigFile::save(&starter_config()?, path)?;
    log::info!("Wrote config to {}", path.display());
    Ok(())
}
