//! Command handlers
//!
//! Each command handler orchestrates the execution of a CLI command.

pub mod check;
pub mod config;
pub mod watch;

pub use check::run_check;
pub use config::run_config;
pub use watch::run_watch;

use crate::cli::args::SamplingArgs;
use crate::config::ConfigBuilder;
use crate::error::ConfigError;

/// Whether debug logging was asked for on the command line or in the config
///
/// A config file that fails to load counts as not verbose; the command
/// itself reports the error.
pub fn verbose_enabled(verbose_flag: bool, config_path: Option<&str>) -> bool {
    ConfigBuilder::new()
        .with_file(config_path)
        .map(|builder| {
            builder
                .with_verbose(verbose_flag.then_some(true))
                .build()
                .general
                .verbose
        })
        .unwrap_or(verbose_flag)
}

/// Merge the config file with the stream and threshold flags
fn resolve_config(
    config_path: Option<&str>,
    args: &SamplingArgs,
) -> Result<ConfigBuilder, ConfigError> {
    Ok(ConfigBuilder::new()
        .with_file(config_path)?
        .with_stream(args.stream.map(Into::into))
        .with_thresholds(&args.thresholds))
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_verbose_from_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[general]\nverbose = true\n").unwrap();
        assert!(verbose_enabled(false, path.to_str()));

        fs::write(&path, "[general]\nverbose = false\n").unwrap();
        assert!(!verbose_enabled(false, path.to_str()));
        assert!(verbose_enabled(true, path.to_str()));
    }

    #[test]
    fn test_verbose_with_unloadable_config() {
        assert!(!verbose_enabled(false, Some("/nonexistent/sensorwatch.toml")));
        assert!(verbose_enabled(true, Some("/nonexistent/sensorwatch.toml")));
    }
}
