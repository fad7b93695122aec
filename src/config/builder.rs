//! Configuration builder
//!
//! Merges configuration from files and CLI arguments. CLI values win.

use crate::config::{Config, ConfigFile};
use crate::domain::{DriveMode, StreamKind};
use crate::error::ConfigError;

/// Builder for merging configuration sources
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Load configuration from a file
    ///
    /// An explicit path must load; without one the default locations are
    /// searched and a missing file is not an error.
    pub fn with_file(mut self, path: Option<&str>) -> Result<Self, ConfigError> {
        let file_config = match path {
            Some(path) => Some(ConfigFile::load(path)?),
            None => ConfigFile::load_default(),
        };

        if let Some(cfg) = file_config {
            self.config = cfg;
        }

        Ok(self)
    }

    /// Override with CLI verbose flag
    pub fn with_verbose(mut self, verbose: Option<bool>) -> Self {
        if let Some(v) = verbose {
            self.config.general.verbose = v;
        }
        self
    }

    /// Override the stream
    ///
    /// Switching streams drops thresholds the new stream has no axis for.
    pub fn with_stream(mut self, stream: Option<StreamKind>) -> Self {
        if let Some(s) = stream {
            if s != self.config.sampling.stream {
                self.config.thresholds.retain(|axis, _| s.has_axis(axis));
            }
            self.config.sampling.stream = s;
        }
        self
    }

    /// Override the drive mode
    pub fn with_mode(mut self, mode: Option<DriveMode>) -> Self {
        if let Some(m) = mode {
            self.config.sampling.mode = m;
        }
        self
    }

    /// Override the evaluation period
    pub fn with_period_millis(mut self, period: Option<u64>) -> Self {
        if let Some(p) = period {
            self.config.sampling.period_millis = p;
        }
        self
    }

    /// Override the minimum alert interval
    pub fn with_min_alert_interval_millis(mut self, interval: Option<u64>) -> Self {
        if let Some(i) = interval {
            self.config.sampling.min_alert_interval_millis = i;
        }
        self
    }

    /// Set individual axis limits on top of the file's table
    pub fn with_thresholds(mut self, thresholds: &[(String, f64)]) -> Self {
        for (axis, limit) in thresholds {
            self.config
                .thresholds
                .insert(axis.to_ascii_lowercase(), *limit);
        }
        self
    }

    /// Build the final configuration
    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
