//! Configuration system
//!
//! Handles TOML config file parsing and CLI argument merging.

pub mod builder;
pub mod file;

pub use builder::ConfigBuilder;
pub use file::ConfigFile;

use crate::domain::{DriveMode, SamplingConfig, StreamKind, ThresholdVector};
use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,
    /// Stream selection and timing
    pub sampling: SamplingSection,
    /// Per-axis limits; empty means the default limit on every axis
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub thresholds: BTreeMap<String, f64>,
}

/// General configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GeneralConfig {
    /// Enable verbose logging
    pub verbose: bool,
}

/// Sampling configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingSection {
    /// Stream to watch
    pub stream: StreamKind,
    /// Periodic ticks or per-event checks
    pub mode: DriveMode,
    /// Evaluation period in milliseconds
    pub period_millis: u64,
    /// Minimum time between alerts in milliseconds
    pub min_alert_interval_millis: u64,
}

impl Default for SamplingSection {
    fn default() -> Self {
        Self {
            stream: StreamKind::Accelerometer,
            mode: DriveMode::Periodic,
            period_millis: SamplingConfig::DEFAULT_PERIOD_MILLIS,
            min_alert_interval_millis: SamplingConfig::DEFAULT_MIN_ALERT_INTERVAL_MILLIS,
        }
    }
}

impl Config {
    /// Resolve the threshold table against the selected stream
    ///
    /// # Errors
    /// `InvalidThreshold` for a bad limit, `UnknownAxis` for an axis the
    /// stream doesn't have.
    pub fn threshold_vector(&self) -> Result<ThresholdVector, DomainError> {
        let stream = self.sampling.stream;
        if self.thresholds.is_empty() {
            return ThresholdVector::uniform(stream, SamplingConfig::DEFAULT_AXIS_THRESHOLD);
        }

        let thresholds =
            ThresholdVector::new(self.thresholds.iter().map(|(axis, limit)| (axis.as_str(), *limit)))?;
        thresholds.check_axes(stream)?;
        Ok(thresholds)
    }

    /// Convert to a validated [`SamplingConfig`]
    pub fn to_sampling_config(&self) -> Result<SamplingConfig, DomainError> {
        SamplingConfig::new(
            self.sampling.period_millis,
            self.threshold_vector()?,
            self.sampling.min_alert_interval_millis,
        )
    }
}
