//! Sampling configuration
//!
//! The loop only ever holds a validated `SamplingConfig`; it is replaced
//! wholesale on reconfiguration.

use super::{StreamKind, ThresholdVector};
use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// How a driver decides when to evaluate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriveMode {
    /// Evaluate every `period_millis`
    #[default]
    Periodic,
    /// Evaluate on each new reading, at most once per `period_millis`
    PerEvent,
}

impl fmt::Display for DriveMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Periodic => write!(f, "periodic"),
            Self::PerEvent => write!(f, "per_event"),
        }
    }
}

/// Sampling period, thresholds and alert rate limit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingConfig {
    /// Evaluation period in milliseconds (> 0)
    pub period_millis: u64,
    /// Per-axis limits
    pub thresholds: ThresholdVector,
    /// Minimum time between two alerts of one stream in milliseconds (> 0)
    pub min_alert_interval_millis: u64,
}

impl SamplingConfig {
    /// Default evaluation period
    pub const DEFAULT_PERIOD_MILLIS: u64 = 5_000;
    /// Default minimum alert interval
    pub const DEFAULT_MIN_ALERT_INTERVAL_MILLIS: u64 = 2_000;

    /// Create a validated configuration
    ///
    /// # Errors
    /// Returns `DomainError::InvalidPeriod` or `DomainError::InvalidAlertInterval`
    /// for zero values.
    pub fn new(
        period_millis: u64,
        thresholds: ThresholdVector,
        min_alert_interval_millis: u64,
    ) -> Result<Self, DomainError> {
        let config = Self {
            period_millis,
            thresholds,
            min_alert_interval_millis,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the invariants the sampling loop relies on
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.period_millis == 0 {
            return Err(DomainError::InvalidPeriod(self.period_millis));
        }
        if self.min_alert_interval_millis == 0 {
            return Err(DomainError::InvalidAlertInterval(
                self.min_alert_interval_millis,
            ));
        }
        Ok(())
    }

    /// Default threshold applied to every axis
    pub const DEFAULT_AXIS_THRESHOLD: f64 = 10.0;

    /// Default configuration for a stream kind
    pub fn defaults_for(kind: StreamKind) -> Self {
        Self {
            period_millis: Self::DEFAULT_PERIOD_MILLIS,
            thresholds: ThresholdVector::uniform(kind, Self::DEFAULT_AXIS_THRESHOLD)
                .unwrap_or_else(|_| ThresholdVector::empty()),
            min_alert_interval_millis: Self::DEFAULT_MIN_ALERT_INTERVAL_MILLIS,
        }
    }

    /// Evaluation period
    #[inline]
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_millis)
    }
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self::defaults_for(StreamKind::Accelerometer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_config() {
        let thresholds = ThresholdVector::uniform(StreamKind::Accelerometer, 10.0).unwrap();
        let config = SamplingConfig::new(1000, thresholds, 2000).unwrap();
        assert_eq!(config.period(), Duration::from_secs(1));
    }

    #[test]
    fn test_zero_period_rejected() {
        let result = SamplingConfig::new(0, ThresholdVector::empty(), 2000);
        assert_eq!(result, Err(DomainError::InvalidPeriod(0)));
    }

    #[test]
    fn test_zero_alert_interval_rejected() {
        let result = SamplingConfig::new(100, ThresholdVector::empty(), 0);
        assert_eq!(result, Err(DomainError::InvalidAlertInterval(0)));
    }

    #[test]
    fn test_defaults() {
        let config = SamplingConfig::default();
        assert_eq!(config.period_millis, 5_000);
        assert_eq!(config.min_alert_interval_millis, 2_000);
        assert_eq!(config.thresholds.get("z"), Some(10.0));
        assert!(config.validate().is_ok());

        let gps = SamplingConfig::defaults_for(StreamKind::Gps);
        assert_eq!(gps.thresholds.get("latitude"), Some(10.0));
        assert_eq!(gps.thresholds.get("x"), None);
    }

    #[test]
    fn test_drive_mode_serde() {
        let mode: DriveMode = serde_json::from_str("\"per_event\"").unwrap();
        assert_eq!(mode, DriveMode::PerEvent);
        assert_eq!(DriveMode::default(), DriveMode::Periodic);
    }
}
