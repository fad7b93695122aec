//! Alert system domain types

use crate::domain::{Reading, StreamKind, ThresholdVector};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::SystemTime;

/// What triggered an alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlertKind {
    /// `|value| > limit` on at least one axis
    AxisThresholdExceeded,
    /// Position moved more than the limit on at least one axis
    PositionChanged,
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AxisThresholdExceeded => write!(f, "THRESHOLD"),
            Self::PositionChanged => write!(f, "MOVED"),
        }
    }
}

/// Alert produced by an evaluation
///
/// Not persisted; dropped after delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertEvent {
    /// Unique alert ID
    pub id: String,
    /// Trigger
    pub kind: AlertKind,
    /// Stream the reading came from
    pub stream: StreamKind,
    /// Reading snapshot that was evaluated
    pub reading: Reading,
    /// Thresholds in effect for the evaluation
    pub thresholds: ThresholdVector,
    /// When the alert was raised
    pub timestamp: SystemTime,
    /// Human-readable message
    pub message: String,
}

impl AlertEvent {
    /// Create an alert for `reading`
    pub fn new(
        kind: AlertKind,
        stream: StreamKind,
        reading: Reading,
        thresholds: ThresholdVector,
    ) -> Self {
        let timestamp = SystemTime::now();
        let id = format!(
            "{}-{}",
            stream,
            timestamp
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_millis()
        );

        let message = match kind {
            AlertKind::AxisThresholdExceeded => {
                format!("{} threshold reached! {}", stream.display_name(), reading)
            }
            AlertKind::PositionChanged => {
                format!("{} position changed! {}", stream.display_name(), reading)
            }
        };

        Self {
            id,
            kind,
            stream,
            reading,
            thresholds,
            timestamp,
            message,
        }
    }
}
