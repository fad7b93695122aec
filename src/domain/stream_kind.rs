//! Sensor stream kinds
//!
//! Each kind knows its axis labels and how readings are compared against
//! thresholds. The kind is resolved once when a loop starts.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How readings of a stream are compared against a threshold vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Comparison {
    /// Alert when `|value| > limit` on any thresholded axis
    AbsoluteThreshold,
    /// Alert when any thresholded axis moved more than its limit since the
    /// reference reading
    PositionChange,
}

/// Kind of sensor stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamKind {
    /// 3-axis accelerometer (m/s^2)
    Accelerometer,
    /// 3-axis gyroscope (rad/s)
    Gyroscope,
    /// GPS position (degrees)
    Gps,
}

const XYZ: &[&str] = &["x", "y", "z"];
const LAT_LON: &[&str] = &["latitude", "longitude"];

impl StreamKind {
    /// All supported kinds
    pub const ALL: [StreamKind; 3] = [Self::Accelerometer, Self::Gyroscope, Self::Gps];

    /// Axis labels in delivery order
    pub fn axes(&self) -> &'static [&'static str] {
        match self {
            Self::Accelerometer | Self::Gyroscope => XYZ,
            Self::Gps => LAT_LON,
        }
    }

    /// Comparison policy used for this kind
    pub fn comparison(&self) -> Comparison {
        match self {
            Self::Accelerometer | Self::Gyroscope => Comparison::AbsoluteThreshold,
            Self::Gps => Comparison::PositionChange,
        }
    }

    /// Whether `axis` (case-insensitive) belongs to this kind
    pub fn has_axis(&self, axis: &str) -> bool {
        self.axes().iter().any(|a| a.eq_ignore_ascii_case(axis))
    }

    /// Human-readable name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Accelerometer => "Accelerometer",
            Self::Gyroscope => "Gyroscope",
            Self::Gps => "GPS",
        }
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accelerometer => write!(f, "accelerometer"),
            Self::Gyroscope => write!(f, "gyroscope"),
            Self::Gps => write!(f, "gps"),
        }
    }
}

impl FromStr for StreamKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "accelerometer" | "accel" => Ok(Self::Accelerometer),
            "gyroscope" | "gyro" => Ok(Self::Gyroscope),
            "gps" | "location" => Ok(Self::Gps),
            _ => Err(DomainError::UnknownStreamKind(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axes() {
        assert_eq!(StreamKind::Accelerometer.axes(), &["x", "y", "z"]);
        assert_eq!(StreamKind::Gps.axes(), &["latitude", "longitude"]);
    }

    #[test]
    fn test_comparison_policy() {
        assert_eq!(
            StreamKind::Gyroscope.comparison(),
            Comparison::AbsoluteThreshold
        );
        assert_eq!(StreamKind::Gps.comparison(), Comparison::PositionChange);
    }

    #[test]
    fn test_parse() {
        assert_eq!("Gyro".parse::<StreamKind>(), Ok(StreamKind::Gyroscope));
        assert_eq!("gps".parse::<StreamKind>(), Ok(StreamKind::Gps));
        assert!(matches!(
            "barometer".parse::<StreamKind>(),
            Err(DomainError::UnknownStreamKind(_))
        ));
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for kind in StreamKind::ALL {
            assert_eq!(kind.to_string().parse::<StreamKind>(), Ok(kind));
        }
    }

    #[test]
    fn test_has_axis() {
        assert!(StreamKind::Accelerometer.has_axis("X"));
        assert!(!StreamKind::Accelerometer.has_axis("latitude"));
    }
}
