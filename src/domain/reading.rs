//! Sensor readings
//!
//! A reading is an ordered list of named axis values plus a timestamp.

use super::StreamKind;
use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall-clock time in Unix milliseconds
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

/// One named axis value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisValue {
    pub name: String,
    pub value: f64,
}

/// Immutable sensor reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    timestamp_millis: u64,
    axes: Vec<AxisValue>,
}

impl Reading {
    /// Create a reading from named axis values
    ///
    /// Axis names are stored lowercase.
    pub fn new<I, S>(timestamp_millis: u64, axes: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let axes = axes
            .into_iter()
            .map(|(name, value)| AxisValue {
                name: name.into().to_ascii_lowercase(),
                value,
            })
            .collect();
        Self {
            timestamp_millis,
            axes,
        }
    }

    /// Zero-valued reading for a stream kind, timestamp 0
    pub fn zero(kind: StreamKind) -> Self {
        Self::new(0, kind.axes().iter().map(|a| (*a, 0.0)))
    }

    /// Map positional values onto the axes of `kind`
    ///
    /// # Errors
    /// Returns `DomainError::AxisCountMismatch` if the number of values differs
    /// from the number of axes.
    pub fn from_values(
        kind: StreamKind,
        timestamp_millis: u64,
        values: &[f64],
    ) -> Result<Self, DomainError> {
        let axes = kind.axes();
        if values.len() != axes.len() {
            return Err(DomainError::AxisCountMismatch {
                expected: axes.len(),
                actual: values.len(),
            });
        }
        Ok(Self::new(
            timestamp_millis,
            axes.iter().copied().zip(values.iter().copied()),
        ))
    }

    /// Timestamp in Unix milliseconds
    #[inline]
    pub fn timestamp_millis(&self) -> u64 {
        self.timestamp_millis
    }

    /// Value of an axis (case-insensitive), if present
    pub fn get(&self, axis: &str) -> Option<f64> {
        self.axes
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(axis))
            .map(|a| a.value)
    }

    /// Axis values in order
    pub fn axes(&self) -> &[AxisValue] {
        &self.axes
    }

    /// Number of axes
    pub fn len(&self) -> usize {
        self.axes.len()
    }

    /// Whether the reading has no axes
    pub fn is_empty(&self) -> bool {
        self.axes.is_empty()
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .axes
            .iter()
            .map(|a| format!("{}={}", a.name.to_ascii_uppercase(), a.value))
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_reading() {
        let reading = Reading::zero(StreamKind::Accelerometer);
        assert_eq!(reading.len(), 3);
        assert_eq!(reading.timestamp_millis(), 0);
        assert!(reading.axes().iter().all(|a| a.value == 0.0));
    }

    #[test]
    fn test_from_values() {
        let reading = Reading::from_values(StreamKind::Gps, 10, &[52.5, 13.4]).unwrap();
        assert_eq!(reading.get("latitude"), Some(52.5));
        assert_eq!(reading.get("Longitude"), Some(13.4));
        assert_eq!(reading.get("z"), None);
    }

    #[test]
    fn test_from_values_length_mismatch() {
        let result = Reading::from_values(StreamKind::Gyroscope, 0, &[1.0, 2.0]);
        assert_eq!(
            result,
            Err(DomainError::AxisCountMismatch {
                expected: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn test_names_are_lowercased_and_ordered() {
        let reading = Reading::new(1, [("Z", 3.0), ("X", 1.0)]);
        let names: Vec<&str> = reading.axes().iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["z", "x"]);
    }

    #[test]
    fn test_display() {
        let reading = Reading::from_values(StreamKind::Accelerometer, 0, &[1.0, -2.5, 0.0]).unwrap();
        assert_eq!(reading.to_string(), "X=1, Y=-2.5, Z=0");
    }

    #[test]
    fn test_now_millis_is_recent() {
        assert!(now_millis() > 1_600_000_000_000);
    }
}
