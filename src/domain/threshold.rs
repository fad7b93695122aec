//! Threshold vectors and comparisons
//!
//! Thresholds are validated on construction (fail-fast pattern): every limit
//! is finite and non-negative.

use super::{Reading, StreamKind};
use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Per-axis threshold limits keyed by lowercase axis name
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, f64>", into = "BTreeMap<String, f64>")]
pub struct ThresholdVector(BTreeMap<String, f64>);

impl ThresholdVector {
    /// Build a threshold vector from `(axis, limit)` pairs
    ///
    /// # Errors
    /// Returns `DomainError::InvalidThreshold` if any limit is negative, NaN
    /// or infinite.
    pub fn new<I, S>(limits: I) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let mut map = BTreeMap::new();
        for (axis, limit) in limits {
            let axis = axis.into().to_ascii_lowercase();
            Self::check(&axis, limit)?;
            map.insert(axis, limit);
        }
        Ok(Self(map))
    }

    /// Empty vector; never exceeded
    pub fn empty() -> Self {
        Self::default()
    }

    /// Same limit on every axis of `kind`
    pub fn uniform(kind: StreamKind, limit: f64) -> Result<Self, DomainError> {
        Self::new(kind.axes().iter().map(|a| (*a, limit)))
    }

    fn check(axis: &str, limit: f64) -> Result<(), DomainError> {
        if !limit.is_finite() || limit < 0.0 {
            return Err(DomainError::InvalidThreshold {
                axis: axis.to_string(),
                value: limit,
            });
        }
        Ok(())
    }

    /// Limit for an axis (case-insensitive)
    pub fn get(&self, axis: &str) -> Option<f64> {
        self.0.get(&axis.to_ascii_lowercase()).copied()
    }

    /// Iterate `(axis, limit)` pairs in axis-name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Number of thresholded axes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no axis is thresholded
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Ensure every thresholded axis belongs to `kind`
    pub fn check_axes(&self, kind: StreamKind) -> Result<(), DomainError> {
        match self.0.keys().find(|axis| !kind.has_axis(axis)) {
            Some(axis) => Err(DomainError::UnknownAxis {
                stream: kind.to_string(),
                axis: axis.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl TryFrom<BTreeMap<String, f64>> for ThresholdVector {
    type Error = DomainError;

    fn try_from(map: BTreeMap<String, f64>) -> Result<Self, Self::Error> {
        Self::new(map)
    }
}

impl From<ThresholdVector> for BTreeMap<String, f64> {
    fn from(thresholds: ThresholdVector) -> Self {
        thresholds.0
    }
}

impl fmt::Display for ThresholdVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(axis, limit)| format!("{}: {}", axis.to_ascii_uppercase(), limit))
            .collect();
        write!(f, "{{{}}}", parts.join(", "))
    }
}

/// True if any thresholded axis has `|value| > limit`
///
/// Axes of the reading without a threshold are ignored, as are thresholds for
/// axes the reading doesn't carry. An empty vector never exceeds.
pub fn exceeds(reading: &Reading, thresholds: &ThresholdVector) -> bool {
    thresholds
        .iter()
        .any(|(axis, limit)| reading.get(axis).is_some_and(|v| v.abs() > limit))
}

/// True if any thresholded axis moved more than its limit from `reference`
pub fn moved_beyond(reference: &Reading, current: &Reading, thresholds: &ThresholdVector) -> bool {
    thresholds.iter().any(|(axis, limit)| {
        match (reference.get(axis), current.get(axis)) {
            (Some(before), Some(after)) => (after - before).abs() > limit,
            _ => false,
        }
    })
}
