//! Per-stream evaluation
//!
//! Applies the comparison policy of a stream kind to reading snapshots.

use super::types::AlertKind;
use crate::domain::{exceeds, moved_beyond, Comparison, Reading, StreamKind, ThresholdVector};
use std::sync::Arc;

/// Stateful evaluator for one stream
///
/// Absolute thresholds are stateless. Position change keeps the reference
/// reading: the first reading evaluated, then each reading that triggered.
#[derive(Debug, Clone)]
pub struct Evaluator {
    comparison: Comparison,
    reference: Option<Arc<Reading>>,
}

impl Evaluator {
    /// Evaluator using the policy of `kind`
    pub fn for_kind(kind: StreamKind) -> Self {
        Self::new(kind.comparison())
    }

    /// Evaluator with an explicit policy
    pub fn new(comparison: Comparison) -> Self {
        Self {
            comparison,
            reference: None,
        }
    }

    /// Policy in use
    pub fn comparison(&self) -> Comparison {
        self.comparison
    }

    /// Returns the alert kind if `reading` triggers
    pub fn evaluate(
        &mut self,
        reading: &Arc<Reading>,
        thresholds: &ThresholdVector,
    ) -> Option<AlertKind> {
        match self.comparison {
            Comparison::AbsoluteThreshold => {
                exceeds(reading, thresholds).then_some(AlertKind::AxisThresholdExceeded)
            }
            Comparison::PositionChange => {
                let Some(reference) = &self.reference else {
                    self.reference = Some(Arc::clone(reading));
                    return None;
                };
                if moved_beyond(reference, reading, thresholds) {
                    self.reference = Some(Arc::clone(reading));
                    Some(AlertKind::PositionChanged)
                } else {
                    None
                }
            }
        }
    }
}
