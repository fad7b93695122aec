//! Domain models for sensorwatch
//!
//! This module contains all domain types with validation.
//! Types are validated on construction (fail-fast pattern).

pub mod reading;
pub mod sampling;
pub mod stream_kind;
pub mod threshold;

pub use reading::{now_millis, AxisValue, Reading};
pub use sampling::{DriveMode, SamplingConfig};
pub use stream_kind::{Comparison, StreamKind};
pub use threshold::{exceeds, moved_beyond, ThresholdVector};
