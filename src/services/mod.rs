//! Service layer
//!
//! The sampling loop drives evaluation of every subscribed stream and hands
//! alerts to the configured sink.

pub mod sampling_loop;

pub use sampling_loop::{LoopState, LoopStatus, SamplingLoop, StreamStatus};
