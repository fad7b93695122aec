//! Sensor input layer
//!
//! Streams push readings; each stream's latest reading lives in a
//! [`LatestValueSlot`] that the sampling loop polls.

pub mod push;
pub mod replay;
pub mod slot;
pub mod stream;

pub use push::PushSource;
pub use slot::LatestValueSlot;
pub use stream::{Availability, ReadingCallback, SensorStream, Subscription, SubscriptionState};
