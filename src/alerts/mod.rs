//! Alerting
//!
//! Threshold evaluation, per-stream rate limiting and delivery of alerts to
//! one or more sinks.

mod evaluator;
mod notifier;
mod throttle;
mod types;

pub use evaluator::Evaluator;
pub use notifier::{
    AlertSink, CallbackNotifier, ChannelNotifier, LogNotifier, NotificationManager,
    TerminalNotifier,
};
pub use throttle::AlertThrottle;
pub use types::{AlertEvent, AlertKind};
