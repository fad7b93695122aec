//! Sensor stream abstraction
//!
//! A stream is a push-based source of readings. Subscribing registers a
//! callback; disposing the returned [`Subscription`] stops delivery.

use crate::domain::{Reading, StreamKind};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Callback invoked from the producer's context for every reading
pub type ReadingCallback = Arc<dyn Fn(Arc<Reading>) + Send + Sync>;

/// Whether the underlying sensor exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    Available,
    Unavailable,
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Available => write!(f, "available"),
            Self::Unavailable => write!(f, "unavailable"),
        }
    }
}

/// Lifecycle of a subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionState {
    /// Receiving readings
    Active,
    /// Sensor absent; nothing will ever be delivered
    Unavailable,
    /// Disposed
    Closed,
}

impl fmt::Display for SubscriptionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Unavailable => write!(f, "unavailable"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

/// Trait for push-based sensor sources
pub trait SensorStream: Send + Sync {
    /// Kind of readings this stream produces
    fn kind(&self) -> StreamKind;

    /// Probe whether the sensor exists
    fn availability(&self) -> Availability {
        Availability::Available
    }

    /// Register `on_reading`; delivery stops when the subscription is disposed
    ///
    /// An unavailable sensor yields a subscription in the `Unavailable` state
    /// that never delivers.
    fn subscribe(&self, on_reading: ReadingCallback) -> Subscription;
}

type Release = Box<dyn FnOnce() + Send + Sync>;

/// Handle to a registered callback
///
/// Dropping the handle unsubscribes.
pub struct Subscription {
    id: Uuid,
    state: SubscriptionState,
    release: Option<Release>,
}

impl Subscription {
    /// Active subscription; `release` runs once on unsubscribe
    pub fn active<F>(id: Uuid, release: F) -> Self
    where
        F: FnOnce() + Send + Sync + 'static,
    {
        Self {
            id,
            state: SubscriptionState::Active,
            release: Some(Box::new(release)),
        }
    }

    /// Subscription to a missing sensor
    pub fn unavailable() -> Self {
        Self {
            id: Uuid::nil(),
            state: SubscriptionState::Unavailable,
            release: None,
        }
    }

    /// Subscription id (nil for unavailable sensors)
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Current state
    pub fn state(&self) -> SubscriptionState {
        self.state
    }

    /// Whether readings are being delivered
    pub fn is_active(&self) -> bool {
        self.state == SubscriptionState::Active
    }

    /// Stop delivery and release the source; safe to call repeatedly
    pub fn unsubscribe(&mut self) {
        if let Some(release) = self.release.take() {
            release();
            log::debug!("Subscription {} released", self.id);
        }
        self.state = SubscriptionState::Closed;
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("state", &self.state)
            .finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
