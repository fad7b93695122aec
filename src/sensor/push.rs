//! Push source
//!
//! A [`SensorStream`] the host feeds by calling [`PushSource::publish`] from
//! whatever context its sensor callbacks run on. Every registered callback
//! receives the reading in publish order.

use super::stream::{Availability, ReadingCallback, SensorStream, Subscription};
use crate::domain::{Reading, StreamKind};
use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Host-driven sensor stream
#[derive(Clone)]
pub struct PushSource {
    kind: StreamKind,
    availability: Availability,
    listeners: Arc<DashMap<Uuid, ReadingCallback>>,
}

impl PushSource {
    /// Create a source for an available sensor
    pub fn new(kind: StreamKind) -> Self {
        Self {
            kind,
            availability: Availability::Available,
            listeners: Arc::new(DashMap::new()),
        }
    }

    /// Create a source for a sensor the device doesn't have
    pub fn unavailable(kind: StreamKind) -> Self {
        Self {
            availability: Availability::Unavailable,
            ..Self::new(kind)
        }
    }

    /// Deliver a reading to every subscriber
    ///
    /// Returns the number of subscribers notified. Readings published to an
    /// unavailable source are dropped.
    pub fn publish(&self, reading: Reading) -> usize {
        if self.availability == Availability::Unavailable {
            return 0;
        }

        // Snapshot callbacks so none run while a shard lock is held
        let callbacks: Vec<ReadingCallback> = self
            .listeners
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();

        let reading = Arc::new(reading);
        for callback in &callbacks {
            callback(Arc::clone(&reading));
        }
        callbacks.len()
    }

    /// Number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }
}

impl SensorStream for PushSource {
    fn kind(&self) -> StreamKind {
        self.kind
    }

    fn availability(&self) -> Availability {
        self.availability
    }

    fn subscribe(&self, on_reading: ReadingCallback) -> Subscription {
        if self.availability == Availability::Unavailable {
            log::warn!("{} sensor unavailable; subscription will never deliver", self.kind);
            return Subscription::unavailable();
        }

        let id = Uuid::new_v4();
        self.listeners.insert(id, on_reading);
        log::debug!("Subscribed {} to {} stream", id, self.kind);

        let listeners = Arc::clone(&self.listeners);
        Subscription::active(id, move || {
            listeners.remove(&id);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensor::SubscriptionState;
    use std::sync::Mutex;

    fn recorder() -> (Arc<Mutex<Vec<u64>>>, ReadingCallback) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let callback: ReadingCallback = {
            let seen = Arc::clone(&seen);
            Arc::new(move |reading: Arc<Reading>| {
                seen.lock().unwrap().push(reading.timestamp_millis());
            })
        };
        (seen, callback)
    }

    fn reading(t: u64) -> Reading {
        Reading::from_values(StreamKind::Accelerometer, t, &[0.0, 0.0, 9.8]).unwrap()
    }

    #[test]
    fn test_delivers_in_order() {
        let source = PushSource::new(StreamKind::Accelerometer);
        let (seen, callback) = recorder();
        let _sub = source.subscribe(callback);

        for t in 1..=5 {
            assert_eq!(source.publish(reading(t)), 1);
        }

        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let source = PushSource::new(StreamKind::Accelerometer);
        let (seen, callback) = recorder();
        let mut sub = source.subscribe(callback);

        source.publish(reading(1));
        sub.unsubscribe();
        source.publish(reading(2));

        assert_eq!(*seen.lock().unwrap(), vec![1]);
        assert_eq!(source.subscriber_count(), 0);
    }

    #[test]
    fn test_unsubscribe_without_readings() {
        let source = PushSource::new(StreamKind::Gyroscope);
        let (_seen, callback) = recorder();
        let mut sub = source.subscribe(callback);
        sub.unsubscribe();
        sub.unsubscribe();
        assert_eq!(source.subscriber_count(), 0);
    }

    #[test]
    fn test_unavailable_source_never_delivers() {
        let source = PushSource::unavailable(StreamKind::Gyroscope);
        let (seen, callback) = recorder();
        let sub = source.subscribe(callback);

        assert_eq!(source.availability(), Availability::Unavailable);
        assert_eq!(sub.state(), SubscriptionState::Unavailable);
        assert_eq!(source.publish(reading(1)), 0);
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_multiple_subscribers() {
        let source = PushSource::new(StreamKind::Accelerometer);
        let (seen_a, cb_a) = recorder();
        let (seen_b, cb_b) = recorder();
        let _a = source.subscribe(cb_a);
        let _b = source.subscribe(cb_b);

        assert_eq!(source.publish(reading(7)), 2);
        assert_eq!(*seen_a.lock().unwrap(), vec![7]);
        assert_eq!(*seen_b.lock().unwrap(), vec![7]);
    }
}
