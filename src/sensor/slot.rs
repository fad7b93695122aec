//! Latest-value slot
//!
//! Holds the most recent reading of one stream. The producer overwrites it
//! from the sensor callback context, drivers read snapshots from their own
//! task. Both sides only touch an `Arc` pointer under the channel lock, so a
//! reader never waits on anything longer than that swap.
//!
//! Whether anything has been set lives in the watched value itself, so a
//! receiver woken by `set` always finds the reading that woke it.

use crate::domain::{Reading, StreamKind};
use std::sync::Arc;
use tokio::sync::watch;

/// Single-writer, many-reader cell for the latest reading
#[derive(Debug)]
pub struct LatestValueSlot {
    tx: watch::Sender<Option<Arc<Reading>>>,
    initial: Arc<Reading>,
}

impl LatestValueSlot {
    /// Create a slot holding `initial`
    pub fn new(initial: Reading) -> Self {
        let (tx, _rx) = watch::channel(None);
        Self {
            tx,
            initial: Arc::new(initial),
        }
    }

    /// Create a slot holding the zero reading of `kind`
    pub fn zeroed(kind: StreamKind) -> Self {
        Self::new(Reading::zero(kind))
    }

    /// Overwrite the slot unconditionally
    pub fn set(&self, reading: Arc<Reading>) {
        self.tx.send_replace(Some(reading));
    }

    /// Snapshot of the latest reading (or the initial value)
    pub fn get(&self) -> Arc<Reading> {
        self.latest().unwrap_or_else(|| Arc::clone(&self.initial))
    }

    /// Latest reading passed to `set`, `None` before the first one
    pub fn latest(&self) -> Option<Arc<Reading>> {
        self.tx.borrow().clone()
    }

    /// Whether `set` has been called at least once
    pub fn is_written(&self) -> bool {
        self.tx.borrow().is_some()
    }

    /// Receiver that wakes on every subsequent `set`
    pub fn changes(&self) -> watch::Receiver<Option<Arc<Reading>>> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn accel(t: u64, x: f64) -> Arc<Reading> {
        Arc::new(Reading::from_values(StreamKind::Accelerometer, t, &[x, 0.0, 0.0]).unwrap())
    }

    #[test]
    fn test_initial_value_is_zero() {
        let slot = LatestValueSlot::zeroed(StreamKind::Accelerometer);
        assert_eq!(*slot.get(), Reading::zero(StreamKind::Accelerometer));
        assert!(!slot.is_written());
    }

    #[test]
    fn test_set_overwrites() {
        let slot = LatestValueSlot::zeroed(StreamKind::Accelerometer);
        slot.set(accel(1, 1.0));
        slot.set(accel(2, 2.0));
        assert_eq!(slot.get().get("x"), Some(2.0));
        assert!(slot.is_written());
    }

    #[test]
    fn test_concurrent_set_and_get() {
        let slot = Arc::new(LatestValueSlot::zeroed(StreamKind::Accelerometer));

        let writer = {
            let slot = Arc::clone(&slot);
            thread::spawn(move || {
                for i in 1..=1000u64 {
                    slot.set(accel(i, i as f64));
                }
            })
        };

        let reader = {
            let slot = Arc::clone(&slot);
            thread::spawn(move || {
                let mut last = 0;
                for _ in 0..1000 {
                    let reading = slot.get();
                    // Single writer: timestamps never go backwards
                    assert!(reading.timestamp_millis() >= last);
                    last = reading.timestamp_millis();
                }
            })
        };

        writer.join().unwrap();
        reader.join().unwrap();
        assert_eq!(slot.get().timestamp_millis(), 1000);
    }

    #[tokio::test]
    async fn test_changes_wake_on_set() {
        let slot = LatestValueSlot::zeroed(StreamKind::Gyroscope);
        let mut rx = slot.changes();
        slot.set(Arc::new(
            Reading::from_values(StreamKind::Gyroscope, 5, &[0.1, 0.2, 0.3]).unwrap(),
        ));
        rx.changed().await.unwrap();
        let seen = rx.borrow_and_update().clone().unwrap();
        assert_eq!(seen.timestamp_millis(), 5);
    }

    #[test]
    fn test_latest_before_and_after_set() {
        let slot = LatestValueSlot::zeroed(StreamKind::Accelerometer);
        assert!(slot.latest().is_none());
        slot.set(accel(3, 4.0));
        assert_eq!(slot.latest().unwrap().get("x"), Some(4.0));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_woken_receiver_sees_reading_from_other_thread() {
        for i in 1..=200u64 {
            let slot = Arc::new(LatestValueSlot::zeroed(StreamKind::Accelerometer));
            let mut rx = slot.changes();

            let writer = {
                let slot = Arc::clone(&slot);
                thread::spawn(move || slot.set(accel(i, 25.0)))
            };

            rx.changed().await.unwrap();
            assert!(slot.is_written());
            assert_eq!(slot.latest().unwrap().timestamp_millis(), i);
            writer.join().unwrap();
        }
    }
}
