//! Mock implementations for testing
//!
//! Provides a recording sink, a failing sink and a hand-driven stream for
//! unit testing the sampling loop without real sensors.

use crate::alerts::{AlertEvent, AlertSink};
use crate::domain::{Reading, StreamKind};
use crate::error::{AppError, Result};
use crate::sensor::{ReadingCallback, SensorStream, Subscription};

use std::collections::HashMap;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Sink that keeps every delivered alert
#[derive(Debug, Default)]
pub struct RecordingSink {
    alerts: Mutex<Vec<AlertEvent>>,
}

impl RecordingSink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of all delivered alerts, oldest first
    pub fn alerts(&self) -> Vec<AlertEvent> {
        self.alerts.lock().map(|a| a.clone()).unwrap_or_default()
    }

    /// Number of delivered alerts
    pub fn count(&self) -> usize {
        self.alerts.lock().map(|a| a.len()).unwrap_or(0)
    }
}

impl AlertSink for RecordingSink {
    fn deliver(&self, alert: &AlertEvent) -> Result<()> {
        if let Ok(mut alerts) = self.alerts.lock() {
            alerts.push(alert.clone());
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}

/// Sink whose every delivery fails
#[derive(Debug, Default)]
pub struct FailingSink;

impl AlertSink for FailingSink {
    fn deliver(&self, _alert: &AlertEvent) -> Result<()> {
        Err(AppError::Io(io::Error::new(
            io::ErrorKind::BrokenPipe,
            "sink closed",
        )))
    }

    fn name(&self) -> &str {
        "failing"
    }
}

/// Hand-driven stream that tracks its subscriptions
pub struct MockStream {
    kind: StreamKind,
    callbacks: Arc<Mutex<HashMap<Uuid, ReadingCallback>>>,
    subscribe_calls: AtomicUsize,
}

impl MockStream {
    /// Create a stream of `kind`
    pub fn new(kind: StreamKind) -> Self {
        Self {
            kind,
            callbacks: Arc::new(Mutex::new(HashMap::new())),
            subscribe_calls: AtomicUsize::new(0),
        }
    }

    /// Deliver `reading` to every subscriber
    pub fn emit(&self, reading: Reading) {
        let reading = Arc::new(reading);
        let callbacks: Vec<ReadingCallback> = self
            .callbacks
            .lock()
            .map(|c| c.values().cloned().collect())
            .unwrap_or_default();
        for callback in callbacks {
            callback(Arc::clone(&reading));
        }
    }

    /// Subscriptions not yet disposed
    pub fn active_subscriptions(&self) -> usize {
        self.callbacks.lock().map(|c| c.len()).unwrap_or(0)
    }

    /// Number of `subscribe` calls so far
    pub fn subscribe_calls(&self) -> usize {
        self.subscribe_calls.load(Ordering::SeqCst)
    }
}

impl SensorStream for MockStream {
    fn kind(&self) -> StreamKind {
        self.kind
    }

    fn subscribe(&self, on_reading: ReadingCallback) -> Subscription {
        self.subscribe_calls.fetch_add(1, Ordering::SeqCst);
        let id = Uuid::new_v4();
        if let Ok(mut callbacks) = self.callbacks.lock() {
            callbacks.insert(id, on_reading);
        }

        let callbacks = Arc::clone(&self.callbacks);
        Subscription::active(id, move || {
            if let Ok(mut callbacks) = callbacks.lock() {
                callbacks.remove(&id);
            }
        })
    }
}
