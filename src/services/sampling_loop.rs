//! Sampling loop
//!
//! Ties streams, slots, evaluators and throttles together. Each stream gets
//! its own slot and its own driver task; drivers share nothing but the
//! configuration snapshot and the sink.
//!
//! ```text
//! SensorStream --callback--> LatestValueSlot
//!                                  |
//!            driver (tick or change) reads snapshot
//!                                  |
//!                Evaluator -> AlertThrottle -> AlertSink
//! ```

use crate::alerts::{AlertEvent, AlertSink, AlertThrottle, Evaluator};
use crate::domain::{DriveMode, Reading, SamplingConfig, StreamKind};
use crate::error::ServiceError;
use crate::sensor::{
    Availability, LatestValueSlot, ReadingCallback, SensorStream, Subscription, SubscriptionState,
};
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Lifecycle state of the loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopState {
    Idle,
    Running,
}

impl fmt::Display for LoopState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Running => write!(f, "running"),
        }
    }
}

/// Counters of one stream
#[derive(Debug, Default)]
struct StreamStats {
    evaluations: AtomicU64,
    alerts_emitted: AtomicU64,
    alerts_suppressed: AtomicU64,
    pending: AtomicBool,
}

/// Snapshot of one stream's state and counters
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreamStatus {
    pub kind: StreamKind,
    pub availability: Availability,
    pub subscription: SubscriptionState,
    /// Evaluations performed
    pub evaluations: u64,
    /// Alerts handed to the sink
    pub alerts_emitted: u64,
    /// Alerts dropped by the throttle
    pub alerts_suppressed: u64,
    /// A reading is waiting for the per-event period gate
    pub pending: bool,
}

/// Snapshot returned by [`SamplingLoop::status`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoopStatus {
    pub state: LoopState,
    pub mode: DriveMode,
    pub config: SamplingConfig,
    pub streams: Vec<StreamStatus>,
}

struct StreamHandle {
    kind: StreamKind,
    availability: Availability,
    subscription: Subscription,
    stats: Arc<StreamStats>,
    task: Option<JoinHandle<()>>,
}

impl StreamHandle {
    fn status(&self) -> StreamStatus {
        StreamStatus {
            kind: self.kind,
            availability: self.availability,
            subscription: self.subscription.state(),
            evaluations: self.stats.evaluations.load(Ordering::Relaxed),
            alerts_emitted: self.stats.alerts_emitted.load(Ordering::Relaxed),
            alerts_suppressed: self.stats.alerts_suppressed.load(Ordering::Relaxed),
            pending: self.stats.pending.load(Ordering::Relaxed),
        }
    }
}

struct Running {
    shutdown_tx: watch::Sender<bool>,
    streams: Vec<StreamHandle>,
}

/// Background sampling and alerting loop
///
/// `Idle -> start -> Running -> stop -> Idle`. The loop can be restarted
/// after `stop`.
pub struct SamplingLoop {
    mode: DriveMode,
    sink: Arc<dyn AlertSink>,
    config_tx: watch::Sender<Arc<SamplingConfig>>,
    running: Option<Running>,
}

impl SamplingLoop {
    /// Create an idle loop delivering to `sink`
    pub fn new(mode: DriveMode, sink: Arc<dyn AlertSink>) -> Self {
        let (config_tx, _rx) = watch::channel(Arc::new(SamplingConfig::default()));
        Self {
            mode,
            sink,
            config_tx,
            running: None,
        }
    }

    /// Drive mode used by every stream
    pub fn mode(&self) -> DriveMode {
        self.mode
    }

    /// Current lifecycle state
    pub fn state(&self) -> LoopState {
        if self.running.is_some() {
            LoopState::Running
        } else {
            LoopState::Idle
        }
    }

    /// Whether `start` succeeded and `stop` hasn't been called since
    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Configuration in effect
    pub fn current_config(&self) -> Arc<SamplingConfig> {
        Arc::clone(&self.config_tx.borrow())
    }

    /// Subscribe to every stream and spawn one driver per stream
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    /// `InvalidConfiguration` for an invalid `config`, `AlreadyRunning`,
    /// `NoStreams` for an empty stream list, `NoRuntime` outside tokio.
    pub fn start(
        &mut self,
        streams: Vec<Arc<dyn SensorStream>>,
        config: SamplingConfig,
    ) -> Result<(), ServiceError> {
        config.validate()?;
        if self.running.is_some() {
            return Err(ServiceError::AlreadyRunning);
        }
        if streams.is_empty() {
            return Err(ServiceError::NoStreams);
        }
        let runtime = Handle::try_current().map_err(|_| ServiceError::NoRuntime)?;

        self.config_tx.send_replace(Arc::new(config));
        let (shutdown_tx, _rx) = watch::channel(false);
        let origin = Instant::now();

        let mut handles = Vec::with_capacity(streams.len());
        for stream in streams {
            let kind = stream.kind();
            let slot = Arc::new(LatestValueSlot::zeroed(kind));
            // Taken before subscribing so the first reading wakes a per-event driver
            let changes = slot.changes();

            let callback: ReadingCallback = {
                let slot = Arc::clone(&slot);
                Arc::new(move |reading| slot.set(reading))
            };
            let subscription = stream.subscribe(callback);
            let stats = Arc::new(StreamStats::default());

            let task = if subscription.state() == SubscriptionState::Unavailable {
                log::warn!("{} stream unavailable; no alerts will be raised for it", kind);
                None
            } else {
                let driver = Driver {
                    kind,
                    slot,
                    changes,
                    config_rx: self.config_tx.subscribe(),
                    shutdown_rx: shutdown_tx.subscribe(),
                    sink: Arc::clone(&self.sink),
                    stats: Arc::clone(&stats),
                    evaluator: Evaluator::for_kind(kind),
                    throttle: AlertThrottle::new(
                        self.config_tx.borrow().min_alert_interval_millis,
                    ),
                    origin,
                };
                Some(runtime.spawn(driver.run(self.mode)))
            };

            handles.push(StreamHandle {
                kind,
                availability: stream.availability(),
                subscription,
                stats,
                task,
            });
        }

        log::info!(
            "Sampling loop started: {} stream(s), mode {}, period {}ms",
            handles.len(),
            self.mode,
            self.config_tx.borrow().period_millis
        );

        self.running = Some(Running {
            shutdown_tx,
            streams: handles,
        });
        Ok(())
    }

    /// Replace the configuration
    ///
    /// Takes effect at the next evaluation of every stream. On error the
    /// previous configuration stays in effect.
    pub fn reconfigure(&self, config: SamplingConfig) -> Result<(), ServiceError> {
        config.validate()?;
        log::info!(
            "Reconfigured: period {}ms, thresholds {}, min alert interval {}ms",
            config.period_millis,
            config.thresholds,
            config.min_alert_interval_millis
        );
        self.config_tx.send_replace(Arc::new(config));
        Ok(())
    }

    /// Stop every driver and unsubscribe every stream
    ///
    /// Returns once all drivers have exited; no alert is delivered after
    /// that. Calling it on an idle loop does nothing.
    pub async fn stop(&mut self) {
        let Some(running) = self.running.take() else {
            return;
        };

        running.shutdown_tx.send_replace(true);

        for mut stream in running.streams {
            stream.subscription.unsubscribe();
            if let Some(task) = stream.task.take() {
                if let Err(e) = task.await {
                    log::warn!("{} driver exited abnormally: {}", stream.kind, e);
                }
            }
        }

        log::info!("Sampling loop stopped");
    }

    /// State, configuration and per-stream counters
    pub fn status(&self) -> LoopStatus {
        LoopStatus {
            state: self.state(),
            mode: self.mode,
            config: (*self.current_config()).clone(),
            streams: self
                .running
                .as_ref()
                .map(|r| r.streams.iter().map(StreamHandle::status).collect())
                .unwrap_or_default(),
        }
    }
}

impl Drop for SamplingLoop {
    fn drop(&mut self) {
        if let Some(running) = self.running.take() {
            running.shutdown_tx.send_replace(true);
            for stream in &running.streams {
                if let Some(task) = &stream.task {
                    task.abort();
                }
            }
        }
    }
}

/// Per-stream driver task
struct Driver {
    kind: StreamKind,
    slot: Arc<LatestValueSlot>,
    changes: watch::Receiver<Option<Arc<Reading>>>,
    config_rx: watch::Receiver<Arc<SamplingConfig>>,
    shutdown_rx: watch::Receiver<bool>,
    sink: Arc<dyn AlertSink>,
    stats: Arc<StreamStats>,
    evaluator: Evaluator,
    throttle: AlertThrottle,
    origin: Instant,
}

impl Driver {
    async fn run(mut self, mode: DriveMode) {
        log::debug!("{} driver started ({})", self.kind, mode);
        match mode {
            DriveMode::Periodic => self.run_periodic().await,
            DriveMode::PerEvent => self.run_per_event().await,
        }
        log::debug!("{} driver exited", self.kind);
    }

    async fn run_periodic(&mut self) {
        let mut last_check = self.origin;
        let mut deadline = last_check + self.config_rx.borrow().period();

        loop {
            if *self.shutdown_rx.borrow() {
                return;
            }

            tokio::select! {
                biased;
                _ = self.shutdown_rx.changed() => return,
                changed = self.config_rx.changed() => {
                    if changed.is_err() {
                        return;
                    }
                    // New period counts from the last evaluation
                    deadline = last_check + self.config_rx.borrow_and_update().period();
                }
                _ = tokio::time::sleep_until(deadline) => {
                    let config = Arc::clone(&self.config_rx.borrow_and_update());
                    last_check = Instant::now();
                    deadline = last_check + config.period();
                    self.check(self.elapsed_millis(), &config);
                }
            }
        }
    }

    async fn run_per_event(&mut self) {
        let mut last_check: Option<u64> = None;
        // Deferred check for a reading held back by the period gate
        let mut trailing: Option<Instant> = None;

        loop {
            if *self.shutdown_rx.borrow() {
                return;
            }

            tokio::select! {
                biased;
                _ = self.shutdown_rx.changed() => return,
                changed = self.changes.changed() => {
                    if changed.is_err() {
                        return;
                    }
                    trailing = self.check_when_due(&mut last_check);
                }
                _ = tokio::time::sleep_until(trailing.unwrap_or_else(Instant::now)), if trailing.is_some() => {
                    trailing = self.check_when_due(&mut last_check);
                }
            }
            self.stats.pending.store(trailing.is_some(), Ordering::Relaxed);
        }
    }

    /// Check now if the period gate is open, otherwise return when it opens
    fn check_when_due(&mut self, last_check: &mut Option<u64>) -> Option<Instant> {
        let config = Arc::clone(&self.config_rx.borrow_and_update());
        let now = self.elapsed_millis();

        if let Some(last) = *last_check {
            let due = last.saturating_add(config.period_millis);
            if now < due {
                return Some(self.origin + Duration::from_millis(due));
            }
        }

        if self.check(now, &config) {
            *last_check = Some(now);
        }
        None
    }

    fn elapsed_millis(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    /// One evaluation against a single config snapshot; no await inside
    ///
    /// Returns false when the slot has never been written.
    fn check(&mut self, now: u64, config: &SamplingConfig) -> bool {
        let Some(reading) = self.slot.latest() else {
            return false;
        };
        self.stats.evaluations.fetch_add(1, Ordering::Relaxed);

        let Some(kind) = self.evaluator.evaluate(&reading, &config.thresholds) else {
            return true;
        };

        self.throttle.set_min_interval(config.min_alert_interval_millis);
        if !self.throttle.try_emit(now) {
            self.stats.alerts_suppressed.fetch_add(1, Ordering::Relaxed);
            log::debug!("{} alert suppressed at {}ms", self.kind, now);
            return true;
        }

        self.stats.alerts_emitted.fetch_add(1, Ordering::Relaxed);
        let alert = AlertEvent::new(
            kind,
            self.kind,
            (*reading).clone(),
            config.thresholds.clone(),
        );
        if let Err(e) = self.sink.deliver(&alert) {
            log::warn!("Alert sink {} failed: {}", self.sink.name(), e);
        }
        true
    }
}
