//! Alert sinks
//!
//! Delivery is fire-and-forget: the sampling loop logs a failed delivery and
//! moves on. Nothing is retried.

use super::types::{AlertEvent, AlertKind};
use crate::error::Result;
use std::io::{self, Write};
use tokio::sync::mpsc;

/// Receiver of alerts
pub trait AlertSink: Send + Sync {
    /// Deliver an alert
    fn deliver(&self, alert: &AlertEvent) -> Result<()>;

    /// Sink name for identification
    fn name(&self) -> &str;
}

/// Terminal/console notifier
///
/// Outputs alerts to stdout/stderr with colored formatting
pub struct TerminalNotifier {
    /// Use stderr instead of stdout
    use_stderr: bool,
    /// Use colors (ANSI escape codes)
    use_colors: bool,
}

impl TerminalNotifier {
    /// Create a new terminal notifier
    pub fn new() -> Self {
        Self {
            use_stderr: true,
            use_colors: Self::supports_color(),
        }
    }

    /// Create a notifier that uses stdout
    pub fn stdout() -> Self {
        Self {
            use_stderr: false,
            use_colors: Self::supports_color(),
        }
    }

    /// Create a notifier without colors
    pub fn no_color() -> Self {
        Self {
            use_stderr: true,
            use_colors: false,
        }
    }

    fn supports_color() -> bool {
        std::env::var("TERM")
            .map(|term| term != "dumb")
            .unwrap_or(false)
    }

    fn format_alert(&self, alert: &AlertEvent) -> String {
        let timestamp = alert
            .timestamp
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| {
                let secs = d.as_secs();
                let hours = (secs / 3600) % 24;
                let mins = (secs % 3600) / 60;
                let secs = secs % 60;
                format!("{:02}:{:02}:{:02}", hours, mins, secs)
            })
            .unwrap_or_else(|_| "??:??:??".to_string());

        format!(
            "[{}] {} {}",
            timestamp,
            self.format_kind(alert.kind),
            alert.message
        )
    }

    fn format_kind(&self, kind: AlertKind) -> String {
        if !self.use_colors {
            return format!("{}", kind);
        }

        let color_code = match kind {
            AlertKind::AxisThresholdExceeded => "\x1b[33m", // Yellow
            AlertKind::PositionChanged => "\x1b[36m",       // Cyan
        };

        format!("{}{}\x1b[0m", color_code, kind)
    }
}

impl Default for TerminalNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl AlertSink for TerminalNotifier {
    fn deliver(&self, alert: &AlertEvent) -> Result<()> {
        let message = self.format_alert(alert);

        if self.use_stderr {
            let stderr = io::stderr();
            let mut handle = stderr.lock();
            writeln!(handle, "{}", message)?;
        } else {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "{}", message)?;
        }

        Ok(())
    }

    fn name(&self) -> &str {
        "terminal"
    }
}

/// Emits alerts as `log` records at info level
#[derive(Debug, Default)]
pub struct LogNotifier;

impl AlertSink for LogNotifier {
    fn deliver(&self, alert: &AlertEvent) -> Result<()> {
        log::info!("[{}] {}", alert.stream, alert.message);
        Ok(())
    }

    fn name(&self) -> &str {
        "log"
    }
}

/// Hands alerts to a closure
pub struct CallbackNotifier<F> {
    callback: F,
}

impl<F> CallbackNotifier<F>
where
    F: Fn(&AlertEvent) + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> AlertSink for CallbackNotifier<F>
where
    F: Fn(&AlertEvent) + Send + Sync,
{
    fn deliver(&self, alert: &AlertEvent) -> Result<()> {
        (self.callback)(alert);
        Ok(())
    }

    fn name(&self) -> &str {
        "callback"
    }
}

/// Forwards alerts into a tokio channel
///
/// A closed receiver is not an error; the alert is dropped.
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<AlertEvent>,
}

impl ChannelNotifier {
    /// Create the notifier and the receiving end
    pub fn new() -> (Self, mpsc::UnboundedReceiver<AlertEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl AlertSink for ChannelNotifier {
    fn deliver(&self, alert: &AlertEvent) -> Result<()> {
        if self.tx.send(alert.clone()).is_err() {
            log::debug!("Alert channel closed; dropping {}", alert.id);
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "channel"
    }
}

/// Notification manager
///
/// Fans alerts out to several sinks. A failing sink doesn't stop the others.
pub struct NotificationManager {
    sinks: Vec<Box<dyn AlertSink>>,
}

impl NotificationManager {
    /// Create a new notification manager
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    /// Add a sink
    pub fn add_sink(&mut self, sink: Box<dyn AlertSink>) {
        self.sinks.push(sink);
    }

    /// Builder form of [`add_sink`](Self::add_sink)
    pub fn with_sink(mut self, sink: Box<dyn AlertSink>) -> Self {
        self.add_sink(sink);
        self
    }

    /// Send alert to all sinks
    pub fn notify_all(&self, alert: &AlertEvent) {
        for sink in &self.sinks {
            if let Err(e) = sink.deliver(alert) {
                log::warn!("Failed to deliver alert via {}: {}", sink.name(), e);
            }
        }
    }

    /// Get number of sinks
    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }
}

impl Default for NotificationManager {
    fn default() -> Self {
        Self::new().with_sink(Box::new(TerminalNotifier::new()))
    }
}

impl AlertSink for NotificationManager {
    fn deliver(&self, alert: &AlertEvent) -> Result<()> {
        self.notify_all(alert);
        Ok(())
    }

    fn name(&self) -> &str {
        "manager"
    }
}
