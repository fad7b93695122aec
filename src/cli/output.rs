//! Output formatting utilities
//!
//! Provides table and JSON output formatting for CLI commands.

use crate::alerts::AlertEvent;
use crate::cli::args::OutputFormat;
use crate::domain::{Comparison, DriveMode, Reading, StreamKind, ThresholdVector};
use crate::services::{LoopStatus, StreamStatus};
use serde::Serialize;
use std::io::{self, Write};

/// Format and print output based on the selected format
pub fn print_output<T: Serialize + TableDisplay>(data: &T, format: OutputFormat) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match format {
        OutputFormat::Table => {
            writeln!(handle, "{}", data.to_table())?;
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(data).unwrap_or_else(|_| "{}".to_string());
            writeln!(handle, "{}", json)?;
        }
        OutputFormat::Compact => {
            writeln!(handle, "{}", data.to_compact())?;
        }
    }

    Ok(())
}

/// Trait for types that can be displayed as a table
pub trait TableDisplay {
    /// Format as a table string
    fn to_table(&self) -> String;

    /// Format as a compact single line
    fn to_compact(&self) -> String {
        self.to_table().trim_end().replace('\n', " | ")
    }
}

impl TableDisplay for AlertEvent {
    fn to_table(&self) -> String {
        format!("{} {}", self.kind, self.message)
    }

    fn to_compact(&self) -> String {
        format!("{}:{}", self.stream, self.reading)
    }
}

/// Per-axis outcome of a check
#[derive(Debug, Clone, Serialize)]
pub struct AxisCheck {
    pub axis: String,
    pub value: f64,
    /// Value of the earlier fix for position changes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<f64>,
    pub limit: Option<f64>,
    pub exceeded: bool,
}

/// Result of evaluating one reading
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    pub stream: StreamKind,
    pub comparison: Comparison,
    pub exceeded: bool,
    pub message: Option<String>,
    pub axes: Vec<AxisCheck>,
}

impl CheckResult {
    /// Compare every axis of `reading` with its limit
    pub fn new(stream: StreamKind, reading: &Reading, thresholds: &ThresholdVector) -> Self {
        let axes: Vec<AxisCheck> = reading
            .axes()
            .iter()
            .map(|a| {
                let limit = thresholds.get(&a.name);
                AxisCheck {
                    axis: a.name.clone(),
                    value: a.value,
                    reference: None,
                    limit,
                    exceeded: limit.is_some_and(|l| a.value.abs() > l),
                }
            })
            .collect();
        let exceeded = axes.iter().any(|a| a.exceeded);

        Self {
            stream,
            comparison: Comparison::AbsoluteThreshold,
            exceeded,
            message: exceeded
                .then(|| format!("{} threshold reached! {}", stream.display_name(), reading)),
            axes,
        }
    }

    /// Compare how far every axis of `reading` moved from `reference`
    pub fn moved(
        stream: StreamKind,
        reference: &Reading,
        reading: &Reading,
        thresholds: &ThresholdVector,
    ) -> Self {
        let axes: Vec<AxisCheck> = reading
            .axes()
            .iter()
            .map(|a| {
                let limit = thresholds.get(&a.name);
                let before = reference.get(&a.name);
                let exceeded = match (limit, before) {
                    (Some(limit), Some(before)) => (a.value - before).abs() > limit,
                    _ => false,
                };
                AxisCheck {
                    axis: a.name.clone(),
                    value: a.value,
                    reference: before,
                    limit,
                    exceeded,
                }
            })
            .collect();
        let exceeded = axes.iter().any(|a| a.exceeded);

        Self {
            stream,
            comparison: Comparison::PositionChange,
            exceeded,
            message: exceeded
                .then(|| format!("{} position changed! {}", stream.display_name(), reading)),
            axes,
        }
    }
}

impl TableDisplay for CheckResult {
    fn to_table(&self) -> String {
        let moved = self.comparison == Comparison::PositionChange;
        let mut output = format!("{}\n", self.stream.display_name());
        if moved {
            output.push_str("  Axis        Value       From        Max change  Status\n");
            output.push_str("  ──────────────────────────────────────────────────────────\n");
        } else {
            output.push_str("  Axis        Value       Limit       Status\n");
            output.push_str("  ──────────────────────────────────────────────\n");
        }

        for axis in &self.axes {
            let limit = axis
                .limit
                .map(|l| l.to_string())
                .unwrap_or_else(|| "-".to_string());
            let status = match (axis.exceeded, moved) {
                (true, true) => "MOVED",
                (true, false) => "EXCEEDED",
                (false, _) => "ok",
            };
            let from = if moved {
                let from = axis
                    .reference
                    .map(|r| r.to_string())
                    .unwrap_or_else(|| "-".to_string());
                format!("{:<11} ", from)
            } else {
                String::new()
            };
            output.push_str(&format!(
                "  {:<11} {:<11} {}{:<11} {}\n",
                axis.axis.to_ascii_uppercase(),
                axis.value,
                from,
                limit,
                status
            ));
        }

        match (&self.message, moved) {
            (Some(message), _) => output.push_str(&format!("\n✗ {}\n", message)),
            (None, true) => output.push_str("\n✓ Within allowed movement\n"),
            (None, false) => output.push_str("\n✓ Within thresholds\n"),
        }

        output
    }

    fn to_compact(&self) -> String {
        match &self.message {
            Some(message) => message.clone(),
            None => format!("{}: ok", self.stream),
        }
    }
}

/// Effective configuration for display
#[derive(Debug, Clone, Serialize)]
pub struct ConfigView {
    pub source: Option<String>,
    pub stream: StreamKind,
    pub mode: DriveMode,
    pub period_millis: u64,
    pub min_alert_interval_millis: u64,
    pub thresholds: ThresholdVector,
}

impl TableDisplay for ConfigView {
    fn to_table(&self) -> String {
        let mut output = format!(
            "Source:              {}\n",
            self.source.as_deref().unwrap_or("built-in defaults")
        );
        output.push_str(&format!("Stream:              {}\n", self.stream));
        output.push_str(&format!("Mode:                {}\n", self.mode));
        output.push_str(&format!("Period:              {} ms\n", self.period_millis));
        output.push_str(&format!(
            "Min alert interval:  {} ms\n",
            self.min_alert_interval_millis
        ));
        output.push_str(&format!("Thresholds:          {}\n", self.thresholds));
        output
    }

    fn to_compact(&self) -> String {
        format!(
            "{} {} every {}ms, alerts >= {}ms apart, {}",
            self.stream, self.mode, self.period_millis, self.min_alert_interval_millis, self.thresholds
        )
    }
}

fn stream_line(stream: &StreamStatus) -> String {
    format!(
        "  {:<14} {:<12} {:<12} {:<12} {:<8} {}\n",
        stream.kind.to_string(),
        stream.subscription.to_string(),
        stream.evaluations,
        stream.alerts_emitted,
        stream.alerts_suppressed,
        stream.availability
    )
}

impl TableDisplay for LoopStatus {
    fn to_table(&self) -> String {
        let mut output = format!(
            "Sampling loop: {} ({}, period {} ms)\n\n",
            self.state, self.mode, self.config.period_millis
        );

        if self.streams.is_empty() {
            output.push_str("  No streams\n");
            return output;
        }

        output.push_str("  Stream         State        Evaluations  Alerts       Dropped  Sensor\n");
        output.push_str("  ──────────────────────────────────────────────────────────────────────\n");
        for stream in &self.streams {
            output.push_str(&stream_line(stream));
        }

        output
    }

    fn to_compact(&self) -> String {
        self.streams
            .iter()
            .map(|s| {
                format!(
                    "{}: {} evaluated, {} alerts, {} dropped",
                    s.kind, s.evaluations, s.alerts_emitted, s.alerts_suppressed
                )
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Simple message output
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub message: String,
    pub success: bool,
}

impl TableDisplay for Message {
    fn to_table(&self) -> String {
        if self.success {
            format!("✓ {}", self.message)
        } else {
            format!("✗ {}", self.message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SamplingConfig;
    use crate::sensor::{Availability, SubscriptionState};
    use crate::services::LoopState;

    #[test]
    fn test_check_result_exceeded() {
        let reading = Reading::from_values(StreamKind::Accelerometer, 0, &[-25.0, 0.0, 0.0]).unwrap();
        let thresholds = ThresholdVector::uniform(StreamKind::Accelerometer, 20.0).unwrap();
        let result = CheckResult::new(StreamKind::Accelerometer, &reading, &thresholds);

        assert!(result.exceeded);
        assert!(result.axes[0].exceeded);
        assert!(!result.axes[1].exceeded);
        assert_eq!(
            result.to_compact(),
            "Accelerometer threshold reached! X=-25, Y=0, Z=0"
        );
        assert!(result.to_table().contains("EXCEEDED"));
    }

    #[test]
    fn test_check_result_within() {
        let reading = Reading::from_values(StreamKind::Gyroscope, 0, &[1.0, 2.0, 3.0]).unwrap();
        let thresholds = ThresholdVector::new([("x", 5.0)]).unwrap();
        let result = CheckResult::new(StreamKind::Gyroscope, &reading, &thresholds);

        assert!(!result.exceeded);
        assert_eq!(result.axes[2].limit, None);
        assert_eq!(result.to_compact(), "gyroscope: ok");
        assert!(result.to_table().contains("Within thresholds"));
    }

    #[test]
    fn test_check_result_moved() {
        let reference = Reading::from_values(StreamKind::Gps, 0, &[52.5, 13.4]).unwrap();
        let reading = Reading::from_values(StreamKind::Gps, 0, &[52.502, 13.4]).unwrap();
        let thresholds = ThresholdVector::uniform(StreamKind::Gps, 0.001).unwrap();
        let result = CheckResult::moved(StreamKind::Gps, &reference, &reading, &thresholds);

        assert!(result.exceeded);
        assert_eq!(result.comparison, Comparison::PositionChange);
        assert_eq!(result.axes[0].reference, Some(52.5));
        assert!(result.axes[0].exceeded);
        assert!(!result.axes[1].exceeded);
        assert!(result.to_compact().starts_with("GPS position changed!"));
        assert!(result.to_table().contains("MOVED"));
    }

    #[test]
    fn test_loop_status_table() {
        let status = LoopStatus {
            state: LoopState::Running,
            mode: DriveMode::Periodic,
            config: SamplingConfig::default(),
            streams: vec![StreamStatus {
                kind: StreamKind::Accelerometer,
                availability: Availability::Available,
                subscription: SubscriptionState::Active,
                evaluations: 12,
                alerts_emitted: 2,
                alerts_suppressed: 5,
                pending: false,
            }],
        };

        let table = status.to_table();
        assert!(table.contains("running"));
        assert!(table.contains("accelerometer"));
        assert!(table.contains("active"));
        assert_eq!(
            status.to_compact(),
            "accelerometer: 12 evaluated, 2 alerts, 5 dropped"
        );
    }

    #[test]
    fn test_message_display() {
        let msg = Message {
            message: "Operation completed".to_string(),
            success: true,
        };

        assert!(msg.to_table().starts_with('✓'));
    }
}
