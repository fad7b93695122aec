//! Replay of recorded readings
//!
//! Reads JSON lines of the form
//! `{"timestamp_millis": 1700000000000, "values": [0.1, 9.8, 0.0]}` and
//! publishes each one into a [`PushSource`]. `timestamp_millis` is optional
//! and defaults to the wall clock. Blank lines and lines starting with `#`
//! are skipped.

use super::{PushSource, SensorStream};
use crate::domain::{now_millis, Reading, StreamKind};
use crate::error::StreamError;
use serde::Deserialize;
use std::io::BufRead;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct RecordedReading {
    timestamp_millis: Option<u64>,
    values: Vec<f64>,
}

/// Parse one input line into a reading for `kind`
///
/// Returns `Ok(None)` for blank and comment lines.
pub fn parse_line(
    kind: StreamKind,
    line_no: usize,
    line: &str,
) -> Result<Option<Reading>, StreamError> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let record: RecordedReading =
        serde_json::from_str(trimmed).map_err(|e| StreamError::Parse {
            line: line_no,
            message: e.to_string(),
        })?;

    let timestamp = record.timestamp_millis.unwrap_or_else(now_millis);
    Reading::from_values(kind, timestamp, &record.values)
        .map(Some)
        .map_err(|source| StreamError::Reading {
            line: line_no,
            source,
        })
}

/// Publish every reading from `reader` into `source`
///
/// Runs on the caller's thread, which plays the role of the sensor callback
/// context. With `pace` set, sleeps between readings. Malformed lines are
/// logged and skipped; I/O errors abort the replay.
pub fn replay<R: BufRead>(
    reader: R,
    source: &PushSource,
    pace: Option<Duration>,
) -> Result<usize, StreamError> {
    let mut published = 0;

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        match parse_line(source.kind(), idx + 1, &line) {
            Ok(Some(reading)) => {
                source.publish(reading);
                published += 1;
                if let Some(pace) = pace {
                    std::thread::sleep(pace);
                }
            }
            Ok(None) => {}
            Err(e) => log::warn!("Skipping input: {}", e),
        }
    }

    log::info!("Replay finished after {} readings", published);
    Ok(published)
}
