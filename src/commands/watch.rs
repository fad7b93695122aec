//! Watch command implementation
//!
//! Replays recorded readings through a [`PushSource`] while the sampling loop
//! runs, printing alerts as they are raised. SIGHUP reloads the
//! configuration file.

use super::resolve_config;
use crate::alerts::{
    AlertEvent, AlertSink, CallbackNotifier, LogNotifier, NotificationManager, TerminalNotifier,
};
use crate::cli::args::{OutputFormat, WatchArgs};
use crate::cli::output::{print_output, TableDisplay};
use crate::config::Config;
use crate::domain::StreamKind;
use crate::error::{AppError, ConfigError, Result, StreamError};
use crate::sensor::replay::replay;
use crate::sensor::{PushSource, SensorStream};
use crate::services::{LoopStatus, SamplingLoop};

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

const DRAIN_POLL: Duration = Duration::from_millis(10);

/// Execute the watch command
pub async fn run_watch(
    args: &WatchArgs,
    format: OutputFormat,
    config_path: Option<&str>,
) -> Result<()> {
    let status = watch_with_sink(args, config_path, alert_sink(format, args.no_color)).await?;
    print_output(&status, format)?;
    Ok(())
}

/// Run the loop until input ends, the time limit passes or Ctrl-C
///
/// Returns the loop status captured just before stopping.
async fn watch_with_sink(
    args: &WatchArgs,
    config_path: Option<&str>,
    sink: Arc<dyn AlertSink>,
) -> Result<LoopStatus> {
    let config = watch_config(args, config_path)?;
    let stream = config.sampling.stream;
    let sampling_config = config.to_sampling_config()?;
    let input = open_input(args.input.as_deref())?;

    let mut sampling = SamplingLoop::new(config.sampling.mode, sink);
    let source = PushSource::new(stream);
    sampling.start(
        vec![Arc::new(source.clone()) as Arc<dyn SensorStream>],
        sampling_config,
    )?;

    let pace = args.pace_millis.map(Duration::from_millis);
    let mut replay_task = tokio::task::spawn_blocking(move || replay(input, &source, pace));

    let outcome = supervise(&sampling, args, config_path, stream, &mut replay_task).await;

    let status = sampling.status();
    sampling.stop().await;
    outcome.map(|()| status)
}

fn watch_config(
    args: &WatchArgs,
    config_path: Option<&str>,
) -> std::result::Result<Config, ConfigError> {
    Ok(resolve_config(config_path, &args.sampling)?
        .with_mode(args.mode.map(Into::into))
        .with_period_millis(args.period_millis)
        .with_min_alert_interval_millis(args.min_alert_interval_millis)
        .build())
}

fn open_input(path: Option<&Path>) -> Result<Box<dyn BufRead + Send>> {
    match path {
        Some(path) if path != Path::new("-") => {
            let file = File::open(path).map_err(StreamError::from)?;
            Ok(Box::new(BufReader::new(file)))
        }
        _ => Ok(Box::new(BufReader::new(io::stdin()))),
    }
}

/// Alert output for the selected format, mirrored into the log
fn alert_sink(format: OutputFormat, no_color: bool) -> Arc<dyn AlertSink> {
    let printer: Box<dyn AlertSink> = match format {
        OutputFormat::Table if no_color => Box::new(TerminalNotifier::no_color()),
        OutputFormat::Table => Box::new(TerminalNotifier::new()),
        OutputFormat::Json => Box::new(CallbackNotifier::new(|alert: &AlertEvent| {
            if let Ok(line) = serde_json::to_string(alert) {
                let _ = writeln!(io::stdout().lock(), "{}", line);
            }
        })),
        OutputFormat::Compact => Box::new(CallbackNotifier::new(|alert: &AlertEvent| {
            let _ = writeln!(io::stdout().lock(), "{}", alert.to_compact());
        })),
    };

    Arc::new(
        NotificationManager::new()
            .with_sink(printer)
            .with_sink(Box::new(LogNotifier)),
    )
}

async fn supervise(
    sampling: &SamplingLoop,
    args: &WatchArgs,
    config_path: Option<&str>,
    stream: StreamKind,
    replay_task: &mut JoinHandle<std::result::Result<usize, StreamError>>,
) -> Result<()> {
    let deadline = args
        .run_for_millis
        .map(|ms| Instant::now() + Duration::from_millis(ms));
    let mut replay_done = false;
    let mut hangup = Hangup::new()?;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                log::info!("Interrupted");
                return Ok(());
            }
            _ = deadline_reached(deadline) => {
                log::debug!("Run time elapsed");
                return Ok(());
            }
            joined = &mut *replay_task, if !replay_done => {
                replay_done = true;
                match joined {
                    Ok(Ok(count)) => log::info!("Replayed {} reading(s)", count),
                    Ok(Err(e)) => return Err(e.into()),
                    Err(e) => log::error!("Replay task failed: {}", e),
                }
                if deadline.is_none() {
                    drain(sampling).await;
                    return Ok(());
                }
            }
            _ = hangup.recv() => reload(sampling, args, config_path, stream),
        }
    }
}

/// Wait until the last replayed reading has been evaluated
///
/// Periodic drivers pick it up within one period; per-event drivers may hold
/// it back until their period gate opens.
async fn drain(sampling: &SamplingLoop) {
    tokio::time::sleep(sampling.current_config().period()).await;
    while sampling.status().streams.iter().any(|s| s.pending) {
        tokio::time::sleep(DRAIN_POLL).await;
    }
}

async fn deadline_reached(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Re-read the config file and apply it to the running loop
fn reload(
    sampling: &SamplingLoop,
    args: &WatchArgs,
    config_path: Option<&str>,
    stream: StreamKind,
) {
    log::info!("Reloading configuration");

    let result = watch_config(args, config_path)
        .map_err(AppError::from)
        .and_then(|mut config| {
            if config.sampling.stream != stream || config.sampling.mode != sampling.mode() {
                log::warn!("Stream and mode changes need a restart; applying timing and thresholds");
            }
            config.sampling.stream = stream;
            Ok(config.to_sampling_config()?)
        })
        .and_then(|config| Ok(sampling.reconfigure(config)?));

    if let Err(e) = result {
        log::warn!("Keeping previous configuration: {}", e);
    }
}

#[cfg(unix)]
struct Hangup(tokio::signal::unix::Signal);

#[cfg(unix)]
impl Hangup {
    fn new() -> io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};
        Ok(Self(signal(SignalKind::hangup())?))
    }

    async fn recv(&mut self) {
        if self.0.recv().await.is_none() {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
struct Hangup;

#[cfg(not(unix))]
impl Hangup {
    fn new() -> io::Result<Self> {
        Ok(Self)
    }

    async fn recv(&mut self) {
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::args::{ModeArg, SamplingArgs, StreamArg};
    use crate::domain::DriveMode;
    use crate::mock::RecordingSink;
    use std::fs;
    use std::path::PathBuf;

    fn watch_args(input: PathBuf) -> WatchArgs {
        WatchArgs {
            sampling: SamplingArgs {
                stream: Some(StreamArg::Accelerometer),
                thresholds: vec![("x".to_string(), 20.0)],
            },
            input: Some(input),
            mode: Some(ModeArg::PerEvent),
            period_millis: Some(20),
            min_alert_interval_millis: Some(60_000),
            pace_millis: None,
            run_for_millis: None,
            no_color: true,
        }
    }

    fn empty_config(dir: &tempfile::TempDir) -> String {
        let path = dir.path().join("config.toml");
        fs::write(&path, "").unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn test_watch_config_merges_flags() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = empty_config(&dir);
        let args = watch_args(dir.path().join("readings.jsonl"));

        let config = watch_config(&args, Some(config_path.as_str())).unwrap();
        assert_eq!(config.sampling.mode, DriveMode::PerEvent);
        assert_eq!(config.sampling.period_millis, 20);
        assert_eq!(config.sampling.min_alert_interval_millis, 60_000);
        assert_eq!(config.thresholds.get("x"), Some(&20.0));
    }

    #[tokio::test]
    async fn test_watch_replays_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = empty_config(&dir);
        let input = dir.path().join("readings.jsonl");
        fs::write(
            &input,
            "# recorded\n\
             {\"timestamp_millis\": 1, \"values\": [25.0, 0.0, 0.0]}\n\
             not json\n\
             {\"timestamp_millis\": 2, \"values\": [30.0, 0.0, 0.0]}\n",
        )
        .unwrap();

        let sink = Arc::new(RecordingSink::new());
        let status = watch_with_sink(&watch_args(input), Some(config_path.as_str()), sink.clone())
            .await
            .unwrap();

        // Second exceedance falls inside the alert interval
        assert_eq!(sink.count(), 1);
        assert!(sink.alerts()[0]
            .message
            .starts_with("Accelerometer threshold reached! X="));
        assert_eq!(status.streams[0].alerts_emitted, 1);
    }

    #[tokio::test]
    async fn test_watch_evaluates_gated_last_reading() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = empty_config(&dir);
        let input = dir.path().join("readings.jsonl");
        fs::write(
            &input,
            "{\"values\": [1.0, 0.0, 0.0]}\n\
             {\"values\": [25.0, 0.0, 0.0]}\n",
        )
        .unwrap();

        let mut args = watch_args(input);
        args.period_millis = Some(200);
        args.pace_millis = Some(20);

        let sink = Arc::new(RecordingSink::new());
        let status = watch_with_sink(&args, Some(config_path.as_str()), sink.clone())
            .await
            .unwrap();

        assert_eq!(sink.count(), 1);
        assert_eq!(sink.alerts()[0].reading.get("x"), Some(25.0));
        assert!(!status.streams[0].pending);
    }

    #[tokio::test]
    async fn test_watch_run_for() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = empty_config(&dir);
        let input = dir.path().join("readings.jsonl");
        fs::write(&input, "{\"values\": [0.0, 0.0, 50.0]}\n").unwrap();

        let mut args = watch_args(input);
        args.mode = Some(ModeArg::Periodic);
        args.period_millis = Some(10);
        args.sampling.thresholds = vec![("z".to_string(), 5.0)];
        args.run_for_millis = Some(100);

        let sink = Arc::new(RecordingSink::new());
        let status = watch_with_sink(&args, Some(config_path.as_str()), sink.clone())
            .await
            .unwrap();

        assert_eq!(sink.count(), 1);
        assert!(status.streams[0].evaluations >= 1);
    }

    #[tokio::test]
    async fn test_watch_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = empty_config(&dir);
        let args = watch_args(dir.path().join("missing.jsonl"));

        let result =
            watch_with_sink(&args, Some(config_path.as_str()), Arc::new(RecordingSink::new())).await;
        assert!(matches!(result, Err(AppError::Stream(StreamError::Read(_)))));
    }

    #[tokio::test]
    async fn test_watch_invalid_thresholds() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = empty_config(&dir);
        let mut args = watch_args(dir.path().join("readings.jsonl"));
        args.sampling.thresholds = vec![("latitude".to_string(), 1.0)];

        let result =
            watch_with_sink(&args, Some(config_path.as_str()), Arc::new(RecordingSink::new())).await;
        assert!(matches!(result, Err(AppError::Domain(_))));
    }

    #[test]
    fn test_reload_keeps_config_on_error() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(&config_path, "[sampling]\nperiod_millis = 0\n").unwrap();

        let mut args = watch_args(dir.path().join("readings.jsonl"));
        args.period_millis = None;

        let sampling = SamplingLoop::new(DriveMode::PerEvent, Arc::new(RecordingSink::new()));
        let before = sampling.current_config();
        reload(&sampling, &args, config_path.to_str(), StreamKind::Accelerometer);
        assert_eq!(sampling.current_config(), before);

        fs::write(&config_path, "[sampling]\nperiod_millis = 250\n").unwrap();
        reload(&sampling, &args, config_path.to_str(), StreamKind::Accelerometer);
        assert_eq!(sampling.current_config().period_millis, 250);
    }
}
