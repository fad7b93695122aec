//! Check command implementation
//!
//! Evaluates one reading against the configured thresholds without starting
//! the sampling loop. GPS readings are compared with a reference fix.

use super::resolve_config;
use crate::cli::args::{CheckArgs, OutputFormat};
use crate::cli::output::{print_output, CheckResult};
use crate::domain::{now_millis, Comparison, Reading};
use crate::error::{DomainError, Result};

/// Execute the check command
pub fn run_check(args: &CheckArgs, format: OutputFormat, config_path: Option<&str>) -> Result<()> {
    let result = evaluate(args, config_path)?;
    print_output(&result, format)?;
    Ok(())
}

fn evaluate(args: &CheckArgs, config_path: Option<&str>) -> Result<CheckResult> {
    let config = resolve_config(config_path, &args.sampling)?.build();
    let stream = config.sampling.stream;
    let thresholds = config.threshold_vector()?;

    let reading = Reading::from_values(stream, now_millis(), &args.values)?;
    log::debug!("Checking {} against {}", reading, thresholds);

    match stream.comparison() {
        Comparison::AbsoluteThreshold => {
            if !args.reference.is_empty() {
                log::warn!("--reference ignored for {} readings", stream);
            }
            Ok(CheckResult::new(stream, &reading, &thresholds))
        }
        Comparison::PositionChange => {
            if args.reference.is_empty() {
                return Err(DomainError::MissingReference {
                    stream: stream.to_string(),
                }
                .into());
            }
            let reference =
                Reading::from_values(stream, reading.timestamp_millis(), &args.reference)?;
            Ok(CheckResult::moved(stream, &reference, &reading, &thresholds))
        }
    }
}
