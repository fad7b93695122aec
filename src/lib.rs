//! sensorwatch - background sensor sampling with threshold alerts
//!
//! This library samples push-based sensor streams (accelerometer, gyroscope,
//! GPS) on a timer or per event, compares the latest reading of each stream
//! against per-axis thresholds and delivers rate-limited alerts to a sink.
//!
//! # Modules
//!
//! - [`alerts`]: Evaluation, throttling and alert sinks
//! - [`cli`]: Command-line interface definitions
//! - [`commands`]: Command handlers
//! - [`config`]: Configuration system
//! - [`domain`]: Domain models with validation
//! - [`error`]: Error types
//! - [`sensor`]: Stream abstraction and latest-value slots
//! - [`services`]: The sampling loop

pub mod alerts;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod error;
pub mod sensor;
pub mod services;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use error::{AppError, Result};
