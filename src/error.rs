//! Unified error types for sensorwatch
//!
//! This module defines all error types used throughout the application.
//! Uses thiserror for ergonomic error definitions.

use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from configuration parsing/validation
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Error from domain type validation
    #[error("Domain validation error: {0}")]
    Domain(#[from] DomainError),

    /// Error from the sampling loop
    #[error("Sampling error: {0}")]
    Service(#[from] ServiceError),

    /// Error reading sensor input
    #[error("Stream error: {0}")]
    Stream(#[from] StreamError),

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from domain type validation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Sampling period must be positive
    #[error("Invalid sampling period: {0}ms (must be greater than 0)")]
    InvalidPeriod(u64),

    /// Minimum alert interval must be positive
    #[error("Invalid alert interval: {0}ms (must be greater than 0)")]
    InvalidAlertInterval(u64),

    /// Threshold limit is negative or not finite
    #[error("Invalid threshold for axis '{axis}': {value} (must be finite and >= 0)")]
    InvalidThreshold { axis: String, value: f64 },

    /// Axis name is not part of the stream
    #[error("Unknown axis '{axis}' for {stream} stream")]
    UnknownAxis { stream: String, axis: String },

    /// Positional values don't line up with the stream's axes
    #[error("Expected {expected} values, got {actual}")]
    AxisCountMismatch { expected: usize, actual: usize },

    /// Unrecognised stream kind name
    #[error("Unknown stream kind: {0}")]
    UnknownStreamKind(String),

    /// Position-change streams compare against an earlier fix
    #[error("{stream} readings are compared with a previous fix; a reference reading is required")]
    MissingReference { stream: String },
}

/// Errors from configuration parsing and validation
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not found
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// Invalid config value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Errors from sampling loop operations
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Configuration rejected; the previous one stays in effect
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(#[from] DomainError),

    /// `start` called while the loop is already running
    #[error("Sampling loop is already running")]
    AlreadyRunning,

    /// `start` called without any stream
    #[error("No sensor streams to sample")]
    NoStreams,

    /// `start` called outside a tokio runtime
    #[error("Sampling loop must be started from within a tokio runtime")]
    NoRuntime,
}

/// Errors from reading sensor input
#[derive(Error, Debug)]
pub enum StreamError {
    /// Reading the input failed
    #[error("Failed to read input: {0}")]
    Read(#[from] std::io::Error),

    /// A line could not be parsed as a reading
    #[error("Line {line}: {message}")]
    Parse { line: usize, message: String },

    /// The values don't fit the stream kind
    #[error("Line {line}: {source}")]
    Reading {
        line: usize,
        #[source]
        source: DomainError,
    },
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
