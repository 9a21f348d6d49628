//! Error types for the rate engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate.
//! Rate calculation itself is total, so every [`EngineError`] originates from
//! loading or validating a rate card; [`ServiceError`] wraps those together with
//! the failures the binary can hit while starting up.

use thiserror::Error;

use crate::api::AmountTooLarge;

/// The main error type for the rate engine.
///
/// # Example
///
/// ```
/// use rate_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/profiles.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/profiles.yaml");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A rate value in a tier table is malformed.
    #[error("Invalid rate '{value}': {message}")]
    InvalidRate {
        /// The raw rate as written in configuration.
        value: String,
        /// Why the rate was rejected.
        message: String,
    },

    /// A tier table violates its ordering or range invariants.
    #[error("Invalid tier table '{table}': {message}")]
    InvalidTierTable {
        /// The id of the offending table.
        table: String,
        /// A description of the violated invariant.
        message: String,
    },

    /// A pricing profile references something that does not exist.
    #[error("Invalid pricing profile '{profile}': {message}")]
    InvalidProfile {
        /// The profile (client type) name.
        profile: String,
        /// A description of the problem.
        message: String,
    },

    /// A discount policy is malformed.
    #[error("Invalid discount policy for '{client_type}': {message}")]
    InvalidDiscountPolicy {
        /// The client type the policy is attached to.
        client_type: String,
        /// A description of the problem.
        message: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors raised by the `rate-engine` binary outside of the engine proper.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The rate card could not be loaded.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// A process setting was missing or malformed.
    #[error("Invalid setting {key}: {message}")]
    Settings {
        /// The environment variable or flag name.
        key: String,
        /// Why the value was rejected.
        message: String,
    },

    /// The tracing subscriber could not be installed.
    #[error("Telemetry error: {message}")]
    Telemetry {
        /// A description of the failure.
        message: String,
    },

    /// Binding or serving the HTTP listener failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Rendering a result to JSON failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A `quote` argument was out of range.
    #[error("Invalid argument: {0}")]
    Input(#[from] AmountTooLarge),
}
