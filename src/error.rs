// src/error.rs

//! # Simulation Errors
//!
//! A single error type covers configuration validation, controller input
//! checks, numeric blow-up during integration, and the I/O and
//! serialization failures of the loading and export helpers.

use thiserror::Error;

/// Errors produced while configuring, running, or summarizing a simulation.
#[derive(Error, Debug)]
pub enum SimulationError {
    /// A parameter failed validation before the loop started.
    #[error("invalid configuration: `{field}` {reason}")]
    InvalidConfiguration {
        /// Dotted path of the offending parameter.
        field: &'static str,
        /// Human readable description of the violated constraint.
        reason: &'static str,
    },

    /// A component received an input it cannot process.
    #[error("invalid input: {reason}")]
    InvalidInput {
        /// Human readable description of the rejected input.
        reason: &'static str,
    },

    /// The plant state became non-finite and the run was cut short.
    #[error("numeric overflow: plant state became non-finite at t = {time} s")]
    NumericOverflow {
        /// Simulated time of the step that diverged.
        time: f64,
    },

    /// Metrics were requested for a record without samples.
    #[error("simulation record contains no samples")]
    EmptyRecord,

    /// The loop was stepped after reaching its final state.
    #[error("simulation loop already completed; start a new run")]
    LoopCompleted,

    /// Reading or writing a file failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A YAML parameter document could not be parsed.
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization failed.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// CSV serialization failed.
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SimulationError>;
