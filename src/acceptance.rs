// src/acceptance.rs

//! # Acceptance Evaluation
//!
//! Compares computed [`PerformanceMetrics`] against documented limits and
//! reports a verdict per check. Every verdict is derived from the metrics
//! of an actual run; an undefined metric fails the check that needs it.

use crate::metrics::PerformanceMetrics;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Upper limits a run must stay within. `None` skips the check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcceptanceCriteria {
    /// Largest allowed overshoot in percent.
    pub max_overshoot_percent: Option<f64>,
    /// Latest allowed settling time in seconds.
    pub max_settling_time: Option<f64>,
    /// Largest allowed final tracking error in meters.
    pub max_steady_state_error: Option<f64>,
    /// Longest allowed rise time in seconds.
    pub max_rise_time: Option<f64>,
}

impl Default for AcceptanceCriteria {
    fn default() -> Self {
        Self {
            max_overshoot_percent: Some(5.0),
            max_settling_time: None,
            max_steady_state_error: Some(0.5),
            max_rise_time: None,
        }
    }
}

/// Outcome of a single check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    /// Name of the metric checked.
    pub name: String,
    /// Measured value, `None` when the metric is undefined.
    pub measured: Option<f64>,
    /// Inclusive upper limit.
    pub limit: f64,
    /// Whether the measured value is defined and within the limit.
    pub passed: bool,
}

/// All checks of one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcceptanceReport {
    /// Individual check outcomes in evaluation order.
    pub checks: Vec<CheckResult>,
    /// `true` when every check passed.
    pub passed: bool,
}

impl AcceptanceCriteria {
    /// Evaluates `metrics` against the configured limits.
    pub fn evaluate(&self, metrics: &PerformanceMetrics) -> AcceptanceReport {
        let candidates = [
            ("overshoot_percent", Some(metrics.overshoot_percent), self.max_overshoot_percent),
            ("settling_time", metrics.settling_time, self.max_settling_time),
            ("steady_state_error", Some(metrics.steady_state_error), self.max_steady_state_error),
            ("rise_time", metrics.rise_time, self.max_rise_time),
        ];

        let checks: Vec<CheckResult> = candidates
            .into_iter()
            .filter_map(|(name, measured, limit)| {
                limit.map(|limit| CheckResult {
                    name: name.to_owned(),
                    measured,
                    limit,
                    passed: measured.is_some_and(|value| value <= limit),
                })
            })
            .collect();
        let passed = checks.iter().all(|check| check.passed);

        AcceptanceReport { checks, passed }
    }
}

impl fmt::Display for AcceptanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for check in &self.checks {
            let measured = match check.measured {
                Some(value) => format!("{value:.4}"),
                None => "undefined".to_owned(),
            };
            writeln!(
                f,
                "{:<20} {:>12} <= {:<10} {}",
                check.name,
                measured,
                check.limit,
                if check.passed { "PASS" } else { "FAIL" }
            )?;
        }
        write!(f, "overall: {}", if self.passed { "PASS" } else { "FAIL" })
    }
}
