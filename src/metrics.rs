// src/metrics.rs

//! # Step Response Metrics
//!
//! Reduces a finished [`SimulationRecord`] to the usual control figures of
//! merit, measured on the true altitude against a reference value `C`.
//!
//! | Metric | Definition |
//! |---|---|
//! | overshoot | `max(0, (peak - C) / C * 100)`, exactly `0` when `C == 0` |
//! | settling time | first time after which every sample stays in the band |
//! | rise time | first `rise_high * C` crossing minus first `rise_low * C` crossing |
//! | steady-state error | `abs(h[last] - C)` |
//! | thrust variation | `max - min` of the thrust command |
//!
//! The peak is the maximum altitude for a non-negative reference and the
//! minimum for a negative one. The settling band is `settling_tolerance * |C|`,
//! or the absolute `zero_command_band` when `C == 0`.
//!
//! Outcomes that some parameter sets legitimately produce are `None`
//! rather than errors: a rise level that is never reached, a zero
//! reference (no rise defined), or a response that is still outside the
//! band at the last sample (not settled).

use crate::error::{Result, SimulationError};
use crate::simulation::{Sample, SimulationRecord};
use serde::{Deserialize, Serialize};

/// Tolerances used when extracting metrics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Settling band as a fraction of `|C|`.
    pub settling_tolerance: f64,
    /// Absolute settling band in meters used when `C == 0`.
    pub zero_command_band: f64,
    /// Lower rise level as a fraction of `C`.
    pub rise_low: f64,
    /// Upper rise level as a fraction of `C`.
    pub rise_high: f64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            settling_tolerance: 0.05,
            zero_command_band: 0.05,
            rise_low: 0.1,
            rise_high: 0.9,
        }
    }
}

impl MetricsConfig {
    /// Settling band of the given width, other values at their defaults.
    pub fn with_tolerance(settling_tolerance: f64) -> Self {
        Self {
            settling_tolerance,
            ..Self::default()
        }
    }

    /// Checks that bands are positive and rise levels ordered within `[0, 1]`.
    pub fn validate(&self) -> Result<()> {
        if !(self.settling_tolerance > 0.0 && self.settling_tolerance.is_finite()) {
            return Err(SimulationError::InvalidConfiguration {
                field: "metrics.settling_tolerance",
                reason: "must be finite and strictly positive",
            });
        }
        if !(self.zero_command_band > 0.0 && self.zero_command_band.is_finite()) {
            return Err(SimulationError::InvalidConfiguration {
                field: "metrics.zero_command_band",
                reason: "must be finite and strictly positive",
            });
        }
        if !(0.0 <= self.rise_low && self.rise_low < self.rise_high && self.rise_high <= 1.0) {
            return Err(SimulationError::InvalidConfiguration {
                field: "metrics.rise_high",
                reason: "rise levels must satisfy 0 <= rise_low < rise_high <= 1",
            });
        }
        Ok(())
    }
}

/// Scalar summary of one run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    /// Reference value `C` in meters.
    pub reference: f64,
    /// Overshoot past the reference, in percent.
    pub overshoot_percent: f64,
    /// Settling time in seconds, `None` if the run ends outside the band.
    pub settling_time: Option<f64>,
    /// Rise time in seconds, `None` if a rise level is never reached.
    pub rise_time: Option<f64>,
    /// Final tracking error in meters.
    pub steady_state_error: f64,
    /// Spread of the thrust command.
    pub thrust_variation: f64,
    /// Largest thrust command.
    pub max_thrust: f64,
    /// Smallest thrust command.
    pub min_thrust: f64,
    /// Extreme altitude in the direction of the reference.
    pub peak_altitude: f64,
    /// Time of the first sample at the peak altitude.
    pub peak_time: f64,
}

/// Extracts metrics against the last commanded altitude of the record.
pub fn extract_metrics(record: &SimulationRecord, config: &MetricsConfig) -> Result<PerformanceMetrics> {
    let last = record.last().ok_or(SimulationError::EmptyRecord)?;
    extract_metrics_with_reference(record, last.commanded_altitude, config)
}

/// Extracts metrics against an explicit reference value.
///
/// Fails on empty or unstable records, a non-finite reference, and an
/// invalid `config`.
pub fn extract_metrics_with_reference(
    record: &SimulationRecord,
    reference: f64,
    config: &MetricsConfig,
) -> Result<PerformanceMetrics> {
    config.validate()?;
    record.ensure_stable()?;
    if !reference.is_finite() {
        return Err(SimulationError::InvalidInput {
            reason: "metric reference must be finite",
        });
    }
    let samples = record.samples();
    let last = samples.last().ok_or(SimulationError::EmptyRecord)?;

    let (peak_altitude, peak_time) = peak(samples, reference);
    let overshoot_percent = if reference == 0.0 {
        0.0
    } else {
        ((peak_altitude - reference) / reference * 100.0).max(0.0)
    };

    let band = if reference == 0.0 {
        config.zero_command_band
    } else {
        config.settling_tolerance * reference.abs()
    };

    let (max_thrust, min_thrust) = samples.iter().fold(
        (f64::NEG_INFINITY, f64::INFINITY),
        |(max, min), sample| (max.max(sample.thrust_command), min.min(sample.thrust_command)),
    );

    Ok(PerformanceMetrics {
        reference,
        overshoot_percent,
        settling_time: settling_time(samples, reference, band),
        rise_time: rise_time(samples, reference, config),
        steady_state_error: (last.true_altitude - reference).abs(),
        thrust_variation: max_thrust - min_thrust,
        max_thrust,
        min_thrust,
        peak_altitude,
        peak_time,
    })
}

fn peak(samples: &[Sample], reference: f64) -> (f64, f64) {
    let beyond = |candidate: f64, current: f64| {
        if reference < 0.0 {
            candidate < current
        } else {
            candidate > current
        }
    };
    samples[1..].iter().fold(
        (samples[0].true_altitude, samples[0].time),
        |(altitude, time), sample| {
            if beyond(sample.true_altitude, altitude) {
                (sample.true_altitude, sample.time)
            } else {
                (altitude, time)
            }
        },
    )
}

fn settling_time(samples: &[Sample], reference: f64, band: f64) -> Option<f64> {
    match samples
        .iter()
        .rposition(|sample| (sample.true_altitude - reference).abs() > band)
    {
        None => Some(samples[0].time),
        Some(index) => samples.get(index + 1).map(|sample| sample.time),
    }
}

fn rise_time(samples: &[Sample], reference: f64, config: &MetricsConfig) -> Option<f64> {
    if reference == 0.0 {
        return None;
    }
    let first_reaching = |fraction: f64| {
        let level = fraction * reference;
        samples
            .iter()
            .find(|sample| {
                if reference > 0.0 {
                    sample.true_altitude >= level
                } else {
                    sample.true_altitude <= level
                }
            })
            .map(|sample| sample.time)
    };
    Some(first_reaching(config.rise_high)? - first_reaching(config.rise_low)?)
}
