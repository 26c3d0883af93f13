// src/disturbance.rs

//! # Disturbance Model
//!
//! Exogenous vertical force acting on the plant as a function of simulated
//! time. Four modes are supported: no disturbance, a step held over a time
//! window, a short impulse, and bounded zero-mean random noise that is
//! redrawn once per its own sample period and held in between.

use crate::error::{Result, SimulationError};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Uniform};
use serde::{Deserialize, Serialize};

/// Slack used when mapping a simulation time onto a sample index, so grid
/// times such as `300 * 0.001` land on the sample boundary they represent.
pub(crate) const SAMPLE_EPSILON: f64 = 1e-9;

fn default_impulse_width() -> f64 {
    0.01
}

/// Disturbance mode and its timing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum DisturbanceConfig {
    /// No disturbance.
    #[default]
    None,
    /// `magnitude` newtons during `[start, start + duration)`.
    Step {
        /// Force in newtons, positive upward.
        magnitude: f64,
        /// Onset time in seconds.
        start: f64,
        /// Length of the active window in seconds.
        duration: f64,
    },
    /// `magnitude` newtons during the short window `[start, start + width)`.
    Impulse {
        /// Force in newtons, positive upward.
        magnitude: f64,
        /// Onset time in seconds.
        start: f64,
        /// Length of the impulse in seconds.
        #[serde(default = "default_impulse_width")]
        width: f64,
    },
    /// Uniform noise in `[-magnitude, magnitude]`, redrawn every `sample_period`.
    BoundedRandom {
        /// Bound of the noise in newtons.
        magnitude: f64,
        /// Interval between draws in seconds.
        sample_period: f64,
        /// Seed of the noise generator.
        #[serde(default)]
        seed: u64,
    },
}

impl DisturbanceConfig {
    /// Checks timing and magnitude values.
    pub fn validate(&self) -> Result<()> {
        match *self {
            DisturbanceConfig::None => Ok(()),
            DisturbanceConfig::Step {
                magnitude,
                start,
                duration,
            } => {
                require_finite("disturbance.magnitude", magnitude)?;
                require_finite("disturbance.start", start)?;
                if !(duration >= 0.0) {
                    return Err(SimulationError::InvalidConfiguration {
                        field: "disturbance.duration",
                        reason: "must be non-negative",
                    });
                }
                Ok(())
            }
            DisturbanceConfig::Impulse {
                magnitude,
                start,
                width,
            } => {
                require_finite("disturbance.magnitude", magnitude)?;
                require_finite("disturbance.start", start)?;
                if !(width > 0.0 && width.is_finite()) {
                    return Err(SimulationError::InvalidConfiguration {
                        field: "disturbance.width",
                        reason: "must be finite and strictly positive",
                    });
                }
                Ok(())
            }
            DisturbanceConfig::BoundedRandom {
                magnitude,
                sample_period,
                ..
            } => {
                if !(magnitude >= 0.0 && magnitude.is_finite()) {
                    return Err(SimulationError::InvalidConfiguration {
                        field: "disturbance.magnitude",
                        reason: "must be finite and non-negative",
                    });
                }
                if !(sample_period > 0.0 && sample_period.is_finite()) {
                    return Err(SimulationError::InvalidConfiguration {
                        field: "disturbance.sample_period",
                        reason: "must be finite and strictly positive",
                    });
                }
                Ok(())
            }
        }
    }
}

fn require_finite(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SimulationError::InvalidConfiguration {
            field,
            reason: "must be finite",
        })
    }
}

/// Time-driven disturbance source for one run.
#[derive(Debug, Clone)]
pub struct DisturbanceModel {
    config: DisturbanceConfig,
    rng: StdRng,
    held: f64,
    sample_index: Option<u64>,
}

impl DisturbanceModel {
    /// Creates a disturbance source; random modes start from their seed.
    pub fn new(config: DisturbanceConfig) -> Self {
        let seed = match config {
            DisturbanceConfig::BoundedRandom { seed, .. } => seed,
            _ => 0,
        };
        Self {
            config,
            rng: StdRng::seed_from_u64(seed),
            held: 0.0,
            sample_index: None,
        }
    }

    /// Disturbance force in newtons at `time`.
    pub fn force_at(&mut self, time: f64) -> f64 {
        match self.config {
            DisturbanceConfig::None => 0.0,
            DisturbanceConfig::Step {
                magnitude,
                start,
                duration,
            } => window(time, start, duration, magnitude),
            DisturbanceConfig::Impulse {
                magnitude,
                start,
                width,
            } => window(time, start, width, magnitude),
            DisturbanceConfig::BoundedRandom {
                magnitude,
                sample_period,
                ..
            } => {
                let index = (time / sample_period + SAMPLE_EPSILON).floor().max(0.0) as u64;
                if self.sample_index != Some(index) {
                    let bound = magnitude.abs();
                    self.held = Uniform::new_inclusive(-bound, bound).sample(&mut self.rng);
                    self.sample_index = Some(index);
                }
                self.held
            }
        }
    }
}

fn window(time: f64, start: f64, length: f64, magnitude: f64) -> f64 {
    if time >= start && time < start + length {
        magnitude
    } else {
        0.0
    }
}
