// src/sensor.rs

//! # Altitude Sensor Model
//!
//! Corrupts the true altitude the way a sampled altimeter would: additive
//! zero-mean Gaussian noise, sample-and-hold between sensor sample
//! instants, and quantization to the sensor resolution.

use crate::disturbance::SAMPLE_EPSILON;
use crate::error::{Result, SimulationError};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

/// Altimeter characteristics.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    /// Variance of the additive noise in m². Zero disables noise.
    pub noise_variance: f64,
    /// Interval between sensor samples in seconds. Zero samples on every step.
    pub sample_period: f64,
    /// Quantization step in meters. Zero disables quantization.
    pub resolution: f64,
    /// Seed of the noise generator.
    pub seed: u64,
}

impl SensorConfig {
    /// Checks that all values are finite and non-negative.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("sensor.noise_variance", self.noise_variance),
            ("sensor.sample_period", self.sample_period),
            ("sensor.resolution", self.resolution),
        ];
        for (field, value) in fields {
            if !(value >= 0.0 && value.is_finite()) {
                return Err(SimulationError::InvalidConfiguration {
                    field,
                    reason: "must be finite and non-negative",
                });
            }
        }
        Ok(())
    }
}

/// Sampled, noisy, quantized altimeter for one run.
#[derive(Debug, Clone)]
pub struct SensorModel {
    config: SensorConfig,
    noise: Option<Normal<f64>>,
    rng: StdRng,
    held: f64,
    sample_index: Option<u64>,
}

impl SensorModel {
    /// Creates a sensor that takes its first sample on the first measurement.
    pub fn new(config: SensorConfig) -> Result<Self> {
        config.validate()?;
        let noise = if config.noise_variance > 0.0 {
            let noise = Normal::new(0.0, config.noise_variance.sqrt()).map_err(|_| {
                SimulationError::InvalidConfiguration {
                    field: "sensor.noise_variance",
                    reason: "does not describe a normal distribution",
                }
            })?;
            Some(noise)
        } else {
            None
        };

        Ok(Self {
            config,
            noise,
            rng: StdRng::seed_from_u64(config.seed),
            held: 0.0,
            sample_index: None,
        })
    }

    /// Sensed altitude at `time` given the true altitude.
    ///
    /// A new reading is taken only when `time` crosses into a new sensor
    /// sample period; in between the previous reading is held.
    pub fn measure(&mut self, time: f64, altitude: f64) -> f64 {
        let index = if self.config.sample_period > 0.0 {
            Some((time / self.config.sample_period + SAMPLE_EPSILON).floor().max(0.0) as u64)
        } else {
            None
        };

        if index.is_none() || index != self.sample_index {
            let noisy = match self.noise {
                Some(noise) => altitude + noise.sample(&mut self.rng),
                None => altitude,
            };
            self.held = self.quantize(noisy);
            self.sample_index = index;
        }
        self.held
    }

    fn quantize(&self, value: f64) -> f64 {
        if self.config.resolution > 0.0 {
            (value / self.config.resolution).round() * self.config.resolution
        } else {
            value
        }
    }
}
