// src/config.rs

//! # Simulation Parameters
//!
//! One immutable [`SimulationParameters`] value describes a complete run:
//! vehicle, actuator, controller, command, disturbance, optional sensor,
//! and the time grid. Parameters are plain serde structures, so they can
//! be built in code, loaded from YAML, or round-tripped through JSON.
//! [`SimulationParameters::validate`] rejects physically meaningless
//! values before any integration happens.

use crate::command::CommandProfile;
use crate::controller::ControllerConfig;
use crate::disturbance::DisturbanceConfig;
use crate::error::{Result, SimulationError};
use crate::plant::STANDARD_GRAVITY;
use crate::sensor::SensorConfig;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

/// Largest number of integration steps a single run may take.
pub const MAX_STEPS: u64 = 100_000_000;

/// Point-mass vehicle properties.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleParameters {
    /// Mass in kilograms.
    pub mass: f64,
    /// Gravitational acceleration in m/s².
    pub gravity: f64,
    /// Linear drag coefficient in Ns/m.
    pub drag: f64,
    /// Whether the ground plane at altitude zero stops the vehicle.
    pub ground_contact: bool,
}

impl Default for VehicleParameters {
    fn default() -> Self {
        Self {
            mass: 1.0,
            gravity: STANDARD_GRAVITY,
            drag: 0.1,
            ground_contact: true,
        }
    }
}

/// Thrust actuator properties.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActuatorParameters {
    /// Thrust in newtons at full command.
    pub gain: f64,
    /// First-order lag time constant in seconds.
    pub time_constant: f64,
}

impl Default for ActuatorParameters {
    fn default() -> Self {
        Self {
            gain: 10.0,
            time_constant: 0.1,
        }
    }
}

/// Complete, immutable configuration of one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParameters {
    /// Vehicle properties.
    pub vehicle: VehicleParameters,
    /// Actuator properties.
    pub actuator: ActuatorParameters,
    /// PID gains and limits.
    pub controller: ControllerConfig<f64>,
    /// Commanded altitude over time.
    pub command: CommandProfile,
    /// Exogenous disturbance force.
    pub disturbance: DisturbanceConfig,
    /// Altimeter model; `None` feeds the true altitude back.
    pub sensor: Option<SensorConfig>,
    /// Integration step in seconds.
    pub time_step: f64,
    /// Simulated duration in seconds.
    pub duration: f64,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            vehicle: VehicleParameters::default(),
            actuator: ActuatorParameters::default(),
            controller: ControllerConfig {
                kp: 1.0,
                ki: 0.1,
                kd: 0.5,
                ..ControllerConfig::new()
            },
            command: CommandProfile::default(),
            disturbance: DisturbanceConfig::None,
            sensor: None,
            time_step: 0.001,
            duration: 20.0,
        }
    }
}

impl SimulationParameters {
    /// Parses and validates parameters from a YAML document.
    /// Omitted fields take their default values.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let params: SimulationParameters = serde_yaml::from_str(yaml)?;
        params.validate()?;
        Ok(params)
    }

    /// Checks every parameter, failing on the first violation.
    pub fn validate(&self) -> Result<()> {
        positive("vehicle.mass", self.vehicle.mass)?;
        non_negative("vehicle.gravity", self.vehicle.gravity)?;
        non_negative("vehicle.drag", self.vehicle.drag)?;
        positive("actuator.gain", self.actuator.gain)?;
        positive("actuator.time_constant", self.actuator.time_constant)?;

        let controller = &self.controller;
        finite("controller.kp", controller.kp)?;
        finite("controller.ki", controller.ki)?;
        finite("controller.kd", controller.kd)?;
        finite("controller.output_min", controller.output_min)?;
        finite("controller.output_max", controller.output_max)?;
        if !(controller.output_min < controller.output_max) {
            return Err(SimulationError::InvalidConfiguration {
                field: "controller.output_max",
                reason: "must be greater than controller.output_min",
            });
        }
        non_negative("controller.anti_windup_gain", controller.anti_windup_gain)?;
        if !(controller.derivative_filter > 0.0 && controller.derivative_filter <= 1.0) {
            return Err(SimulationError::InvalidConfiguration {
                field: "controller.derivative_filter",
                reason: "must lie in (0, 1]",
            });
        }

        self.command.validate()?;
        self.disturbance.validate()?;
        if let Some(sensor) = &self.sensor {
            sensor.validate()?;
        }

        positive("time_step", self.time_step)?;
        positive("duration", self.duration)?;
        if !(self.duration / self.time_step <= MAX_STEPS as f64) {
            return Err(SimulationError::InvalidConfiguration {
                field: "duration",
                reason: "needs more than 100000000 time steps at this time_step",
            });
        }
        Ok(())
    }

    /// Number of integration steps after the initial sample, `⌈T/Δt⌉`.
    ///
    /// Ratios within rounding noise of an integer are not pushed up to
    /// the next step.
    pub fn step_count(&self) -> u64 {
        let ratio = self.duration / self.time_step;
        let nearest = ratio.round();
        if (ratio - nearest).abs() <= 1e-9 * nearest.max(1.0) {
            nearest as u64
        } else {
            ratio.ceil() as u64
        }
    }

    /// Number of samples a completed run records, saturating at `usize::MAX`.
    pub fn sample_count(&self) -> usize {
        usize::try_from(self.step_count())
            .ok()
            .and_then(|steps| steps.checked_add(1))
            .unwrap_or(usize::MAX)
    }
}

/// Loads and validates parameters from a YAML file.
pub fn load_parameters<P: AsRef<Path>>(path: P) -> Result<SimulationParameters> {
    let file = File::open(path)?;
    let params: SimulationParameters = serde_yaml::from_reader(file)?;
    params.validate()?;
    Ok(params)
}

fn finite(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SimulationError::InvalidConfiguration {
            field,
            reason: "must be finite",
        })
    }
}

fn positive(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SimulationError::InvalidConfiguration {
            field,
            reason: "must be finite and strictly positive",
        })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SimulationError::InvalidConfiguration {
            field,
            reason: "must be finite and non-negative",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn rejected_field(params: &SimulationParameters) -> Option<&'static str> {
        match params.validate() {
            Err(SimulationError::InvalidConfiguration { field, .. }) => Some(field),
            _ => None,
        }
    }

    #[test]
    fn test_default_parameters_are_valid() {
        assert!(SimulationParameters::default().validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_non_physical_values() {
        let mut params = SimulationParameters::default();
        params.vehicle.mass = 0.0;
        assert_eq!(Some("vehicle.mass"), rejected_field(&params));

        let mut params = SimulationParameters::default();
        params.actuator.time_constant = -0.1;
        assert_eq!(Some("actuator.time_constant"), rejected_field(&params));

        let mut params = SimulationParameters::default();
        params.time_step = 0.0;
        assert_eq!(Some("time_step"), rejected_field(&params));

        let mut params = SimulationParameters::default();
        params.duration = f64::INFINITY;
        assert_eq!(Some("duration"), rejected_field(&params));
    }

    #[test]
    fn test_validation_rejects_non_finite_gains() {
        let mut params = SimulationParameters::default();
        params.controller.ki = f64::NAN;
        assert_eq!(Some("controller.ki"), rejected_field(&params));

        let mut params = SimulationParameters::default();
        params.controller.kd = f64::NEG_INFINITY;
        assert_eq!(Some("controller.kd"), rejected_field(&params));
    }

    #[test]
    fn test_validation_rejects_inverted_output_limits() {
        let mut params = SimulationParameters::default();
        params.controller.output_min = 1.0;
        params.controller.output_max = 0.0;
        assert_eq!(Some("controller.output_max"), rejected_field(&params));
    }

    #[test]
    fn test_step_count() {
        let mut params = SimulationParameters::default();
        assert_eq!(20_000, params.step_count());

        params.time_step = 0.3;
        params.duration = 1.0;
        assert_eq!(4, params.step_count());
        assert_eq!(5, params.sample_count());

        params.time_step = 0.1;
        params.duration = 0.3;
        assert_eq!(3, params.step_count(), "Rounding noise must not add a step.");
    }

    #[test]
    fn test_validation_rejects_oversized_grid() {
        let params = SimulationParameters {
            time_step: 1e-9,
            duration: 1e9,
            ..SimulationParameters::default()
        };
        assert_eq!(Some("duration"), rejected_field(&params));

        let params = SimulationParameters {
            time_step: 1e-6,
            duration: 100.0,
            ..SimulationParameters::default()
        };
        assert!(params.validate().is_ok(), "Exactly MAX_STEPS steps is allowed.");
        assert_eq!(MAX_STEPS, params.step_count());
    }

    #[test]
    fn test_sample_count_saturates() {
        let params = SimulationParameters {
            time_step: f64::MIN_POSITIVE,
            duration: f64::MAX,
            ..SimulationParameters::default()
        };
        assert_eq!(usize::MAX, params.sample_count());
    }

    #[test]
    fn test_yaml_partial_document_uses_defaults() {
        let yaml = "
vehicle:
  mass: 1.2
controller:
  kp: 2.0
disturbance:
  mode: step
  magnitude: 2.0
  start: 5.0
  duration: 2.0
sensor:
  noise_variance: 0.01
duration: 10.0
";
        let params = SimulationParameters::from_yaml_str(yaml).unwrap();

        assert_eq!(1.2, params.vehicle.mass);
        assert_eq!(STANDARD_GRAVITY, params.vehicle.gravity);
        assert_eq!(2.0, params.controller.kp);
        assert_eq!(1.0, params.controller.output_max);
        assert_eq!(0.01, params.sensor.unwrap().noise_variance);
        assert_eq!(10.0, params.duration);
        assert_eq!(0.001, params.time_step);
        assert!(matches!(params.disturbance, DisturbanceConfig::Step { .. }));
    }

    #[test]
    fn test_yaml_invalid_document_is_rejected() {
        let result = SimulationParameters::from_yaml_str("vehicle:\n  mass: -1.0\n");
        assert!(matches!(
            result,
            Err(SimulationError::InvalidConfiguration {
                field: "vehicle.mass",
                ..
            })
        ));

        let result = SimulationParameters::from_yaml_str("time_step: [1, 2]\n");
        assert!(matches!(result, Err(SimulationError::Yaml(_))));
    }

    #[test]
    fn test_load_parameters_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "time_step: 0.01\nduration: 5.0").unwrap();

        let params = load_parameters(file.path()).unwrap();
        assert_eq!(500, params.step_count());
    }
}
