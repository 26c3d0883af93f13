// src/controller.rs

//! # Altitude PID Controller
//!
//! This module wraps a `piddiy` PID controller with the pieces an altitude
//! hold loop needs on top of the bare P, I, and D terms.
//!
//! ## Overview
//!
//! Each call to [`AltitudeController::control`] takes the tracking error and
//! the time delta, and returns a thrust command clamped to the configured
//! output range (by default the normalized `[0, 1]` range of the actuator).
//!
//! - **Derivative:** computed on the raw tracking error, so a step in the
//!   commanded altitude produces a one-step derivative kick. An optional
//!   first-order low-pass filter smooths the term.
//! - **Anti-windup:** the difference between the unsaturated and saturated
//!   output is fed back through the anti-windup gain into the integrator on
//!   the following step (back-calculation).
//! - **State:** the integrator and previous error live inside the wrapped
//!   controller; [`AltitudeController::state`] exposes a snapshot and
//!   [`AltitudeController::reset`] returns to zero initial conditions.

use crate::error::{Result, SimulationError};
use crate::pid::{compute_altitude, low_pass_filter, AltitudeControlData, LowPassFilterState};
use crate::Number;
use piddiy::PidController;
use serde::{Deserialize, Serialize};

/// Configuration for PID gains, output limits, and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig<T> {
    /// Proportional gain.
    pub kp: T,
    /// Integral gain.
    pub ki: T,
    /// Derivative gain.
    pub kd: T,
    /// Lower limit of the controller output.
    pub output_min: T,
    /// Upper limit of the controller output.
    pub output_max: T,
    /// Gain applied to the saturation error fed back into the integrator.
    pub anti_windup_gain: T,
    /// Smoothing factor for the derivative low-pass filter.
    /// One disables filtering.
    pub derivative_filter: T,
}

impl<T: Number> ControllerConfig<T> {
    /// Creates a new configuration with default values for all parameters.
    /// Proportional-only control with unit gain, output limited to `[0, 1]`,
    /// unit anti-windup gain, and no derivative filtering.
    /// The gains should be replaced with values tuned for the vehicle.
    ///
    /// Example Usage
    /// ```
    /// use free_flight_altitude_hold::{AltitudeController, ControllerConfig};
    ///
    /// let mut config = ControllerConfig::<f64>::new();
    /// config.kp = 1.0;
    /// config.ki = 0.1;
    /// config.kd = 0.5;
    ///
    /// let mut controller = AltitudeController::with_config(config);
    /// let command = controller.control(5.0, 0.001).unwrap();
    /// assert_eq!(command, 1.0);
    /// ```
    pub fn new() -> Self {
        Self {
            kp: T::one(),
            ki: T::zero(),
            kd: T::zero(),
            output_min: T::zero(),
            output_max: T::one(),
            anti_windup_gain: T::one(),
            derivative_filter: T::one(),
        }
    }
}

impl<T: Number> Default for ControllerConfig<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of the mutable controller state.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ControllerState<T> {
    /// Accumulated integral of the error.
    pub integral: T,
    /// Error seen on the previous step, used for the derivative.
    pub previous_error: T,
    /// Saturated output produced on the previous step.
    pub previous_output: T,
    /// Unsaturated minus saturated output of the previous step.
    pub saturation_error: T,
}

/// Struct representing the altitude PID controller.
pub struct AltitudeController<T: Number> {
    pid: PidController<T, AltitudeControlData<T>>,
    config: ControllerConfig<T>,
    derivative_filter: LowPassFilterState<T>,
    previous_output: T,
    saturation_error: T,
}

impl<T: Number> AltitudeController<T> {
    /// Creates a new controller using the provided configuration
    pub fn with_config(config: ControllerConfig<T>) -> Self {
        let mut pid = PidController::new();
        pid.compute_fn(compute_altitude)
            .set_point(T::zero())
            .kp(config.kp)
            .ki(config.ki)
            .kd(config.kd);

        AltitudeController {
            pid,
            config,
            derivative_filter: LowPassFilterState { previous: T::zero() },
            previous_output: T::zero(),
            saturation_error: T::zero(),
        }
    }

    /// Creates a new controller with default settings
    pub fn new() -> Self {
        Self::with_config(ControllerConfig::new())
    }

    /// The configuration this controller was built with.
    pub fn config(&self) -> &ControllerConfig<T> {
        &self.config
    }

    /// Computes the saturated command for the given tracking error.
    ///
    /// Fails with [`SimulationError::InvalidInput`] when `dt` is not
    /// strictly positive.
    pub fn control(&mut self, error: T, dt: T) -> Result<T> {
        if !(dt > T::zero()) {
            return Err(SimulationError::InvalidInput {
                reason: "controller time step must be strictly positive",
            });
        }

        let raw_derivative = (error - self.pid.error) / dt;
        let (filter, derivative) = low_pass_filter(
            self.derivative_filter,
            raw_derivative,
            self.config.derivative_filter,
        );
        self.derivative_filter = filter;

        let data = AltitudeControlData {
            error,
            dt,
            derivative,
            saturation_error: self.saturation_error,
            anti_windup_gain: self.config.anti_windup_gain,
        };
        let unsaturated = self.pid.compute(data);
        let output = unsaturated.clamp(self.config.output_min, self.config.output_max);

        self.saturation_error = unsaturated - output;
        self.previous_output = output;
        Ok(output)
    }

    /// Returns a snapshot of the controller state.
    pub fn state(&self) -> ControllerState<T> {
        ControllerState {
            integral: self.pid.integral,
            previous_error: self.pid.error,
            previous_output: self.previous_output,
            saturation_error: self.saturation_error,
        }
    }

    /// Returns the controller to zero initial conditions, keeping its configuration.
    pub fn reset(&mut self) {
        *self = Self::with_config(self.config);
    }
}

impl<T: Number> Default for AltitudeController<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;
    use fixed::types::I16F16;

    fn config(kp: f64, ki: f64, kd: f64) -> ControllerConfig<f64> {
        ControllerConfig {
            kp,
            ki,
            kd,
            ..ControllerConfig::new()
        }
    }

    #[test]
    fn test_controller_initialization_with_default_config() {
        let controller = AltitudeController::<f64>::new();

        assert_eq!(*controller.config(), ControllerConfig::new());
        assert_eq!(controller.state(), ControllerState::default());
    }

    #[test]
    fn test_controller_rejects_non_positive_dt() {
        let mut controller = AltitudeController::<f64>::new();

        assert!(matches!(
            controller.control(1.0, 0.0),
            Err(SimulationError::InvalidInput { .. })
        ));
        assert!(matches!(
            controller.control(1.0, -0.01),
            Err(SimulationError::InvalidInput { .. })
        ));
        assert!(controller.control(1.0, f64::NAN).is_err());
        assert_eq!(controller.state(), ControllerState::default(), "Rejected input must not touch state.");
    }

    #[test]
    fn test_controller_unsaturated_output() {
        let mut controller = AltitudeController::with_config(config(0.1, 0.1, 0.01));

        // P 0.1 * 2, I 0.1 * (2 * 0.5), D 0.01 * (2 / 0.5)
        let output = controller.control(2.0, 0.5).unwrap();
        assert!(value_close(0.34, output));

        let state = controller.state();
        assert!(value_close(1.0, state.integral));
        assert!(value_close(2.0, state.previous_error));
        assert!(value_close(0.0, state.saturation_error));
    }

    #[test]
    fn test_controller_output_saturation() {
        let mut controller = AltitudeController::with_config(config(1.0, 0.0, 0.0));

        assert!(value_close(1.0, controller.control(5.0, 0.01).unwrap()));
        assert!(value_close(4.0, controller.state().saturation_error));

        assert!(value_close(0.0, controller.control(-5.0, 0.01).unwrap()));
        assert!(value_close(-5.0, controller.state().saturation_error));
    }

    #[test]
    fn test_controller_derivative_kick_on_step() {
        let mut controller = AltitudeController::with_config(ControllerConfig {
            output_min: -1000.0,
            output_max: 1000.0,
            ..config(0.0, 0.0, 0.5)
        });

        let _ = controller.control(0.0, 0.01).unwrap();
        let kick = controller.control(1.0, 0.01).unwrap();
        let settled = controller.control(1.0, 0.01).unwrap();

        assert!(value_close(50.0, kick), "Derivative acts on the raw error step.");
        assert!(value_close(0.0, settled));
    }

    #[test]
    fn test_controller_derivative_filter() {
        let mut controller = AltitudeController::with_config(ControllerConfig {
            output_min: -1000.0,
            output_max: 1000.0,
            derivative_filter: 0.5,
            ..config(0.0, 0.0, 1.0)
        });

        let first = controller.control(1.0, 0.1).unwrap();
        let second = controller.control(1.0, 0.1).unwrap();

        assert!(value_close(5.0, first), "Half of the raw derivative of 10.");
        assert!(value_close(2.5, second), "Filter decays toward the zero raw derivative.");
    }

    #[test]
    fn test_controller_anti_windup_limits_integral() {
        let mut limited = AltitudeController::with_config(config(1.0, 1.0, 0.0));
        let mut unlimited = AltitudeController::with_config(ControllerConfig {
            anti_windup_gain: 0.0,
            ..config(1.0, 1.0, 0.0)
        });

        for _ in 0..1000 {
            let _ = limited.control(5.0, 0.01).unwrap();
            let _ = unlimited.control(5.0, 0.01).unwrap();
        }

        assert!(value_close(50.0, unlimited.state().integral), "Plain integration grows without bound.");
        assert!(
            limited.state().integral < 1.0,
            "Back-calculation holds the integrator near the limit, got {}.",
            limited.state().integral
        );
    }

    /// Counts the steps a reversed error needs to pull the output off the upper limit.
    fn steps_to_leave_saturation(anti_windup_gain: f64) -> usize {
        let mut controller = AltitudeController::with_config(ControllerConfig {
            anti_windup_gain,
            ..config(0.5, 1.0, 0.0)
        });
        for _ in 0..500 {
            let _ = controller.control(4.0, 0.01).unwrap();
        }

        let mut steps = 0;
        while controller.control(-1.0, 0.01).unwrap() >= 1.0 && steps < 5000 {
            steps += 1;
        }
        steps
    }

    #[test]
    fn test_controller_recovers_quickly_after_saturation() {
        let limited = steps_to_leave_saturation(1.0);
        let unlimited = steps_to_leave_saturation(0.0);

        assert!(limited < 200, "Limited integrator took {limited} steps.");
        assert!(unlimited > 1000, "Wound-up integrator took {unlimited} steps.");
    }

    #[test]
    fn test_controller_reset() {
        let mut controller = AltitudeController::with_config(config(1.0, 1.0, 1.0));
        for _ in 0..10 {
            let _ = controller.control(3.0, 0.1).unwrap();
        }
        assert_ne!(controller.state(), ControllerState::default());

        controller.reset();
        assert_eq!(controller.state(), ControllerState::default());
        assert_eq!(*controller.config(), config(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_controller_fixed_point() {
        let mut config = ControllerConfig::<I16F16>::new();
        config.kp = I16F16::from_num(0.25);
        config.ki = I16F16::from_num(0.5);

        let mut controller = AltitudeController::with_config(config);
        let output = controller
            .control(I16F16::from_num(1), I16F16::from_num(0.5))
            .unwrap();

        // P 0.25 + I 0.5 * 0.5
        assert_eq!(I16F16::from_num(0.5), output);
    }
}
