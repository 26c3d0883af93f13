// src/pid/altitude.rs

//! # Altitude PID Control Module
//!
//! This module provides a compute function and control data structure
//! to perform altitude PID (Proportional-Integral-Derivative) control
//! calculations with back-calculation anti-windup.

use crate::Number;
use piddiy::PidController;

/// Control data for the altitude PID compute callback.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AltitudeControlData<T> {
    /// The tracking error, commanded altitude minus sensed altitude.
    pub error: T,
    /// The time delta since the last computation.
    pub dt: T,
    /// The (optionally filtered) error derivative for this step.
    pub derivative: T,
    /// Unsaturated minus saturated output from the previous step.
    pub saturation_error: T,
    /// Gain applied to `saturation_error` before it is removed from the integral.
    pub anti_windup_gain: T,
}

/// Altitude PID compute callback.
///
/// The integral accumulates `error * dt` and bleeds off the previous
/// step's saturation error scaled by the anti-windup gain, so the
/// integrator stops growing while the output is pinned at a limit.
pub fn compute_altitude<T: Number>(
    pid: &mut PidController<T, AltitudeControlData<T>>,
    data: AltitudeControlData<T>,
) -> (T, T, T) {
    let error = data.error;
    let integral = pid.integral + (error - data.anti_windup_gain * data.saturation_error) * data.dt;

    (error, integral, data.derivative)
}
