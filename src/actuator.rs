// src/actuator.rs

//! # Actuator Model
//!
//! First-order lag between the normalized thrust command and the physical
//! thrust force. The command is saturated to `[0, 1]` before it enters the
//! lag, and the resulting force is saturated to `[0, gain]`, so the
//! actuator never changes thrust instantaneously and never pulls downward.

use crate::Number;
use serde::{Deserialize, Serialize};

/// Mutable actuator state.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ActuatorState<T> {
    /// Lagged, normalized actuator output.
    pub output: T,
}

/// First-order lag actuator mapping a normalized command into thrust.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActuatorModel<T> {
    gain: T,
    time_constant: T,
    state: ActuatorState<T>,
}

impl<T: Number> ActuatorModel<T> {
    /// Creates an actuator at rest.
    ///
    /// * `gain` - Thrust in newtons produced by a full (unit) command.
    /// * `time_constant` - Lag time constant in seconds.
    pub fn new(gain: T, time_constant: T) -> Self {
        Self {
            gain,
            time_constant,
            state: ActuatorState { output: T::zero() },
        }
    }

    /// Current actuator state.
    pub fn state(&self) -> ActuatorState<T> {
        self.state
    }

    /// Advances the lag by `dt` toward `command` and returns the thrust force.
    ///
    /// The blend factor `dt / tau` is capped at one, so a step longer than the
    /// time constant lands on the command instead of overshooting it.
    pub fn step(&mut self, command: T, dt: T) -> T {
        let command = command.clamp(T::zero(), T::one());
        let blend = (dt / self.time_constant).clamp(T::zero(), T::one());
        self.state.output = self.state.output + (command - self.state.output) * blend;

        (self.state.output * self.gain).clamp(T::zero(), self.gain)
    }
}
