// src/command.rs

//! # Commanded Altitude
//!
//! The loop asks a [`CommandSignal`] for the commanded altitude at every
//! sample time. [`CommandProfile`] covers the serializable cases; any
//! `Fn(f64) -> f64` closure works as well.

use crate::error::{Result, SimulationError};
use serde::{Deserialize, Serialize};

/// Source of the commanded altitude over time.
pub trait CommandSignal {
    /// Commanded altitude in meters at `time` seconds.
    fn command_at(&self, time: f64) -> f64;
}

impl<F> CommandSignal for F
where
    F: Fn(f64) -> f64,
{
    fn command_at(&self, time: f64) -> f64 {
        self(time)
    }
}

/// A point of a piecewise-constant command schedule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CommandPoint {
    /// Time from which `value` applies, in seconds.
    pub time: f64,
    /// Commanded altitude in meters.
    pub value: f64,
}

/// Serializable command profiles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum CommandProfile {
    /// The same altitude for the whole run.
    Constant {
        /// Commanded altitude in meters.
        value: f64,
    },
    /// `initial` before `time`, `value` from `time` on.
    Step {
        /// Commanded altitude before the step.
        #[serde(default)]
        initial: f64,
        /// Commanded altitude after the step.
        value: f64,
        /// Step time in seconds.
        time: f64,
    },
    /// `initial` until the first point, then each point's value from its time on.
    Schedule {
        /// Commanded altitude before the first point.
        #[serde(default)]
        initial: f64,
        /// Points in ascending time order.
        points: Vec<CommandPoint>,
    },
}

impl Default for CommandProfile {
    fn default() -> Self {
        CommandProfile::Step {
            initial: 0.0,
            value: 5.0,
            time: 2.0,
        }
    }
}

impl CommandProfile {
    /// Checks that every value is finite and schedule points are ordered.
    pub fn validate(&self) -> Result<()> {
        let invalid = |field: &'static str| SimulationError::InvalidConfiguration {
            field,
            reason: "must be finite",
        };
        match self {
            CommandProfile::Constant { value } => {
                if !value.is_finite() {
                    return Err(invalid("command.value"));
                }
            }
            CommandProfile::Step {
                initial,
                value,
                time,
            } => {
                if !initial.is_finite() {
                    return Err(invalid("command.initial"));
                }
                if !value.is_finite() {
                    return Err(invalid("command.value"));
                }
                if !time.is_finite() {
                    return Err(invalid("command.time"));
                }
            }
            CommandProfile::Schedule { initial, points } => {
                if !initial.is_finite() {
                    return Err(invalid("command.initial"));
                }
                if points
                    .iter()
                    .any(|point| !point.time.is_finite() || !point.value.is_finite())
                {
                    return Err(invalid("command.points"));
                }
                if points.windows(2).any(|pair| pair[1].time < pair[0].time) {
                    return Err(SimulationError::InvalidConfiguration {
                        field: "command.points",
                        reason: "must be sorted by time",
                    });
                }
            }
        }
        Ok(())
    }
}

impl CommandSignal for CommandProfile {
    fn command_at(&self, time: f64) -> f64 {
        match self {
            CommandProfile::Constant { value } => *value,
            CommandProfile::Step {
                initial,
                value,
                time: step_time,
            } => {
                if time >= *step_time {
                    *value
                } else {
                    *initial
                }
            }
            CommandProfile::Schedule { initial, points } => points
                .iter()
                .take_while(|point| point.time <= time)
                .last()
                .map_or(*initial, |point| point.value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_step() {
        let profile = CommandProfile::default();

        assert_eq!(0.0, profile.command_at(1.999));
        assert_eq!(5.0, profile.command_at(2.0));
        assert_eq!(5.0, profile.command_at(20.0));
    }

    #[test]
    fn test_command_schedule() {
        let profile: CommandProfile = serde_yaml::from_str(
            "kind: schedule\npoints:\n  - { time: 1.0, value: 3.0 }\n  - { time: 4.0, value: 1.5 }\n",
        )
        .unwrap();

        assert_eq!(0.0, profile.command_at(0.5));
        assert_eq!(3.0, profile.command_at(1.0));
        assert_eq!(3.0, profile.command_at(3.9));
        assert_eq!(1.5, profile.command_at(10.0));
    }

    #[test]
    fn test_command_closure() {
        let ramp = |time: f64| 0.5 * time;
        assert_eq!(2.0, ramp.command_at(4.0));
    }

    #[test]
    fn test_command_validation() {
        let unordered = CommandProfile::Schedule {
            initial: 0.0,
            points: vec![
                CommandPoint { time: 2.0, value: 1.0 },
                CommandPoint { time: 1.0, value: 2.0 },
            ],
        };

        assert!(unordered.validate().is_err());
        assert!(CommandProfile::Constant { value: f64::INFINITY }.validate().is_err());
        assert!(CommandProfile::default().validate().is_ok());
    }
}
