// src/plant.rs

//! # Vertical Plant Model
//!
//! Point-mass vertical dynamics under thrust, gravity, linear drag, and an
//! exogenous disturbance force, integrated with explicit Euler on velocity
//! followed by position.
//!
//! An optional ground plane at altitude zero keeps a vehicle that is not
//! producing enough thrust resting on the ground instead of falling
//! through it.

use crate::Number;
use serde::{Deserialize, Serialize};

/// Standard gravitational acceleration in m/s².
pub const STANDARD_GRAVITY: f64 = 9.81;

/// Mutable plant state.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlantState<T> {
    /// Altitude above the ground plane in meters.
    pub altitude: T,
    /// Vertical velocity in m/s, positive upward.
    pub velocity: T,
    /// Vertical acceleration of the last step in m/s².
    pub acceleration: T,
}

/// Vertical force balance of a thrust-driven vehicle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlantModel<T> {
    mass: T,
    gravity: T,
    drag: T,
    ground_contact: bool,
    state: PlantState<T>,
}

impl<T: Number> PlantModel<T> {
    /// Creates a plant at rest on the ground.
    ///
    /// * `mass` - Vehicle mass in kilograms.
    /// * `gravity` - Gravitational acceleration in m/s².
    /// * `drag` - Linear drag coefficient in Ns/m.
    pub fn new(mass: T, gravity: T, drag: T) -> Self {
        Self {
            mass,
            gravity,
            drag,
            ground_contact: true,
            state: PlantState {
                altitude: T::zero(),
                velocity: T::zero(),
                acceleration: T::zero(),
            },
        }
    }

    /// Enables or disables the ground plane at altitude zero.
    pub fn with_ground_contact(mut self, ground_contact: bool) -> Self {
        self.ground_contact = ground_contact;
        self
    }

    /// Current plant state.
    pub fn state(&self) -> PlantState<T> {
        self.state
    }

    /// Net vertical force for the given thrust and disturbance at the current velocity.
    pub fn net_force(&self, thrust: T, disturbance: T) -> T {
        thrust - self.mass * self.gravity - self.drag * self.state.velocity + disturbance
    }

    /// Advances the plant by `dt` and returns the new state.
    pub fn step(&mut self, thrust: T, disturbance: T, dt: T) -> PlantState<T> {
        let acceleration = self.net_force(thrust, disturbance) / self.mass;
        let mut velocity = self.state.velocity + acceleration * dt;
        let mut altitude = self.state.altitude + velocity * dt;

        if self.ground_contact && altitude < T::zero() {
            altitude = T::zero();
            if velocity < T::zero() {
                velocity = T::zero();
            }
        }

        self.state = PlantState {
            altitude,
            velocity,
            acceleration,
        };
        self.state
    }
}
