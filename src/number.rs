// src/number.rs

//! Shared numeric bound for the controller, actuator, and plant models.
//! These models run on `f32`, `f64`, or fixed-point types alike; the
//! simulation loop instantiates them with `f64`.

use piddiy::Number as PiddiyNumber;

/// Custom trait to encapsulate base number requirements.
pub trait Number: PiddiyNumber {
    /// Clamps generic PartialOrd values within a given range.
    fn clamp(self, min: Self, max: Self) -> Self {
        num_traits::clamp(self, min, max)
    }
}

impl<T: PiddiyNumber> Number for T {}
