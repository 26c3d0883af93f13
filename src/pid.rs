// src/pid.rs

//! # PID Control Module
//!
//! This module provides the compute callback, control data structure,
//! and derivative filter used to perform altitude PID
//! (Proportional-Integral-Derivative) control calculations.

pub mod altitude;
pub use altitude::*;
pub mod filter;
pub use filter::*;
