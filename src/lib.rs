// src/lib.rs

//! # PID Altitude Hold Simulation
//!
//! This crate simulates the vertical channel of a thrust-driven vehicle
//! under PID altitude hold and derives step-response performance metrics
//! from the resulting time series.
//!
//! The loop couples a point-mass plant, a first-order-lag thrust actuator,
//! an exogenous disturbance, an optional sampled and quantized altimeter,
//! and a saturating PID controller with back-calculation anti-windup. The
//! controller, actuator, and plant are generic over [`Number`], so they run
//! on floating point or fixed-point types alike.
//!
//! ```
//! use free_flight_altitude_hold::{extract_metrics, simulate, MetricsConfig, SimulationParameters};
//!
//! let params = SimulationParameters {
//!     time_step: 0.01,
//!     ..SimulationParameters::default()
//! };
//! let record = simulate(&params).unwrap();
//! let metrics = extract_metrics(&record, &MetricsConfig::default()).unwrap();
//!
//! assert_eq!(params.sample_count(), record.len());
//! assert!(metrics.overshoot_percent >= 0.0);
//! ```

#![deny(missing_docs)]

pub mod acceptance;
pub mod actuator;
pub mod command;
pub mod config;
pub mod controller;
pub mod disturbance;
pub mod error;
pub mod export;
pub mod metrics;
pub mod number;
pub mod pid;
pub mod plant;
pub mod sensor;
pub mod simulation;

#[doc(inline)]
pub use acceptance::{AcceptanceCriteria, AcceptanceReport, CheckResult};
#[doc(inline)]
pub use actuator::{ActuatorModel, ActuatorState};
#[doc(inline)]
pub use command::{CommandPoint, CommandProfile, CommandSignal};
#[doc(inline)]
pub use config::{load_parameters, ActuatorParameters, SimulationParameters, VehicleParameters, MAX_STEPS};
#[doc(inline)]
pub use controller::{AltitudeController, ControllerConfig, ControllerState};
#[doc(inline)]
pub use disturbance::{DisturbanceConfig, DisturbanceModel};
#[doc(inline)]
pub use error::{Result, SimulationError};
#[doc(inline)]
pub use metrics::{extract_metrics, extract_metrics_with_reference, MetricsConfig, PerformanceMetrics};
#[doc(inline)]
pub use number::Number;
#[doc(inline)]
pub use plant::{PlantModel, PlantState, STANDARD_GRAVITY};
#[doc(inline)]
pub use sensor::{SensorConfig, SensorModel};
#[doc(inline)]
pub use simulation::{
    run_batch, simulate, LoopState, RunStatus, Sample, SimulationLoop, SimulationRecord, StopHandle,
};

#[cfg(test)]
mod test_utils;
