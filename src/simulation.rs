// src/simulation.rs

//! # Altitude Hold Simulation Loop
//!
//! This module closes the loop between the controller, actuator, plant,
//! disturbance, and sensor models over a fixed time grid and records every
//! step into a [`SimulationRecord`].
//!
//! ## Overview
//!
//! A [`SimulationLoop`] moves through three states. It is `Initialized`
//! with all component states at zero, `Running` while steps remain, and
//! `Completed` once the last grid point has been recorded, a stop was
//! requested, or the plant state diverged. A completed loop cannot be
//! resumed; build a new one from the parameters for another run.
//!
//! Each step, in order:
//!
//! 1. reads the sensed altitude from the previous step (the true altitude
//!    when no sensor is configured),
//! 2. forms the tracking error against the commanded altitude,
//! 3. advances the controller, actuator, disturbance, plant, and sensor,
//! 4. appends a [`Sample`] stamped with the step's grid time.
//!
//! ## Parallel Runs
//!
//! A run is strictly sequential. Independent runs share nothing, so
//! [`run_batch`] spreads them over scoped worker threads and returns one
//! result per input slot, in input order.

use crate::actuator::ActuatorModel;
use crate::command::{CommandProfile, CommandSignal};
use crate::config::SimulationParameters;
use crate::controller::AltitudeController;
use crate::disturbance::DisturbanceModel;
use crate::error::{Result, SimulationError};
use crate::plant::PlantModel;
use crate::sensor::SensorModel;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

/// Upper bound on the samples reserved up front; longer runs grow the record as they go.
const PREALLOCATED_SAMPLES: usize = 1 << 20;

/// One recorded time step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Grid time `k * dt` at the start of the step, in seconds.
    ///
    /// The command, error, and thrust fields were evaluated at this time;
    /// `true_altitude` and `sensed_altitude` are the state after the step,
    /// at `time + dt`.
    pub time: f64,
    /// Commanded altitude in meters.
    pub commanded_altitude: f64,
    /// Plant altitude in meters after the step.
    pub true_altitude: f64,
    /// Altitude reported by the sensor after the step.
    pub sensed_altitude: f64,
    /// Saturated controller output.
    pub thrust_command: f64,
    /// Actuator thrust force in newtons.
    pub thrust_force: f64,
    /// Tracking error the controller acted on.
    pub control_error: f64,
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum RunStatus {
    /// The loop has not finished yet.
    InProgress,
    /// Every grid point was recorded.
    Completed,
    /// A stop was requested before the step at `time`.
    Stopped {
        /// Grid time of the first step not taken.
        time: f64,
    },
    /// The plant state became non-finite during the step at `time`.
    /// That step is not recorded.
    Unstable {
        /// Grid time of the diverging step.
        time: f64,
    },
}

/// Append-only time series produced by one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationRecord {
    time_step: f64,
    status: RunStatus,
    samples: Vec<Sample>,
}

impl SimulationRecord {
    fn with_capacity(time_step: f64, capacity: usize) -> Self {
        Self {
            time_step,
            status: RunStatus::InProgress,
            samples: Vec::with_capacity(capacity),
        }
    }

    /// Builds a completed record from samples recorded elsewhere.
    pub fn from_samples(time_step: f64, samples: Vec<Sample>) -> Self {
        Self {
            time_step,
            status: RunStatus::Completed,
            samples,
        }
    }

    /// Integration step of the run in seconds.
    pub fn time_step(&self) -> f64 {
        self.time_step
    }

    /// How the run ended.
    pub fn status(&self) -> RunStatus {
        self.status
    }

    /// `true` when every grid point was recorded.
    pub fn is_complete(&self) -> bool {
        self.status == RunStatus::Completed
    }

    /// Recorded samples in time order.
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Number of recorded samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// `true` when nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// The most recent sample.
    pub fn last(&self) -> Option<&Sample> {
        self.samples.last()
    }

    /// Returns the record, or [`SimulationError::NumericOverflow`] if the run diverged.
    pub fn ensure_stable(&self) -> Result<&Self> {
        match self.status {
            RunStatus::Unstable { time } => Err(SimulationError::NumericOverflow { time }),
            _ => Ok(self),
        }
    }
}

/// Shared flag used to ask a running loop to stop between steps.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    /// Creates a handle with no stop requested.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests a stop; the loop honors it before its next step.
    pub fn request_stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// `true` once a stop was requested.
    pub fn is_stop_requested(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Lifecycle of a [`SimulationLoop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoopState {
    /// Component states are zeroed and no step has run.
    Initialized,
    /// Steps remain on the time grid.
    Running,
    /// The run is over and cannot be resumed.
    Completed,
}

/// Closed-loop altitude hold simulation for one run.
pub struct SimulationLoop<C = CommandProfile> {
    command: C,
    time_step: f64,
    steps: u64,
    step: u64,
    controller: AltitudeController<f64>,
    actuator: ActuatorModel<f64>,
    plant: PlantModel<f64>,
    disturbance: DisturbanceModel,
    sensor: Option<SensorModel>,
    sensed_altitude: f64,
    state: LoopState,
    stop: Option<StopHandle>,
    record: SimulationRecord,
}

impl SimulationLoop<CommandProfile> {
    /// Validates `params` and builds a loop driven by its command profile.
    pub fn new(params: &SimulationParameters) -> Result<Self> {
        Self::with_command(params, params.command.clone())
    }
}

impl<C: CommandSignal> SimulationLoop<C> {
    /// Validates `params` and builds a loop driven by an external command signal.
    pub fn with_command(params: &SimulationParameters, command: C) -> Result<Self> {
        params.validate()?;

        let vehicle = &params.vehicle;
        let plant = PlantModel::new(vehicle.mass, vehicle.gravity, vehicle.drag)
            .with_ground_contact(vehicle.ground_contact);
        let sensor = params.sensor.map(SensorModel::new).transpose()?;

        Ok(Self {
            command,
            time_step: params.time_step,
            steps: params.step_count(),
            step: 0,
            controller: AltitudeController::with_config(params.controller),
            actuator: ActuatorModel::new(params.actuator.gain, params.actuator.time_constant),
            plant,
            disturbance: DisturbanceModel::new(params.disturbance.clone()),
            sensor,
            sensed_altitude: plant.state().altitude,
            state: LoopState::Initialized,
            stop: None,
            record: SimulationRecord::with_capacity(
                params.time_step,
                params.sample_count().min(PREALLOCATED_SAMPLES),
            ),
        })
    }

    /// Attaches a stop handle checked once per step.
    pub fn with_stop_handle(mut self, stop: StopHandle) -> Self {
        self.stop = Some(stop);
        self
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Grid time of the next step.
    pub fn time(&self) -> f64 {
        self.step as f64 * self.time_step
    }

    /// Samples recorded so far.
    pub fn record(&self) -> &SimulationRecord {
        &self.record
    }

    /// Runs a single step and returns the resulting state.
    ///
    /// Fails with [`SimulationError::LoopCompleted`] once the run is over.
    pub fn step(&mut self) -> Result<LoopState> {
        match self.state {
            LoopState::Completed => return Err(SimulationError::LoopCompleted),
            LoopState::Initialized => {
                info!(
                    "starting altitude hold run: {} steps of {} s",
                    self.steps, self.time_step
                );
                self.state = LoopState::Running;
            }
            LoopState::Running => {}
        }

        let time = self.time();
        if self.stop.as_ref().is_some_and(StopHandle::is_stop_requested) {
            info!("stop requested, ending run at t = {time} s");
            return Ok(self.finish(RunStatus::Stopped { time }));
        }

        let dt = self.time_step;
        let commanded_altitude = self.command.command_at(time);
        let control_error = commanded_altitude - self.sensed_altitude;
        let thrust_command = self.controller.control(control_error, dt)?;
        let thrust_force = self.actuator.step(thrust_command, dt);
        let disturbance = self.disturbance.force_at(time);
        let plant = self.plant.step(thrust_force, disturbance, dt);

        if !plant.altitude.is_finite() || !plant.velocity.is_finite() {
            warn!("plant state diverged at t = {time} s, truncating run");
            return Ok(self.finish(RunStatus::Unstable { time }));
        }

        self.sensed_altitude = match self.sensor.as_mut() {
            Some(sensor) => sensor.measure(time, plant.altitude),
            None => plant.altitude,
        };
        self.record.samples.push(Sample {
            time,
            commanded_altitude,
            true_altitude: plant.altitude,
            sensed_altitude: self.sensed_altitude,
            thrust_command,
            thrust_force,
            control_error,
        });

        self.step += 1;
        if self.step > self.steps {
            debug!(
                "run completed with {} samples, final altitude {} m",
                self.record.len(),
                plant.altitude
            );
            return Ok(self.finish(RunStatus::Completed));
        }
        Ok(self.state)
    }

    /// Steps until the loop completes and returns the record.
    pub fn run(mut self) -> Result<SimulationRecord> {
        while self.step()? != LoopState::Completed {}
        Ok(self.into_record())
    }

    /// Consumes the loop and returns whatever was recorded.
    pub fn into_record(self) -> SimulationRecord {
        self.record
    }

    fn finish(&mut self, status: RunStatus) -> LoopState {
        self.record.status = status;
        self.state = LoopState::Completed;
        self.state
    }
}

/// Runs one simulation with the command profile from `params`.
pub fn simulate(params: &SimulationParameters) -> Result<SimulationRecord> {
    SimulationLoop::new(params)?.run()
}

/// Runs independent simulations in parallel.
///
/// The result at index `i` belongs to `batch[i]`. Runs are split into
/// contiguous chunks, one per available core.
pub fn run_batch(batch: &[SimulationParameters]) -> Vec<Result<SimulationRecord>> {
    if batch.is_empty() {
        return Vec::new();
    }
    let workers = thread::available_parallelism().map_or(1, |n| n.get());
    let chunk_size = batch.len().div_ceil(workers);
    info!(
        "running batch of {} simulations on {} workers",
        batch.len(),
        batch.len().div_ceil(chunk_size)
    );

    thread::scope(|scope| {
        let handles: Vec<_> = batch
            .chunks(chunk_size)
            .map(|chunk| scope.spawn(move || chunk.iter().map(simulate).collect::<Vec<_>>()))
            .collect();

        handles
            .into_iter()
            .flat_map(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
            })
            .collect()
    })
}
