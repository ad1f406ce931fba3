use crate::config;
use crate::kinematics;
use crate::policy::{self, Decision};
use crate::scheduler::{TickHandle, TickScheduler};
use crate::sensors::{self, SensorArrayConfig};
use crate::track::TrackSurface;
use crate::types::{AnalogReading, MotorEffort, Pose, Workspace};
use rand::prelude::*;
use rand::rngs::StdRng;
use std::fmt;

/// Idle/Running state. A running simulation always owns exactly one pending tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running { pending: TickHandle },
}

/// What one tick published.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub pose: Pose,
    pub readings: Vec<AnalogReading>,
    pub decision: Decision,
    pub effort: MotorEffort,
}

/// Uniform multiplicative jitter applied to each reading after conversion.
pub struct SensorNoise {
    percent: f64,
    rng: StdRng,
}

impl SensorNoise {
    pub fn new(percent: f64, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        SensorNoise {
            percent: percent.abs(),
            rng,
        }
    }

    pub fn percent(&self) -> f64 {
        self.percent
    }

    fn apply(&mut self, reading: AnalogReading) -> AnalogReading {
        let scale = self.percent / 100.0;
        let jitter = reading as f64 * scale * self.rng.gen_range(-1.0..=1.0);
        (reading as f64 + jitter)
            .round()
            .clamp(0.0, config::ANALOG_MAX as f64) as AnalogReading
    }
}

impl fmt::Debug for SensorNoise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SensorNoise")
            .field("percent", &self.percent)
            .finish_non_exhaustive()
    }
}

/// The per-tick orchestrator: sample, decide, integrate, publish.
///
/// `start`, `stop`, `reset` and `set_sensor_config` are the only mutators besides the
/// tick itself. Pose, readings and the last effort are what the outside world sees.
#[derive(Debug)]
pub struct Simulation {
    workspace: Workspace,
    sensors: SensorArrayConfig,
    pose: Pose,
    readings: Vec<AnalogReading>,
    last_decision: Decision,
    state: RunState,
    noise: Option<SensorNoise>,
}

impl Simulation {
    pub fn new(width: u32, height: u32, sensors: SensorArrayConfig) -> Self {
        let workspace = Workspace::new(width as f64, height as f64);
        let mut sim = Simulation {
            workspace,
            sensors,
            pose: Pose::new(0.0, 0.0, 0.0),
            readings: Vec::new(),
            last_decision: Decision::Stop,
            state: RunState::Idle,
            noise: None,
        };
        sim.reset();
        sim
    }

    pub fn with_noise(mut self, noise: SensorNoise) -> Self {
        if noise.percent() > 0.0 {
            log::info!("Sensor noise enabled: +/-{:.1}%", noise.percent());
            self.noise = Some(noise);
        }
        self
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, RunState::Running { .. })
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn readings(&self) -> &[AnalogReading] {
        &self.readings
    }

    pub fn last_decision(&self) -> Decision {
        self.last_decision
    }

    pub fn last_effort(&self) -> MotorEffort {
        self.last_decision.effort()
    }

    pub fn sensor_config(&self) -> &SensorArrayConfig {
        &self.sensors
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Idle -> Running. Requests the first tick; does nothing when already running.
    pub fn start<S: TickScheduler>(&mut self, scheduler: &mut S) {
        if self.is_running() {
            return;
        }
        let pending = scheduler.request_tick();
        self.state = RunState::Running { pending };
        log::info!("Simulation started (first tick {})", pending.id());
    }

    /// Running -> Idle. Cancels the pending tick so nothing runs after this returns.
    pub fn stop<S: TickScheduler>(&mut self, scheduler: &mut S) {
        if let RunState::Running { pending } = self.state {
            scheduler.cancel_tick(pending);
            self.state = RunState::Idle;
            log::info!("Simulation stopped (cancelled tick {})", pending.id());
        }
    }

    /// Puts the robot back in the centre facing +x with neutral readings.
    /// Leaves the run state alone.
    pub fn reset(&mut self) {
        let center = self.workspace.center();
        self.pose = Pose::new(center.x, center.y, 0.0);
        self.readings = vec![config::NEUTRAL_READING; config::DEFAULT_SENSOR_COUNT];
        self.last_decision = Decision::Stop;
        crate::debug_sim!("Reset to ({:.1}, {:.1}, 0.0)", center.x, center.y);
    }

    /// Swaps the sensor layout. Takes effect on the next tick.
    pub fn set_sensor_config(&mut self, sensors: SensorArrayConfig) {
        crate::debug_sim!("Sensor layout now has {} sensors", sensors.len());
        self.sensors = sensors;
    }

    /// Scheduler callback. Runs one step if `handle` is the tick this simulation is
    /// waiting on, then books the next one. Stale handles are ignored.
    pub fn tick<S: TickScheduler>(
        &mut self,
        handle: TickHandle,
        surface: &TrackSurface,
        scheduler: &mut S,
    ) -> Option<TickReport> {
        match self.state {
            RunState::Running { pending } if pending == handle => {}
            _ => {
                crate::debug_sim!("Tick {} is stale, ignoring", handle.id());
                return None;
            }
        }

        let report = self.step(surface);
        let pending = scheduler.request_tick();
        self.state = RunState::Running { pending };
        crate::debug_sim!(
            "Tick {} done: {:?} pose=({:.2}, {:.2}, {:.1})",
            handle.id(),
            report.decision,
            report.pose.x,
            report.pose.y,
            report.pose.angle_deg
        );
        Some(report)
    }

    /// One simulation step against the current surface, regardless of run state.
    pub fn step(&mut self, surface: &TrackSurface) -> TickReport {
        let points =
            sensors::sample_points(&self.pose, &self.sensors, surface.width(), surface.height());

        let mut readings: Vec<AnalogReading> = points
            .iter()
            .map(|&p| sensors::sample_and_convert(surface, p))
            .collect();
        if let Some(noise) = self.noise.as_mut() {
            for reading in readings.iter_mut() {
                *reading = noise.apply(*reading);
            }
        }
        crate::debug_sensor!("Readings {:?}", readings);
        self.readings = readings;

        let decision = policy::decide(&self.readings);
        let effort = decision.effort();
        self.last_decision = decision;

        self.pose = kinematics::integrate(self.pose, effort, &self.workspace);

        TickReport {
            pose: self.pose,
            readings: self.readings.clone(),
            decision,
            effort,
        }
    }
}
