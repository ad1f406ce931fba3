//! Hard-wired line-following decision table.
//!
//! The robot program shown in the editor is never consulted here; the table below mirrors
//! what the stock program does with a five-sensor bar.

use crate::config::{LINE_THRESHOLD, NEUTRAL_READING};
use crate::types::{AnalogReading, MotorEffort};

// Reading slots the table looks at (A0..A4)
const LEFT: usize = 0;
const CENTER_LEFT: usize = 1;
const CENTER: usize = 2;
const CENTER_RIGHT: usize = 3;
const RIGHT: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Straight,
    TurnLeft,
    TurnRight,
    Stop,
}

impl Decision {
    pub fn effort(self) -> MotorEffort {
        match self {
            Decision::Straight => MotorEffort::new(200, 200),
            Decision::TurnLeft => MotorEffort::new(100, 255),
            Decision::TurnRight => MotorEffort::new(255, 100),
            Decision::Stop => MotorEffort::STOP,
        }
    }
}

/// Reading at `index`, or the neutral surface value when that sensor is not fitted.
pub fn reading_at(readings: &[AnalogReading], index: usize) -> AnalogReading {
    readings.get(index).copied().unwrap_or(NEUTRAL_READING)
}

/// First matching rule wins: centre, then left pair, then right pair, else stop.
pub fn decide(readings: &[AnalogReading]) -> Decision {
    let on_line = |index| reading_at(readings, index) < LINE_THRESHOLD;

    let decision = if on_line(CENTER) {
        Decision::Straight
    } else if on_line(LEFT) || on_line(CENTER_LEFT) {
        Decision::TurnLeft
    } else if on_line(RIGHT) || on_line(CENTER_RIGHT) {
        Decision::TurnRight
    } else {
        Decision::Stop
    };
    crate::debug_policy!("{:?} from {:?}", decision, readings);
    decision
}

pub fn motor_effort(readings: &[AnalogReading]) -> MotorEffort {
    decide(readings).effort()
}
