use std::collections::VecDeque;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::FlightResult;
use crate::nav::{Course, Position};
use crate::vehicle::{Avionics, DirectiveSink};

use super::law::FlightControl;

fn default_rounding() -> bool {
    true
}

fn default_throttle() -> f64 {
    0.5
}

// ---------------------------------------------------------------------------
// Directives: one variant per maneuver command
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Directive {
    FollowCourse {
        course: Course,
        altitude: f64,
    },
    TurnTo {
        heading: f64,
        #[serde(default)]
        roll: f64,
        #[serde(default)]
        altitude: Option<f64>,
    },
    Turn {
        degrees: f64,
        #[serde(default)]
        roll: f64,
        #[serde(default)]
        altitude: Option<f64>,
    },
    Swoop {
        low_altitude: f64,
        high_altitude: f64,
        #[serde(default)]
        min_air_speed: Option<f64>,
    },
    FlyTo {
        point: Position,
        #[serde(default)]
        altitude: Option<f64>,
        #[serde(default)]
        air_speed: Option<f64>,
        #[serde(default = "default_rounding")]
        rounding: bool,
    },
    FlyCourse {
        course: Course,
        #[serde(default)]
        altitude: Option<f64>,
        #[serde(default)]
        air_speed: Option<f64>,
        #[serde(default = "default_rounding")]
        rounding: bool,
    },
    StraightAndLevel {
        #[serde(default)]
        altitude: Option<f64>,
        #[serde(default)]
        air_speed: Option<f64>,
        #[serde(default)]
        heading: Option<f64>,
    },
    DescentCourse {
        course: Course,
        altitude: f64,
        #[serde(default)]
        air_speed: Option<f64>,
        #[serde(default = "default_rounding")]
        rounding: bool,
    },
    NotifyWhenNominal,
}

impl Directive {
    pub fn name(&self) -> &'static str {
        match self {
            Directive::FollowCourse { .. } => "follow_course",
            Directive::TurnTo { .. } => "turn_to",
            Directive::Turn { .. } => "turn",
            Directive::Swoop { .. } => "swoop",
            Directive::FlyTo { .. } => "fly_to",
            Directive::FlyCourse { .. } => "fly_course",
            Directive::StraightAndLevel { .. } => "straight_and_level",
            Directive::DescentCourse { .. } => "descent_course",
            Directive::NotifyWhenNominal => "notify_when_nominal",
        }
    }
}

impl FlightControl {
    /// Apply one directive to the control law.
    pub fn dispatch(&mut self, io: &mut Avionics<'_>, directive: Directive) -> FlightResult<()> {
        debug!("Dispatching {}", directive.name());
        match directive {
            Directive::FollowCourse { course, altitude } => self.follow_course(course, altitude),
            Directive::TurnTo { heading, roll, altitude } => {
                self.turn_to(io.sensors, heading, roll, altitude)
            }
            Directive::Turn { degrees, roll, altitude } => {
                self.turn(io.sensors, degrees, roll, altitude)
            }
            Directive::Swoop { low_altitude, high_altitude, min_air_speed } => {
                self.swoop(io, low_altitude, high_altitude, min_air_speed)
            }
            Directive::FlyTo { point, altitude, air_speed, rounding } => {
                self.fly_to(io.sensors, point, altitude, air_speed, rounding)
            }
            Directive::FlyCourse { course, altitude, air_speed, rounding } => {
                self.fly_course(course, altitude, air_speed, rounding)
            }
            Directive::StraightAndLevel { altitude, air_speed, heading } => {
                self.straight_and_level(io.sensors, altitude, air_speed, heading)
            }
            Directive::DescentCourse { course, altitude, air_speed, rounding } => {
                self.descent_course(io.sensors, course, altitude, air_speed, rounding)?
            }
            Directive::NotifyWhenNominal => self.notify_when_nominal(),
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Flight plan and queue
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightPlan {
    /// Knots; airspeed goal while swooping.
    pub max_air_speed: f64,
    /// Pitch handed over by the take-off phase, degrees.
    #[serde(default)]
    pub initial_pitch: f64,
    #[serde(default = "default_throttle")]
    pub initial_throttle: f64,
    pub directives: Vec<Directive>,
}

/// Pending directives. Completion notifications only raise a flag; the
/// driver pops the next directive between ticks.
#[derive(Debug, Clone, Default)]
pub struct DirectiveQueue {
    pending: VecDeque<Directive>,
    requested: bool,
    max_air_speed: f64,
}

impl DirectiveQueue {
    pub fn new(max_air_speed: f64) -> Self {
        Self { max_air_speed, ..Self::default() }
    }

    pub fn push(&mut self, directive: Directive) {
        self.pending.push_back(directive);
    }

    pub fn pop(&mut self) -> Option<Directive> {
        self.pending.pop_front()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Whether a directive was requested since the last call.
    pub fn take_request(&mut self) -> bool {
        std::mem::take(&mut self.requested)
    }
}

impl DirectiveSink for DirectiveQueue {
    fn next_directive(&mut self) {
        self.requested = true;
    }

    fn max_air_speed(&self) -> f64 {
        self.max_air_speed
    }
}
