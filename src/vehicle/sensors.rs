use serde::{Deserialize, Serialize};

use crate::nav::Position;

/// Live vehicle state. Feet, knots, feet per minute, degrees, seconds.
pub trait Sensors {
    fn altitude(&self) -> f64;
    fn air_speed(&self) -> f64;
    fn climb_rate(&self) -> f64;
    fn position(&self) -> Position;
    fn ground_speed(&self) -> f64;
    fn ground_track(&self) -> f64;
    fn true_heading(&self) -> f64;
    fn heading(&self) -> f64;
    fn pitch(&self) -> f64;
    fn roll(&self) -> f64;
    fn engines_out(&self) -> u32;
    /// Monotonic timestamp, seconds.
    fn time(&self) -> f64;
}

// ---------------------------------------------------------------------------
// Snapshot: one sample of every sensor, also usable as a sensor itself
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VehicleState {
    pub time: f64,
    pub altitude: f64,
    pub air_speed: f64,
    pub climb_rate: f64,
    pub position: Position,
    pub ground_speed: f64,
    pub ground_track: f64,
    pub true_heading: f64,
    #[serde(default)]
    pub heading: f64,
    #[serde(default)]
    pub pitch: f64,
    #[serde(default)]
    pub roll: f64,
    #[serde(default)]
    pub engines_out: u32,
}

impl VehicleState {
    pub fn sample(sensors: &dyn Sensors) -> Self {
        Self {
            time: sensors.time(),
            altitude: sensors.altitude(),
            air_speed: sensors.air_speed(),
            climb_rate: sensors.climb_rate(),
            position: sensors.position(),
            ground_speed: sensors.ground_speed(),
            ground_track: sensors.ground_track(),
            true_heading: sensors.true_heading(),
            heading: sensors.heading(),
            pitch: sensors.pitch(),
            roll: sensors.roll(),
            engines_out: sensors.engines_out(),
        }
    }

    /// Level flight at `altitude` and `air_speed` on `track`, no wind.
    pub fn level(time: f64, position: Position, altitude: f64, air_speed: f64, track: f64) -> Self {
        Self {
            time,
            altitude,
            air_speed,
            climb_rate: 0.0,
            position,
            ground_speed: air_speed,
            ground_track: track,
            true_heading: track,
            heading: track,
            pitch: 0.0,
            roll: 0.0,
            engines_out: 0,
        }
    }
}

impl Sensors for VehicleState {
    fn altitude(&self) -> f64 {
        self.altitude
    }
    fn air_speed(&self) -> f64 {
        self.air_speed
    }
    fn climb_rate(&self) -> f64 {
        self.climb_rate
    }
    fn position(&self) -> Position {
        self.position
    }
    fn ground_speed(&self) -> f64 {
        self.ground_speed
    }
    fn ground_track(&self) -> f64 {
        self.ground_track
    }
    fn true_heading(&self) -> f64 {
        self.true_heading
    }
    fn heading(&self) -> f64 {
        self.heading
    }
    fn pitch(&self) -> f64 {
        self.pitch
    }
    fn roll(&self) -> f64 {
        self.roll
    }
    fn engines_out(&self) -> u32 {
        self.engines_out
    }
    fn time(&self) -> f64 {
        self.time
    }
}
