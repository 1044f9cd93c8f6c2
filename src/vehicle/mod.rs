pub mod recorder;
pub mod sensors;

pub use recorder::{AttitudeCommand, RecordingAttitude, RecordingThrottle};
pub use sensors::{Sensors, VehicleState};

use crate::control::optimize::{OptimizationProgress, Scoring, ScoringStep};
use crate::control::pid::PidGains;
use crate::error::{FlightControlError, FlightResult};
use crate::io::journal::Journal;

// ---------------------------------------------------------------------------
// Collaborators driven by the control law
// ---------------------------------------------------------------------------

/// Attitude subsystem: holds commanded pitch and roll with its own loops.
pub trait AttitudeControl {
    fn start_flight(&mut self);

    fn stop_flight(&mut self);

    /// Degrees; positive pitch is nose up, positive roll is right wing down.
    fn update_controls(&mut self, pitch: f64, roll: f64, yaw: f64);

    /// Begin tuning one of the subsystem's own loops. `target` is the name
    /// after the `attitude.` prefix.
    fn start_optimization(
        &mut self,
        target: &str,
        _gains: PidGains,
        _scoring: Box<dyn Scoring>,
        _journal: Option<Journal>,
    ) -> FlightResult<ScoringStep> {
        Err(FlightControlError::UnknownOptimizationTarget(format!("attitude.{target}")))
    }

    fn next_optimization(&mut self) -> FlightResult<OptimizationProgress> {
        Err(FlightControlError::NoOptimization)
    }

    fn stop_optimization(&mut self) -> FlightResult<()> {
        Err(FlightControlError::NoOptimization)
    }
}

pub trait ThrottleControl {
    /// (min, max) throttle setting.
    fn limits(&self) -> (f64, f64);

    fn current(&self) -> f64;

    fn set(&mut self, value: f64);
}

/// Receives "maneuver complete" notifications.
pub trait DirectiveSink {
    fn next_directive(&mut self);

    /// Airframe never-exceed cruise speed, used as the swoop airspeed goal.
    fn max_air_speed(&self) -> f64;
}

/// Borrowed collaborators for one call into the control law.
pub struct Avionics<'a> {
    pub sensors: &'a dyn Sensors,
    pub attitude: &'a mut dyn AttitudeControl,
    pub throttle: &'a mut dyn ThrottleControl,
    pub directives: &'a mut dyn DirectiveSink,
}
