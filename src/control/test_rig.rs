use crate::config::FlightControlConfig;
use crate::nav::Position;
use crate::vehicle::{Avionics, RecordingAttitude, RecordingThrottle, VehicleState};

use super::directive::DirectiveQueue;
use super::law::FlightControl;
use super::pid::PidGains;

pub fn test_config() -> FlightControlConfig {
    FlightControlConfig {
        climb_pitch_pid: Some(PidGains::new(0.01, 0.001, 0.0)),
        airspeed_pitch_pid: Some(PidGains::new(0.5, 0.05, 0.0)),
        throttle_pid: Some(PidGains::new(0.02, 0.005, 0.0)),
        ..FlightControlConfig::default()
    }
}

/// Level flight heading north from the origin, with recording actuators.
pub struct Rig {
    pub state: VehicleState,
    pub attitude: RecordingAttitude,
    pub throttle: RecordingThrottle,
    pub queue: DirectiveQueue,
}

impl Rig {
    pub fn new(altitude: f64, air_speed: f64) -> Self {
        Self {
            state: VehicleState::level(0.0, Position::new(0.0, 0.0), altitude, air_speed, 0.0),
            attitude: RecordingAttitude::default(),
            throttle: RecordingThrottle::new(0.0, 1.0, 0.5),
            queue: DirectiveQueue::new(160.0),
        }
    }

    pub fn io(&mut self) -> Avionics<'_> {
        Avionics {
            sensors: &self.state,
            attitude: &mut self.attitude,
            throttle: &mut self.throttle,
            directives: &mut self.queue,
        }
    }

    /// Started control law holding the current altitude, airspeed and track.
    pub fn flying(&mut self, config: FlightControlConfig) -> FlightControl {
        let mut fc = FlightControl::new(config).unwrap();
        let air_speed = self.state.air_speed;
        fc.straight_and_level(&self.state, None, Some(air_speed), None);
        fc.start(&mut self.io(), 0.0).unwrap();
        fc
    }
}
