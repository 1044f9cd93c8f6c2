use log::{debug, warn};

use crate::error::FlightResult;
use crate::nav::{Course, DescentProfile, Position, TurnDirection};
use crate::vehicle::{Avionics, Sensors};

use super::law::{FlightControl, FlightMode, PitchMode, SwoopPlan, SWOOP_THROTTLE};
use super::pid::PidMode;

// ---------------------------------------------------------------------------
// Maneuver commands. Arguments left as `None` keep the current goal.
// ---------------------------------------------------------------------------

impl FlightControl {
    pub fn follow_course(&mut self, course: Course, altitude: f64) {
        self.state.mode = FlightMode::Course;
        self.state.goal.course = course;
        self.state.goal.altitude = altitude;
        self.state.pitch_mode = PitchMode::Normal;
    }

    /// Turn onto `heading`. A non-zero `roll` forces the turn direction by
    /// its sign.
    pub fn turn_to(
        &mut self,
        sensors: &dyn Sensors,
        heading: f64,
        roll: f64,
        altitude: Option<f64>,
    ) {
        debug!("Flight control turning to {heading}, roll {roll}, alt {altitude:?}");
        self.state.mode = FlightMode::Turn;
        self.state.turn_direction = TurnDirection::from_roll(roll);
        self.state.goal.true_heading = heading;
        if let Some(altitude) = altitude {
            self.state.goal.altitude = altitude;
        }
        debug!("starting turn at {}", sensors.heading());
        self.state.pitch_mode = PitchMode::Normal;
    }

    /// Turn `degrees` relative to the current ground track.
    pub fn turn(&mut self, sensors: &dyn Sensors, degrees: f64, roll: f64, altitude: Option<f64>) {
        debug!("Flight control turning {degrees}, roll {roll}, alt {altitude:?}");
        self.state.mode = FlightMode::Turn;
        self.state.turn_direction = TurnDirection::from_roll(roll);
        if let Some(altitude) = altitude {
            self.state.goal.altitude = altitude;
        }
        let turn_start = sensors.ground_track();
        self.state.goal.true_heading = (turn_start + degrees).rem_euclid(360.0);
        debug!("starting turn at {turn_start}");
        self.state.pitch_mode = PitchMode::Normal;
    }

    /// Dive to `low_altitude` and climb back to `high_altitude`. From at or
    /// below `low_altitude` only the altitude goal changes.
    pub fn swoop(
        &mut self,
        io: &mut Avionics<'_>,
        low_altitude: f64,
        high_altitude: f64,
        min_air_speed: Option<f64>,
    ) {
        let current_altitude = io.sensors.altitude();
        self.state.airspeed_achievement_minutes = self.config.air_speed_achievement_minutes;
        self.state.swoop_min_air_speed =
            min_air_speed.unwrap_or(0.0).max(self.config.min_climb_air_speed);
        if current_altitude <= low_altitude {
            debug!("Swoop from below {low_altitude} ft, climbing to {high_altitude}");
            self.state.goal.altitude = high_altitude;
            if let Some(plan) = self.state.swoop.as_mut() {
                plan.high_altitude = high_altitude;
            }
        } else {
            // A swoop commanded mid-swoop keeps the values to restore
            let (mode_before, air_speed_before) = match self.state.swoop {
                Some(plan) => (plan.mode_before, plan.air_speed_before),
                None => (self.state.mode, self.state.goal.air_speed),
            };
            self.state.swoop = Some(SwoopPlan { high_altitude, mode_before, air_speed_before });
            self.state.mode = FlightMode::SwoopDown;
            self.state.desired_pitch = -self.config.swoop_pitch;
            self.state.goal.air_speed = io.directives.max_air_speed();

            let air_speed = io.sensors.air_speed();
            self.throttle.set_mode(PidMode::Manual, air_speed, io.throttle.current());
            self.climb_pitch.set_mode(
                PidMode::Manual,
                io.sensors.climb_rate(),
                self.state.desired_pitch,
            );
            io.throttle.set(SWOOP_THROTTLE);
            self.state.goal.altitude = low_altitude;
            debug!("Swooping down to {low_altitude} ft");
        }
        self.state.pitch_mode = PitchMode::Normal;
    }

    /// Fly from the current position to `point`.
    pub fn fly_to(
        &mut self,
        sensors: &dyn Sensors,
        point: Position,
        altitude: Option<f64>,
        air_speed: Option<f64>,
        rounding: bool,
    ) {
        self.set_course_goal(Course::new(sensors.position(), point), altitude, air_speed, rounding);
        debug!("Flight Control flying to ({},{})", point.x, point.y);
    }

    pub fn fly_course(
        &mut self,
        course: Course,
        altitude: Option<f64>,
        air_speed: Option<f64>,
        rounding: bool,
    ) {
        self.set_course_goal(course, altitude, air_speed, rounding);
        debug!(
            "Flight Control flying course ({},{}) to ({},{}), altitude={}, airspeed={}",
            course.from.x,
            course.from.y,
            course.to.x,
            course.to.y,
            self.state.goal.altitude,
            self.state.goal.air_speed
        );
    }

    /// Hold a heading. Omitted altitude and heading default to the current
    /// sensor values.
    pub fn straight_and_level(
        &mut self,
        sensors: &dyn Sensors,
        altitude: Option<f64>,
        air_speed: Option<f64>,
        heading: Option<f64>,
    ) {
        self.state.mode = FlightMode::Straight;
        self.state.goal.altitude = altitude.unwrap_or_else(|| sensors.altitude());
        self.set_air_speed_goal(air_speed);
        self.state.goal.true_heading = heading.unwrap_or_else(|| sensors.true_heading());
        self.state.pitch_mode = PitchMode::Normal;
        debug!(
            "Flight Control Straight and Level at {} feet, airspeed={}, heading {}",
            self.state.goal.altitude, self.state.goal.air_speed, self.state.goal.true_heading
        );
    }

    /// Fly `course` while descending (or climbing) linearly to `altitude`
    /// at the destination. The profile is planned from the current state.
    pub fn descent_course(
        &mut self,
        sensors: &dyn Sensors,
        course: Course,
        altitude: f64,
        air_speed: Option<f64>,
        rounding: bool,
    ) -> FlightResult<()> {
        let goal_air_speed = air_speed.unwrap_or(self.state.goal.air_speed);
        let profile = DescentProfile::plan(
            sensors.altitude(),
            sensors.position(),
            &course,
            altitude,
            goal_air_speed,
        )
        .inspect_err(|e| warn!("Descent course rejected: {e}"))?;

        self.state.goal.course = course;
        self.state.goal.altitude = altitude;
        self.state.goal.air_speed = goal_air_speed;
        self.state.mode = FlightMode::Course;
        self.state.course_rounding = rounding;
        self.state.pitch_mode = PitchMode::ControlledDescent(profile);
        self.state.airspeed_achievement_minutes = profile.minutes_to_destination;
        debug!(
            "Starting Descent course: distance={}, descent of {} feet, nominal rate = {}",
            profile.distance,
            altitude - profile.starting_altitude,
            profile.nominal_rate
        );
        Ok(())
    }

    /// Request the next directive once altitude, airspeed and heading are
    /// all nominal.
    pub fn notify_when_nominal(&mut self) {
        self.state.notify_when_nominal = true;
    }

    fn set_course_goal(
        &mut self,
        course: Course,
        altitude: Option<f64>,
        air_speed: Option<f64>,
        rounding: bool,
    ) {
        self.state.goal.course = course;
        if let Some(altitude) = altitude {
            self.state.goal.altitude = altitude;
        }
        self.set_air_speed_goal(air_speed);
        self.state.mode = FlightMode::Course;
        self.state.pitch_mode = PitchMode::Normal;
        self.state.course_rounding = rounding;
    }

    fn set_air_speed_goal(&mut self, air_speed: Option<f64>) {
        if let Some(air_speed) = air_speed {
            self.state.goal.air_speed = air_speed;
            self.state.airspeed_achievement_minutes = self.config.air_speed_achievement_minutes;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::law::TickStatus;
    use crate::control::pid::PidLoop;
    use crate::control::test_rig::{test_config, Rig};
    use crate::vehicle::DirectiveSink;

    fn north_course() -> Course {
        Course::new(Position::new(0.0, 0.0), Position::new(0.0, 1.0))
    }

    #[test]
    fn turn_is_relative_to_ground_track() {
        let mut rig = Rig::new(3000.0, 100.0);
        rig.state.ground_track = 350.0;
        let mut fc = rig.flying(test_config());
        fc.turn(&rig.state, 30.0, 0.0, None);
        assert_eq!(fc.mode(), FlightMode::Turn);
        assert!((fc.goal().true_heading - 20.0).abs() < 1e-9);
        assert_eq!(fc.goal().altitude, 3000.0);
    }

    #[test]
    fn turn_completes_within_three_degrees() {
        let mut rig = Rig::new(3000.0, 100.0);
        let mut fc = rig.flying(test_config());
        fc.turn_to(&rig.state, 90.0, 0.0, Some(3500.0));
        rig.state.time += 1.0;
        assert!(matches!(fc.update(&mut rig.io()), TickStatus::Commanded { .. }));
        assert!(fc.desired_roll() > 0.0, "Right turn toward 090");

        rig.state.true_heading = 88.5;
        rig.state.time += 1.0;
        let commands = rig.attitude.commands.len();
        assert_eq!(fc.update(&mut rig.io()), TickStatus::DirectiveRequested);
        assert!(rig.queue.take_request());
        assert_eq!(rig.attitude.commands.len(), commands, "Nothing commanded on completion");
    }

    #[test]
    fn forced_left_turn_rolls_left() {
        let mut rig = Rig::new(3000.0, 100.0);
        let mut fc = rig.flying(test_config());
        fc.turn_to(&rig.state, 90.0, -20.0, None);
        rig.state.time += 1.0;
        fc.update(&mut rig.io());
        assert!(fc.desired_roll() < 0.0);
        assert!(fc.desired_roll() >= -fc.config().max_roll);
    }

    #[test]
    fn straight_and_level_defaults_to_current_state() {
        let mut rig = Rig::new(4200.0, 100.0);
        rig.state.true_heading = 123.0;
        let mut fc = rig.flying(test_config());
        fc.straight_and_level(&rig.state, None, Some(110.0), None);
        assert_eq!(fc.mode(), FlightMode::Straight);
        assert_eq!(fc.goal().altitude, 4200.0);
        assert_eq!(fc.goal().true_heading, 123.0);
        assert_eq!(fc.goal().air_speed, 110.0);
    }

    #[test]
    fn swoop_dives_then_climbs_then_restores() {
        let mut rig = Rig::new(5000.0, 100.0);
        let mut fc = rig.flying(test_config());
        fc.fly_course(north_course(), Some(5000.0), Some(100.0), true);
        fc.swoop(&mut rig.io(), 3000.0, 4500.0, None);
        assert_eq!(fc.mode(), FlightMode::SwoopDown);
        assert_eq!(fc.goal().altitude, 3000.0);
        assert_eq!(fc.goal().air_speed, rig.queue.max_air_speed());
        assert_eq!(rig.throttle.value, SWOOP_THROTTLE);
        assert_eq!(fc.desired_pitch(), -fc.config().swoop_pitch);

        rig.state.altitude = 3150.0;
        rig.state.time += 1.0;
        fc.update(&mut rig.io());
        assert_eq!(fc.mode(), FlightMode::SwoopUp);
        assert_eq!(fc.goal().altitude, 4500.0);
        assert_eq!(fc.desired_roll(), 0.0);

        rig.state.altitude = 4350.0;
        rig.state.time += 1.0;
        fc.update(&mut rig.io());
        assert_eq!(fc.mode(), FlightMode::Course);
        assert_eq!(fc.goal().air_speed, 100.0);
        assert_eq!(fc.pid(crate::control::PidId::Throttle).mode(), PidMode::Automatic);
    }

    #[test]
    fn swoop_from_below_only_raises_altitude() {
        let mut rig = Rig::new(2000.0, 100.0);
        let mut fc = rig.flying(test_config());
        fc.swoop(&mut rig.io(), 3000.0, 4500.0, Some(45.0));
        assert_eq!(fc.mode(), FlightMode::Straight);
        assert_eq!(fc.goal().altitude, 4500.0);
        assert_eq!(fc.state().swoop_min_air_speed, 45.0);
        assert!(fc.state().swoop.is_none());
    }

    #[test]
    fn second_swoop_keeps_pre_swoop_mode_and_airspeed() {
        let mut rig = Rig::new(5000.0, 100.0);
        let mut fc = rig.flying(test_config());
        fc.fly_course(north_course(), Some(5000.0), Some(100.0), true);
        fc.swoop(&mut rig.io(), 3000.0, 4500.0, None);
        fc.swoop(&mut rig.io(), 2800.0, 4600.0, None);
        assert_eq!(fc.mode(), FlightMode::SwoopDown);
        assert_eq!(fc.goal().altitude, 2800.0);

        rig.state.altitude = 2950.0;
        rig.state.time += 1.0;
        fc.update(&mut rig.io());
        assert_eq!(fc.mode(), FlightMode::SwoopUp);
        assert_eq!(fc.goal().altitude, 4600.0);

        rig.state.altitude = 4450.0;
        rig.state.time += 1.0;
        fc.update(&mut rig.io());
        assert_eq!(fc.mode(), FlightMode::Course);
        assert_eq!(fc.goal().air_speed, 100.0);
        assert!(fc.state().swoop.is_none());

        rig.state.time += 1.0;
        fc.update(&mut rig.io());
        assert_eq!(fc.mode(), FlightMode::Course);
        assert_eq!(fc.pid(crate::control::PidId::Throttle).mode(), PidMode::Automatic);
    }

    #[test]
    fn descent_course_rate_covers_altitude_change() {
        let mut rig = Rig::new(6000.0, 120.0);
        let mut fc = rig.flying(test_config());
        fc.descent_course(&rig.state, north_course(), 2000.0, Some(120.0), true).unwrap();
        let PitchMode::ControlledDescent(profile) = fc.state().pitch_mode else {
            panic!("descent pitch mode expected");
        };
        let hours = profile.distance / 120.0;
        assert!((profile.nominal_rate * hours * 60.0 - (2000.0 - 6000.0)).abs() < 1e-6);
        assert!((fc.state().airspeed_achievement_minutes - hours * 60.0).abs() < 1e-9);

        fc.follow_course(north_course(), 2000.0);
        assert_eq!(fc.state().pitch_mode, PitchMode::Normal);
    }

    #[test]
    fn descent_with_zero_airspeed_is_rejected() {
        let mut rig = Rig::new(6000.0, 0.0);
        let mut fc = rig.flying(test_config());
        fc.fly_course(north_course(), None, Some(0.0), true);
        let before = fc.mode();
        assert!(fc.descent_course(&rig.state, north_course(), 2000.0, None, true).is_err());
        assert_eq!(fc.mode(), before);
        assert_eq!(fc.state().pitch_mode, PitchMode::Normal);
    }

    #[test]
    fn notify_when_nominal_requests_once() {
        let mut rig = Rig::new(3000.0, 100.0);
        let mut fc = rig.flying(test_config());
        fc.straight_and_level(&rig.state, Some(3000.0), Some(100.0), Some(0.0));
        fc.notify_when_nominal();
        rig.state.time += 1.0;
        fc.update(&mut rig.io());
        assert!(rig.queue.take_request());
        rig.state.time += 1.0;
        fc.update(&mut rig.io());
        assert!(!rig.queue.take_request());
    }
}
