use log::{debug, trace};

use crate::io::journal::JournalRow;
use crate::vehicle::Avionics;

use super::law::{FlightControl, PitchMode};
use super::optimize::PidId;
use super::pid::{PidLoop, PidMode};

/// Hysteresis on the minimum climb airspeed once airspeed pitch is engaged.
pub const AIRSPEED_PITCH_HYSTERESIS: f64 = 1.1;

/// Pitch proposed by one strategy, with the journal triple it produced
/// (goal, measured input, pitch). Curve-driven pitch has no triple.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitchCandidate {
    pub pitch: f64,
    pub journal: Option<[f64; 3]>,
}

impl FlightControl {
    /// Desired pitch for this tick.
    pub(super) fn select_pitch(
        &mut self,
        io: &mut Avionics<'_>,
        ms: f64,
        mut row: Option<&mut JournalRow>,
    ) -> f64 {
        let candidate = match self.state.pitch_mode {
            PitchMode::ControlledDescent(_) => self.descent_pitch(ms, row.as_deref_mut()),
            PitchMode::Normal if self.airspeed_pitch_needed(io) => {
                let airspeed = self.airspeed_pitch_strategy(io, ms, row.as_deref_mut());
                let climb = self.climb_pitch_strategy(ms, row.as_deref_mut());
                self.state.using_airspeed_pitch = airspeed.pitch < climb.pitch;
                if self.state.using_airspeed_pitch {
                    trace!(
                        "Pitch chosen to preserve airspeed ({}) instead of climb rate ({})",
                        airspeed.pitch,
                        climb.pitch
                    );
                } else {
                    trace!(
                        "Pitch chosen to preserve climb rate ({}) instead of air speed ({})",
                        climb.pitch,
                        airspeed.pitch
                    );
                }
                choose_pitch(airspeed, climb)
            }
            PitchMode::Normal => {
                let current = &self.state.current;
                self.airspeed_pitch.set_mode(
                    PidMode::Manual,
                    current.air_speed,
                    -self.state.desired_pitch,
                );
                self.state.using_airspeed_pitch = false;
                self.climb_pitch_strategy(ms, row.as_deref_mut())
            }
        };
        if let (Some(row), Some(triple)) = (row, candidate.journal) {
            row.pitch = Some(triple);
        }
        candidate.pitch
    }

    /// The aircraft cannot hold the requested climb: full throttle, slow,
    /// and still below the altitude goal.
    fn airspeed_pitch_needed(&self, io: &Avionics<'_>) -> bool {
        let current = &self.state.current;
        let min_speed = self.config.min_climb_air_speed;
        let slow = current.air_speed <= min_speed
            || (self.state.using_airspeed_pitch
                && current.air_speed <= min_speed * AIRSPEED_PITCH_HYSTERESIS);
        io.throttle.current() >= self.state.throttle_range.1
            && slow
            && self.state.goal.altitude > current.altitude
    }

    fn airspeed_pitch_strategy(
        &mut self,
        io: &Avionics<'_>,
        ms: f64,
        row: Option<&mut JournalRow>,
    ) -> PitchCandidate {
        let current = self.state.current;
        if self.airspeed_pitch.mode() != PidMode::Automatic {
            let mut seed = self.state.desired_pitch;
            if let Some(curve) = &self.config.engine_out_pitch_curve {
                let max_pitch = curve.eval(f64::from(io.sensors.engines_out()));
                seed = seed.min(max_pitch);
                debug!(
                    "Activating airspeed pitch. max_pitch = {max_pitch}, desired={seed}, engines out = {}",
                    current.engines_out
                );
            } else {
                debug!("Activating airspeed pitch. old desired={seed}");
            }
            self.airspeed_pitch.set_mode(PidMode::Automatic, current.air_speed, -seed);
        }
        // The airspeed loop raises its output to slow down, so its limits
        // are the pitch limits negated and swapped.
        let (min, max) = self.config.pitch_limits.at_roll(current.roll);
        self.airspeed_pitch.set_output_limits(-max, -min);

        let goal = if self.optimizing(PidId::AirspeedPitch) {
            self.airspeed_pitch.set_point()
        } else {
            self.airspeed_pitch.set_set_point(self.config.min_climb_air_speed, None);
            self.config.min_climb_air_speed
        };
        let pitch = -self.airspeed_pitch.compute(current.air_speed, ms);
        self.score(PidId::AirspeedPitch, current.air_speed, pitch, row);
        PitchCandidate { pitch, journal: Some([goal, current.air_speed, pitch]) }
    }

    fn climb_pitch_strategy(&mut self, ms: f64, row: Option<&mut JournalRow>) -> PitchCandidate {
        let current = self.state.current;
        let altitude_error = self.state.goal.altitude - current.altitude;
        let (min, max) = self.config.pitch_limits.at_roll(current.roll);

        if altitude_error.abs() < self.config.climb_pitch_curve.first_input() {
            if self.climb_pitch.mode() != PidMode::Automatic {
                self.climb_pitch.set_mode(
                    PidMode::Automatic,
                    current.climb_rate,
                    self.state.desired_pitch,
                );
            }
            self.climb_pitch.set_output_limits(min, max);
            if !self.optimizing(PidId::ClimbPitch) {
                self.climb_pitch.set_set_point(
                    self.state.goal.climb_rate,
                    Some(self.config.climb_rate_achievement_seconds),
                );
            }
            let pitch = self.climb_pitch.compute(current.climb_rate, ms);
            trace!(
                "Climb Pitch PID: {}/{}-->{pitch}",
                current.climb_rate,
                self.state.goal.climb_rate
            );
            self.score(PidId::ClimbPitch, current.climb_rate, pitch, row);
            PitchCandidate {
                pitch,
                journal: Some([self.state.goal.climb_rate, current.climb_rate, pitch]),
            }
        } else {
            if self.climb_pitch.mode() != PidMode::Manual {
                self.climb_pitch.set_mode(
                    PidMode::Manual,
                    current.climb_rate,
                    self.state.desired_pitch,
                );
            }
            let pitch = self.config.climb_pitch_curve.eval(altitude_error).clamp(min, max);
            trace!("Climb Pitch Curve: {altitude_error}-->{pitch}");
            PitchCandidate { pitch, journal: None }
        }
    }

    /// Follow the planned descent line: the climb-rate goal is the nominal
    /// rate corrected by how far the aircraft is from the profile altitude.
    fn descent_pitch(&mut self, ms: f64, row: Option<&mut JournalRow>) -> PitchCandidate {
        let PitchMode::ControlledDescent(profile) = self.state.pitch_mode else {
            return PitchCandidate { pitch: self.state.desired_pitch, journal: None };
        };
        let current = self.state.current;
        if self.climb_pitch.mode() != PidMode::Automatic {
            self.climb_pitch.set_mode(
                PidMode::Automatic,
                current.climb_rate,
                self.state.desired_pitch,
            );
        }
        let fraction = profile.fraction_remaining(current.position, self.state.goal.course.to);
        let profile_altitude = profile.profile_altitude(fraction);
        let altitude_error = current.altitude - profile_altitude;
        let correction = self
            .config
            .descent_curve
            .as_ref()
            .map_or(0.0, |curve| curve.eval(altitude_error));
        self.state.goal.climb_rate = correction + profile.nominal_rate;
        self.climb_pitch.set_set_point(
            self.state.goal.climb_rate,
            Some(self.config.climb_rate_achievement_seconds),
        );
        trace!(
            "Descent Rate {}/{profile_altitude}--> {}",
            current.altitude,
            self.state.goal.climb_rate
        );
        let pitch = self.climb_pitch.compute(current.climb_rate, ms);
        trace!("Descent Pitch {}/{}--> {pitch}", current.climb_rate, self.state.goal.climb_rate);
        self.score(PidId::ClimbPitch, current.climb_rate, pitch, row);
        PitchCandidate {
            pitch,
            journal: Some([self.state.goal.climb_rate, current.climb_rate, pitch]),
        }
    }
}

/// With both strategies active the more nose-down pitch wins.
pub fn choose_pitch(airspeed: PitchCandidate, climb: PitchCandidate) -> PitchCandidate {
    if airspeed.pitch < climb.pitch {
        airspeed
    } else {
        climb
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FlightControlConfig;
    use crate::control::law::TickStatus;
    use crate::control::test_rig::{test_config, Rig};
    use crate::curve::RateCurve;
    use crate::nav::{Course, Position};

    fn north_course() -> Course {
        Course::new(Position::new(0.0, 0.0), Position::new(0.0, 1.0))
    }

    fn candidate(pitch: f64) -> PitchCandidate {
        PitchCandidate { pitch, journal: None }
    }

    #[test]
    fn nose_down_candidate_wins() {
        assert_eq!(choose_pitch(candidate(-2.0), candidate(3.0)).pitch, -2.0);
        assert_eq!(choose_pitch(candidate(4.0), candidate(1.5)).pitch, 1.5);
        // Ties go to the climb strategy
        assert_eq!(choose_pitch(candidate(1.0), candidate(1.0)), candidate(1.0));
    }

    #[test]
    fn far_from_altitude_uses_curve_and_disarms_pid() {
        let mut rig = Rig::new(3000.0, 100.0);
        let mut fc = rig.flying(test_config());
        fc.follow_course(
            Course::new(Position::new(0.0, 0.0), Position::new(0.0, 1.0)),
            3800.0,
        );
        rig.state.time += 1.0;
        let status = fc.update(&mut rig.io());
        assert!(matches!(status, TickStatus::Commanded { .. }));
        // 800 ft below goal, between the 500 and 1000 ft breakpoints
        assert!((fc.desired_pitch() - 10.4).abs() < 1e-9);
        assert_eq!(fc.pid(PidId::ClimbPitch).mode(), PidMode::Manual);
    }

    #[test]
    fn near_altitude_arms_climb_pid() {
        let mut rig = Rig::new(3000.0, 100.0);
        let mut fc = rig.flying(test_config());
        fc.follow_course(
            Course::new(Position::new(0.0, 0.0), Position::new(0.0, 1.0)),
            3050.0,
        );
        rig.state.time += 1.0;
        fc.update(&mut rig.io());
        assert_eq!(fc.pid(PidId::ClimbPitch).mode(), PidMode::Automatic);
        assert_eq!(fc.pid(PidId::AirspeedPitch).mode(), PidMode::Manual);
    }

    #[test]
    fn slow_at_full_throttle_engages_airspeed_pitch() {
        let mut rig = Rig::new(3000.0, 18.0);
        rig.throttle.value = 1.0;
        let mut fc = rig.flying(test_config());
        fc.follow_course(
            Course::new(Position::new(0.0, 0.0), Position::new(0.0, 1.0)),
            3800.0,
        );
        rig.state.time += 1.0;
        fc.update(&mut rig.io());
        assert_eq!(fc.pid(PidId::AirspeedPitch).mode(), PidMode::Automatic);
        let climb = fc.config().climb_pitch_curve.eval(800.0);
        assert!(fc.desired_pitch() <= climb);
    }

    #[test]
    fn engine_out_caps_airspeed_pitch_seed() {
        let config = FlightControlConfig {
            engine_out_pitch_curve: Some(RateCurve::new(vec![(0.0, 15.0), (1.0, 5.0)]).unwrap()),
            ..test_config()
        };
        let mut rig = Rig::new(3000.0, 18.0);
        rig.throttle.value = 1.0;
        rig.state.engines_out = 1;
        let mut fc = rig.flying(config);
        fc.follow_course(north_course(), 3800.0);
        fc.state.desired_pitch = 12.0;

        rig.state.time += 1.0;
        fc.update(&mut rig.io());
        assert_eq!(fc.pid(PidId::AirspeedPitch).mode(), PidMode::Automatic);
        // Seeded at the 5 deg cap, then one P + I step at 2 kt below minimum
        assert!((fc.desired_pitch() - 3.9).abs() < 1e-9);
    }

    #[test]
    fn controlled_descent_follows_profile() {
        let config = FlightControlConfig {
            descent_curve: Some(RateCurve::new(vec![(0.0, 0.0), (1000.0, -500.0)]).unwrap()),
            ..test_config()
        };
        let mut rig = Rig::new(6000.0, 120.0);
        let mut fc = rig.flying(config);
        fc.descent_course(&rig.state, north_course(), 2000.0, None, true).unwrap();
        let PitchMode::ControlledDescent(profile) = fc.state().pitch_mode else {
            panic!("descent pitch mode expected");
        };
        assert!(profile.nominal_rate < 0.0);
        fc.climb_pitch.set_mode(PidMode::Manual, 0.0, 0.0);

        // On the profile at the start of the course
        rig.state.time += 1.0;
        assert!(matches!(fc.update(&mut rig.io()), TickStatus::Commanded { .. }));
        assert_eq!(fc.pid(PidId::ClimbPitch).mode(), PidMode::Automatic);
        assert!((fc.goal().climb_rate - profile.nominal_rate).abs() < 1e-9);

        // Above the profile: descend faster
        rig.state.altitude = 6500.0;
        rig.state.time += 1.0;
        fc.update(&mut rig.io());
        assert!((fc.goal().climb_rate - (profile.nominal_rate - 250.0)).abs() < 1e-9);

        // Below the profile: the correction outweighs the nominal rate
        rig.state.altitude = 5500.0;
        rig.state.time += 1.0;
        fc.update(&mut rig.io());
        assert!((fc.goal().climb_rate - (profile.nominal_rate + 250.0)).abs() < 1e-9);
        assert!(fc.goal().climb_rate > 0.0);

        // Halfway along, the profile altitude is the midpoint
        rig.state.position = Position::new(0.0, 0.5);
        rig.state.altitude = 4000.0;
        rig.state.time += 1.0;
        fc.update(&mut rig.io());
        assert!((fc.goal().climb_rate - profile.nominal_rate).abs() < 1e-6);
        assert_eq!(fc.state().pitch_mode, PitchMode::ControlledDescent(profile));
    }
}
