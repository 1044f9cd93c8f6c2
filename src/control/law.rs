use std::fmt;

use log::{debug, error, info, trace, warn};

use crate::config::{FlightControlConfig, Tunings};
use crate::error::FlightResult;
use crate::io::journal::{Journal, JournalRow};
use crate::nav::{
    add_position, completed_turn, crossed_course_end, heading_error, intercept_heading,
    turn_radius, Course, DescentProfile, Position, TurnDirection,
};
use crate::vehicle::{Avionics, VehicleState};

use super::optimize::{ActiveOptimization, PidId};
use super::pid::{Pid, PidLoop, PidMode};

/// Heading error below which straight flight counts as on heading.
pub const HEADING_NOMINAL_DEGREES: f64 = 5.0;
/// Relative airspeed error below which airspeed counts as nominal.
pub const AIRSPEED_NOMINAL_FRACTION: f64 = 0.05;
/// Altitude error (feet) below which altitude counts as nominal.
pub const ALTITUDE_NOMINAL_FEET: f64 = 50.0;
/// Throttle held while a swoop trades altitude for speed.
pub const SWOOP_THROTTLE: f64 = 0.75;

// ---------------------------------------------------------------------------
// Mode, goal, per-tick outcome
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlightMode {
    Course,
    Turn,
    Straight,
    SwoopDown,
    SwoopUp,
}

impl FlightMode {
    pub fn is_swoop(self) -> bool {
        matches!(self, FlightMode::SwoopDown | FlightMode::SwoopUp)
    }
}

impl fmt::Display for FlightMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FlightMode::Course => "course",
            FlightMode::Turn => "turn",
            FlightMode::Straight => "straight",
            FlightMode::SwoopDown => "swoop_down",
            FlightMode::SwoopUp => "swoop_up",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavigationGoal {
    pub course: Course,
    /// Feet.
    pub altitude: f64,
    /// Knots.
    pub air_speed: f64,
    /// Degrees true.
    pub true_heading: f64,
    /// Feet per minute, derived every tick.
    pub climb_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PitchMode {
    Normal,
    ControlledDescent(DescentProfile),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct SwoopPlan {
    pub high_altitude: f64,
    pub mode_before: FlightMode,
    pub air_speed_before: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickStatus {
    /// Attitude command issued this tick (degrees).
    Commanded { pitch: f64, roll: f64 },
    /// The current maneuver finished; nothing was commanded.
    DirectiveRequested,
}

/// Mutable state of the control law, separate from its immutable config.
#[derive(Debug, Clone)]
pub struct FlightControlState {
    pub mode: FlightMode,
    pub goal: NavigationGoal,
    pub current: VehicleState,
    pub desired_roll: f64,
    pub desired_pitch: f64,
    /// Rate-limited pitch last sent to the attitude subsystem.
    pub applied_pitch: f64,
    pub pitch_mode: PitchMode,
    pub(super) turn_direction: TurnDirection,
    pub(super) swoop: Option<SwoopPlan>,
    /// Knots; below this the climb out of a swoop goes to full throttle.
    pub(super) swoop_min_air_speed: f64,
    pub(super) using_airspeed_pitch: bool,
    pub(super) course_rounding: bool,
    pub(super) notify_when_nominal: bool,
    pub(super) airspeed_achievement_minutes: f64,
    pub(super) last_update_ms: Option<f64>,
    pub(super) throttle_range: (f64, f64),
}

impl FlightControlState {
    fn new(config: &FlightControlConfig) -> Self {
        let origin = Position::new(0.0, 0.0);
        Self {
            mode: FlightMode::Course,
            goal: NavigationGoal {
                course: Course::new(origin, origin),
                altitude: 0.0,
                air_speed: 0.0,
                true_heading: 0.0,
                climb_rate: 0.0,
            },
            current: VehicleState::level(0.0, origin, 0.0, 0.0, 0.0),
            desired_roll: 0.0,
            desired_pitch: 0.0,
            applied_pitch: 0.0,
            pitch_mode: PitchMode::Normal,
            turn_direction: TurnDirection::Either,
            swoop: None,
            swoop_min_air_speed: config.min_climb_air_speed,
            using_airspeed_pitch: false,
            course_rounding: true,
            notify_when_nominal: false,
            airspeed_achievement_minutes: config.air_speed_achievement_minutes,
            last_update_ms: None,
            throttle_range: (0.0, 1.0),
        }
    }
}

// ---------------------------------------------------------------------------
// Flight control law
// ---------------------------------------------------------------------------

/// Converts navigation goals into pitch, roll and throttle commands.
///
/// Owns the three PID loops (climb-rate pitch, airspeed pitch, throttle) and
/// the mode state machine. Collaborators are borrowed per call through
/// [`Avionics`]; `update` is meant to be called once per sample period.
#[derive(Debug)]
pub struct FlightControl {
    pub(super) config: FlightControlConfig,
    pub(super) tunings: Tunings,
    pub(super) state: FlightControlState,
    pub(super) climb_pitch: Pid,
    pub(super) airspeed_pitch: Pid,
    pub(super) throttle: Pid,
    pub(super) journal: Option<Journal>,
    pub(super) optimization: Option<ActiveOptimization>,
}

impl FlightControl {
    pub fn new(config: FlightControlConfig) -> FlightResult<Self> {
        let tunings = config.validate()?;
        let (min_pitch, max_pitch) = config.pitch_limits.at_roll(0.0);

        let mut climb_pitch = Pid::new(tunings.climb_pitch);
        climb_pitch.set_output_limits(min_pitch, max_pitch);
        climb_pitch.set_sample_time(config.pitch_pid_sample_ms);

        let mut airspeed_pitch = Pid::new(tunings.airspeed_pitch);
        airspeed_pitch.set_output_limits(min_pitch, max_pitch);
        airspeed_pitch.set_sample_time(config.pitch_pid_sample_ms);

        let mut throttle = Pid::new(tunings.throttle);
        throttle.set_sample_time(config.throttle_pid_sample_ms);

        Ok(Self {
            state: FlightControlState::new(&config),
            config,
            tunings,
            climb_pitch,
            airspeed_pitch,
            throttle,
            journal: None,
            optimization: None,
        })
    }

    pub fn config(&self) -> &FlightControlConfig {
        &self.config
    }

    pub fn state(&self) -> &FlightControlState {
        &self.state
    }

    pub fn mode(&self) -> FlightMode {
        self.state.mode
    }

    pub fn goal(&self) -> &NavigationGoal {
        &self.state.goal
    }

    pub fn applied_pitch(&self) -> f64 {
        self.state.applied_pitch
    }

    pub fn desired_pitch(&self) -> f64 {
        self.state.desired_pitch
    }

    pub fn desired_roll(&self) -> f64 {
        self.state.desired_roll
    }

    pub fn journal_open(&self) -> bool {
        self.journal.is_some()
    }

    pub fn pid(&self, id: PidId) -> &Pid {
        match id {
            PidId::ClimbPitch => &self.climb_pitch,
            PidId::AirspeedPitch => &self.airspeed_pitch,
            PidId::Throttle => &self.throttle,
        }
    }

    pub(super) fn pid_mut(&mut self, id: PidId) -> &mut Pid {
        match id {
            PidId::ClimbPitch => &mut self.climb_pitch,
            PidId::AirspeedPitch => &mut self.airspeed_pitch,
            PidId::Throttle => &mut self.throttle,
        }
    }

    /// Take authority after the take-off roll: arm the loops, start the
    /// attitude subsystem and open the configured journal.
    pub fn start(&mut self, io: &mut Avionics<'_>, initial_pitch: f64) -> FlightResult<()> {
        info!("Flight control starting, initial pitch {initial_pitch}");
        let current = VehicleState::sample(io.sensors);
        self.state.current = current;

        let (min, max) = io.throttle.limits();
        self.state.throttle_range = (min, max);
        self.throttle.set_output_limits(min, max);
        self.throttle.set_set_point(self.state.goal.air_speed, None);
        self.throttle.set_mode(PidMode::Automatic, current.air_speed, io.throttle.current());

        self.state.goal.climb_rate = self.climb_rate_target();
        self.climb_pitch.set_mode(PidMode::Automatic, current.climb_rate, initial_pitch);

        self.state.desired_pitch = initial_pitch;
        self.state.applied_pitch = current.pitch;
        self.state.airspeed_achievement_minutes = self.config.air_speed_achievement_minutes;
        self.state.last_update_ms = Some(current.time * 1000.0);

        io.attitude.start_flight();

        if self.journal.is_none() {
            if let Some(cfg) = &self.config.journal {
                self.journal = Some(Journal::create(&cfg.path, cfg.columns())?);
                debug!("Journaling to {}", cfg.path.display());
            }
        }
        Ok(())
    }

    /// Disarm every loop, stop the attitude subsystem and close journals.
    /// Returns the last applied pitch.
    pub fn stop(&mut self, io: &mut Avionics<'_>) -> f64 {
        if self.optimization.is_some() {
            if let Err(e) = self.stop_optimization(io) {
                warn!("Stopping PID optimization failed: {e}");
            }
        }
        let current = self.state.current;
        let desired_pitch = self.state.desired_pitch;
        self.throttle.set_mode(PidMode::Manual, current.air_speed, io.throttle.current());
        self.climb_pitch.set_mode(PidMode::Manual, current.climb_rate, desired_pitch);
        self.airspeed_pitch.set_mode(PidMode::Manual, current.air_speed, -desired_pitch);
        io.attitude.stop_flight();
        if let Some(journal) = self.journal.take() {
            if let Err(e) = journal.close() {
                error!("Closing flight journal failed: {e}");
            }
        }
        info!("Flight control stopped at pitch {}", self.state.applied_pitch);
        self.state.applied_pitch
    }

    /// One control tick.
    pub fn update(&mut self, io: &mut Avionics<'_>) -> TickStatus {
        let current = VehicleState::sample(io.sensors);
        let ms = current.time * 1000.0;
        self.state.current = current;

        let mut heading_nominal = false;
        let roll = match self.state.mode {
            FlightMode::Turn => {
                let (roll, _) = self.compute_roll(self.state.goal.true_heading);
                if completed_turn(current.true_heading, self.state.goal.true_heading) {
                    debug!("Turn to {} completed", self.state.goal.true_heading);
                    io.directives.next_directive();
                    return TickStatus::DirectiveRequested;
                }
                roll
            }
            FlightMode::SwoopDown => {
                self.swoop_down(io);
                0.0
            }
            FlightMode::SwoopUp => {
                self.swoop_up(io);
                0.0
            }
            FlightMode::Straight => {
                let (roll, error) = self.compute_roll(self.state.goal.true_heading);
                heading_nominal = error.abs() < HEADING_NOMINAL_DEGREES;
                roll
            }
            FlightMode::Course => {
                if self.completed_course() {
                    debug!("Flight control completed course");
                    io.directives.next_directive();
                    return TickStatus::DirectiveRequested;
                }
                self.roll_from_course()
            }
        };
        let max_roll = self.config.max_roll;
        self.state.desired_roll = roll.clamp(-max_roll, max_roll);

        let mut row = self.active_journal_mut().map(|_| JournalRow::new(ms));

        let mut airspeed_nominal = false;
        if self.throttle.mode() == PidMode::Automatic {
            let goal = self.state.goal.air_speed;
            if !self.optimizing(PidId::Throttle) {
                let achievement = self.state.airspeed_achievement_minutes * 60.0;
                self.throttle.set_set_point(goal, Some(achievement));
            }
            let (min, max) = self.state.throttle_range;
            let th = self.throttle.compute(current.air_speed, ms).clamp(min, max);
            self.score(PidId::Throttle, current.air_speed, th, row.as_mut());
            if let Some(r) = row.as_mut() {
                r.throttle = Some([goal, current.air_speed, th]);
            }
            io.throttle.set(th);
            if goal.abs() > f64::EPSILON
                && ((current.air_speed - goal) / goal).abs() < AIRSPEED_NOMINAL_FRACTION
            {
                airspeed_nominal = true;
            }
        }

        let mut altitude_nominal = false;
        if !self.state.mode.is_swoop() {
            self.state.goal.climb_rate = self.climb_rate_target();
            trace!(
                "Desired climb rate {} - {} ==> {}",
                self.state.goal.altitude,
                current.altitude,
                self.state.goal.climb_rate
            );
            self.state.desired_pitch = self.select_pitch(io, ms, row.as_mut());
            altitude_nominal =
                (current.altitude - self.state.goal.altitude).abs() < ALTITUDE_NOMINAL_FEET;
        }

        if let Some(row) = row {
            self.write_journal_row(&row);
        }

        self.state.applied_pitch = self.slew_pitch(ms);
        io.attitude.update_controls(self.state.applied_pitch, self.state.desired_roll, 0.0);
        self.state.last_update_ms = Some(ms);

        if self.state.notify_when_nominal && altitude_nominal && airspeed_nominal && heading_nominal
        {
            debug!("Flight nominal, requesting next directive");
            self.state.notify_when_nominal = false;
            io.directives.next_directive();
        }

        TickStatus::Commanded { pitch: self.state.applied_pitch, roll: self.state.desired_roll }
    }

    /// Move the applied pitch toward the desired pitch, bounded by the
    /// configured change per PID sample period.
    fn slew_pitch(&self, ms: f64) -> f64 {
        let elapsed = ms - self.state.last_update_ms.unwrap_or(ms);
        let max_step =
            (self.config.max_pitch_change_per_sample * elapsed / self.config.pitch_pid_sample_ms)
                .max(0.0);
        let applied = self.state.applied_pitch;
        let diff = self.state.desired_pitch - applied;
        if diff.abs() > max_step {
            applied + max_step.copysign(diff)
        } else {
            self.state.desired_pitch
        }
    }

    fn swoop_down(&mut self, io: &mut Avionics<'_>) {
        let Some(plan) = self.state.swoop else {
            self.abandon_swoop(io);
            return;
        };
        let current = self.state.current;
        if current.altitude <= self.state.goal.altitude + self.config.swoop_altitude_reversal {
            debug!("Swoop reversing at {} ft, climbing to {}", current.altitude, plan.high_altitude);
            self.state.mode = FlightMode::SwoopUp;
            self.state.desired_pitch = self.config.swoop_pitch;
            self.state.goal.altitude = plan.high_altitude;
            io.throttle.set(SWOOP_THROTTLE);
            self.throttle.set_mode(PidMode::Manual, current.air_speed, io.throttle.current());
        } else if current.air_speed > self.config.swoop_max_air_speed {
            self.throttle.set_mode(PidMode::Automatic, current.air_speed, io.throttle.current());
            self.state.goal.air_speed = self.config.swoop_max_air_speed;
        }
    }

    fn swoop_up(&mut self, io: &mut Avionics<'_>) {
        let Some(plan) = self.state.swoop else {
            self.abandon_swoop(io);
            return;
        };
        let current = self.state.current;
        if current.altitude >= self.state.goal.altitude - self.config.swoop_altitude_reversal {
            debug!("Swoop complete at {} ft, resuming {}", current.altitude, plan.mode_before);
            self.throttle.set_mode(PidMode::Automatic, current.air_speed, io.throttle.current());
            self.state.mode = plan.mode_before;
            self.state.goal.air_speed = plan.air_speed_before;
            self.climb_pitch.set_mode(PidMode::Automatic, current.climb_rate, current.pitch);
            self.state.swoop = None;
        } else if current.air_speed < self.state.swoop_min_air_speed {
            io.throttle.set(1.0);
            self.state.desired_pitch = self.config.swoop_pitch / 2.0;
        }
    }

    /// A swoop mode with no plan has nothing to reverse to: hold the current
    /// heading and altitude instead.
    fn abandon_swoop(&mut self, io: &mut Avionics<'_>) {
        let current = self.state.current;
        warn!("{} without a swoop plan, flying straight and level", self.state.mode);
        self.state.mode = FlightMode::Straight;
        self.state.goal.true_heading = current.true_heading;
        self.state.goal.altitude = current.altitude;
        self.throttle.set_mode(PidMode::Automatic, current.air_speed, io.throttle.current());
    }

    /// Roll toward `target` heading from the current ground track. Returns
    /// (roll, wrapped heading error).
    pub(super) fn compute_roll(&mut self, target: f64) -> (f64, f64) {
        let error =
            heading_error(target, self.state.current.ground_track, &mut self.state.turn_direction);
        (self.config.roll_curve.eval(error), error)
    }

    fn lead_turn_radius(&self, speed: f64) -> f64 {
        turn_radius(speed, self.config.turn_rate)
    }

    fn roll_from_course(&mut self) -> f64 {
        let current = self.state.current;
        let projected = add_position(
            current.position,
            current.ground_speed * self.config.course_projection_seconds / 3600.0,
            current.ground_track,
        );
        let lead = self.lead_turn_radius(current.air_speed) * self.config.intercept_multiplier;
        let heading = intercept_heading(projected, &self.state.goal.course, lead);
        self.compute_roll(heading).0
    }

    pub(super) fn completed_course(&self) -> bool {
        let lead = if self.state.course_rounding {
            self.lead_turn_radius(self.state.current.ground_speed)
        } else {
            0.0
        };
        crossed_course_end(self.state.current.position, &self.state.goal.course, lead)
    }

    /// Climb rate (ft/min) that closes the current altitude error.
    pub(super) fn climb_rate_target(&self) -> f64 {
        let altitude_error = self.state.goal.altitude - self.state.current.altitude;
        match &self.config.climb_rate_curve {
            Some(curve) => curve.eval(altitude_error),
            None => {
                let (min, max) = self.config.climb_rate_limits;
                (altitude_error / self.config.altitude_achievement_minutes).clamp(min, max)
            }
        }
    }

    pub(super) fn optimizing(&self, id: PidId) -> bool {
        matches!(&self.optimization, Some(ActiveOptimization::Local(s)) if s.pid() == id)
    }

    /// Report one computed sample of `id` to an active scoring session.
    pub(super) fn score(
        &mut self,
        id: PidId,
        measured: f64,
        commanded: f64,
        row: Option<&mut JournalRow>,
    ) {
        if let Some(ActiveOptimization::Local(session)) = &mut self.optimization {
            session.score_sample(id, measured, commanded, row);
        }
    }

    /// The session journal while a local optimization runs, else the flight
    /// journal.
    fn active_journal_mut(&mut self) -> Option<&mut Journal> {
        match &mut self.optimization {
            Some(ActiveOptimization::Local(session)) => session.journal_mut(),
            _ => self.journal.as_mut(),
        }
    }

    fn write_journal_row(&mut self, row: &JournalRow) {
        let failed = match self.active_journal_mut() {
            Some(journal) => journal.write_row(row).err(),
            None => None,
        };
        if let Some(e) = failed {
            error!("Journal write failed, journaling disabled: {e}");
            match &mut self.optimization {
                Some(ActiveOptimization::Local(session)) => session.drop_journal(),
                _ => self.journal = None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JournalConfig;
    use crate::control::optimize::SetPointSweep;
    use crate::control::pid::PidGains;
    use crate::control::test_rig::{test_config, Rig};

    fn north_course() -> Course {
        Course::new(Position::new(0.0, 0.0), Position::new(0.0, 1.0))
    }

    #[test]
    fn stop_returns_applied_pitch_and_disarms() {
        let mut rig = Rig::new(3000.0, 100.0);
        let mut fc = rig.flying(test_config());
        fc.follow_course(north_course(), 3800.0);
        rig.state.time += 1.0;
        fc.update(&mut rig.io());
        // Desired pitch jumps to the curve value, applied pitch slews 1 deg
        assert!((fc.desired_pitch() - 10.4).abs() < 1e-9);
        assert!((fc.applied_pitch() - 1.0).abs() < 1e-9);

        let last = fc.stop(&mut rig.io());
        assert!((last - 1.0).abs() < 1e-9);
        for id in PidId::ALL {
            assert_eq!(fc.pid(id).mode(), PidMode::Manual, "{} still armed", id.name());
        }
        assert!(!rig.attitude.flying);
        assert!(!fc.journal_open());
    }

    #[test]
    fn start_opens_configured_journal() {
        let path = std::env::temp_dir()
            .join(format!("flight-law-start-journal-{}.csv", std::process::id()));
        let config = FlightControlConfig {
            journal: Some(JournalConfig { path: path.clone(), pitch: true, throttle: true }),
            ..test_config()
        };
        let mut rig = Rig::new(3000.0, 100.0);
        let mut fc = rig.flying(config);
        assert!(fc.journal_open());
        assert!(rig.attitude.flying);

        rig.state.time += 1.0;
        fc.update(&mut rig.io());
        fc.stop(&mut rig.io());
        assert!(!fc.journal_open());

        let contents = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(
            lines[0],
            "Time,PitchGoal,PitchInput,DesiredPitch,ThrottleSet,ThrottleCurrent,Throttle"
        );
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("1000,"));
        assert_eq!(lines[1].split(',').count(), 7);
    }

    #[test]
    fn stop_during_optimization_restores_gains() {
        let mut rig = Rig::new(3000.0, 100.0);
        let config = test_config();
        let configured = config.throttle_pid.unwrap();
        let mut fc = rig.flying(config);
        let trial = PidGains::new(0.1, 0.0, 0.0);
        fc.start_optimization(
            &mut rig.io(),
            "throttle",
            trial,
            Box::new(SetPointSweep::new(vec![110.0, 90.0])),
            None,
        )
        .unwrap();
        assert_eq!(fc.pid(PidId::Throttle).tunings(), trial);

        fc.stop(&mut rig.io());
        assert!(!fc.is_optimizing());
        assert_eq!(fc.pid(PidId::Throttle).tunings(), configured);
        assert_eq!(fc.pid(PidId::Throttle).mode(), PidMode::Manual);
    }

    #[test]
    fn overspeed_in_dive_rearms_throttle() {
        let mut rig = Rig::new(5000.0, 100.0);
        let mut fc = rig.flying(test_config());
        fc.fly_course(north_course(), Some(5000.0), Some(100.0), true);
        fc.swoop(&mut rig.io(), 3000.0, 4500.0, None);
        assert_eq!(fc.pid(PidId::Throttle).mode(), PidMode::Manual);

        rig.state.altitude = 4000.0;
        rig.state.air_speed = 210.0;
        rig.state.time += 1.0;
        fc.update(&mut rig.io());
        assert_eq!(fc.mode(), FlightMode::SwoopDown);
        assert_eq!(fc.pid(PidId::Throttle).mode(), PidMode::Automatic);
        assert_eq!(fc.goal().air_speed, fc.config().swoop_max_air_speed);
    }

    #[test]
    fn slow_climb_out_of_swoop_goes_full_throttle() {
        let mut rig = Rig::new(5000.0, 100.0);
        let mut fc = rig.flying(test_config());
        fc.fly_course(north_course(), Some(5000.0), Some(100.0), true);
        fc.swoop(&mut rig.io(), 3000.0, 4500.0, Some(30.0));

        rig.state.altitude = 3150.0;
        rig.state.time += 1.0;
        fc.update(&mut rig.io());
        assert_eq!(fc.mode(), FlightMode::SwoopUp);
        assert_eq!(rig.throttle.value, SWOOP_THROTTLE);

        rig.state.altitude = 3500.0;
        rig.state.air_speed = 25.0;
        rig.state.time += 1.0;
        fc.update(&mut rig.io());
        assert_eq!(fc.mode(), FlightMode::SwoopUp);
        assert_eq!(rig.throttle.value, 1.0);
        assert_eq!(fc.desired_pitch(), fc.config().swoop_pitch / 2.0);
    }

    #[test]
    fn swoop_mode_without_plan_falls_back_to_straight() {
        let mut rig = Rig::new(4000.0, 100.0);
        rig.state.true_heading = 45.0;
        let mut fc = rig.flying(test_config());
        fc.state.mode = FlightMode::SwoopUp;
        fc.state.swoop = None;

        rig.state.time += 1.0;
        assert!(matches!(fc.update(&mut rig.io()), TickStatus::Commanded { .. }));
        assert_eq!(fc.mode(), FlightMode::Straight);
        assert_eq!(fc.goal().true_heading, 45.0);
        assert_eq!(fc.goal().altitude, 4000.0);
        assert_eq!(fc.pid(PidId::Throttle).mode(), PidMode::Automatic);
        assert_eq!(fc.pid(PidId::ClimbPitch).mode(), PidMode::Automatic);
    }
}
