use std::fmt;
use std::str::FromStr;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{FlightControlError, FlightResult};
use crate::io::journal::{Journal, JournalRow};
use crate::vehicle::Avionics;

use super::law::{FlightControl, FlightMode, PitchMode};
use super::pid::{PidGains, PidLoop};

/// Prefix routing an optimization target to the attitude subsystem.
pub const ATTITUDE_PREFIX: &str = "attitude.";

// ---------------------------------------------------------------------------
// Targets
// ---------------------------------------------------------------------------

/// The three loops owned by the flight control law.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PidId {
    ClimbPitch,
    AirspeedPitch,
    Throttle,
}

impl PidId {
    pub const ALL: [PidId; 3] = [PidId::ClimbPitch, PidId::AirspeedPitch, PidId::Throttle];

    pub fn name(self) -> &'static str {
        match self {
            PidId::ClimbPitch => "climb_pitch",
            PidId::AirspeedPitch => "airspeed_pitch",
            PidId::Throttle => "throttle",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptimizationTarget {
    Local(PidId),
    /// A loop inside the attitude subsystem, named without the prefix.
    Attitude(String),
}

impl FromStr for OptimizationTarget {
    type Err = FlightControlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(name) = s.strip_prefix(ATTITUDE_PREFIX) {
            if !name.is_empty() {
                return Ok(OptimizationTarget::Attitude(name.to_owned()));
            }
        }
        PidId::ALL
            .into_iter()
            .find(|id| id.name() == s)
            .map(OptimizationTarget::Local)
            .ok_or_else(|| FlightControlError::UnknownOptimizationTarget(s.to_owned()))
    }
}

impl fmt::Display for OptimizationTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptimizationTarget::Local(id) => f.write_str(id.name()),
            OptimizationTarget::Attitude(name) => write!(f, "{ATTITUDE_PREFIX}{name}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Scoring collaborator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringStep {
    pub index: usize,
    /// Set-point the loop is driven to for this step.
    pub goal: f64,
}

/// Grades a loop's response while it is driven through a sequence of steps.
pub trait Scoring {
    /// `initial` is the loop's current output (pitch or throttle).
    fn initialize_scoring(&mut self, initial: f64) -> ScoringStep;

    /// `None` once the sweep is finished.
    fn next_step(&mut self) -> Option<ScoringStep>;

    fn score(&self) -> f64;

    /// Called after every compute of the loop under test.
    fn increment_score(
        &mut self,
        measured: f64,
        commanded: f64,
        goal: f64,
        row: Option<&mut JournalRow>,
    );
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OptimizationProgress {
    Step(ScoringStep),
    Finished { score: f64 },
}

/// Steps through fixed set-points and scores the mean absolute error.
#[derive(Debug, Clone, Default)]
pub struct SetPointSweep {
    goals: Vec<f64>,
    index: usize,
    total_error: f64,
    samples: usize,
}

impl SetPointSweep {
    pub fn new(goals: Vec<f64>) -> Self {
        Self { goals, ..Self::default() }
    }
}

impl Scoring for SetPointSweep {
    fn initialize_scoring(&mut self, initial: f64) -> ScoringStep {
        self.index = 0;
        self.total_error = 0.0;
        self.samples = 0;
        ScoringStep { index: 0, goal: self.goals.first().copied().unwrap_or(initial) }
    }

    fn next_step(&mut self) -> Option<ScoringStep> {
        let index = self.index + 1;
        let goal = *self.goals.get(index)?;
        self.index = index;
        Some(ScoringStep { index, goal })
    }

    fn score(&self) -> f64 {
        if self.samples == 0 {
            0.0
        } else {
            self.total_error / self.samples as f64
        }
    }

    fn increment_score(
        &mut self,
        measured: f64,
        _commanded: f64,
        goal: f64,
        row: Option<&mut JournalRow>,
    ) {
        let error = (goal - measured).abs();
        self.total_error += error;
        self.samples += 1;
        if let Some(row) = row {
            row.push_extra(error);
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Optimization of one local loop: scoring state plus its own journal,
/// which replaces the flight journal while the session runs.
pub struct OptimizationSession {
    pid: PidId,
    scoring: Box<dyn Scoring>,
    goal: f64,
    journal: Option<Journal>,
}

impl fmt::Debug for OptimizationSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptimizationSession")
            .field("pid", &self.pid)
            .field("goal", &self.goal)
            .field("journal", &self.journal)
            .finish_non_exhaustive()
    }
}

impl OptimizationSession {
    pub fn pid(&self) -> PidId {
        self.pid
    }

    pub fn goal(&self) -> f64 {
        self.goal
    }

    pub(super) fn journal_mut(&mut self) -> Option<&mut Journal> {
        self.journal.as_mut()
    }

    pub(super) fn drop_journal(&mut self) {
        self.journal = None;
    }

    pub(super) fn score_sample(
        &mut self,
        id: PidId,
        measured: f64,
        commanded: f64,
        row: Option<&mut JournalRow>,
    ) {
        if id == self.pid {
            self.scoring.increment_score(measured, commanded, self.goal, row);
        }
    }

    /// Close the journal and return the final score.
    fn finish(self) -> FlightResult<f64> {
        let score = self.scoring.score();
        if let Some(journal) = self.journal {
            journal.close()?;
        }
        Ok(score)
    }
}

#[derive(Debug)]
pub(super) enum ActiveOptimization {
    Local(OptimizationSession),
    /// Routed to the attitude subsystem, which holds the session.
    Attitude,
}

// ---------------------------------------------------------------------------
// Session control on the flight control law
// ---------------------------------------------------------------------------

impl FlightControl {
    pub fn is_optimizing(&self) -> bool {
        self.optimization.is_some()
    }

    /// The loop behind `id` through its tunable interface.
    pub fn tuning_loop(&mut self, id: PidId) -> &mut dyn PidLoop {
        self.pid_mut(id)
    }

    /// Begin optimizing `target` with trial `gains`. Switches to straight
    /// flight and applies the scorer's first set-point.
    pub fn start_optimization(
        &mut self,
        io: &mut Avionics<'_>,
        target: &str,
        gains: PidGains,
        mut scoring: Box<dyn Scoring>,
        journal: Option<Journal>,
    ) -> FlightResult<ScoringStep> {
        let target: OptimizationTarget = target.parse()?;
        if self.optimization.is_some() {
            warn!("Optimization already running, stopping it before {target}");
            self.stop_optimization(io)?;
        }
        self.state.mode = FlightMode::Straight;
        self.state.pitch_mode = PitchMode::Normal;

        let id = match &target {
            OptimizationTarget::Attitude(name) => {
                let step = io.attitude.start_optimization(name, gains, scoring, journal)?;
                self.optimization = Some(ActiveOptimization::Attitude);
                info!("PID optimization of {target} started, goal {}", step.goal);
                return Ok(step);
            }
            OptimizationTarget::Local(id) => *id,
        };

        let initial = match id {
            PidId::Throttle => io.throttle.current(),
            PidId::ClimbPitch | PidId::AirspeedPitch => self.state.desired_pitch,
        };
        let step = scoring.initialize_scoring(initial);
        let achievement = self.optimization_achievement_secs(id);
        let pid = self.tuning_loop(id);
        pid.set_tunings(gains);
        pid.set_set_point(step.goal, Some(achievement));

        self.optimization = Some(ActiveOptimization::Local(OptimizationSession {
            pid: id,
            scoring,
            goal: step.goal,
            journal,
        }));
        info!("PID optimization of {target} started, goal {}", step.goal);
        Ok(step)
    }

    /// Advance to the next step, or finish the session and restore the
    /// configured gains when the scorer has none left.
    pub fn next_optimization(&mut self, io: &mut Avionics<'_>) -> FlightResult<OptimizationProgress> {
        let next = match &mut self.optimization {
            None => return Err(FlightControlError::NoOptimization),
            Some(ActiveOptimization::Attitude) => {
                let progress = io.attitude.next_optimization()?;
                if let OptimizationProgress::Finished { score } = progress {
                    info!("Attitude PID optimization finished, score {score}");
                    self.optimization = None;
                }
                return Ok(progress);
            }
            Some(ActiveOptimization::Local(session)) => {
                let step = session.scoring.next_step();
                if let Some(step) = step {
                    session.goal = step.goal;
                }
                step.map(|s| (session.pid, s))
            }
        };

        match next {
            Some((id, step)) => {
                let achievement = self.optimization_achievement_secs(id);
                self.tuning_loop(id).set_set_point(step.goal, Some(achievement));
                Ok(OptimizationProgress::Step(step))
            }
            None => {
                let score = self.finish_local_optimization()?;
                Ok(OptimizationProgress::Finished { score })
            }
        }
    }

    /// Abandon the active session, restoring the configured gains.
    pub fn stop_optimization(&mut self, io: &mut Avionics<'_>) -> FlightResult<()> {
        match &self.optimization {
            None => Err(FlightControlError::NoOptimization),
            Some(ActiveOptimization::Attitude) => {
                self.optimization = None;
                io.attitude.stop_optimization()
            }
            Some(ActiveOptimization::Local(_)) => self.finish_local_optimization().map(|_| ()),
        }
    }

    fn finish_local_optimization(&mut self) -> FlightResult<f64> {
        let Some(ActiveOptimization::Local(session)) = self.optimization.take() else {
            return Err(FlightControlError::NoOptimization);
        };
        let id = session.pid;
        let gains = match id {
            PidId::ClimbPitch => self.tunings.climb_pitch,
            PidId::AirspeedPitch => self.tunings.airspeed_pitch,
            PidId::Throttle => self.tunings.throttle,
        };
        self.tuning_loop(id).set_tunings(gains);
        let score = session.finish()?;
        info!("PID optimization of {} finished, score {score}", id.name());
        Ok(score)
    }

    fn optimization_achievement_secs(&self, id: PidId) -> f64 {
        match id {
            PidId::ClimbPitch => self.config.climb_rate_achievement_seconds,
            PidId::AirspeedPitch | PidId::Throttle => {
                self.state.airspeed_achievement_minutes * 60.0
            }
        }
    }
}
