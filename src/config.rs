use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::control::pid::PidGains;
use crate::curve::RateCurve;
use crate::error::{FlightControlError, FlightResult};
use crate::io::journal::JournalColumns;

// ---------------------------------------------------------------------------
// Pitch limits: fixed pair, or max pitch magnitude as a function of |roll|
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PitchLimits {
    Fixed(f64, f64),
    RollCurve(RateCurve),
}

impl PitchLimits {
    /// (min, max) pitch in degrees at the given roll angle.
    pub fn at_roll(&self, roll: f64) -> (f64, f64) {
        match self {
            PitchLimits::Fixed(min, max) => (*min, *max),
            PitchLimits::RollCurve(curve) => {
                let max = curve.eval(roll.abs());
                (-max, max)
            }
        }
    }

    fn validate(&self) -> FlightResult<()> {
        match self {
            PitchLimits::Fixed(min, max) if !(min <= max) => Err(FlightControlError::Config(
                format!("pitch limits ({min}, {max}) are not ordered"),
            )),
            PitchLimits::RollCurve(curve) if curve.points().iter().any(|(_, y)| *y < 0.0) => Err(
                FlightControlError::Config("pitch limit curve outputs must be non-negative".into()),
            ),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalConfig {
    pub path: PathBuf,
    #[serde(default)]
    pub pitch: bool,
    #[serde(default)]
    pub throttle: bool,
}

impl JournalConfig {
    pub fn columns(&self) -> JournalColumns {
        JournalColumns { pitch: self.pitch, throttle: self.throttle }
    }
}

/// Validated gains for the three loops owned by the control law.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tunings {
    pub climb_pitch: PidGains,
    pub airspeed_pitch: PidGains,
    pub throttle: PidGains,
}

// ---------------------------------------------------------------------------
// Flight control configuration (immutable once the law is built)
// ---------------------------------------------------------------------------

/// Units: feet, knots, degrees, feet per minute, milliseconds for PID sample
/// periods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightControlConfig {
    pub altitude_achievement_minutes: f64,
    pub air_speed_achievement_minutes: f64,
    pub climb_rate_achievement_seconds: f64,
    pub climb_rate_limits: (f64, f64),
    pub pitch_limits: PitchLimits,

    pub pitch_pid_sample_ms: f64,
    pub throttle_pid_sample_ms: f64,
    pub climb_pitch_pid: Option<PidGains>,
    pub airspeed_pitch_pid: Option<PidGains>,
    pub throttle_pid: Option<PidGains>,

    pub roll_curve: RateCurve,
    pub intercept_multiplier: f64,
    pub max_roll: f64,
    pub max_pitch_change_per_sample: f64,
    /// Degrees per minute at max roll.
    pub turn_rate: f64,
    pub course_projection_seconds: f64,

    /// Altitude error -> climb rate. Replaces the achievement-time rule when set.
    pub climb_rate_curve: Option<RateCurve>,
    /// Altitude error -> pitch. The first breakpoint bounds the PID regime.
    pub climb_pitch_curve: RateCurve,
    /// Engines out -> max pitch while preserving airspeed.
    pub engine_out_pitch_curve: Option<RateCurve>,
    /// Altitude above descent profile -> climb rate correction.
    pub descent_curve: Option<RateCurve>,
    pub min_climb_air_speed: f64,

    pub swoop_pitch: f64,
    pub swoop_max_air_speed: f64,
    pub swoop_altitude_reversal: f64,

    pub journal: Option<JournalConfig>,
}

impl Default for FlightControlConfig {
    fn default() -> Self {
        Self {
            altitude_achievement_minutes: 1.2,
            air_speed_achievement_minutes: 0.5,
            climb_rate_achievement_seconds: 10.0,
            climb_rate_limits: (-1000.0, 1000.0),
            pitch_limits: PitchLimits::RollCurve(curve(&[(0.0, 20.0), (45.0, 0.0)])),
            pitch_pid_sample_ms: 1000.0,
            throttle_pid_sample_ms: 1000.0,
            climb_pitch_pid: None,
            airspeed_pitch_pid: None,
            throttle_pid: None,
            roll_curve: curve(&[(0.0, 0.0), (5.0, 5.0), (10.0, 20.0), (20.0, 30.0)]),
            intercept_multiplier: 20.0,
            max_roll: 30.0,
            max_pitch_change_per_sample: 1.0,
            turn_rate: 180.0,
            course_projection_seconds: 3.0,
            climb_rate_curve: None,
            climb_pitch_curve: curve(&[(100.0, 2.0), (500.0, 8.0), (1000.0, 12.0)]),
            engine_out_pitch_curve: None,
            descent_curve: None,
            min_climb_air_speed: 20.0,
            swoop_pitch: 20.0,
            swoop_max_air_speed: 200.0,
            swoop_altitude_reversal: 200.0,
            journal: None,
        }
    }
}

fn curve(points: &[(f64, f64)]) -> RateCurve {
    RateCurve::literal(points)
}

fn require_gains(gains: Option<PidGains>, pid: &'static str) -> FlightResult<PidGains> {
    let gains = gains.ok_or(FlightControlError::MissingTuning(pid))?;
    if !gains.is_finite() {
        return Err(FlightControlError::InvalidTuning {
            pid,
            detail: format!("non-finite gains {:?}", <[f64; 3]>::from(gains)),
        });
    }
    Ok(gains)
}

fn require_positive(value: f64, name: &str) -> FlightResult<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(FlightControlError::Config(format!("{name} must be positive, got {value}")))
    }
}

impl FlightControlConfig {
    /// Check every field the control law relies on and return the PID gains.
    pub fn validate(&self) -> FlightResult<Tunings> {
        let tunings = Tunings {
            climb_pitch: require_gains(self.climb_pitch_pid, "climb_pitch")?,
            airspeed_pitch: require_gains(self.airspeed_pitch_pid, "airspeed_pitch")?,
            throttle: require_gains(self.throttle_pid, "throttle")?,
        };
        require_positive(self.pitch_pid_sample_ms, "pitch_pid_sample_ms")?;
        require_positive(self.throttle_pid_sample_ms, "throttle_pid_sample_ms")?;
        require_positive(self.altitude_achievement_minutes, "altitude_achievement_minutes")?;
        require_positive(self.air_speed_achievement_minutes, "air_speed_achievement_minutes")?;
        require_positive(self.turn_rate, "turn_rate")?;
        let (min_rate, max_rate) = self.climb_rate_limits;
        if !(min_rate <= max_rate) {
            return Err(FlightControlError::Config(format!(
                "climb rate limits ({min_rate}, {max_rate}) are not ordered"
            )));
        }
        if !(self.max_roll >= 0.0) || !(self.max_pitch_change_per_sample >= 0.0) {
            return Err(FlightControlError::Config(
                "max_roll and max_pitch_change_per_sample must be non-negative".into(),
            ));
        }
        self.pitch_limits.validate()?;
        Ok(tunings)
    }
}
