use std::f64::consts::PI;

use nalgebra::{Rotation2, Vector2};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Units: positions are (longitude, latitude) in degrees, distances in
// nautical miles, headings in degrees true, speeds in knots.
// ---------------------------------------------------------------------------

pub type Position = Vector2<f64>;

pub const NM_PER_DEGREE: f64 = 60.0;

/// A turn is complete once the heading is within this many degrees of target.
pub const TURN_COMPLETE_DEGREES: f64 = 3.0;

/// Desired track from one waypoint to the next.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub from: Position,
    pub to: Position,
}

impl Course {
    pub fn new(from: Position, to: Position) -> Self {
        Self { from, to }
    }

    pub fn leg(&self) -> CourseLeg {
        CourseLeg::between(self.from, self.to)
    }
}

/// True heading and distance between two positions on a locally flat earth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CourseLeg {
    /// Degrees true, in [0, 360).
    pub heading: f64,
    /// Nautical miles.
    pub distance: f64,
    /// Longitude scale factor (cosine of mean latitude).
    pub rel_lng: f64,
}

impl CourseLeg {
    pub fn between(from: Position, to: Position) -> Self {
        let rel_lng = ((from.y + to.y) / 2.0).to_radians().cos();
        let east = (to.x - from.x) * rel_lng * NM_PER_DEGREE;
        let north = (to.y - from.y) * NM_PER_DEGREE;
        CourseLeg {
            heading: east.atan2(north).to_degrees().rem_euclid(360.0),
            distance: east.hypot(north),
            rel_lng,
        }
    }
}

/// Wrap an angle in degrees into (-180, 180].
pub fn wrap_degrees(angle: f64) -> f64 {
    let w = angle.rem_euclid(360.0);
    if w > 180.0 {
        w - 360.0
    } else {
        w
    }
}

/// Move `pos` by `distance` nm along `heading` degrees true.
pub fn add_position(pos: Position, distance: f64, heading: f64) -> Position {
    let h = heading.to_radians();
    let rel_lng = pos.y.to_radians().cos();
    Position::new(
        pos.x + distance * h.sin() / (NM_PER_DEGREE * rel_lng),
        pos.y + distance * h.cos() / NM_PER_DEGREE,
    )
}

/// Turn radius (nm) at `speed` knots for a turn rate in degrees per minute.
pub fn turn_radius(speed: f64, turn_rate: f64) -> f64 {
    (360.0 * (speed / 60.0) / turn_rate) / (4.0 * PI)
}

/// Express `pos` in a frame centered on the course destination and rotated
/// along the course bearing: `x` is cross-track (positive right of course),
/// `y` is along-track (negative before the destination). Nautical miles.
pub fn course_frame(pos: Position, course: &Course) -> Vector2<f64> {
    let leg = course.leg();
    let rel = pos - course.to;
    let local = Vector2::new(rel.x * leg.rel_lng, rel.y) * NM_PER_DEGREE;
    Rotation2::new(leg.heading.to_radians()) * local
}

/// Heading that steers toward a point on the course line `lead` nm ahead of
/// the abeam point.
pub fn intercept_heading(pos: Position, course: &Course, lead: f64) -> f64 {
    let leg = course.leg();
    let cross_track = course_frame(pos, course).x;
    let correction = cross_track.atan2(lead).to_degrees();
    (leg.heading - correction).rem_euclid(360.0)
}

/// True once `pos` has crossed the line perpendicular to the course placed
/// `lead` nm before the destination.
pub fn crossed_course_end(pos: Position, course: &Course, lead: f64) -> bool {
    course_frame(pos, course).y >= -lead
}

pub fn completed_turn(current_heading: f64, target_heading: f64) -> bool {
    wrap_degrees(current_heading - target_heading).abs() < TURN_COMPLETE_DEGREES
}

// ---------------------------------------------------------------------------
// Forced turn direction
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TurnDirection {
    #[default]
    Either,
    Left,
    Right,
}

impl TurnDirection {
    /// Direction implied by the sign of a requested roll angle.
    pub fn from_roll(roll: f64) -> Self {
        if roll < 0.0 {
            TurnDirection::Left
        } else if roll > 0.0 {
            TurnDirection::Right
        } else {
            TurnDirection::Either
        }
    }
}

/// Heading error `target - current` wrapped into (-180, 180], biased to the
/// forced direction while one is set. The force clears itself once the
/// natural error already has the forced sign.
pub fn heading_error(target: f64, current: f64, force: &mut TurnDirection) -> f64 {
    let error = wrap_degrees(target - current);
    match *force {
        TurnDirection::Either => error,
        TurnDirection::Left => {
            if error <= 0.0 {
                *force = TurnDirection::Either;
                error
            } else {
                error - 360.0
            }
        }
        TurnDirection::Right => {
            if error >= 0.0 {
                *force = TurnDirection::Either;
                error
            } else {
                error + 360.0
            }
        }
    }
}
