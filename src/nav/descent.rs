use crate::error::{FlightControlError, FlightResult};

use super::geometry::{Course, CourseLeg, Position};

/// Controlled descent along a course, planned once when the descent is
/// commanded and read every tick afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DescentProfile {
    /// Feet.
    pub starting_altitude: f64,
    pub target_altitude: f64,
    /// Nautical miles from the planning position to the destination.
    pub distance: f64,
    pub minutes_to_destination: f64,
    /// Feet per minute (negative when descending).
    pub nominal_rate: f64,
}

impl DescentProfile {
    pub fn plan(
        starting_altitude: f64,
        position: Position,
        course: &Course,
        target_altitude: f64,
        air_speed: f64,
    ) -> FlightResult<Self> {
        if air_speed <= 0.0 {
            return Err(FlightControlError::InvalidManeuver(format!(
                "descent needs a positive airspeed goal, got {air_speed}"
            )));
        }
        let distance = CourseLeg::between(position, course.to).distance;
        if distance <= 0.0 {
            return Err(FlightControlError::InvalidManeuver(
                "descent destination is the current position".into(),
            ));
        }
        let minutes_to_destination = distance / air_speed * 60.0;
        let nominal_rate = (target_altitude - starting_altitude) / minutes_to_destination;
        Ok(Self {
            starting_altitude,
            target_altitude,
            distance,
            minutes_to_destination,
            nominal_rate,
        })
    }

    /// Fraction of the planned distance still to fly from `position`.
    pub fn fraction_remaining(&self, position: Position, destination: Position) -> f64 {
        CourseLeg::between(position, destination).distance / self.distance
    }

    /// Altitude the profile calls for with `fraction` of the distance left.
    pub fn profile_altitude(&self, fraction: f64) -> f64 {
        self.target_altitude * (1.0 - fraction) + self.starting_altitude * fraction
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course() -> Course {
        Course::new(Position::new(0.0, 0.0), Position::new(0.0, 1.0))
    }

    #[test]
    fn nominal_rate_covers_full_descent() {
        let p = DescentProfile::plan(5000.0, Position::new(0.0, 0.0), &course(), 1000.0, 120.0)
            .unwrap();
        let hours = p.distance / 120.0;
        let covered = p.nominal_rate * hours * 60.0;
        assert!((covered - (1000.0 - 5000.0)).abs() < 1e-9, "covered {covered}");
        assert!((p.minutes_to_destination - 30.0).abs() < 1e-9);
    }

    #[test]
    fn profile_blends_by_distance_remaining() {
        let p = DescentProfile::plan(5000.0, Position::new(0.0, 0.0), &course(), 1000.0, 120.0)
            .unwrap();
        let half = p.fraction_remaining(Position::new(0.0, 0.5), course().to);
        assert!((half - 0.5).abs() < 1e-9);
        assert!((p.profile_altitude(half) - 3000.0).abs() < 1e-6);
        assert!((p.profile_altitude(1.0) - 5000.0).abs() < 1e-12);
        assert!((p.profile_altitude(0.0) - 1000.0).abs() < 1e-12);
    }

    #[test]
    fn rejects_degenerate_plans() {
        let at_dest = Position::new(0.0, 1.0);
        assert!(DescentProfile::plan(5000.0, at_dest, &course(), 1000.0, 120.0).is_err());
        assert!(DescentProfile::plan(5000.0, Position::new(0.0, 0.0), &course(), 1000.0, 0.0).is_err());
    }
}
