use serde::{Deserialize, Serialize};

use crate::error::FlightControlError;

// ---------------------------------------------------------------------------
// Rate curve: piecewise-linear magnitude map, saturating at both ends
// ---------------------------------------------------------------------------

/// Piecewise-linear map from an input magnitude to an output magnitude.
///
/// The curve is evaluated on `|value|` and the sign of `value` is applied to
/// the result, so a roll curve defined for positive heading errors also
/// commands left turns. Inputs below the first breakpoint return the first
/// output; inputs beyond the last breakpoint return the last output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<(f64, f64)>", into = "Vec<(f64, f64)>")]
pub struct RateCurve {
    points: Vec<(f64, f64)>,
}

impl RateCurve {
    pub fn new(points: Vec<(f64, f64)>) -> Result<Self, FlightControlError> {
        if points.is_empty() {
            return Err(FlightControlError::InvalidCurve("no breakpoints".into()));
        }
        if points.iter().any(|(x, y)| !x.is_finite() || !y.is_finite()) {
            return Err(FlightControlError::InvalidCurve("non-finite breakpoint".into()));
        }
        if points[0].0 < 0.0 {
            return Err(FlightControlError::InvalidCurve(format!(
                "first input {} is negative",
                points[0].0
            )));
        }
        if let Some(pair) = points.windows(2).find(|w| w[1].0 <= w[0].0) {
            return Err(FlightControlError::InvalidCurve(format!(
                "inputs not strictly increasing at {} -> {}",
                pair[0].0, pair[1].0
            )));
        }
        Ok(Self { points })
    }

    /// Built-in breakpoint tables; ordering is checked in debug builds only.
    pub(crate) fn literal(points: &[(f64, f64)]) -> Self {
        debug_assert!(RateCurve::new(points.to_vec()).is_ok());
        Self { points: points.to_vec() }
    }

    /// Evaluate the curve at `value`.
    pub fn eval(&self, value: f64) -> f64 {
        let magnitude = value.abs();
        let sign = if value < 0.0 { -1.0 } else { 1.0 };
        sign * self.eval_magnitude(magnitude)
    }

    fn eval_magnitude(&self, magnitude: f64) -> f64 {
        let (x0, y0) = self.points[0];
        if magnitude <= x0 {
            return y0;
        }
        for w in self.points.windows(2) {
            let (xa, ya) = w[0];
            let (xb, yb) = w[1];
            if magnitude <= xb {
                let frac = (magnitude - xa) / (xb - xa);
                return ya + frac * (yb - ya);
            }
        }
        self.points[self.points.len() - 1].1
    }

    /// Input of the first breakpoint.
    pub fn first_input(&self) -> f64 {
        self.points[0].0
    }

    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }
}

impl TryFrom<Vec<(f64, f64)>> for RateCurve {
    type Error = FlightControlError;

    fn try_from(points: Vec<(f64, f64)>) -> Result<Self, Self::Error> {
        RateCurve::new(points)
    }
}

impl From<RateCurve> for Vec<(f64, f64)> {
    fn from(curve: RateCurve) -> Self {
        curve.points
    }
}
