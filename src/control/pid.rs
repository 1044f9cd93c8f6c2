use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// PID Controller (single loop, sample-time gated)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PidMode {
    Automatic,
    Manual,
}

/// Proportional / integral / derivative gains. Serialized as `[P, I, D]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct PidGains {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
}

impl PidGains {
    pub fn new(kp: f64, ki: f64, kd: f64) -> Self {
        Self { kp, ki, kd }
    }

    pub fn is_finite(&self) -> bool {
        self.kp.is_finite() && self.ki.is_finite() && self.kd.is_finite()
    }
}

impl From<[f64; 3]> for PidGains {
    fn from([kp, ki, kd]: [f64; 3]) -> Self {
        Self { kp, ki, kd }
    }
}

impl From<PidGains> for [f64; 3] {
    fn from(g: PidGains) -> Self {
        [g.kp, g.ki, g.kd]
    }
}

/// Operations shared by every tunable loop, local or inside the attitude
/// subsystem. This is the surface an optimization session drives.
pub trait PidLoop {
    fn set_tunings(&mut self, gains: PidGains);

    fn tunings(&self) -> PidGains;

    /// Request a new set-point. With an achievement time the effective
    /// set-point lags toward `value` with that time constant (seconds).
    fn set_set_point(&mut self, value: f64, achievement_secs: Option<f64>);

    fn compute(&mut self, input: f64, now_ms: f64) -> f64;

    fn mode(&self) -> PidMode;
}

#[derive(Debug, Clone)]
pub struct Pid {
    gains: PidGains,
    mode: PidMode,
    target: f64,
    set_point: f64,
    achievement_secs: Option<f64>,
    out_min: f64,
    out_max: f64,
    sample_ms: f64,
    last_ms: Option<f64>,
    last_input: f64,
    integral: f64,
    output: f64,
}

impl Pid {
    /// New loop in MANUAL mode with unbounded output and a 1 s sample period.
    pub fn new(gains: PidGains) -> Self {
        Self {
            gains,
            mode: PidMode::Manual,
            target: 0.0,
            set_point: 0.0,
            achievement_secs: None,
            out_min: f64::NEG_INFINITY,
            out_max: f64::INFINITY,
            sample_ms: 1000.0,
            last_ms: None,
            last_input: 0.0,
            integral: 0.0,
            output: 0.0,
        }
    }

    /// Switch mode. Entering AUTOMATIC from MANUAL seeds the integrator with
    /// `output` so the first computed value continues from it; MANUAL holds
    /// `output` until the loop is re-armed.
    pub fn set_mode(&mut self, mode: PidMode, input: f64, output: f64) {
        match (self.mode, mode) {
            (PidMode::Manual, PidMode::Automatic) => {
                self.last_input = input;
                self.last_ms = None;
                self.output = output.clamp(self.out_min, self.out_max);
                self.integral = self.output;
            }
            (_, PidMode::Manual) => {
                self.output = output;
            }
            (PidMode::Automatic, PidMode::Automatic) => {}
        }
        self.mode = mode;
    }

    pub fn set_output_limits(&mut self, min: f64, max: f64) {
        if min > max {
            return;
        }
        self.out_min = min;
        self.out_max = max;
        if self.mode == PidMode::Automatic {
            self.output = self.output.clamp(min, max);
            self.integral = self.integral.clamp(min, max);
        }
    }

    pub fn output_limits(&self) -> (f64, f64) {
        (self.out_min, self.out_max)
    }

    pub fn set_sample_time(&mut self, sample_ms: f64) {
        if sample_ms > 0.0 {
            self.sample_ms = sample_ms;
        }
    }

    /// Effective (lagged) set-point.
    pub fn set_point(&self) -> f64 {
        self.set_point
    }

    pub fn output(&self) -> f64 {
        self.output
    }

    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.last_ms = None;
    }
}

impl PidLoop for Pid {
    fn set_tunings(&mut self, gains: PidGains) {
        if gains.is_finite() {
            self.gains = gains;
        }
    }

    fn tunings(&self) -> PidGains {
        self.gains
    }

    fn set_set_point(&mut self, value: f64, achievement_secs: Option<f64>) {
        self.target = value;
        self.achievement_secs = achievement_secs.filter(|t| *t > 0.0);
        if self.achievement_secs.is_none() {
            self.set_point = value;
        }
    }

    fn compute(&mut self, input: f64, now_ms: f64) -> f64 {
        if self.mode == PidMode::Manual {
            return self.output;
        }
        let elapsed_ms = match self.last_ms {
            Some(last) => now_ms - last,
            None => self.sample_ms,
        };
        if elapsed_ms < self.sample_ms {
            return self.output;
        }
        let dt = elapsed_ms / 1000.0;

        let lag = match self.achievement_secs {
            Some(t) => (dt / t).min(1.0),
            None => 1.0,
        };
        self.set_point += (self.target - self.set_point) * lag;

        let error = self.set_point - input;
        self.integral += self.gains.ki * error * dt;
        // Anti-windup: integral never leaves the output range
        self.integral = self.integral.clamp(self.out_min, self.out_max);
        let d_input = (input - self.last_input) / dt;

        let out = self.gains.kp * error + self.integral - self.gains.kd * d_input;
        self.output = out.clamp(self.out_min, self.out_max);
        self.last_input = input;
        self.last_ms = Some(now_ms);
        self.output
    }

    fn mode(&self) -> PidMode {
        self.mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn armed(gains: PidGains) -> Pid {
        let mut pid = Pid::new(gains);
        pid.set_mode(PidMode::Automatic, 0.0, 0.0);
        pid
    }

    #[test]
    fn pid_proportional() {
        let mut pid = armed(PidGains::new(1.0, 0.0, 0.0));
        pid.set_set_point(0.5, None);
        let out = pid.compute(0.0, 1000.0);
        assert!((out - 0.5).abs() < 1e-10, "Pure P should output Kp * error");
    }

    #[test]
    fn pid_integral_accumulates() {
        let mut pid = armed(PidGains::new(0.0, 1.0, 0.0));
        pid.set_set_point(1.0, None);
        pid.compute(0.0, 0.0);
        let out = pid.compute(0.0, 1000.0);
        assert!((out - 2.0).abs() < 1e-10, "Integral should accumulate");
    }

    #[test]
    fn compute_is_gated_by_sample_time() {
        let mut pid = armed(PidGains::new(1.0, 0.0, 0.0));
        pid.set_set_point(1.0, None);
        let first = pid.compute(0.0, 0.0);
        pid.set_set_point(5.0, None);
        assert_eq!(pid.compute(0.0, 500.0), first, "Held until sample period elapses");
        assert!((pid.compute(0.0, 1000.0) - 5.0).abs() < 1e-10);
    }

    #[test]
    fn manual_holds_output() {
        let mut pid = Pid::new(PidGains::new(3.0, 1.0, 0.0));
        pid.set_mode(PidMode::Manual, 0.0, 0.75);
        pid.set_set_point(100.0, None);
        assert_eq!(pid.compute(0.0, 1000.0), 0.75);
        assert_eq!(pid.mode(), PidMode::Manual);
    }

    #[test]
    fn bumpless_transfer_on_arming() {
        let mut pid = Pid::new(PidGains::new(0.0, 1.0, 0.0));
        pid.set_output_limits(-10.0, 10.0);
        pid.set_mode(PidMode::Automatic, 3.0, 4.0);
        pid.set_set_point(3.0, None);
        let out = pid.compute(3.0, 1000.0);
        assert!((out - 4.0).abs() < 1e-10, "Zero error keeps seeded output");
    }

    #[test]
    fn output_is_clamped() {
        let mut pid = armed(PidGains::new(100.0, 0.0, 0.0));
        pid.set_output_limits(-1.0, 1.0);
        pid.set_set_point(10.0, None);
        assert_eq!(pid.compute(0.0, 1000.0), 1.0);
    }

    #[test]
    fn achievement_time_lags_set_point() {
        let mut pid = armed(PidGains::new(1.0, 0.0, 0.0));
        pid.set_set_point(10.0, Some(4.0));
        let out = pid.compute(0.0, 1000.0);
        assert!((pid.set_point() - 2.5).abs() < 1e-10);
        assert!((out - 2.5).abs() < 1e-10);
        pid.compute(0.0, 2000.0);
        assert!(pid.set_point() > 2.5 && pid.set_point() < 10.0);
    }

    #[test]
    fn gains_deserialize_from_triple() {
        let g: PidGains = serde_json::from_str("[0.5, 0.1, 0.02]").unwrap();
        assert_eq!(g, PidGains::new(0.5, 0.1, 0.02));
        assert!(serde_json::from_str::<PidGains>("[0.5, 0.1]").is_err());
    }
}
