use super::{AttitudeControl, ThrottleControl};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttitudeCommand {
    pub pitch: f64,
    pub roll: f64,
    pub yaw: f64,
}

/// Attitude sink that keeps every command; used for replays and tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingAttitude {
    pub flying: bool,
    pub commands: Vec<AttitudeCommand>,
}

impl RecordingAttitude {
    pub fn last(&self) -> Option<AttitudeCommand> {
        self.commands.last().copied()
    }
}

impl AttitudeControl for RecordingAttitude {
    fn start_flight(&mut self) {
        self.flying = true;
    }

    fn stop_flight(&mut self) {
        self.flying = false;
    }

    fn update_controls(&mut self, pitch: f64, roll: f64, yaw: f64) {
        self.commands.push(AttitudeCommand { pitch, roll, yaw });
    }
}

/// Throttle that holds the last setting, clamped to its limits.
#[derive(Debug, Clone)]
pub struct RecordingThrottle {
    pub min: f64,
    pub max: f64,
    pub value: f64,
    pub history: Vec<f64>,
}

impl RecordingThrottle {
    pub fn new(min: f64, max: f64, value: f64) -> Self {
        Self { min, max, value: value.clamp(min, max), history: Vec::new() }
    }
}

impl ThrottleControl for RecordingThrottle {
    fn limits(&self) -> (f64, f64) {
        (self.min, self.max)
    }

    fn current(&self) -> f64 {
        self.value
    }

    fn set(&mut self, value: f64) {
        self.value = value.clamp(self.min, self.max);
        self.history.push(self.value);
    }
}
