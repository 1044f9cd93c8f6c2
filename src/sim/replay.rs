use log::{debug, info, warn};

use crate::control::{DirectiveQueue, FlightControl, FlightMode, FlightPlan, TickStatus};
use crate::error::FlightResult;
use crate::vehicle::{Avionics, RecordingAttitude, RecordingThrottle, VehicleState};

/// Throttle range of the replay bench.
pub const THROTTLE_RANGE: (f64, f64) = (0.0, 1.0);

/// Control law output for one recorded sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReplayRecord {
    pub time: f64,
    pub mode: FlightMode,
    /// Applied pitch, degrees.
    pub pitch: f64,
    /// Commanded roll, degrees.
    pub roll: f64,
    pub throttle: f64,
}

// ---------------------------------------------------------------------------
// Bench: recording actuators plus the directive queue
// ---------------------------------------------------------------------------

struct Bench {
    attitude: RecordingAttitude,
    throttle: RecordingThrottle,
    queue: DirectiveQueue,
}

impl Bench {
    fn io<'a>(&'a mut self, sensors: &'a VehicleState) -> Avionics<'a> {
        Avionics {
            sensors,
            attitude: &mut self.attitude,
            throttle: &mut self.throttle,
            directives: &mut self.queue,
        }
    }

    /// Apply the next queued directive, if any.
    fn advance(&mut self, fc: &mut FlightControl, sample: &VehicleState) -> FlightResult<()> {
        match self.queue.pop() {
            Some(directive) => fc.dispatch(&mut self.io(sample), directive),
            None => {
                debug!("Flight plan exhausted at t={}", sample.time);
                Ok(())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Replay
// ---------------------------------------------------------------------------

/// Drive `fc` through a recorded sensor trace, feeding it `plan` one
/// directive at a time. The same inputs always produce the same records.
pub fn replay(
    fc: &mut FlightControl,
    trace: &[VehicleState],
    plan: FlightPlan,
) -> FlightResult<Vec<ReplayRecord>> {
    let Some(first) = trace.first() else {
        warn!("Empty sensor trace, nothing to replay");
        return Ok(Vec::new());
    };
    let (min, max) = THROTTLE_RANGE;
    let mut bench = Bench {
        attitude: RecordingAttitude::default(),
        throttle: RecordingThrottle::new(min, max, plan.initial_throttle),
        queue: DirectiveQueue::new(plan.max_air_speed),
    };
    let initial_pitch = plan.initial_pitch;
    for directive in plan.directives {
        bench.queue.push(directive);
    }
    info!("Replaying {} samples, {} directives", trace.len(), bench.queue.len());

    bench.advance(fc, first)?;
    fc.start(&mut bench.io(first), initial_pitch)?;

    let result = run(fc, trace, &mut bench);
    let last = trace.last().unwrap_or(first);
    fc.stop(&mut bench.io(last));
    result
}

fn run(
    fc: &mut FlightControl,
    trace: &[VehicleState],
    bench: &mut Bench,
) -> FlightResult<Vec<ReplayRecord>> {
    let mut records = Vec::with_capacity(trace.len());
    for sample in trace {
        let status = fc.update(&mut bench.io(sample));
        if bench.queue.take_request() {
            bench.advance(fc, sample)?;
        }
        if status == TickStatus::DirectiveRequested {
            debug!("Directive requested at t={}, now {}", sample.time, fc.mode());
        }
        records.push(ReplayRecord {
            time: sample.time,
            mode: fc.mode(),
            pitch: fc.applied_pitch(),
            roll: fc.desired_roll(),
            throttle: bench.throttle.value,
        });
    }
    Ok(records)
}
