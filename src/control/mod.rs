pub mod directive;
pub mod law;
pub mod maneuver;
pub mod optimize;
pub mod pid;
pub mod pitch;

#[cfg(test)]
pub(crate) mod test_rig;

pub use directive::{Directive, DirectiveQueue, FlightPlan};
pub use law::{FlightControl, FlightControlState, FlightMode, NavigationGoal, PitchMode, TickStatus};
pub use optimize::{
    OptimizationProgress, OptimizationSession, OptimizationTarget, PidId, Scoring, ScoringStep,
    SetPointSweep,
};
pub use pid::{Pid, PidGains, PidLoop, PidMode};
