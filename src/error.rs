use thiserror::Error;

#[derive(Error, Debug)]
pub enum FlightControlError {
    #[error("Missing PID tuning triple for {0}")]
    MissingTuning(&'static str),

    #[error("Invalid PID tuning for {pid}: {detail}")]
    InvalidTuning { pid: &'static str, detail: String },

    #[error("Invalid rate curve: {0}")]
    InvalidCurve(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown PID optimization target: {0}")]
    UnknownOptimizationTarget(String),

    #[error("No PID optimization in progress")]
    NoOptimization,

    #[error("Invalid maneuver: {0}")]
    InvalidManeuver(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type FlightResult<T> = Result<T, FlightControlError>;
