use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::FlightControlConfig;
use crate::control::{FlightMode, FlightPlan};
use crate::error::FlightResult;
use crate::sim::ReplayRecord;
use crate::vehicle::VehicleState;

fn load<T: DeserializeOwned>(path: impl AsRef<Path>) -> FlightResult<T> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

/// Load a control law configuration. Validation happens when the control
/// law is constructed from it.
pub fn load_config(path: impl AsRef<Path>) -> FlightResult<FlightControlConfig> {
    load(path)
}

/// Load a recorded sensor trace: a JSON array of vehicle state samples.
pub fn load_trace(path: impl AsRef<Path>) -> FlightResult<Vec<VehicleState>> {
    load(path)
}

pub fn load_plan(path: impl AsRef<Path>) -> FlightResult<FlightPlan> {
    load(path)
}

/// Summary statistics computed from replay records.
#[derive(Debug, Clone, Serialize)]
pub struct ReplaySummary {
    pub samples: usize,
    pub duration_s: f64,
    pub max_pitch_deg: f64,
    pub min_pitch_deg: f64,
    pub max_roll_deg: f64,
    pub mean_throttle: f64,
    pub mode_changes: usize,
    pub final_mode: String,
}

impl ReplaySummary {
    /// Compute summary from replay records.
    pub fn from_records(records: &[ReplayRecord]) -> Self {
        let max_pitch = records.iter().map(|r| r.pitch).fold(f64::NEG_INFINITY, f64::max);
        let min_pitch = records.iter().map(|r| r.pitch).fold(f64::INFINITY, f64::min);
        let max_roll = records.iter().map(|r| r.roll.abs()).fold(0.0_f64, f64::max);
        let mean_throttle = if records.is_empty() {
            0.0
        } else {
            records.iter().map(|r| r.throttle).sum::<f64>() / records.len() as f64
        };
        let mode_changes = records.windows(2).filter(|w| w[0].mode != w[1].mode).count();

        let (duration_s, final_mode) = match (records.first(), records.last()) {
            (Some(first), Some(last)) => (last.time - first.time, last.mode),
            _ => (0.0, FlightMode::Course),
        };

        ReplaySummary {
            samples: records.len(),
            duration_s,
            max_pitch_deg: if records.is_empty() { 0.0 } else { max_pitch },
            min_pitch_deg: if records.is_empty() { 0.0 } else { min_pitch },
            max_roll_deg: max_roll,
            mean_throttle,
            mode_changes,
            final_mode: final_mode.to_string(),
        }
    }
}

/// Write replay summary as pretty JSON to a writer.
pub fn write_summary<W: Write>(writer: &mut W, summary: &ReplaySummary) -> FlightResult<()> {
    serde_json::to_writer_pretty(&mut *writer, summary)?;
    writeln!(writer)?;
    Ok(())
}

/// Write replay summary JSON to a file.
pub fn write_summary_file(path: impl AsRef<Path>, summary: &ReplaySummary) -> FlightResult<()> {
    let mut file = io::BufWriter::new(File::create(path)?);
    write_summary(&mut file, summary)?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Vec<ReplayRecord> {
        vec![
            ReplayRecord { time: 0.0, mode: FlightMode::Course, pitch: 0.0, roll: 5.0, throttle: 0.4 },
            ReplayRecord { time: 1.0, mode: FlightMode::Course, pitch: 1.0, roll: -20.0, throttle: 0.6 },
            ReplayRecord { time: 2.0, mode: FlightMode::Turn, pitch: 2.0, roll: 30.0, throttle: 0.8 },
        ]
    }

    #[test]
    fn summary_tracks_extremes_and_modes() {
        let s = ReplaySummary::from_records(&records());
        assert_eq!(s.samples, 3);
        assert!((s.duration_s - 2.0).abs() < 1e-12);
        assert_eq!(s.max_pitch_deg, 2.0);
        assert_eq!(s.max_roll_deg, 30.0);
        assert!((s.mean_throttle - 0.6).abs() < 1e-12);
        assert_eq!(s.mode_changes, 1);
        assert_eq!(s.final_mode, "turn");
    }

    #[test]
    fn json_output_is_valid() {
        let summary = ReplaySummary::from_records(&records());
        let mut buf = Vec::new();
        write_summary(&mut buf, &summary).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["samples"], 3);
        assert_eq!(value["final_mode"], "turn");
    }

    #[test]
    fn plan_loads_from_file() {
        let path = std::env::temp_dir().join(format!("flight-law-plan-{}.json", std::process::id()));
        std::fs::write(
            &path,
            r#"{"max_air_speed": 150, "directives": [{"command": "notify_when_nominal"}]}"#,
        )
        .unwrap();
        let plan = load_plan(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(plan.max_air_speed, 150.0);
        assert_eq!(plan.initial_throttle, 0.5);
        assert_eq!(plan.directives.len(), 1);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_trace("/nonexistent/trace.json").unwrap_err();
        assert!(matches!(err, crate::error::FlightControlError::Io(_)));
    }
}
