use std::env;
use std::process::ExitCode;

use log::error;

use flight_law::io::{csv, json};
use flight_law::sim::{replay, ReplayRecord};
use flight_law::{logger, FlightControl, FlightResult};

const USAGE: &str = "usage: flight-law <config.json> <trace.json> <plan.json> [out.csv]";

fn main() -> ExitCode {
    if let Err(e) = logger::init(logger::level_from_env()) {
        eprintln!("logger: {e}");
    }

    let args: Vec<String> = env::args().skip(1).collect();
    if !(3..=4).contains(&args.len()) {
        eprintln!("{USAGE}");
        return ExitCode::from(2);
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[String]) -> FlightResult<()> {
    // -----------------------------------------------------------------------
    // Inputs: control law config, recorded sensor trace, flight plan
    // -----------------------------------------------------------------------
    let config = json::load_config(&args[0])?;
    let trace = json::load_trace(&args[1])?;
    let plan = json::load_plan(&args[2])?;
    let directives = plan.directives.len();

    let mut fc = FlightControl::new(config)?;

    // -----------------------------------------------------------------------
    // Replay
    // -----------------------------------------------------------------------
    let records = replay(&mut fc, &trace, plan)?;
    let summary = json::ReplaySummary::from_records(&records);

    // -----------------------------------------------------------------------
    // Print results
    // -----------------------------------------------------------------------
    println!();
    println!("====================================================================");
    println!("  FLIGHT CONTROL REPLAY: {}", args[1]);
    println!("====================================================================");
    println!();
    println!("  Replay");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  Samples:       {:>8}       Directives:   {:>8}",
        summary.samples, directives
    );
    println!(
        "  Duration:      {:>8.1} s     Mode changes: {:>8}",
        summary.duration_s, summary.mode_changes
    );
    println!(
        "  Pitch range:   {:>8.2} .. {:.2} deg",
        summary.min_pitch_deg, summary.max_pitch_deg
    );
    println!(
        "  Max roll:      {:>8.2} deg   Mean throttle:{:>8.3}",
        summary.max_roll_deg, summary.mean_throttle
    );
    println!("  Final mode:    {:>8}", summary.final_mode);
    println!();

    // -----------------------------------------------------------------------
    // Command table (sampled)
    // -----------------------------------------------------------------------
    println!("  Commands");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  {:>8}  {:>10}  {:>9}  {:>9}  {:>8}",
        "t (s)", "mode", "pitch", "roll", "throttle"
    );
    println!("  {}", "─".repeat(54));

    let sample_interval = (records.len() / 30).max(1);
    for (i, r) in records.iter().enumerate() {
        let mode_change = i > 0 && records[i - 1].mode != r.mode;
        if i % sample_interval == 0 || mode_change || i + 1 == records.len() {
            print_record(r);
        }
    }
    println!();

    if let Some(out) = args.get(3) {
        csv::write_records_file(out, &records)?;
        println!("  Records written to {out}");
    }
    println!("====================================================================");
    println!();
    Ok(())
}

fn print_record(r: &ReplayRecord) {
    println!(
        "  {:>8.2}  {:>10}  {:>9.2}  {:>9.2}  {:>8.3}",
        r.time,
        r.mode.to_string(),
        r.pitch,
        r.roll,
        r.throttle
    );
}
