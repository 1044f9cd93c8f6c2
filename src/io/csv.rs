use std::io::{self, Write};
use std::path::Path;

use crate::sim::ReplayRecord;

/// Write replay records in CSV format.
///
/// Columns: time, mode, pitch_deg, roll_deg, throttle
pub fn write_records<W: Write>(writer: &mut W, records: &[ReplayRecord]) -> io::Result<()> {
    writeln!(writer, "time,mode,pitch_deg,roll_deg,throttle")?;

    for r in records {
        writeln!(
            writer,
            "{:.3},{},{:.4},{:.4},{:.4}",
            r.time, r.mode, r.pitch, r.roll, r.throttle,
        )?;
    }

    Ok(())
}

/// Write replay records to a CSV file at the given path.
pub fn write_records_file(path: impl AsRef<Path>, records: &[ReplayRecord]) -> io::Result<()> {
    let mut file = io::BufWriter::new(std::fs::File::create(path)?);
    write_records(&mut file, records)?;
    file.flush()
}
