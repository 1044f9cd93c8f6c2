use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Rows between explicit flushes of the underlying writer.
pub const FLUSH_EVERY_ROWS: usize = 10;

/// Optional column groups after the leading `Time` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JournalColumns {
    pub pitch: bool,
    pub throttle: bool,
}

impl JournalColumns {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn header(&self) -> String {
        let mut header = String::from("Time");
        if self.pitch {
            header.push_str(",PitchGoal,PitchInput,DesiredPitch");
        }
        if self.throttle {
            header.push_str(",ThrottleSet,ThrottleCurrent,Throttle");
        }
        header
    }
}

/// Values gathered during one control tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JournalRow {
    pub time_ms: f64,
    /// Goal, measured input, commanded pitch of the committed pitch strategy.
    pub pitch: Option<[f64; 3]>,
    /// Airspeed goal, measured airspeed, throttle command.
    pub throttle: Option<[f64; 3]>,
    /// Trailing fields appended by a scoring collaborator.
    pub extra: Vec<f64>,
}

impl JournalRow {
    pub fn new(time_ms: f64) -> Self {
        Self { time_ms, ..Self::default() }
    }

    pub fn push_extra(&mut self, value: f64) {
        self.extra.push(value);
    }
}

/// CSV flight journal, one row per control tick.
pub struct Journal {
    writer: Box<dyn Write>,
    columns: JournalColumns,
    rows_since_flush: usize,
}

impl fmt::Debug for Journal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Journal")
            .field("columns", &self.columns)
            .field("rows_since_flush", &self.rows_since_flush)
            .finish_non_exhaustive()
    }
}

impl Journal {
    /// Wrap `writer` and emit the header line.
    pub fn new<W: Write + 'static>(writer: W, columns: JournalColumns) -> io::Result<Self> {
        let mut writer: Box<dyn Write> = Box::new(writer);
        writeln!(writer, "{}", columns.header())?;
        Ok(Self { writer, columns, rows_since_flush: 0 })
    }

    /// Create (truncating) a journal file at `path`.
    pub fn create(path: impl AsRef<Path>, columns: JournalColumns) -> io::Result<Self> {
        let file = File::create(path)?;
        Self::new(BufWriter::new(file), columns)
    }

    pub fn columns(&self) -> JournalColumns {
        self.columns
    }

    pub fn write_row(&mut self, row: &JournalRow) -> io::Result<()> {
        let mut line = format!("{}", row.time_ms);
        if self.columns.pitch {
            push_group(&mut line, row.pitch);
        }
        if self.columns.throttle {
            push_group(&mut line, row.throttle);
        }
        for v in &row.extra {
            line.push_str(&format!(",{v}"));
        }
        writeln!(self.writer, "{line}")?;

        self.rows_since_flush += 1;
        if self.rows_since_flush >= FLUSH_EVERY_ROWS {
            self.writer.flush()?;
            self.rows_since_flush = 0;
        }
        Ok(())
    }

    /// Flush and release the writer.
    pub fn close(mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

fn push_group(line: &mut String, group: Option<[f64; 3]>) {
    match group {
        Some([a, b, c]) => line.push_str(&format!(",{a},{b},{c}")),
        None => line.push_str(",,,"),
    }
}
