//! Append-only log of the operations performed in a session.

use crate::ecc::format::to_hex;
use std::fmt::{self, Display, Formatter};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Something the user did, with the values it produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// A data word was encoded and stored.
    Write {
        address: usize,
        data: u64,
        encoded: u64,
    },
    /// A stored word was loaded as the active word.
    Read {
        address: usize,
        original: u64,
        encoded: u64,
    },
    /// A bit of the active word was flipped.
    Inject { position: usize },
    /// A check found and corrected a single error.
    Corrected { position: usize, data: u64 },
    /// A check found an uncorrectable error.
    DoubleDetected,
    /// A check found no error.
    Clean,
    /// The codec was rebuilt for another data width.
    WidthChanged { data_bits: usize },
}

impl Operation {
    /// Short name of the operation, e.g. "write to address 7".
    pub fn title(&self) -> String {
        match self {
            Operation::Write { address, .. } => format!("write to address {}", address),
            Operation::Read { address, .. } => format!("read from address {}", address),
            Operation::Inject { .. } => "error injected".to_string(),
            Operation::Corrected { .. } => "error corrected".to_string(),
            Operation::DoubleDetected => "double error detected".to_string(),
            Operation::Clean => "error check".to_string(),
            Operation::WidthChanged { .. } => "width changed".to_string(),
        }
    }

    /// Values the operation produced.
    pub fn status(&self) -> String {
        match *self {
            Operation::Write { data, encoded, .. } => {
                format!("{} encoded as {}", to_hex(data), to_hex(encoded))
            }
            Operation::Read {
                original, encoded, ..
            } => format!("encoded {}, original {}", to_hex(encoded), to_hex(original)),
            Operation::Inject { position } => format!("bit {} flipped", position),
            Operation::Corrected { position, data } => {
                format!("position {}, data {}", position, to_hex(data))
            }
            Operation::DoubleDetected => "uncorrectable".to_string(),
            Operation::Clean => "no error".to_string(),
            Operation::WidthChanged { data_bits } => format!("{}-bit data words", data_bits),
        }
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title(), self.status())
    }
}

/// One logged operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    /// Position in the log, starting at 1
    pub sequence: usize,
    pub operation: Operation,
    /// Time since the log was created
    pub elapsed: Duration,
    /// Wall-clock time of the operation
    pub recorded_at: SystemTime,
}

impl HistoryEntry {
    /// Wall-clock time of day as `HH:MM:SS`, UTC.
    pub fn clock(&self) -> String {
        let secs = self
            .recorded_at
            .duration_since(UNIX_EPOCH)
            .map(|since| since.as_secs())
            .unwrap_or(0);
        format_clock(secs)
    }
}

/// Formats seconds since the Unix epoch as a UTC time of day.
pub fn format_clock(secs_since_epoch: u64) -> String {
    let secs = secs_since_epoch % 86_400;
    format!("{:02}:{:02}:{:02}", secs / 3600, secs % 3600 / 60, secs % 60)
}

impl Display for HistoryEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{:<3} {} +{:>8.3}s  {}",
            self.sequence,
            self.clock(),
            self.elapsed.as_secs_f64(),
            self.operation
        )
    }
}

/// Operations in the order they happened.
#[derive(Debug, Clone)]
pub struct History {
    started: Instant,
    entries: Vec<HistoryEntry>,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    /// Creates an empty log; elapsed times count from here.
    pub fn new() -> Self {
        History {
            started: Instant::now(),
            entries: Vec::new(),
        }
    }

    /// Appends an operation and returns its entry.
    pub fn record(&mut self, operation: Operation) -> &HistoryEntry {
        let entry = HistoryEntry {
            sequence: self.entries.len() + 1,
            operation,
            elapsed: self.started.elapsed(),
            recorded_at: SystemTime::now(),
        };
        self.entries.push(entry);
        &self.entries[self.entries.len() - 1]
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Most recent entry.
    pub fn last(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    /// Number of recorded operations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
