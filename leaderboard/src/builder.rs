pub use crate::config::*;
use crate::parser::{parse_row, RawRow};

/// A builder for assembling a snapshot from rows collected out-of-band.
///
/// ```
/// use leaderboard::Builder;
///
/// let mut builder = Builder::new();
/// builder.add_line("ts,e1@x.com,Alice,memoir,Educated,Tara Westover,5,Loved it,,,,-,TRUE");
/// builder.add_line("ts,e1@x.com,Alice,over 400 pages,Dune,Frank Herbert,3,,,,,-,TRUE");
///
/// let snapshot = builder.build();
/// assert_eq!(snapshot.participants.len(), 1);
/// assert_eq!(snapshot.participants[0].completed_count, 2);
/// ```
pub struct Builder {
    rows: Vec<RawRow>,
}

impl Builder {
    pub fn new() -> Builder {
        Builder { rows: Vec::new() }
    }

    /// Parses one CSV line and queues it.
    pub fn add_line(&mut self, line: &str) {
        self.rows.push(parse_row(line));
    }

    /// Queues an already-split row.
    pub fn add_row(&mut self, row: RawRow) {
        self.rows.push(row);
    }

    /// Aggregates every queued row into a snapshot.
    pub fn build(&self) -> Snapshot {
        crate::aggregate(&self.rows)
    }
}

impl Default for Builder {
    fn default() -> Self {
        Builder::new()
    }
}
