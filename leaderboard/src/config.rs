// ********* Leaderboard data structures ***********

use std::error::Error;
use std::fmt::Display;

use crate::schema::COLUMN_COUNT;

/// A single book credited to a participant.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct BookEntry {
    pub title: String,
    /// Canonical external book id. Never empty: a placeholder sentinel is
    /// substituted when the source carries no recognizable id.
    pub identifier: String,
    /// Challenge label expanded to its display sentence.
    pub challenge: String,
    pub cover_url: Option<String>,
    pub catalog_url: Option<String>,
}

/// One row of the leaderboard, grouped under a unique identity key.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Participant {
    /// Unique identity, the submitter's email address.
    pub key: String,
    pub display_name: String,
    pub status: Option<String>,
    /// Always equal to `books.len()`. The aggregator updates both
    /// together, never independently.
    pub completed_count: usize,
    pub books: Vec<BookEntry>,
}

/// A highlighted review, derived from rows meeting the quality threshold
/// (four stars or more with non-empty review text).
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ReviewEntry {
    pub title: String,
    pub author: String,
    pub identifier: String,
    pub isbn: Option<String>,
    pub cover_url: Option<String>,
    pub description: String,
}

/// The atomic unit of reconciled leaderboard state.
///
/// A snapshot is swapped as a whole; a reader never observes a mix of old
/// and new participants.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Snapshot {
    pub participants: Vec<Participant>,
    pub reviews: Vec<ReviewEntry>,
}

impl Snapshot {
    pub fn empty() -> Snapshot {
        Snapshot {
            participants: Vec::new(),
            reviews: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty() && self.reviews.is_empty()
    }
}

/// Batch-level failures that make a whole document unusable.
///
/// Per-row problems never surface here: the aggregator logs and skips
/// them without failing the batch.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum DocumentError {
    /// The response body was empty.
    TooShort,
    /// The header row is narrower than the column schema.
    InvalidShape { columns: usize },
}

impl Error for DocumentError {}

impl Display for DocumentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentError::TooShort => {
                write!(f, "document too short to contain a header row")
            }
            DocumentError::InvalidShape { columns } => {
                write!(
                    f,
                    "header row has {} columns, expected at least {}",
                    columns, COLUMN_COUNT
                )
            }
        }
    }
}
