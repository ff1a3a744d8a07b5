//! Error types for the binding.

use std::fmt;

use sheets_feed::FeedError;
use thiserror::Error;

/// Why a lookup did not resolve to exactly one entry.
///
/// These are expected outcomes that callers branch on, as opposed to
/// transport or protocol failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupError {
    /// A direct fetch found nothing at the derived URL.
    NoEntry,
    NoSpreadsheet,
    MoreThanOneSpreadsheet(usize),
    NoWorksheet,
    MoreThanOneWorksheet(usize),
    NoCell,
    MoreThanOneCell(usize),
}

impl LookupError {
    /// The symbolic tag for this reason, e.g. `more-than-one-worksheet`.
    pub fn tag(self) -> &'static str {
        match self {
            LookupError::NoEntry => "no-entry",
            LookupError::NoSpreadsheet => "no-spreadsheet",
            LookupError::MoreThanOneSpreadsheet(_) => "more-than-one-spreadsheet",
            LookupError::NoWorksheet => "no-worksheet",
            LookupError::MoreThanOneWorksheet(_) => "more-than-one-worksheet",
            LookupError::NoCell => "no-cell",
            LookupError::MoreThanOneCell(_) => "more-than-one-cell",
        }
    }
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupError::MoreThanOneSpreadsheet(n)
            | LookupError::MoreThanOneWorksheet(n)
            | LookupError::MoreThanOneCell(n) => write!(f, "{} ({n} matches)", self.tag()),
            _ => f.write_str(self.tag()),
        }
    }
}

impl std::error::Error for LookupError {}

#[derive(Debug, Error)]
pub enum SheetsError {
    #[error("Feed error: {0}")]
    Feed(#[from] FeedError),

    #[error("Lookup failed: {0}")]
    Lookup(#[from] LookupError),

    #[error("Remote returned an empty response for {0}")]
    EmptyResponse(&'static str),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid cell address R{row}C{col}: rows and columns start at 1")]
    InvalidCell { row: u32, col: u32 },
}

impl SheetsError {
    /// The lookup reason, if this error is a recoverable lookup miss.
    pub fn lookup(&self) -> Option<LookupError> {
        match self {
            SheetsError::Lookup(reason) => Some(*reason),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SheetsError>;

/// Resolve a query result that must contain exactly one entry.
pub(crate) fn exactly_one<E>(
    mut entries: Vec<E>,
    none: LookupError,
    many: fn(usize) -> LookupError,
) -> Result<E> {
    match entries.len() {
        0 => Err(none.into()),
        1 => Ok(entries.remove(0)),
        n => Err(many(n).into()),
    }
}
