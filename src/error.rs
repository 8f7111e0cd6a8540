//! Error types for parsing, format resolution and configuration
//!
//! Only two conditions are errors in the pipeline: asking the registry for a format nobody
//! registered, and a markdown table whose rows disagree with its separator line. Everything
//! else the parser does not recognise degrades to plain text.

use crate::registry::FormatKind;
use thiserror::Error;

/// A table row whose cell count differs from the number of declared column alignments.
///
/// `row` counts the header as row 0, so the first data row is row 1.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed table: row {row} has {actual} cells, expected {expected}")]
pub struct MalformedTableError {
    pub row: usize,
    pub expected: usize,
    pub actual: usize,
}

/// Errors a [`Parser`](crate::parsers::Parser) can report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error(transparent)]
    MalformedTable(#[from] MalformedTableError),
}

/// A format name (or alias) that matches no registered parser or converter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no {kind} registered for '{name}'")]
pub struct UnknownFormatError {
    pub kind: FormatKind,
    pub name: String,
}

/// Top-level error for the conversion facade.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    UnknownFormat(#[from] UnknownFormatError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("configuration error: {0}")]
    Config(#[from] ::config::ConfigError),
}

impl Error {
    /// True when a format name failed to resolve, as opposed to a failure in the input.
    pub fn is_unknown_format(&self) -> bool {
        matches!(self, Error::UnknownFormat(_))
    }
}

impl From<MalformedTableError> for Error {
    fn from(err: MalformedTableError) -> Self {
        Error::Parse(ParseError::MalformedTable(err))
    }
}
