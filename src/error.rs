//! Error types for parser construction

use thiserror::Error;

/// Which separator set a configuration error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeparatorKind {
    /// Separators terminating a field
    Field,
    /// Separators terminating a line (record)
    Line,
}

impl std::fmt::Display for SeparatorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeparatorKind::Field => write!(f, "field"),
            SeparatorKind::Line => write!(f, "line"),
        }
    }
}

/// Errors raised while building a parser.
///
/// Malformed CSV input is never an error; it is reported as a
/// [`Warning`](crate::types::Warning) on the offending field.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CsvError {
    /// No separators configured for a set
    #[error("{0} separator set is empty")]
    EmptySeparatorSet(SeparatorKind),

    /// A configured separator is the empty string
    #[error("{0} separator must not be empty")]
    EmptySeparator(SeparatorKind),

    /// A separator contains the quote character
    #[error("{kind} separator {separator:?} contains the quote character {quote:?}")]
    SeparatorContainsQuote {
        kind: SeparatorKind,
        separator: String,
        quote: char,
    },

    /// The same string is configured as both a field and a line separator
    #[error("{0:?} is configured as both a field and a line separator")]
    OverlappingSeparator(String),
}

/// Result type for csvstream operations
pub type Result<T> = std::result::Result<T, CsvError>;
