//! Type definitions for parsed CSV data

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How a field was delimited in the input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Quoting {
    /// Plain field, first character was not the quote
    Unquoted,
    /// Field opened with a quote and was closed by one
    Quoted,
    /// Field opened with a quote and input ended before the closing quote
    Unterminated,
}

impl Quoting {
    /// True for both terminated and unterminated quoted fields
    pub fn is_quoted(&self) -> bool {
        !matches!(self, Quoting::Unquoted)
    }
}

/// Recoverable problems found in the input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Warning {
    /// W1: quoted field never saw its closing quote
    MissingClosingQuote,
    /// W2: quote inside a quoted field not followed by a quote, a separator
    /// or end of input
    UnescapedQuote,
}

impl Warning {
    /// Short code (`W1`, `W2`)
    pub fn code(&self) -> &'static str {
        match self {
            Warning::MissingClosingQuote => "W1",
            Warning::UnescapedQuote => "W2",
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::MissingClosingQuote => {
                write!(f, "W1: quoted field is missing its closing quote")
            }
            Warning::UnescapedQuote => write!(f, "W2: quoted field contains an unescaped quote"),
        }
    }
}

/// A warning tagged with the index of the field it applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FieldWarning {
    /// Zero-based field index within the record
    pub field: usize,
    /// The warning raised
    pub warning: Warning,
}

impl fmt::Display for FieldWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "field {}: {}", self.field, self.warning)
    }
}

/// A single parsed field
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Field {
    /// Field content with quote escaping resolved
    pub value: String,
    /// How the field was delimited
    pub quoting: Quoting,
    /// Warnings attached to this field, each kind at most once
    pub warnings: Vec<Warning>,
}

impl Field {
    /// Create an unquoted field without warnings
    pub fn unquoted(value: impl Into<String>) -> Self {
        Field {
            value: value.into(),
            quoting: Quoting::Unquoted,
            warnings: Vec::new(),
        }
    }

    /// Create a terminated quoted field without warnings
    pub fn quoted(value: impl Into<String>) -> Self {
        Field {
            value: value.into(),
            quoting: Quoting::Quoted,
            warnings: Vec::new(),
        }
    }

    /// Field content
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Check whether a warning of this kind is attached
    pub fn has_warning(&self, warning: Warning) -> bool {
        self.warnings.contains(&warning)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// One logical line of CSV
///
/// A record may span several physical lines when a quoted field contains
/// line breaks.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Record {
    /// Zero-based ordinal of the record within the current input
    pub index: u64,
    /// Character offset at which the record's first field started
    pub offset: u64,
    /// Fields in input order
    pub fields: Vec<Field>,
}

impl Record {
    /// Fields in input order
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Get field by index
    pub fn get(&self, index: usize) -> Option<&Field> {
        self.fields.get(index)
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when the record has no fields; parsed records never do
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field values as string slices
    pub fn values(&self) -> Vec<&str> {
        self.fields.iter().map(Field::as_str).collect()
    }

    /// Field values as owned strings
    pub fn to_strings(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.value.clone()).collect()
    }

    /// All warnings in the record, tagged with their field index
    pub fn warnings(&self) -> impl Iterator<Item = FieldWarning> + '_ {
        self.fields.iter().enumerate().flat_map(|(field, f)| {
            f.warnings
                .iter()
                .map(move |&warning| FieldWarning { field, warning })
        })
    }

    /// True when no field carries a warning
    pub fn is_clean(&self) -> bool {
        self.fields.iter().all(|f| f.warnings.is_empty())
    }
}

impl<'a> IntoIterator for &'a Record {
    type Item = &'a Field;
    type IntoIter = std::slice::Iter<'a, Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}
