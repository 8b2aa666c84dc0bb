//! Parser configuration: separator sets and quote character

use crate::error::{CsvError, Result, SeparatorKind};
use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default field separator
pub const DEFAULT_FIELD_SEPARATOR: &str = ",";

/// Default line separators, longest first so `\r\n` is never split
pub const DEFAULT_LINE_SEPARATORS: [&str; 3] = ["\r\n", "\r", "\n"];

/// Default quote character
pub const DEFAULT_QUOTE_CHAR: char = '"';

/// Dialect settings for [`CsvParser`](crate::csv::CsvParser) and
/// [`CsvEncoder`](crate::csv::CsvEncoder).
///
/// Separators are ordered: when two separators match with the same length
/// at the same position, the one configured first wins.
///
/// # Examples
///
/// ```
/// use csvstream::config::ParserConfig;
///
/// let config = ParserConfig::builder()
///     .field_separator(";")
///     .quote_char('\'')
///     .build()
///     .unwrap();
///
/// assert_eq!(config.field_separators(), &[";".to_string()]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ParserConfig {
    field_separators: Vec<String>,
    line_separators: Vec<String>,
    quote_char: char,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            field_separators: vec![DEFAULT_FIELD_SEPARATOR.to_string()],
            line_separators: DEFAULT_LINE_SEPARATORS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            quote_char: DEFAULT_QUOTE_CHAR,
        }
    }
}

impl ParserConfig {
    /// Start from the default dialect (`,`, `\r\n`/`\r`/`\n`, `"`)
    pub fn builder() -> ParserConfigBuilder {
        ParserConfigBuilder {
            config: ParserConfig::default(),
        }
    }

    /// Field separators in priority order
    pub fn field_separators(&self) -> &[String] {
        &self.field_separators
    }

    /// Line separators in priority order
    pub fn line_separators(&self) -> &[String] {
        &self.line_separators
    }

    /// Quote character
    pub fn quote_char(&self) -> char {
        self.quote_char
    }

    /// Check the configuration.
    ///
    /// Rejects empty separator sets, empty separators, separators that
    /// contain the quote character and strings configured as both a field
    /// and a line separator.
    pub fn validate(&self) -> Result<()> {
        for (kind, set) in [
            (SeparatorKind::Field, &self.field_separators),
            (SeparatorKind::Line, &self.line_separators),
        ] {
            if set.is_empty() {
                return Err(CsvError::EmptySeparatorSet(kind));
            }
            for separator in set {
                if separator.is_empty() {
                    return Err(CsvError::EmptySeparator(kind));
                }
                if separator.contains(self.quote_char) {
                    return Err(CsvError::SeparatorContainsQuote {
                        kind,
                        separator: separator.clone(),
                        quote: self.quote_char,
                    });
                }
            }
        }

        if let Some(shared) = self
            .field_separators
            .iter()
            .find(|s| self.line_separators.contains(s))
        {
            return Err(CsvError::OverlappingSeparator(shared.clone()));
        }

        Ok(())
    }
}

/// Builder for [`ParserConfig`]
#[derive(Debug, Clone)]
pub struct ParserConfigBuilder {
    config: ParserConfig,
}

impl ParserConfigBuilder {
    /// Use a single field separator
    pub fn field_separator(mut self, separator: impl Into<String>) -> Self {
        self.config.field_separators = vec![separator.into()];
        self
    }

    /// Replace the field separator set
    pub fn field_separators<I, S>(mut self, separators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.field_separators = separators.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the line separator set
    pub fn line_separators<I, S>(mut self, separators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.line_separators = separators.into_iter().map(Into::into).collect();
        self
    }

    /// Set the quote character
    pub fn quote_char(mut self, quote: char) -> Self {
        self.config.quote_char = quote;
        self
    }

    /// Validate and return the configuration
    pub fn build(self) -> Result<ParserConfig> {
        self.config.validate()?;
        debug!(
            field_separators = ?self.config.field_separators,
            line_separators = ?self.config.line_separators,
            quote = ?self.config.quote_char,
            "csv dialect configured"
        );
        Ok(self.config)
    }
}
