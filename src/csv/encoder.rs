//! CSV encoding for a configured dialect

use super::matcher::SeparatorMatcher;
use crate::config::ParserConfig;
use crate::error::Result;
use crate::types::Record;

/// CSV encoder producing text that [`CsvParser`](super::CsvParser) reads
/// back to the same values.
///
/// Writes the first configured field and line separator. A field is quoted
/// when it contains the quote character or the first character of any
/// configured separator; embedded quotes are doubled.
///
/// When some configured separator extends the written field or line
/// separator (for example `,` and `,,`), every field is quoted: a separator
/// directly followed by a quote can only match as itself.
///
/// # Examples
///
/// ```
/// use csvstream::config::ParserConfig;
/// use csvstream::csv::CsvEncoder;
///
/// let encoder = CsvEncoder::new(&ParserConfig::default()).unwrap();
/// let mut buffer = String::new();
/// encoder.encode_row(&["a", "b,b", "say \"hi\""], &mut buffer);
/// assert_eq!(buffer, r#"a,"b,b","say ""hi""""#);
/// ```
#[derive(Debug, Clone)]
pub struct CsvEncoder {
    field_separator: String,
    line_separator: String,
    quote_char: char,
    special: Vec<char>,
    quote_all: bool,
}

impl CsvEncoder {
    /// Create an encoder for the given dialect.
    ///
    /// Fails when the configuration is invalid (see
    /// [`ParserConfig::validate`]).
    pub fn new(config: &ParserConfig) -> Result<Self> {
        config.validate()?;

        let matcher = SeparatorMatcher::new(config);
        let mut special = matcher.heads().to_vec();
        special.push(config.quote_char());

        // validate() guarantees both sets are non-empty
        let field_separator = config.field_separators()[0].clone();
        let line_separator = config.line_separators()[0].clone();

        let quote_all = config
            .field_separators()
            .iter()
            .chain(config.line_separators())
            .any(|s| {
                [&field_separator, &line_separator]
                    .iter()
                    .any(|written| s.len() > written.len() && s.starts_with(written.as_str()))
            });

        Ok(Self {
            field_separator,
            line_separator,
            quote_char: config.quote_char(),
            special,
            quote_all,
        })
    }

    /// Encode entire row into buffer, without a line separator.
    ///
    /// A row holding a single empty field is written as two quotes so it is
    /// not read back as a blank line.
    pub fn encode_row<S: AsRef<str>>(&self, fields: &[S], buffer: &mut String) {
        if let [only] = fields {
            if only.as_ref().is_empty() {
                buffer.push(self.quote_char);
                buffer.push(self.quote_char);
                return;
            }
        }

        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                buffer.push_str(&self.field_separator);
            }
            self.encode_field(field.as_ref(), buffer);
        }
    }

    /// Encode a parsed record's values, without a line separator
    pub fn encode_record(&self, record: &Record, buffer: &mut String) {
        self.encode_row(&record.values(), buffer);
    }

    /// Encode records, each followed by the line separator
    pub fn encode_records<'a, I>(&self, records: I) -> String
    where
        I: IntoIterator<Item = &'a Record>,
    {
        let mut buffer = String::new();
        for record in records {
            self.encode_record(record, &mut buffer);
            buffer.push_str(&self.line_separator);
        }
        buffer
    }

    /// Encode single field with proper quoting/escaping
    fn encode_field(&self, field: &str, buffer: &mut String) {
        if self.needs_quoting(field) {
            buffer.push(self.quote_char);
            for ch in field.chars() {
                if ch == self.quote_char {
                    // Escape quotes by doubling: " -> ""
                    buffer.push(self.quote_char);
                }
                buffer.push(ch);
            }
            buffer.push(self.quote_char);
        } else {
            buffer.push_str(field);
        }
    }

    /// Check if field requires quoting
    fn needs_quoting(&self, field: &str) -> bool {
        self.quote_all || field.chars().any(|c| self.special.contains(&c))
    }
}
