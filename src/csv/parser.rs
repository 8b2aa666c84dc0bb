//! Streaming CSV parser built on a four-state automaton
//!
//! | State | Meaning |
//! |---|---|
//! | `q0` [`State::StartOfField`] | between fields, nothing accumulated |
//! | `q1` [`State::Quoted`] | inside a quoted field |
//! | `q2` [`State::Unquoted`] | inside an unquoted field |
//! | `q3` [`State::QuoteInQuoted`] | saw a quote inside a quoted field |
//!
//! Characters are fed one at a time; multi-character separators are resolved
//! through a lookahead window so that input split at any point parses the
//! same as the contiguous stream.

use std::collections::VecDeque;
use std::mem;

use tracing::{debug, warn};

use super::matcher::{Resolution, Separator, SeparatorMatcher};
use super::records::Records;
use crate::config::ParserConfig;
use crate::error::Result;
use crate::types::{Field, FieldWarning, Quoting, Record, Warning};

/// Automaton state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    /// `q0`: start of a field
    StartOfField,
    /// `q1`: inside a quoted field
    Quoted,
    /// `q2`: inside an unquoted field
    Unquoted,
    /// `q3`: just read a quote inside a quoted field
    QuoteInQuoted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Event {
    Char(char),
    FieldSeparator,
    LineSeparator,
    End,
}

impl From<Separator> for Event {
    fn from(separator: Separator) -> Self {
        match separator {
            Separator::Field => Event::FieldSeparator,
            Separator::Line => Event::LineSeparator,
        }
    }
}

/// Character-at-a-time CSV parser.
///
/// Completed records are queued inside the parser and pulled with
/// [`next_record`](CsvParser::next_record), [`drain`](CsvParser::drain) or
/// the lazy [`records`](CsvParser::records) iterator. Malformed quoting never
/// fails; it is reported as a [`Warning`] on the field.
///
/// # Examples
///
/// ```
/// use csvstream::csv::CsvParser;
///
/// let mut parser = CsvParser::default();
/// parser.feed_str("a,\"b,b\",c\r\nd");
/// parser.signal_end_of_input();
///
/// let rows: Vec<_> = parser.drain().map(|r| r.to_strings()).collect();
/// assert_eq!(rows, vec![vec!["a", "b,b", "c"], vec!["d"]]);
/// ```
#[derive(Debug, Clone)]
pub struct CsvParser {
    config: ParserConfig,
    matcher: SeparatorMatcher,
    quote: char,

    // Automaton
    state: State,
    lookahead: Vec<char>,

    // Current field and record
    buffer: String,
    field_warnings: Vec<Warning>,
    fields: Vec<Field>,
    record_offset: u64,

    // Output
    ready: VecDeque<Record>,
    position: u64,
    emitted: u64,
}

impl Default for CsvParser {
    fn default() -> Self {
        Self::with_valid_config(ParserConfig::default())
    }
}

impl CsvParser {
    /// Create a parser for the given dialect.
    ///
    /// Fails when the configuration is invalid (see
    /// [`ParserConfig::validate`]).
    pub fn new(config: ParserConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_valid_config(config))
    }

    fn with_valid_config(config: ParserConfig) -> Self {
        let matcher = SeparatorMatcher::new(&config);
        let quote = config.quote_char();
        debug!(quote = ?quote, "csv parser created");
        Self {
            config,
            matcher,
            quote,
            state: State::StartOfField,
            lookahead: Vec::with_capacity(4),
            buffer: String::with_capacity(64),
            field_warnings: Vec::new(),
            fields: Vec::new(),
            record_offset: 0,
            ready: VecDeque::new(),
            position: 0,
            emitted: 0,
        }
    }

    /// Dialect in use
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Current automaton state
    pub fn state(&self) -> State {
        self.state
    }

    /// Number of records completed since creation or the last reset
    pub fn records_emitted(&self) -> u64 {
        self.emitted
    }

    /// Number of completed records waiting to be pulled
    pub fn pending_records(&self) -> usize {
        self.ready.len()
    }

    /// Advance the automaton by one character.
    ///
    /// Returns the warning raised while processing it, if any.
    pub fn feed(&mut self, ch: char) -> Option<FieldWarning> {
        self.lookahead.push(ch);
        self.pump(false)
    }

    /// Feed every character of `chunk`.
    ///
    /// Chunk boundaries carry no meaning: a `\r\n` split across two calls is
    /// still one line break.
    pub fn feed_str(&mut self, chunk: &str) -> Vec<FieldWarning> {
        chunk.chars().filter_map(|ch| self.feed(ch)).collect()
    }

    /// Signal that no more input will arrive.
    ///
    /// Closes the pending field and record, if any. With nothing pending no
    /// record is produced, so calling it twice is harmless.
    pub fn signal_end_of_input(&mut self) -> Option<FieldWarning> {
        let flushed = self.pump(true);
        let closed = self.step(Event::End, 0);
        closed.or(flushed)
    }

    /// Drop all accumulated state and queued records, keeping the dialect
    pub fn reset(&mut self) {
        self.state = State::StartOfField;
        self.lookahead.clear();
        self.buffer.clear();
        self.field_warnings.clear();
        self.fields.clear();
        self.record_offset = 0;
        self.ready.clear();
        self.position = 0;
        self.emitted = 0;
        debug!("csv parser reset");
    }

    /// Pull the oldest completed record
    pub fn next_record(&mut self) -> Option<Record> {
        self.ready.pop_front()
    }

    /// Pull all completed records
    pub fn drain(&mut self) -> impl Iterator<Item = Record> + '_ {
        self.ready.drain(..)
    }

    /// Lazily parse `input`, feeding characters only as records are pulled.
    ///
    /// End of input is signalled when `input` is exhausted. Parsing continues
    /// from the current state; call [`reset`](CsvParser::reset) first to
    /// start a fresh input.
    ///
    /// # Examples
    ///
    /// ```
    /// use csvstream::csv::CsvParser;
    ///
    /// let mut parser = CsvParser::default();
    /// let mut records = parser.records("x,y\nz".chars());
    ///
    /// assert_eq!(records.next().unwrap().values(), vec!["x", "y"]);
    /// assert_eq!(records.next().unwrap().values(), vec!["z"]);
    /// assert!(records.next().is_none());
    /// ```
    pub fn records<I>(&mut self, input: I) -> Records<'_, I::IntoIter>
    where
        I: IntoIterator<Item = char>,
    {
        Records::new(self, input.into_iter())
    }

    /// Parse a complete input from a fresh state
    pub fn parse(&mut self, input: &str) -> Vec<Record> {
        self.reset();
        self.records(input.chars()).collect()
    }

    /// Resolve buffered characters into events while possible
    fn pump(&mut self, at_end: bool) -> Option<FieldWarning> {
        let mut raised = None;

        while let Some(&head) = self.lookahead.first() {
            let (event, width) = if self.state == State::Quoted && !self.is_degraded() {
                (Event::Char(head), 1)
            } else {
                match self.matcher.resolve(&self.lookahead, at_end) {
                    Resolution::Wait => break,
                    Resolution::Char => (Event::Char(head), 1),
                    Resolution::Separator(kind, len) => (Event::from(kind), len),
                }
            };

            self.lookahead.drain(..width);
            if let Some(warning) = self.step(event, width) {
                raised = Some(warning);
            }
        }

        raised
    }

    /// Transition function
    fn step(&mut self, event: Event, width: usize) -> Option<FieldWarning> {
        if self.state == State::StartOfField
            && self.fields.is_empty()
            && matches!(event, Event::Char(_) | Event::FieldSeparator)
        {
            self.record_offset = self.position;
        }
        self.position += width as u64;

        let quote = self.quote;
        let mut raised = None;

        match (self.state, event) {
            (State::StartOfField, Event::Char(c)) if c == quote => {
                self.state = State::Quoted;
            }
            (State::StartOfField, Event::Char(c)) => {
                self.buffer.push(c);
                self.state = State::Unquoted;
            }
            (State::StartOfField, Event::FieldSeparator) => {
                self.finish_field(Quoting::Unquoted);
            }
            (State::StartOfField, Event::LineSeparator | Event::End) => {
                // Blank lines and empty input produce nothing; a line ending
                // right after a field separator closes an empty trailing field.
                if !self.fields.is_empty() {
                    self.finish_field(Quoting::Unquoted);
                    self.finish_record();
                }
            }

            (State::Quoted, Event::Char(c)) if c == quote => {
                self.state = State::QuoteInQuoted;
            }
            (State::Quoted, Event::Char(c)) => {
                self.buffer.push(c);
            }
            // Separators only reach q1 once the field is degraded
            (State::Quoted, Event::FieldSeparator) => {
                self.finish_field(Quoting::Quoted);
            }
            (State::Quoted, Event::LineSeparator) => {
                self.finish_field(Quoting::Quoted);
                self.finish_record();
            }
            (State::Quoted, Event::End) => {
                if self.is_degraded() {
                    self.finish_field(Quoting::Quoted);
                } else {
                    raised = Some(self.raise(Warning::MissingClosingQuote));
                    self.finish_field(Quoting::Unterminated);
                }
                self.finish_record();
            }

            (State::Unquoted, Event::Char(c)) => {
                self.buffer.push(c);
            }
            (State::Unquoted, Event::FieldSeparator) => {
                self.finish_field(Quoting::Unquoted);
            }
            (State::Unquoted, Event::LineSeparator | Event::End) => {
                self.finish_field(Quoting::Unquoted);
                self.finish_record();
            }

            (State::QuoteInQuoted, Event::Char(c)) if c == quote => {
                self.buffer.push(quote);
                self.state = State::Quoted;
            }
            (State::QuoteInQuoted, Event::Char(c)) => {
                raised = Some(self.raise(Warning::UnescapedQuote));
                self.buffer.push(quote);
                self.buffer.push(c);
                self.state = State::Quoted;
            }
            (State::QuoteInQuoted, Event::FieldSeparator) => {
                self.finish_field(Quoting::Quoted);
            }
            (State::QuoteInQuoted, Event::LineSeparator | Event::End) => {
                self.finish_field(Quoting::Quoted);
                self.finish_record();
            }
        }

        raised
    }

    /// A quoted field that took the W2 transition ends at the next separator
    fn is_degraded(&self) -> bool {
        self.field_warnings.contains(&Warning::UnescapedQuote)
    }

    fn raise(&mut self, warning: Warning) -> FieldWarning {
        let tagged = FieldWarning {
            field: self.fields.len(),
            warning,
        };
        warn!(
            record = self.emitted,
            field = tagged.field,
            offset = self.position,
            code = warning.code(),
            "{}",
            warning
        );
        if !self.field_warnings.contains(&warning) {
            self.field_warnings.push(warning);
        }
        tagged
    }

    fn finish_field(&mut self, quoting: Quoting) {
        self.fields.push(Field {
            value: mem::take(&mut self.buffer),
            quoting,
            warnings: mem::take(&mut self.field_warnings),
        });
        self.state = State::StartOfField;
    }

    fn finish_record(&mut self) {
        let record = Record {
            index: self.emitted,
            offset: self.record_offset,
            fields: mem::take(&mut self.fields),
        };
        debug!(
            index = record.index,
            fields = record.fields.len(),
            "csv record completed"
        );
        self.emitted += 1;
        self.ready.push_back(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Vec<Vec<String>> {
        CsvParser::default()
            .parse(input)
            .iter()
            .map(Record::to_strings)
            .collect()
    }

    fn parse_with(config: ParserConfig, input: &str) -> Vec<Vec<String>> {
        CsvParser::new(config)
            .unwrap()
            .parse(input)
            .iter()
            .map(Record::to_strings)
            .collect()
    }

    #[test]
    fn test_simple() {
        assert_eq!(parse("a,b,c"), vec![vec!["a", "b", "c"]]);
    }

    #[test]
    fn test_quoted() {
        assert_eq!(parse(r#""a,b",c"#), vec![vec!["a,b", "c"]]);
    }

    #[test]
    fn test_quoted_separator_in_middle() {
        assert_eq!(parse(r#"a,"b,b",c"#), vec![vec!["a", "b,b", "c"]]);
    }

    #[test]
    fn test_escaped_quotes() {
        assert_eq!(
            parse(r#""Say ""Hello""",world"#),
            vec![vec![r#"Say "Hello""#, "world"]]
        );
    }

    #[test]
    fn test_escaped_quote_sole_field() {
        let records = CsvParser::default().parse(r#""a""b""#);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].values(), vec!["a\"b"]);
        assert_eq!(records[0].fields[0].quoting, Quoting::Quoted);
        assert!(records[0].is_clean());
    }

    #[test]
    fn test_empty_fields() {
        assert_eq!(parse("a,,c"), vec![vec!["a", "", "c"]]);
    }

    #[test]
    fn test_all_empty() {
        assert_eq!(parse(",,"), vec![vec!["", "", ""]]);
    }

    #[test]
    fn test_trailing_field_separator() {
        assert_eq!(parse("a,\nb"), vec![vec!["a", ""], vec!["b"]]);
        assert_eq!(parse("a,"), vec![vec!["a", ""]]);
    }

    #[test]
    fn test_quoted_with_newline() {
        assert_eq!(
            parse("\"Line 1\nLine 2\",normal"),
            vec![vec!["Line 1\nLine 2", "normal"]]
        );
    }

    #[test]
    fn test_mixed_quoted_unquoted() {
        assert_eq!(parse(r#"a,"b,c",d"#), vec![vec!["a", "b,c", "d"]]);
    }

    #[test]
    fn test_custom_delimiter() {
        let config = ParserConfig::builder().field_separator(";").build().unwrap();
        assert_eq!(parse_with(config, r#"a;"b;c";d"#), vec![vec!["a", "b;c", "d"]]);
    }

    #[test]
    fn test_empty_input() {
        let mut parser = CsvParser::default();
        assert!(parser.signal_end_of_input().is_none());
        assert_eq!(parser.pending_records(), 0);
        assert!(parse("").is_empty());
    }

    #[test]
    fn test_blank_lines_skipped() {
        assert!(parse("\n\r\n\r").is_empty());
        assert_eq!(parse("a\n\nb\n"), vec![vec!["a"], vec!["b"]]);
    }

    #[test]
    fn test_single_field() {
        assert_eq!(parse("hello"), vec![vec!["hello"]]);
    }

    #[test]
    fn test_quoted_empty() {
        assert_eq!(parse(r#""","""#), vec![vec!["", ""]]);
        assert_eq!(parse("\"\"\n"), vec![vec![""]]);
    }

    #[test]
    fn test_quote_inside_unquoted_field() {
        let records = CsvParser::default().parse("ab\"c,d");
        assert_eq!(records[0].values(), vec!["ab\"c", "d"]);
        assert!(records[0].is_clean());
    }

    #[test]
    fn test_crlf_is_one_line_break() {
        assert_eq!(parse("a\r\nb\r\n"), vec![vec!["a"], vec!["b"]]);
        assert_eq!(parse("a\rb\nc"), vec![vec!["a"], vec!["b"], vec!["c"]]);
    }

    #[test]
    fn test_crlf_split_across_feeds() {
        let mut parser = CsvParser::default();
        parser.feed_str("a\r");
        assert_eq!(parser.pending_records(), 0);
        parser.feed_str("\nb");
        assert_eq!(parser.pending_records(), 1);
        parser.signal_end_of_input();
        let rows: Vec<_> = parser.drain().map(|r| r.to_strings()).collect();
        assert_eq!(rows, vec![vec!["a"], vec!["b"]]);
    }

    #[test]
    fn test_unterminated_quote() {
        let mut parser = CsvParser::default();
        assert!(parser.feed_str("\"a\"\"").is_empty());
        let warning = parser.signal_end_of_input();
        assert_eq!(
            warning,
            Some(FieldWarning {
                field: 0,
                warning: Warning::MissingClosingQuote
            })
        );

        let record = parser.next_record().unwrap();
        assert_eq!(record.values(), vec!["a\""]);
        assert_eq!(record.fields[0].quoting, Quoting::Unterminated);
        assert!(record.fields[0].has_warning(Warning::MissingClosingQuote));
        assert!(parser.next_record().is_none());
    }

    #[test]
    fn test_unterminated_quote_absorbs_line_breaks() {
        let records = CsvParser::default().parse("x,\"open\nnext,line");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].values(), vec!["x", "open\nnext,line"]);
        let warnings: Vec<_> = records[0].warnings().collect();
        assert_eq!(
            warnings,
            vec![FieldWarning {
                field: 1,
                warning: Warning::MissingClosingQuote
            }]
        );
    }

    #[test]
    fn test_unescaped_quote_recovery() {
        let mut parser = CsvParser::default();
        let warnings = parser.feed_str("\"a\"x,b");
        assert_eq!(
            warnings,
            vec![FieldWarning {
                field: 0,
                warning: Warning::UnescapedQuote
            }]
        );
        parser.signal_end_of_input();

        let record = parser.next_record().unwrap();
        assert_eq!(record.values(), vec!["a\"x", "b"]);
        assert_eq!(record.fields[0].quoting, Quoting::Quoted);
        assert_eq!(record.fields[0].warnings, vec![Warning::UnescapedQuote]);
        assert!(record.fields[1].warnings.is_empty());
    }

    #[test]
    fn test_degraded_field_ends_at_line_break() {
        let records = CsvParser::default().parse("\"a\"b c\nd");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].values(), vec!["a\"b c"]);
        assert_eq!(records[1].values(), vec!["d"]);
    }

    #[test]
    fn test_degraded_field_at_end_of_input() {
        let records = CsvParser::default().parse("\"a\"bc");
        assert_eq!(records[0].values(), vec!["a\"bc"]);
        assert_eq!(records[0].fields[0].quoting, Quoting::Quoted);
        assert_eq!(records[0].fields[0].warnings, vec![Warning::UnescapedQuote]);
    }

    #[test]
    fn test_degraded_field_warns_once() {
        let mut parser = CsvParser::default();
        let warnings = parser.feed_str("\"a\"b\"c\",d");
        assert_eq!(warnings.len(), 2);
        parser.signal_end_of_input();
        let record = parser.next_record().unwrap();
        assert_eq!(record.values(), vec!["a\"b\"c", "d"]);
        assert_eq!(record.fields[0].warnings, vec![Warning::UnescapedQuote]);
    }

    #[test]
    fn test_states() {
        let mut parser = CsvParser::default();
        assert_eq!(parser.state(), State::StartOfField);
        parser.feed('"');
        assert_eq!(parser.state(), State::Quoted);
        parser.feed('a');
        assert_eq!(parser.state(), State::Quoted);
        parser.feed('"');
        assert_eq!(parser.state(), State::QuoteInQuoted);
        parser.feed(',');
        assert_eq!(parser.state(), State::StartOfField);
        parser.feed('b');
        assert_eq!(parser.state(), State::Unquoted);
    }

    #[test]
    fn test_multi_char_separators() {
        let config = ParserConfig::builder()
            .field_separators(["::", ":"])
            .line_separators(["<EOL>"])
            .build()
            .unwrap();
        assert_eq!(
            parse_with(config, "a::b:c<EOL>d<EO<EOL>"),
            vec![vec!["a", "b", "c"], vec!["d<EO"]]
        );
    }

    #[test]
    fn test_pending_prefix_flushed_at_end() {
        let config = ParserConfig::builder()
            .field_separator("<>")
            .line_separators(["\n"])
            .build()
            .unwrap();
        assert_eq!(parse_with(config, "a<>b<"), vec![vec!["a", "b<"]]);
    }

    #[test]
    fn test_record_positions() {
        let records = CsvParser::default().parse("ab,c\n\n,d\n");
        assert_eq!(records.len(), 2);
        assert_eq!((records[0].index, records[0].offset), (0, 0));
        assert_eq!((records[1].index, records[1].offset), (1, 6));
    }

    #[test]
    fn test_end_of_input_twice() {
        let mut parser = CsvParser::default();
        parser.feed_str("a");
        parser.signal_end_of_input();
        parser.signal_end_of_input();
        assert_eq!(parser.pending_records(), 1);
        assert_eq!(parser.records_emitted(), 1);
    }

    #[test]
    fn test_reset() {
        let mut parser = CsvParser::default();
        parser.feed_str("\"half");
        parser.reset();
        assert_eq!(parser.state(), State::StartOfField);
        parser.feed_str("x");
        parser.signal_end_of_input();
        let record = parser.next_record().unwrap();
        assert_eq!(record.values(), vec!["x"]);
        assert_eq!(record.index, 0);
        assert!(record.is_clean());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = ParserConfig::builder().field_separator("\n");
        assert!(config.build().is_err());
    }
}
