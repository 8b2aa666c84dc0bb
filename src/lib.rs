//! # csvstream
//!
//! Streaming CSV parser built on an explicit finite-state machine.
//!
//! The parser consumes one character at a time, so input can arrive in
//! chunks of any size; chunk boundaries never act as field or line
//! boundaries. Field and line separators are configurable sets of
//! multi-character strings matched longest-first, and malformed quoting is
//! recovered the way spreadsheets do it, with a warning attached to the
//! offending field instead of an error.
//!
//! ## Quick Start
//!
//! ```
//! use csvstream::csv::CsvParser;
//! use csvstream::types::Warning;
//!
//! let mut parser = CsvParser::default();
//! let records = parser.parse("name,quote\nbob,\"said \"\"hi\"\"\"\neve,\"a\"x");
//!
//! assert_eq!(records.len(), 3);
//! assert_eq!(records[1].values(), vec!["bob", "said \"hi\""]);
//! assert!(records[2].fields[1].has_warning(Warning::UnescapedQuote));
//! ```
//!
//! ## Custom dialects
//!
//! ```
//! use csvstream::config::ParserConfig;
//! use csvstream::csv::CsvParser;
//!
//! let config = ParserConfig::builder()
//!     .field_separators(["\t", ";"])
//!     .line_separators(["\n"])
//!     .build()
//!     .unwrap();
//!
//! let mut parser = CsvParser::new(config).unwrap();
//! for ch in "a\tb;c\n".chars() {
//!     parser.feed(ch);
//! }
//! parser.signal_end_of_input();
//!
//! assert_eq!(parser.next_record().unwrap().values(), vec!["a", "b", "c"]);
//! ```

pub mod config;
pub mod csv;
pub mod error;
pub mod types;

pub use config::ParserConfig;
pub use csv::{CsvEncoder, CsvParser, Records, State};
pub use error::{CsvError, Result, SeparatorKind};
pub use types::{Field, FieldWarning, Quoting, Record, Warning};
