//! CSV utilities for parsing and encoding

mod encoder;
mod matcher;
mod parser;
mod records;

pub use encoder::CsvEncoder;
pub use parser::{CsvParser, State};
pub use records::Records;
