//! Pull-based iteration over records

use super::parser::CsvParser;
use crate::types::Record;

/// Lazy iterator over the records of a character source.
///
/// Characters are fed to the parser only until the next record completes.
/// When the source is exhausted end-of-input is signalled once, flushing a
/// trailing record that has no line break.
#[derive(Debug)]
pub struct Records<'a, I> {
    parser: &'a mut CsvParser,
    input: I,
    finished: bool,
}

impl<'a, I> Records<'a, I>
where
    I: Iterator<Item = char>,
{
    pub(crate) fn new(parser: &'a mut CsvParser, input: I) -> Self {
        Self {
            parser,
            input,
            finished: false,
        }
    }
}

impl<I> Iterator for Records<'_, I>
where
    I: Iterator<Item = char>,
{
    type Item = Record;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(record) = self.parser.next_record() {
                return Some(record);
            }
            if self.finished {
                return None;
            }
            match self.input.next() {
                Some(ch) => {
                    self.parser.feed(ch);
                }
                None => {
                    self.parser.signal_end_of_input();
                    self.finished = true;
                }
            }
        }
    }
}

impl<I> std::iter::FusedIterator for Records<'_, I> where I: Iterator<Item = char> {}
