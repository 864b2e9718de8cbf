//! Splits a byte stream into raw records.
//!
//! A record ends at an `\n` that is not inside an enclosed field; one `\r`
//! right before that `\n` belongs to the terminator. Any other `\r` is field
//! data. A blank line is a record with a single empty field. Fields are then
//! decoded by the `csv` crate, one record at a time.

use std::io::{BufRead, BufReader, Read, Seek, SeekFrom};

use csv::StringRecord;
use log::trace;

use crate::{csv_file::format::CsvFormat, error::Result};

/// Position of the scanner relative to the enclosure rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scan {
    FieldStart,
    Unquoted,
    Quoted,
    /// Escape character seen inside an enclosed field
    QuotedEscape,
    /// Enclosure seen inside an enclosed field: either doubled or closing
    QuoteInQuoted,
}

impl Scan {
    fn in_enclosure(self) -> bool {
        matches!(self, Scan::Quoted | Scan::QuotedEscape)
    }

    fn step(self, format: &CsvFormat, byte: u8) -> Scan {
        let is_enclosure = format.enclosure() == Some(byte);
        let is_escape = format.escape() == Some(byte) && !is_enclosure;

        match self {
            Scan::FieldStart if is_enclosure => Scan::Quoted,
            Scan::Quoted if is_escape => Scan::QuotedEscape,
            Scan::Quoted if is_enclosure => Scan::QuoteInQuoted,
            Scan::Quoted => Scan::Quoted,
            Scan::QuotedEscape => Scan::Quoted,
            Scan::QuoteInQuoted if is_enclosure => Scan::Quoted,
            _ if byte == format.delimiter() || byte == b'\n' => Scan::FieldStart,
            _ => Scan::Unquoted,
        }
    }
}

/// Reads records from `R` and decodes their fields with a [`CsvFormat`].
#[derive(Debug)]
pub(crate) struct RecordReader<R> {
    inner: BufReader<R>,
    format: CsvFormat,
    raw: Vec<u8>,
    record: StringRecord,
}

impl<R: Read> RecordReader<R> {
    pub(crate) fn new(rdr: R, format: CsvFormat) -> Self {
        Self {
            inner: BufReader::new(rdr),
            format,
            raw: Vec::new(),
            record: StringRecord::new(),
        }
    }

    /// Next decoded record, `None` at the end of the stream.
    pub(crate) fn read_record(&mut self) -> Result<Option<Vec<String>>> {
        if !self.read_raw()? {
            return Ok(None);
        }

        let line = strip_terminator(&self.raw);
        if line.is_empty() {
            return Ok(Some(vec![String::new()]));
        }

        // no unenclosed \n is left in `line`, so it decodes as one record
        let mut decoder = self.format.reader_builder().from_reader(line);
        if !decoder.read_record(&mut self.record)? {
            return Ok(Some(vec![String::new()]));
        }

        let row: Vec<String> = self.record.iter().map(str::to_string).collect();
        trace!("Decoded record of {} bytes into {} fields", line.len(), row.len());
        Ok(Some(row))
    }

    /// Fills `raw` with the bytes of one record, terminator included.
    /// Returns `false` once nothing is left to read.
    fn read_raw(&mut self) -> Result<bool> {
        self.raw.clear();
        let mut state = Scan::FieldStart;

        loop {
            let start = self.raw.len();
            if self.inner.read_until(b'\n', &mut self.raw)? == 0 {
                // end of stream, possibly inside an unterminated enclosure
                return Ok(!self.raw.is_empty());
            }

            state = self.raw[start..]
                .iter()
                .fold(state, |state, &byte| state.step(&self.format, byte));
            if !state.in_enclosure() {
                return Ok(true);
            }
        }
    }
}

impl<R: Read + Seek> RecordReader<R> {
    /// Moves back to the first byte of the stream.
    pub(crate) fn rewind(&mut self) -> Result<()> {
        self.inner.seek(SeekFrom::Start(0))?;
        Ok(())
    }
}

fn strip_terminator(raw: &[u8]) -> &[u8] {
    match raw.strip_suffix(b"\n") {
        Some(line) => line.strip_suffix(b"\r").unwrap_or(line),
        None => raw,
    }
}
