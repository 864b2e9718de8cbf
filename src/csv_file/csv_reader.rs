use std::{
    fs::File,
    io::{Read, Seek},
    path::Path,
};

use log::{debug, trace};

use crate::{
    csv_file::{
        format::{CsvFormat, DEFAULT_DELIMITER, DEFAULT_ENCLOSURE, DEFAULT_ESCAPE, byte_to_text},
        line_break::{DETECTION_SAMPLE_SIZE, LineBreak, detect_line_break},
        record::RecordReader,
    },
    error::{CsvError, Result},
};

/// A restartable, row-at-a-time reader over a delimited text file.
///
/// The first record of the file is the header. It is parsed once at
/// construction and never yielded as data. `skip_lines` further records are
/// discarded after it, then data rows follow. A blank line is a row with a
/// single empty field, so it counts toward `skip_lines` and [`key`](Self::key).
///
/// The reader exposes an explicit cursor (`rewind`, `current`, `advance`,
/// `valid`, `key`) and also implements [`Iterator`], continuing from the
/// cursor position.
///
/// # Line breaks
///
/// The style is detected from the first 10 000 bytes. Only `\r\n` and `\n`
/// files can be read; a file that uses bare `\r` is rejected with
/// [`CsvError::InvalidLineBreak`] as soon as the first record is read, which
/// happens during construction.
///
/// Readable files accept both `\r\n` and `\n` as record ends, whichever
/// style was detected. A `\r` that is not followed by `\n` is field data.
///
/// # Examples
///
/// ```
/// use csv_stream::CsvReaderBuilder;
/// use std::io::Cursor;
///
/// let data = "name,age\r\nAlice,30\r\n\"Bob, Jr.\",40\r\n";
/// let mut reader = CsvReaderBuilder::new()
///     .from_reader(Cursor::new(data))
///     .unwrap();
///
/// assert_eq!(reader.header(), ["name", "age"]);
///
/// let rows: Vec<Vec<String>> = reader.by_ref().collect::<Result<_, _>>().unwrap();
/// assert_eq!(rows, vec![vec!["Alice", "30"], vec!["Bob, Jr.", "40"]]);
/// assert!(!reader.valid());
///
/// // Restart from the first data row
/// reader.rewind().unwrap();
/// assert_eq!(reader.key(), 0);
/// assert_eq!(reader.current().unwrap(), ["Alice", "30"]);
/// ```
#[derive(Debug)]
pub struct CsvReader<R> {
    inner: RecordReader<R>,
    format: CsvFormat,
    line_break: LineBreak,
    skip_lines: usize,
    header: Vec<String>,
    /// Row under the cursor, `None` once past the last row
    current: Option<Vec<String>>,
    row_index: usize,
    /// Error hit while advancing inside `Iterator::next`, reported on the following call
    pending_error: Option<CsvError>,
}

impl<R: Read + Seek> CsvReader<R> {
    /// Seeks back to the first data row and resets the row counter.
    ///
    /// Consumes the header and the `skip_lines` records again, so it can be
    /// called any number of times.
    pub fn rewind(&mut self) -> Result<()> {
        self.pending_error = None;
        self.inner.rewind()?;

        // header
        self.read_line()?;
        for _ in 0..self.skip_lines {
            self.read_line()?;
        }

        self.current = self.read_line()?;
        self.row_index = 0;
        Ok(())
    }

    /// Moves the cursor to the next row and increments the row counter.
    ///
    /// Past the end of the file the cursor holds no row and [`valid`](Self::valid)
    /// returns `false`. A decoding error also leaves the cursor without a row.
    pub fn advance(&mut self) -> Result<()> {
        match self.read_line() {
            Ok(row) => {
                self.current = row;
                self.row_index += 1;
                Ok(())
            }
            Err(error) => {
                self.current = None;
                Err(error)
            }
        }
    }

    fn read_line(&mut self) -> Result<Option<Vec<String>>> {
        self.line_break.ensure_readable()?;

        let row = self.inner.read_record()?;
        if let Some(row) = &row {
            trace!("Read CSV row: {:?}", row);
        }
        Ok(row)
    }
}

impl<R> CsvReader<R> {
    /// Row under the cursor, `None` once the reader is exhausted.
    pub fn current(&self) -> Option<&[String]> {
        self.current.as_deref()
    }

    /// Whether the cursor points at a row.
    pub fn valid(&self) -> bool {
        self.current.is_some()
    }

    /// Number of advances since the last rewind; `0` for the first data row.
    pub fn key(&self) -> usize {
        self.row_index
    }

    /// Header fields captured at construction; empty for an empty file.
    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn columns_count(&self) -> usize {
        self.header.len()
    }

    /// Detected line-break style.
    pub fn line_break(&self) -> LineBreak {
        self.line_break
    }

    /// Detected line-break style with control characters escaped, e.g. `\r\n`.
    pub fn line_break_as_text(&self) -> &'static str {
        self.line_break.as_escaped()
    }

    pub fn format(&self) -> &CsvFormat {
        &self.format
    }

    pub fn delimiter(&self) -> String {
        byte_to_text(Some(self.format.delimiter()))
    }

    /// Configured enclosure, empty when quoting is disabled.
    pub fn enclosure(&self) -> String {
        byte_to_text(self.format.enclosure())
    }

    /// Configured escape character, empty when none.
    pub fn escape(&self) -> String {
        byte_to_text(self.format.escape())
    }

    pub fn skip_lines(&self) -> usize {
        self.skip_lines
    }
}

impl<R: Read + Seek> Iterator for CsvReader<R> {
    type Item = Result<Vec<String>>;

    /// Yields the row under the cursor and advances.
    ///
    /// Does not rewind; call [`CsvReader::rewind`] to iterate again.
    fn next(&mut self) -> Option<Self::Item> {
        if let Some(error) = self.pending_error.take() {
            return Some(Err(error));
        }

        let row = self.current.take()?;
        if let Err(error) = self.advance() {
            self.pending_error = Some(error);
        }
        Some(Ok(row))
    }
}

/// A builder for configuring a [`CsvReader`].
///
/// # Default Configuration
///
/// - Delimiter: comma (,)
/// - Enclosure: double quote (")
/// - Escape: none (enclosures are escaped by doubling)
/// - Skip lines: 0
///
/// Settings are validated when the reader is built.
///
/// # Examples
///
/// ```
/// use csv_stream::CsvReaderBuilder;
/// use std::io::Cursor;
///
/// let data = "id;name\n-- generated --\n1;Alice\n";
/// let reader = CsvReaderBuilder::new()
///     .delimiter(";")
///     .skip_lines(1)
///     .from_reader(Cursor::new(data))
///     .unwrap();
///
/// assert_eq!(reader.header(), ["id", "name"]);
/// assert_eq!(reader.current().unwrap(), ["1", "Alice"]);
/// ```
#[derive(Debug, Clone)]
pub struct CsvReaderBuilder {
    delimiter: String,
    enclosure: String,
    escape: String,
    skip_lines: usize,
}

impl Default for CsvReaderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvReaderBuilder {
    pub fn new() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER.to_string(),
            enclosure: DEFAULT_ENCLOSURE.to_string(),
            escape: DEFAULT_ESCAPE.to_string(),
            skip_lines: 0,
        }
    }

    /// Sets the field delimiter. Must be exactly one byte.
    pub fn delimiter(mut self, delimiter: &str) -> Self {
        self.delimiter = delimiter.to_string();
        self
    }

    /// Sets the enclosure character. An empty string disables quoting.
    pub fn enclosure(mut self, enclosure: &str) -> Self {
        self.enclosure = enclosure.to_string();
        self
    }

    /// Sets an escape character used in front of enclosures inside enclosed
    /// fields, in addition to doubling.
    pub fn escape(mut self, escape: &str) -> Self {
        self.escape = escape.to_string();
        self
    }

    /// Sets the number of records discarded between the header and the
    /// first data row.
    pub fn skip_lines(mut self, skip_lines: usize) -> Self {
        self.skip_lines = skip_lines;
        self
    }

    /// Opens `path` and builds a reader over it.
    ///
    /// # Errors
    ///
    /// - [`CsvError::InvalidConfig`] for an invalid delimiter, enclosure or escape
    /// - [`CsvError::FileNotFound`] if `path` is not a regular file or cannot be opened
    /// - [`CsvError::InvalidLineBreak`] if the file uses bare `\r` line breaks
    pub fn from_path<P: AsRef<Path>>(self, path: P) -> Result<CsvReader<File>> {
        let path = path.as_ref();
        let format = self.format()?;

        if !path.is_file() {
            return Err(CsvError::file_not_found(path, "not an existing regular file"));
        }
        let file = File::open(path).map_err(|e| CsvError::file_not_found(path, e))?;

        debug!("Opened CSV file for reading: {}", path.display());
        self.build(format, file)
    }

    /// Builds a reader over any seekable source.
    ///
    /// # Examples
    ///
    /// ```
    /// use csv_stream::{CsvReaderBuilder, LineBreak};
    /// use std::io::Cursor;
    ///
    /// let reader = CsvReaderBuilder::new()
    ///     .from_reader(Cursor::new("a,b\nc,d\n"))
    ///     .unwrap();
    /// assert_eq!(reader.line_break(), LineBreak::Lf);
    /// assert_eq!(reader.line_break_as_text(), "\\n");
    /// ```
    pub fn from_reader<R: Read + Seek>(self, rdr: R) -> Result<CsvReader<R>> {
        let format = self.format()?;
        self.build(format, rdr)
    }

    fn format(&self) -> Result<CsvFormat> {
        CsvFormat::new(&self.delimiter, &self.enclosure, &self.escape)
    }

    fn build<R: Read + Seek>(self, format: CsvFormat, mut rdr: R) -> Result<CsvReader<R>> {
        let mut sample = Vec::with_capacity(DETECTION_SAMPLE_SIZE);
        (&mut rdr)
            .take(DETECTION_SAMPLE_SIZE as u64)
            .read_to_end(&mut sample)?;
        rdr.rewind()?;
        let line_break = detect_line_break(&sample);

        let inner = RecordReader::new(rdr, format);

        let mut reader = CsvReader {
            inner,
            format,
            line_break,
            skip_lines: self.skip_lines,
            header: Vec::new(),
            current: None,
            row_index: 0,
            pending_error: None,
        };

        reader.header = reader.read_line()?.unwrap_or_default();
        reader.rewind()?;

        debug!(
            "CSV reader ready: line break {}, {} columns, skipping {} lines",
            reader.line_break,
            reader.header.len(),
            reader.skip_lines
        );

        Ok(reader)
    }
}
