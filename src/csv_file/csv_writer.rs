use std::{
    fs::File,
    io::{self, Write},
    path::Path,
};

use csv::{QuoteStyle, WriterBuilder};
use log::{debug, trace};
use serde::Serialize;
use serde_json::{Number, Value};

use crate::{
    csv_file::{
        format::{CsvFormat, DEFAULT_DELIMITER, DEFAULT_ENCLOSURE, DEFAULT_ESCAPE, byte_to_text},
        line_break::LineBreak,
    },
    error::{CsvError, Result, WriteError},
};

/// A CSV writer that serializes rows of scalar values to a sink.
///
/// Every field is wrapped in the enclosure, with embedded enclosures
/// doubled. Fields are joined with the delimiter and each row ends with the
/// configured line break. With an empty enclosure fields are written as is.
///
/// A row is any value that serializes to a sequence: `Vec`, slices, tuples
/// or a JSON array. Strings and numbers are written as text, `None`/null as
/// an empty field, `true` as `1` and `false` as an empty field. Nested
/// sequences and maps are rejected. An empty row is written as the line
/// break alone.
///
/// Each row is encoded completely before anything is written, so a rejected
/// row leaves the sink untouched. Rows are not flushed between calls.
///
/// # Examples
///
/// ```
/// use csv_stream::CsvWriterBuilder;
///
/// let mut writer = CsvWriterBuilder::new()
///     .delimiter(";")
///     .line_break("\n")
///     .from_writer(Vec::<u8>::new())
///     .unwrap();
///
/// writer.write_row(&["name", "quote"]).unwrap();
/// writer.write_row(&("Bob", "say \"hi\"")).unwrap();
///
/// let data = String::from_utf8(writer.into_inner().unwrap()).unwrap();
/// assert_eq!(data, "\"name\";\"quote\"\n\"Bob\";\"say \"\"hi\"\"\"\n");
/// ```
#[derive(Debug)]
pub struct CsvWriter<W: Write> {
    stream: W,
    encoder: WriterBuilder,
    format: CsvFormat,
    line_break: LineBreak,
}

impl<W: Write> CsvWriter<W> {
    /// Encodes `row` and writes it to the sink.
    ///
    /// # Errors
    ///
    /// - [`WriteError::NotARow`] if `row` does not serialize to a sequence
    /// - [`WriteError::UnsupportedField`] if a field is a sequence or a map
    /// - [`WriteError::Incomplete`] if the sink stops accepting bytes
    /// - [`WriteError::Io`] if the sink reports an error
    pub fn write_row<T: Serialize + ?Sized>(&mut self, row: &T) -> Result<()> {
        let line = self.row_to_string(row)?;
        self.write_all(line.as_bytes())?;
        trace!("Wrote CSV row: {:?}", line);
        Ok(())
    }

    /// Returns the encoded text of `row`, including the line break, without
    /// writing it.
    pub fn row_to_string<T: Serialize + ?Sized>(&self, row: &T) -> Result<String> {
        let fields = row_fields(row)?;

        // the encoder would emit `""` for these, which is not the joined text
        let blank = match fields.as_slice() {
            [] => true,
            [only] => only.is_empty() && self.format.enclosure().is_none(),
            _ => false,
        };
        if blank {
            return Ok(self.line_break.as_str().to_string());
        }

        let mut encoder = self.encoder.from_writer(Vec::new());
        encoder
            .write_record(&fields)
            .map_err(|error| WriteError::Encode(error.to_string()))?;
        let bytes = encoder
            .into_inner()
            .map_err(|error| WriteError::Encode(error.to_string()))?;

        String::from_utf8(bytes).map_err(|error| WriteError::Encode(error.to_string()).into())
    }

    /// Flush the underlying sink.
    pub fn flush(&mut self) -> Result<()> {
        self.stream.flush().map_err(WriteError::Io)?;
        Ok(())
    }

    /// Flushes and returns the underlying sink.
    pub fn into_inner(mut self) -> Result<W> {
        self.flush()?;
        Ok(self.stream)
    }

    pub fn get_ref(&self) -> &W {
        &self.stream
    }

    pub fn format(&self) -> &CsvFormat {
        &self.format
    }

    pub fn delimiter(&self) -> String {
        byte_to_text(Some(self.format.delimiter()))
    }

    pub fn enclosure(&self) -> String {
        byte_to_text(self.format.enclosure())
    }

    pub fn line_break(&self) -> LineBreak {
        self.line_break
    }

    fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        let mut written = 0;
        while written < buf.len() {
            match self.stream.write(&buf[written..]) {
                Ok(0) => {
                    return Err(WriteError::Incomplete {
                        expected: buf.len(),
                        written,
                    }
                    .into());
                }
                Ok(n) => written += n,
                Err(error) if error.kind() == io::ErrorKind::Interrupted => {}
                Err(error) => return Err(WriteError::Io(error).into()),
            }
        }
        Ok(())
    }
}

fn row_fields<T: Serialize + ?Sized>(row: &T) -> Result<Vec<String>> {
    let value = serde_json::to_value(row).map_err(|error| WriteError::Encode(error.to_string()))?;

    match value {
        Value::Array(values) => values
            .into_iter()
            .enumerate()
            .map(|(column, value)| field_to_text(column, value))
            .collect(),
        other => Err(WriteError::NotARow(other.to_string()).into()),
    }
}

fn field_to_text(column: usize, value: Value) -> Result<String> {
    match value {
        Value::Null | Value::Bool(false) => Ok(String::new()),
        Value::Bool(true) => Ok("1".to_string()),
        Value::Number(number) => Ok(number_to_text(&number)),
        Value::String(text) => Ok(text),
        other @ (Value::Array(_) | Value::Object(_)) => Err(WriteError::UnsupportedField {
            column,
            value: other.to_string(),
        }
        .into()),
    }
}

/// Integral floats lose their fraction (`1.0` is written as `1`); other
/// numbers keep their `serde_json` text, e.g. `2.5`.
fn number_to_text(number: &Number) -> String {
    match number.as_f64() {
        Some(float) if number.is_f64() && float.fract() == 0.0 && float.abs() < 1e15 => {
            format!("{:.0}", float)
        }
        _ => number.to_string(),
    }
}

/// A builder for configuring a [`CsvWriter`].
///
/// # Default Configuration
///
/// - Delimiter: comma (,)
/// - Enclosure: double quote (")
/// - Line break: `\r\n`
///
/// `\r\n`, `\n` and `\r` are all accepted as line breaks.
#[derive(Debug, Clone)]
pub struct CsvWriterBuilder {
    delimiter: String,
    enclosure: String,
    line_break: String,
}

impl Default for CsvWriterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvWriterBuilder {
    pub fn new() -> CsvWriterBuilder {
        CsvWriterBuilder {
            delimiter: DEFAULT_DELIMITER.to_string(),
            enclosure: DEFAULT_ENCLOSURE.to_string(),
            line_break: LineBreak::default().as_str().to_string(),
        }
    }

    pub fn delimiter(mut self, delimiter: &str) -> CsvWriterBuilder {
        self.delimiter = delimiter.to_string();
        self
    }

    /// Sets the enclosure; an empty string writes fields unquoted.
    pub fn enclosure(mut self, enclosure: &str) -> CsvWriterBuilder {
        self.enclosure = enclosure.to_string();
        self
    }

    /// Sets the literal line break appended to each row.
    pub fn line_break(mut self, line_break: &str) -> CsvWriterBuilder {
        self.line_break = line_break.to_string();
        self
    }

    /// Creates or truncates `path` and builds a writer over it.
    ///
    /// # Errors
    ///
    /// - [`CsvError::InvalidConfig`] for an invalid delimiter or enclosure
    /// - [`CsvError::InvalidLineBreak`] for a line break other than `\r\n`, `\n`, `\r`
    /// - [`CsvError::FileNotFound`] if the file cannot be opened for writing
    pub fn from_path<P: AsRef<Path>>(self, path: P) -> Result<CsvWriter<File>> {
        let path = path.as_ref();
        let (format, line_break) = self.validate()?;

        let file = File::create(path).map_err(|e| CsvError::file_not_found(path, e))?;

        debug!(
            "Opened CSV file for writing: {} (line break {})",
            path.display(),
            line_break
        );
        Ok(Self::build(format, line_break, file))
    }

    /// Builds a writer over any sink.
    pub fn from_writer<W: Write>(self, wtr: W) -> Result<CsvWriter<W>> {
        let (format, line_break) = self.validate()?;
        Ok(Self::build(format, line_break, wtr))
    }

    fn validate(&self) -> Result<(CsvFormat, LineBreak)> {
        let format = CsvFormat::new(&self.delimiter, &self.enclosure, DEFAULT_ESCAPE)?;
        let line_break = self.line_break.parse::<LineBreak>()?;
        Ok((format, line_break))
    }

    fn build<W: Write>(format: CsvFormat, line_break: LineBreak, stream: W) -> CsvWriter<W> {
        let mut encoder = WriterBuilder::new();
        encoder
            .delimiter(format.delimiter())
            .quote(format.enclosure().unwrap_or(b'"'))
            .quote_style(match format.enclosure() {
                Some(_) => QuoteStyle::Always,
                None => QuoteStyle::Never,
            })
            .double_quote(true)
            .terminator(line_break.terminator())
            .has_headers(false)
            .flexible(true);

        CsvWriter {
            stream,
            encoder,
            format,
            line_break,
        }
    }
}
