use csv::{ReaderBuilder, Terminator, Trim};

use crate::error::{CsvError, Result};

/// Default field delimiter.
pub const DEFAULT_DELIMITER: &str = ",";
/// Default enclosure (quote) character.
pub const DEFAULT_ENCLOSURE: &str = "\"";
/// Default escape character: none, enclosures are escaped by doubling.
pub const DEFAULT_ESCAPE: &str = "";

/// Validated single-byte formatting rules shared by readers and writers.
///
/// Lengths are measured in bytes, so a multi-byte UTF-8 character is
/// rejected as a delimiter even though it is a single `char`.
///
/// An empty enclosure means "no enclosure" and is stored as `None`, which
/// keeps it distinct from a NUL byte appearing in data.
///
/// # Examples
///
/// ```
/// use csv_stream::CsvFormat;
///
/// let mut format = CsvFormat::default();
/// format.set_delimiter(";").unwrap();
/// format.set_enclosure("").unwrap();
///
/// assert_eq!(format.delimiter(), b';');
/// assert_eq!(format.enclosure(), None);
/// assert!(format.set_delimiter("").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvFormat {
    delimiter: u8,
    enclosure: Option<u8>,
    escape: Option<u8>,
}

impl Default for CsvFormat {
    fn default() -> Self {
        Self {
            delimiter: b',',
            enclosure: Some(b'"'),
            escape: None,
        }
    }
}

impl CsvFormat {
    /// Builds a format from raw settings, validating each in turn.
    pub fn new(delimiter: &str, enclosure: &str, escape: &str) -> Result<Self> {
        let mut format = Self::default();
        format.set_delimiter(delimiter)?;
        format.set_enclosure(enclosure)?;
        format.set_escape(escape)?;
        Ok(format)
    }

    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }

    pub fn enclosure(&self) -> Option<u8> {
        self.enclosure
    }

    pub fn escape(&self) -> Option<u8> {
        self.escape
    }

    /// Sets the delimiter; it must be exactly one byte.
    pub fn set_delimiter(&mut self, delimiter: &str) -> Result<()> {
        self.delimiter = validate_delimiter(delimiter)?;
        Ok(())
    }

    /// Sets the enclosure; empty disables quoting, longer than one byte fails.
    pub fn set_enclosure(&mut self, enclosure: &str) -> Result<()> {
        self.enclosure = validate_optional("Enclosure", enclosure)?;
        Ok(())
    }

    /// Sets the escape character; empty means none.
    pub fn set_escape(&mut self, escape: &str) -> Result<()> {
        self.escape = validate_optional("Escape character", escape)?;
        Ok(())
    }

    /// Field decoder configured for these rules. Doubled enclosures are
    /// always unescaped; the escape character, if any, is honoured as well.
    /// Only `\n` ends a record, so a lone `\r` stays field data.
    pub(crate) fn reader_builder(&self) -> ReaderBuilder {
        let mut builder = ReaderBuilder::new();
        builder
            .trim(Trim::None)
            .delimiter(self.delimiter)
            .quote(self.enclosure.unwrap_or(b'"'))
            .quoting(self.enclosure.is_some())
            .double_quote(true)
            .escape(self.escape)
            .terminator(Terminator::Any(b'\n'))
            .has_headers(false)
            .flexible(true); // rows may differ in width
        builder
    }
}

fn validate_delimiter(delimiter: &str) -> Result<u8> {
    match delimiter.as_bytes() {
        [] => Err(CsvError::InvalidConfig("Delimiter cannot be empty.".to_string())),
        [byte] => Ok(*byte),
        _ => Err(CsvError::InvalidConfig(format!(
            "Delimiter must be a single character. {:?} received",
            delimiter
        ))),
    }
}

fn validate_optional(name: &str, value: &str) -> Result<Option<u8>> {
    match value.as_bytes() {
        [] => Ok(None),
        [byte] => Ok(Some(*byte)),
        _ => Err(CsvError::InvalidConfig(format!(
            "{} must be a single character. {:?} received",
            name, value
        ))),
    }
}

/// Renders an optional setting back to its configured text form.
pub(crate) fn byte_to_text(byte: Option<u8>) -> String {
    byte.map(|b| char::from(b).to_string()).unwrap_or_default()
}
