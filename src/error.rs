use std::{io, path::PathBuf};

use thiserror::Error;

/// Legacy numeric class for a missing or unopenable file.
pub const FILE_NOT_EXISTS: u8 = 1;
/// Legacy numeric class for invalid parameters (format, line break).
pub const INVALID_PARAM: u8 = 2;
/// Legacy numeric class for write failures.
pub const WRITE_ERROR: u8 = 3;

#[derive(Error, Debug)]
/// Errors raised by CSV readers, writers and helpers.
pub enum CsvError {
    /// Delimiter, enclosure or escape character is not a single byte.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Target path is missing, is a directory, or cannot be opened.
    #[error("cannot open file {path}: {reason}")]
    FileNotFound { path: PathBuf, reason: String },

    /// Line-break style outside the set supported by the operation.
    #[error("invalid line break \"{line_break}\"")]
    InvalidLineBreak { line_break: String },

    #[error("cannot write to CSV: {0}")]
    Write(#[from] WriteError),

    /// Raised by the static helpers.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Malformed input or an I/O failure while decoding a row.
    #[error("cannot read CSV row: {0}")]
    Read(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}

#[derive(Error, Debug)]
pub enum WriteError {
    /// A field cannot be rendered as text (arrays, maps).
    #[error("cannot write data into column {column}: {value}")]
    UnsupportedField { column: usize, value: String },

    /// The row itself does not serialize to a sequence of fields.
    #[error("row must be a sequence of fields, got {0}")]
    NotARow(String),

    /// The sink accepted fewer bytes than the encoded row.
    #[error("to write: {expected} written: {written}")]
    Incomplete { expected: usize, written: usize },

    #[error("cannot encode row: {0}")]
    Encode(String),

    #[error(transparent)]
    Io(io::Error),
}

impl CsvError {
    /// Numeric error class, `0` when the variant has no legacy counterpart.
    pub fn code(&self) -> u8 {
        match self {
            CsvError::FileNotFound { .. } => FILE_NOT_EXISTS,
            CsvError::InvalidConfig(_) | CsvError::InvalidLineBreak { .. } => INVALID_PARAM,
            CsvError::Write(_) => WRITE_ERROR,
            CsvError::Validation(_) | CsvError::Read(_) | CsvError::Io(_) => 0,
        }
    }

    pub(crate) fn file_not_found(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        CsvError::FileNotFound {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, CsvError>;
