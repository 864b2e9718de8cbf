//! Streaming CSV file access.
//!
//! This module provides a reader and a writer that each own one open
//! stream for their lifetime, plus the shared formatting rules they are
//! configured with.
//!
//! # Module Architecture
//!
//! 1. **CsvFormat**: validated delimiter, enclosure and escape bytes.
//!
//! 2. **LineBreak**: the three record terminator styles and their
//!    detection from a file sample.
//!
//! 3. **CsvReader**: a restartable cursor over the data rows of a file whose
//!    first record is a header. Only `\r\n` and `\n` files are readable.
//!    Records are split line by line, honouring enclosed line breaks, and
//!    each one is decoded by the `csv` crate.
//!
//! 4. **CsvWriter**: encodes rows with every field enclosed and writes them
//!    with any of the three line-break styles.
//!
//! Readers and writers are configured through builders and validate their
//! settings when built.
//!
//! # Examples
//!
//! ```
//! use csv_stream::{CsvReaderBuilder, CsvWriterBuilder};
//! use tempfile::NamedTempFile;
//!
//! let file = NamedTempFile::new().unwrap();
//!
//! let mut writer = CsvWriterBuilder::new().from_path(file.path()).unwrap();
//! writer.write_row(&["city", "pop"]).unwrap();
//! writer.write_row(&("Boston", 4628910)).unwrap();
//! writer.write_row(&("Concord", 42695)).unwrap();
//! drop(writer);
//!
//! let reader = CsvReaderBuilder::new().from_path(file.path()).unwrap();
//! assert_eq!(reader.header(), ["city", "pop"]);
//!
//! let cities: Vec<Vec<String>> = reader.collect::<Result<_, _>>().unwrap();
//! assert_eq!(cities, vec![vec!["Boston", "4628910"], vec!["Concord", "42695"]]);
//! ```

pub mod csv_reader;
pub mod csv_writer;
pub mod format;
pub mod line_break;
pub(crate) mod record;
