//! One-shot CSV helpers for callers that do not need a streaming reader or
//! writer.
//!
//! These helpers keep the behaviour of the legacy static functions they
//! replace: [`csv_to_array`] is lenient and returns whatever it could read,
//! while [`get_csv_header_fields`] and [`array_to_csv`] report problems as
//! [`CsvError::Validation`].

use std::{fs::File, io::Write, path::Path};

use log::{debug, warn};

use crate::{
    csv_file::{format::CsvFormat, record::RecordReader},
    error::{CsvError, Result},
};

#[cfg(windows)]
const NEWLINE: &str = "\r\n";
#[cfg(not(windows))]
const NEWLINE: &str = "\n";

/// Reads every row of `path`, optionally dropping the first one.
///
/// Records are split as in [`CsvReader`](crate::CsvReader), so a blank line
/// is a row with one empty field. An empty `delimiter` falls back to a comma.
/// A missing or unreadable file yields an empty result, and a decoding
/// problem part-way through yields the rows read before it; both are logged
/// as warnings.
///
/// # Errors
///
/// Only [`CsvError::InvalidConfig`], for a delimiter, enclosure or escape
/// longer than one byte.
///
/// # Examples
///
/// ```
/// use csv_stream::csv_to_array;
///
/// let rows = csv_to_array("does/not/exist.csv", ",", "\"", "\\", true).unwrap();
/// assert!(rows.is_empty());
/// ```
pub fn csv_to_array<P: AsRef<Path>>(
    path: P,
    delimiter: &str,
    enclosure: &str,
    escape: &str,
    skip_first_line: bool,
) -> Result<Vec<Vec<String>>> {
    let path = path.as_ref();
    let delimiter = if delimiter.is_empty() { "," } else { delimiter };
    let format = CsvFormat::new(delimiter, enclosure, escape)?;

    let file = match File::open(path) {
        Ok(file) => file,
        Err(error) => {
            warn!("Cannot read CSV file {}: {}", path.display(), error);
            return Ok(Vec::new());
        }
    };

    let mut reader = RecordReader::new(file, format);
    let mut rows = Vec::new();
    let mut skip = skip_first_line;

    loop {
        match reader.read_record() {
            Ok(Some(_)) if skip => skip = false,
            Ok(Some(row)) => rows.push(row),
            Ok(None) => break,
            Err(error) => {
                warn!(
                    "Stopped reading CSV file {} after {} rows: {}",
                    path.display(),
                    rows.len(),
                    error
                );
                break;
            }
        }
    }

    debug!("Read {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Returns the decoded first row of `path`, or an empty vector for an empty
/// file.
///
/// # Errors
///
/// - [`CsvError::InvalidConfig`] for an invalid delimiter, enclosure or escape
/// - [`CsvError::Validation`] if the file does not exist, is a directory or
///   cannot be opened
pub fn get_csv_header_fields<P: AsRef<Path>>(
    path: P,
    delimiter: &str,
    enclosure: &str,
    escape: &str,
) -> Result<Vec<String>> {
    let path = path.as_ref();
    let format = CsvFormat::new(delimiter, enclosure, escape)?;

    let file = if path.is_file() {
        File::open(path).ok()
    } else {
        None
    };
    let file = file.ok_or_else(|| {
        CsvError::Validation(format!(
            "File {} does either not exist, is a folder or is not readable",
            path.display()
        ))
    })?;

    let mut reader = RecordReader::new(file, format);
    Ok(reader.read_record()?.unwrap_or_default())
}

/// Writes `rows` to `path` in a single call and returns the number of bytes
/// written.
///
/// Values are joined with `delimiter` without any escaping. A non-empty
/// `enclosure` is put around each value as is. Rows end with the platform
/// newline.
///
/// # Errors
///
/// - [`CsvError::FileNotFound`] if `path` cannot be created
/// - [`CsvError::Validation`] if the write fails or writes nothing, which
///   includes an empty `rows` slice
///
/// # Examples
///
/// ```no_run
/// use csv_stream::array_to_csv;
///
/// let rows = vec![vec!["id", "name"], vec!["1", "Alice"]];
/// let written = array_to_csv("export.csv", &rows, ";", "").unwrap();
/// assert_eq!(written, "id;name\n1;Alice\n".len());
/// ```
pub fn array_to_csv<P, R, S>(path: P, rows: &[R], delimiter: &str, enclosure: &str) -> Result<usize>
where
    P: AsRef<Path>,
    R: AsRef<[S]>,
    S: AsRef<str>,
{
    let path = path.as_ref();

    let mut buffer = String::new();
    for row in rows {
        let line = row
            .as_ref()
            .iter()
            .map(|value| format!("{}{}{}", enclosure, value.as_ref(), enclosure))
            .collect::<Vec<_>>()
            .join(delimiter);
        buffer.push_str(&line);
        buffer.push_str(NEWLINE);
    }

    let mut file = File::create(path).map_err(|e| CsvError::file_not_found(path, e))?;

    match file.write(buffer.as_bytes()) {
        Ok(0) => Err(CsvError::Validation(format!(
            "Nothing written to {}",
            path.display()
        ))),
        Ok(written) => {
            debug!("Wrote {} bytes to {}", written, path.display());
            Ok(written)
        }
        Err(error) => Err(CsvError::Validation(format!(
            "Cannot write to {}: {}",
            path.display(),
            error
        ))),
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn fixture(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn csv_to_array_skips_first_line() -> Result<()> {
        let dir = TempDir::new()?;
        let path = fixture(&dir, "data.csv", "h1,h2\na,b\n\"c,d\",e\n");

        let rows = csv_to_array(&path, ",", "\"", "\\", true)?;
        assert_eq!(rows, vec![vec!["a", "b"], vec!["c,d", "e"]]);

        let all = csv_to_array(&path, ",", "\"", "\\", false)?;
        assert_eq!(all.len(), 3);
        assert_eq!(all[0], ["h1", "h2"]);
        Ok(())
    }

    #[test]
    fn csv_to_array_defaults_empty_delimiter_to_comma() -> Result<()> {
        let dir = TempDir::new()?;
        let path = fixture(&dir, "data.csv", "a,b\r\n1,2\r\n");

        let rows = csv_to_array(&path, "", "\"", "", true)?;
        assert_eq!(rows, vec![vec!["1", "2"]]);
        Ok(())
    }

    #[test]
    fn csv_to_array_keeps_blank_lines_and_lone_carriage_returns() -> Result<()> {
        let dir = TempDir::new()?;
        let path = fixture(&dir, "data.csv", "h\r\na\rb,c\r\n\r\nd\r\n");

        let rows = csv_to_array(&path, ",", "\"", "", true)?;
        assert_eq!(rows, vec![vec!["a\rb", "c"], vec![""], vec!["d"]]);
        Ok(())
    }

    #[test]
    fn csv_to_array_is_lenient_on_missing_file() -> Result<()> {
        let dir = TempDir::new()?;
        let rows = csv_to_array(dir.path().join("missing.csv"), ";", "\"", "\\", true)?;
        assert!(rows.is_empty());

        // a directory cannot be read either
        let rows = csv_to_array(dir.path(), ";", "\"", "\\", false)?;
        assert!(rows.is_empty());
        Ok(())
    }

    #[test]
    fn csv_to_array_rejects_invalid_delimiter() {
        let err = csv_to_array("whatever.csv", ";;", "\"", "", true).unwrap_err();
        assert!(matches!(err, CsvError::InvalidConfig(_)));
    }

    #[test]
    fn header_fields_are_first_row_only() -> Result<()> {
        let dir = TempDir::new()?;
        let single = fixture(&dir, "one.csv", "id\n1\n");
        let pair = fixture(&dir, "two.csv", "id;name\n1;Alice\n");
        let many = fixture(&dir, "many.csv", "\"a\",\"b\",\"c\",\"d\"\r\n1,2,3,4\r\n");

        assert_eq!(get_csv_header_fields(&single, ",", "\"", "")?, ["id"]);
        assert_eq!(get_csv_header_fields(&pair, ";", "\"", "")?, ["id", "name"]);
        assert_eq!(
            get_csv_header_fields(&many, ",", "\"", "")?,
            ["a", "b", "c", "d"]
        );
        Ok(())
    }

    #[test]
    fn header_fields_of_empty_file_are_empty() -> Result<()> {
        let dir = TempDir::new()?;
        let path = fixture(&dir, "empty.csv", "");
        assert!(get_csv_header_fields(&path, ",", "\"", "")?.is_empty());
        Ok(())
    }

    #[test]
    fn header_fields_fail_for_missing_file_and_directory() -> Result<()> {
        let dir = TempDir::new()?;

        let err = get_csv_header_fields(dir.path().join("missing.csv"), ",", "\"", "").unwrap_err();
        assert!(matches!(err, CsvError::Validation(_)));

        let err = get_csv_header_fields(dir.path(), ",", "\"", "").unwrap_err();
        assert!(matches!(err, CsvError::Validation(_)));
        Ok(())
    }

    #[test]
    fn array_to_csv_joins_without_escaping() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("out.csv");
        let rows = vec![vec!["id", "name"], vec!["1", "O\"Neil"]];

        let written = array_to_csv(&path, &rows, ";", "")?;

        let expected = format!("id;name{0}1;O\"Neil{0}", NEWLINE);
        assert_eq!(written, expected.len());
        assert_eq!(fs::read_to_string(&path)?, expected);
        Ok(())
    }

    #[test]
    fn array_to_csv_wraps_with_enclosure_verbatim() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("out.csv");
        let rows = [["a", "b\"c"]];

        array_to_csv(&path, &rows, ",", "\"")?;

        assert_eq!(fs::read_to_string(&path)?, format!("\"a\",\"b\"c\"{}", NEWLINE));
        Ok(())
    }

    #[test]
    fn array_to_csv_fails_when_nothing_is_written() -> Result<()> {
        let dir = TempDir::new()?;
        let rows: Vec<Vec<String>> = Vec::new();

        let err = array_to_csv(dir.path().join("out.csv"), &rows, ";", "").unwrap_err();
        assert!(matches!(err, CsvError::Validation(_)));
        Ok(())
    }

    #[test]
    fn array_to_csv_fails_for_unwritable_path() -> Result<()> {
        let dir = TempDir::new()?;
        let rows = [["x"]];

        let err = array_to_csv(dir.path(), &rows, ";", "").unwrap_err();
        assert!(matches!(err, CsvError::FileNotFound { .. }));
        Ok(())
    }
}
