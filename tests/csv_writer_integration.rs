mod common;

use std::{fs, io};

use common::mocks::MockSink;
use csv_stream::{CsvError, CsvReaderBuilder, CsvWriterBuilder, LineBreak, Result, WriteError};
use serde_json::json;
use tempfile::TempDir;

#[test]
fn written_rows_read_back_unchanged() -> Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();

    let dir = TempDir::new()?;
    let configs = [(",", "\"", "\r\n"), (";", "'", "\n"), ("\t", "\"", "\n")];

    for (index, (delimiter, enclosure, line_break)) in configs.into_iter().enumerate() {
        let path = dir.path().join(format!("round_trip_{}.csv", index));
        let embedded_break = format!("first{}second", line_break);
        let rows = vec![
            json!(["plain", "delimiter", "enclosure", format!("line{}break", line_break), "empty", "null"]),
            json!([
                "plain text",
                format!("a{}b", delimiter),
                format!("say {}hi{}", enclosure, enclosure),
                embedded_break,
                "",
                null
            ]),
            json!(["x", 1, 2.5, "y", "", "z"]),
            json!([]),
            json!(["a\rb", 3.0, "", "", "", ""]),
        ];

        let mut writer = CsvWriterBuilder::new()
            .delimiter(delimiter)
            .enclosure(enclosure)
            .line_break(line_break)
            .from_path(&path)?;
        for row in &rows {
            writer.write_row(row)?;
        }
        writer.flush()?;
        drop(writer);

        let reader = CsvReaderBuilder::new()
            .delimiter(delimiter)
            .enclosure(enclosure)
            .from_path(&path)?;
        assert_eq!(reader.line_break().as_str(), line_break);
        assert_eq!(
            reader.header(),
            [
                "plain".to_string(),
                "delimiter".to_string(),
                "enclosure".to_string(),
                format!("line{}break", line_break),
                "empty".to_string(),
                "null".to_string(),
            ]
        );

        let read = reader.collect::<Result<Vec<_>>>()?;
        assert_eq!(read.len(), 4);
        assert_eq!(
            read[0],
            [
                "plain text".to_string(),
                format!("a{}b", delimiter),
                format!("say {}hi{}", enclosure, enclosure),
                format!("first{}second", line_break),
                String::new(),
                String::new(),
            ]
        );
        assert_eq!(read[1], ["x", "1", "2.5", "y", "", "z"]);
        // an empty row is a bare line break and reads back as one empty field
        assert_eq!(read[2], [""]);
        assert_eq!(read[3], ["a\rb", "3", "", "", "", ""]);
    }

    Ok(())
}

#[test]
fn header_with_embedded_newline_reads_back_with_default_writer() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("people.csv");

    let mut writer = CsvWriterBuilder::new().from_path(&path)?;
    writer.write_row(&["first\nname", "age"])?;
    writer.write_row(&["Alice", "30"])?;
    writer.write_row(&["Bob", "40"])?;
    drop(writer);

    let mut reader = CsvReaderBuilder::new().from_path(&path)?;
    assert_eq!(reader.header(), ["first\nname", "age"]);
    assert_eq!(reader.next().unwrap()?, ["Alice", "30"]);
    assert_eq!(reader.next().unwrap()?, ["Bob", "40"]);
    assert!(reader.next().is_none());

    Ok(())
}

#[test]
fn blank_lines_in_written_files_are_counted() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("blank.csv");

    let mut writer = CsvWriterBuilder::new()
        .enclosure("")
        .line_break("\n")
        .from_path(&path)?;
    for row in [json!(["h"]), json!([""]), json!(["skipme"]), json!(["1"]), json!([]), json!(["2"])] {
        writer.write_row(&row)?;
    }
    drop(writer);
    assert_eq!(fs::read_to_string(&path)?, "h\n\nskipme\n1\n\n2\n");

    let mut reader = CsvReaderBuilder::new()
        .enclosure("")
        .skip_lines(1)
        .from_path(&path)?;
    assert_eq!(reader.current().unwrap(), ["skipme"]);
    reader.advance()?;
    reader.advance()?;
    assert_eq!(reader.key(), 2);
    assert_eq!(reader.current().unwrap(), [""]);
    reader.advance()?;
    assert_eq!(reader.current().unwrap(), ["2"]);

    Ok(())
}

#[test]
fn rejected_row_leaves_file_untouched() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("partial.csv");

    let mut writer = CsvWriterBuilder::new().line_break("\n").from_path(&path)?;
    writer.write_row(&["ok", "row"])?;

    let err = writer
        .write_row(&json!(["before", ["not", "scalar"], "after"]))
        .unwrap_err();
    assert!(matches!(
        err,
        CsvError::Write(WriteError::UnsupportedField { column: 1, .. })
    ));
    drop(writer);

    assert_eq!(fs::read_to_string(&path)?, "\"ok\",\"row\"\n");
    Ok(())
}

#[test]
fn existing_file_is_truncated() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("truncate.csv");
    fs::write(&path, "old content that is longer than the new one\n")?;

    let mut writer = CsvWriterBuilder::new().line_break("\r").from_path(&path)?;
    assert_eq!(writer.line_break(), LineBreak::Cr);
    writer.write_row(&["new"])?;
    drop(writer);

    assert_eq!(fs::read_to_string(&path)?, "\"new\"\r");
    Ok(())
}

#[test]
fn unopenable_path_is_not_found() -> Result<()> {
    let dir = TempDir::new()?;
    let err = CsvWriterBuilder::new().from_path(dir.path()).unwrap_err();
    assert!(matches!(err, CsvError::FileNotFound { .. }));
    Ok(())
}

#[test]
fn zero_byte_write_reports_expected_and_written() -> Result<()> {
    let mut sink = MockSink::new();
    sink.expect_write().times(1).returning(|_| Ok(0));

    let mut writer = CsvWriterBuilder::new().from_writer(sink)?;
    let err = writer.write_row(&["abc"]).unwrap_err();

    match err {
        CsvError::Write(WriteError::Incomplete { expected, written }) => {
            assert_eq!(expected, "\"abc\"\r\n".len());
            assert_eq!(written, 0);
        }
        other => panic!("unexpected error: {}", other),
    }
    Ok(())
}

#[test]
fn short_writes_are_resumed() -> Result<()> {
    let mut sink = MockSink::new();
    sink.expect_write()
        .times(3)
        .returning(|buf| Ok(buf.len().min(3)));

    let mut writer = CsvWriterBuilder::new().line_break("\n").from_writer(sink)?;
    // 5 bytes, written in chunks of 3 and 2
    writer.write_row(&["ab"])?;
    // rejected before reaching the sink
    let err = writer.write_row(&[json!({})]).unwrap_err();
    assert!(matches!(err, CsvError::Write(WriteError::UnsupportedField { .. })));
    // 3 bytes, one call
    writer.write_row(&[""])?;
    Ok(())
}

#[test]
fn sink_error_is_a_write_error() -> Result<()> {
    let mut sink = MockSink::new();
    sink.expect_write()
        .times(1)
        .returning(|_| Err(io::Error::other("disk full")));

    let mut writer = CsvWriterBuilder::new().from_writer(sink)?;
    let err = writer.write_row(&["abc"]).unwrap_err();

    assert!(matches!(err, CsvError::Write(WriteError::Io(_))));
    assert_eq!(err.code(), csv_stream::WRITE_ERROR);
    Ok(())
}

#[test]
fn flush_is_forwarded_to_the_sink() -> Result<()> {
    let mut sink = MockSink::new();
    sink.expect_flush().times(1).returning(|| Ok(()));

    let mut writer = CsvWriterBuilder::new().from_writer(sink)?;
    writer.flush()?;
    Ok(())
}
