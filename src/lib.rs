#![cfg_attr(docsrs, feature(doc_cfg))]

/*!
 # CSV streaming reader and writer

 Row-at-a-time access to delimited text files, with configurable delimiter,
 enclosure and escape characters and line-break handling for `\r\n`, `\n`
 and `\r` files.

 ## Components

- **CsvReader:** Opens a file, detects its line-break style, captures the
  header row and iterates over the data rows. Iteration can be restarted
  with `rewind`.
- **CsvWriter:** Encodes rows of scalar values, enclosing every field and
  doubling embedded enclosures, and appends the configured line break.
- **Helpers:** `csv_to_array`, `get_csv_header_fields` and `array_to_csv`
  for one-shot reads and writes.

 ## Getting Started

```rust
# use csv_stream::{CsvReaderBuilder, CsvWriterBuilder, CsvError};
# fn main() -> Result<(), CsvError> {
let dir = tempfile::tempdir()?;
let path = dir.path().join("people.csv");

let mut writer = CsvWriterBuilder::new()
    .delimiter(";")
    .line_break("\n")
    .from_path(&path)?;
writer.write_row(&["name", "age"])?;
writer.write_row(&("Alice", 30))?;
writer.write_row(&("Bob; Jr.", 40))?;
drop(writer);

let mut reader = CsvReaderBuilder::new().delimiter(";").from_path(&path)?;
assert_eq!(reader.header(), ["name", "age"]);

while reader.valid() {
    println!("{}: {:?}", reader.key(), reader.current());
    reader.advance()?;
}

reader.rewind()?;
assert_eq!(reader.current().unwrap(), ["Alice", "30"]);
# Ok(())
# }
```

 ## Errors

 Every fallible operation returns [`CsvError`]. `csv_to_array` is the only
 lenient entry point: filesystem problems give an empty result instead of
 an error.

 ## License
 Licensed under either of

 -   Apache License, Version 2.0
     ([LICENSE-APACHE](LICENSE-APACHE) or <http://www.apache.org/licenses/LICENSE-2.0>)
 -   MIT license
     ([LICENSE-MIT](LICENSE-MIT) or <http://opensource.org/licenses/MIT>)

 at your option.
 */

/// Streaming CSV reader and writer
pub mod csv_file;

/// Error types for CSV operations
pub mod error;

/// One-shot CSV helpers
pub mod helper;

#[doc(inline)]
pub use error::*;

pub use csv_file::{
    csv_reader::{CsvReader, CsvReaderBuilder},
    csv_writer::{CsvWriter, CsvWriterBuilder},
    format::CsvFormat,
    line_break::{LineBreak, detect_line_break},
};
pub use helper::{array_to_csv, csv_to_array, get_csv_header_fields};
