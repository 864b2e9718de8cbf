use std::{fmt, str::FromStr};

use csv::Terminator;

use crate::error::{CsvError, Result};

/// Number of leading bytes inspected when detecting the line-break style.
pub const DETECTION_SAMPLE_SIZE: usize = 10_000;

/// Record terminator style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LineBreak {
    /// Windows `\r\n`.
    #[default]
    Crlf,
    /// Unix `\n`.
    Lf,
    /// Classic Mac `\r`.
    Cr,
}

impl LineBreak {
    /// Every style, in detection priority order.
    pub const ALL: [LineBreak; 3] = [LineBreak::Crlf, LineBreak::Cr, LineBreak::Lf];

    pub fn as_str(&self) -> &'static str {
        match self {
            LineBreak::Crlf => "\r\n",
            LineBreak::Lf => "\n",
            LineBreak::Cr => "\r",
        }
    }

    pub fn as_bytes(&self) -> &'static [u8] {
        self.as_str().as_bytes()
    }

    /// Escaped display form, e.g. the four characters `\r\n`.
    pub fn as_escaped(&self) -> &'static str {
        match self {
            LineBreak::Crlf => "\\r\\n",
            LineBreak::Lf => "\\n",
            LineBreak::Cr => "\\r",
        }
    }

    /// Whether rows terminated by this style can be parsed by a reader.
    pub fn is_readable(&self) -> bool {
        matches!(self, LineBreak::Crlf | LineBreak::Lf)
    }

    /// Fails with `InvalidLineBreak` unless this style is readable.
    pub fn ensure_readable(&self) -> Result<()> {
        if self.is_readable() {
            Ok(())
        } else {
            Err(CsvError::InvalidLineBreak {
                line_break: self.as_escaped().to_string(),
            })
        }
    }

    /// Terminator written after each encoded record.
    pub(crate) fn terminator(&self) -> Terminator {
        match self {
            LineBreak::Crlf => Terminator::CRLF,
            LineBreak::Lf => Terminator::Any(b'\n'),
            LineBreak::Cr => Terminator::Any(b'\r'),
        }
    }
}

impl fmt::Display for LineBreak {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_escaped())
    }
}

impl FromStr for LineBreak {
    type Err = CsvError;

    /// Parses the literal terminator bytes (`"\r\n"`, `"\n"`, `"\r"`).
    fn from_str(s: &str) -> Result<Self> {
        LineBreak::ALL
            .into_iter()
            .find(|lb| lb.as_str() == s)
            .ok_or_else(|| CsvError::InvalidLineBreak {
                line_break: escape_text(s),
            })
    }
}

/// Detects the line-break style of a sample.
///
/// The style whose marker appears first wins; at equal offsets `\r\n` beats
/// `\r`, which beats `\n`. A sample without any marker defaults to `\n`.
///
/// # Examples
///
/// ```
/// use csv_stream::{LineBreak, detect_line_break};
///
/// assert_eq!(detect_line_break(b"a,b\r\nc,d\r\n"), LineBreak::Crlf);
/// assert_eq!(detect_line_break(b"a,b\nc,d\n"), LineBreak::Lf);
/// assert_eq!(detect_line_break(b"a,b\rc,d\r"), LineBreak::Cr);
/// assert_eq!(detect_line_break(b"a,b"), LineBreak::Lf);
/// ```
pub fn detect_line_break(sample: &[u8]) -> LineBreak {
    let sample = &sample[..sample.len().min(DETECTION_SAMPLE_SIZE)];

    LineBreak::ALL
        .into_iter()
        .filter_map(|lb| find(sample, lb.as_bytes()).map(|pos| (pos, lb)))
        // min_by_key keeps the first minimum, so ALL's order breaks ties
        .min_by_key(|(pos, _)| *pos)
        .map(|(_, lb)| lb)
        .unwrap_or(LineBreak::Lf)
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Escapes control characters the way a JSON string literal would.
pub(crate) fn escape_text(s: &str) -> String {
    let quoted = serde_json::Value::String(s.to_string()).to_string();
    quoted.trim_matches('"').to_string()
}
