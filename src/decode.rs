//! Reader for the text log written by [`crate::flush`].

use std::io::BufRead;
use std::num::ParseIntError;

use thiserror::Error;

use crate::event::EventKind;
use crate::record::MAX_VALUES;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("line {line}: empty record")]
    Empty { line: usize },

    #[error("line {line}: bad hex field {field:?}: {source}")]
    BadHex {
        line: usize,
        field: String,
        #[source]
        source: ParseIntError,
    },

    #[error("line {line}: malformed event kind {kind:?}")]
    BadKind { line: usize, kind: String },

    #[error("line {line}: {count} values, at most {max} allowed", max = MAX_VALUES)]
    TooManyValues { line: usize, count: usize },

    #[error("failed to read trace log: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TraceLine {
    /// nanoseconds since session start
    pub time: u64,
    pub kind: EventKind,
    pub values: Vec<u64>,
}

fn hex(line: usize, field: &str) -> Result<u64, DecodeError> {
    u64::from_str_radix(field, 16).map_err(|source| DecodeError::BadHex {
        line,
        field: field.to_string(),
        source,
    })
}

/// Parses a single log line (without its trailing newline). `line` is only
/// used for error messages.
pub fn parse_line(line: usize, text: &str) -> Result<TraceLine, DecodeError> {
    let mut fields = text.split('\t');
    let time = match fields.next() {
        Some(f) if !f.is_empty() => hex(line, f)?,
        _ => return Err(DecodeError::Empty { line }),
    };
    let kind = fields.next().unwrap_or_default();
    let kind = kind.parse::<EventKind>().map_err(|_| DecodeError::BadKind {
        line,
        kind: kind.to_string(),
    })?;
    let values = fields.map(|f| hex(line, f)).collect::<Result<Vec<_>, _>>()?;
    if values.len() > MAX_VALUES {
        return Err(DecodeError::TooManyValues {
            line,
            count: values.len(),
        });
    }
    Ok(TraceLine { time, kind, values })
}

/// Decodes a whole log. Line numbers in errors start at 1.
pub fn read_log(reader: impl BufRead) -> impl Iterator<Item = Result<TraceLine, DecodeError>> {
    reader.lines().enumerate().map(|(i, line)| {
        let line_no = i + 1;
        parse_line(line_no, line?.trim_end_matches('\r'))
    })
}
