use std::fmt;
use std::str::FromStr;

use crate::error::TraceError;

/// Which feature flag guards an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Subsystem {
    Io,
    Bucket,
}

/// Single-byte tags written into each record and printed as the second column
/// of the log. Downstream decoders depend on these exact characters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum EventKind {
    ReadIoStart = b'r',
    ReadIoFinish = b'R',
    WriteIoStart = b'w',
    WriteIoFinish = b'W',
    BucketCreate = b'C',
    BucketScan = b'S',
}

impl EventKind {
    pub const ALL: [EventKind; 6] = [
        EventKind::ReadIoStart,
        EventKind::ReadIoFinish,
        EventKind::WriteIoStart,
        EventKind::WriteIoFinish,
        EventKind::BucketCreate,
        EventKind::BucketScan,
    ];

    #[inline(always)]
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn as_char(self) -> char {
        self.code() as char
    }

    pub fn subsystem(self) -> Subsystem {
        match self {
            EventKind::ReadIoStart
            | EventKind::ReadIoFinish
            | EventKind::WriteIoStart
            | EventKind::WriteIoFinish => Subsystem::Io,
            EventKind::BucketCreate | EventKind::BucketScan => Subsystem::Bucket,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            EventKind::ReadIoStart => "read-start",
            EventKind::ReadIoFinish => "read-finish",
            EventKind::WriteIoStart => "write-start",
            EventKind::WriteIoFinish => "write-finish",
            EventKind::BucketCreate => "bucket-create",
            EventKind::BucketScan => "bucket-scan",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u8> for EventKind {
    type Error = TraceError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        EventKind::ALL
            .into_iter()
            .find(|kind| kind.code() == code)
            .ok_or_else(|| TraceError::MalformedEventKind(format!("{:#04x}", code)))
    }
}

impl TryFrom<char> for EventKind {
    type Error = TraceError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        u8::try_from(c)
            .ok()
            .and_then(|code| EventKind::try_from(code).ok())
            .ok_or_else(|| TraceError::MalformedEventKind(c.to_string()))
    }
}

/// Accepts exactly one character. `"C"` parses, `"CS"` does not.
impl FromStr for EventKind {
    type Err = TraceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => EventKind::try_from(c),
            _ => Err(TraceError::MalformedEventKind(s.to_string())),
        }
    }
}
