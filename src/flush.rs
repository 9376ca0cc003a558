use std::io::{Result, Write};

use crate::record::{Record, TraceBuffer};

/// Writes one record as a line of the text log:
///
/// hex_time\tevent_char[\thex_value]*\n
///
/// The value count stored in the record decides how many columns follow.
pub fn write_record(writer: &mut impl Write, record: &Record) -> Result<()> {
    write!(writer, "{:x}\t{}", record.time, record.event as char)?;
    for value in record.values() {
        write!(writer, "\t{:x}", value)?;
    }
    writer.write_all(b"\n")
}

/// Writes every buffered record in append order, returning how many lines
/// were written. Stops at the first write error, so the output may end
/// partway through the buffer.
pub fn write_records_text(writer: &mut impl Write, buffer: &TraceBuffer) -> Result<usize> {
    let mut written = 0;
    for record in buffer.records() {
        write_record(writer, &record)?;
        written += 1;
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventKind;

    #[test]
    fn lines_follow_the_log_format() {
        let mut buf = TraceBuffer::with_capacity(1024).unwrap();
        buf.push(0x10, EventKind::ReadIoStart, &[0x2a]);
        buf.push(0x1f, EventKind::ReadIoFinish, &[0x2a, 0xdeadbeef]);
        buf.push(0x20, EventKind::BucketScan, &[]);

        let mut out = Vec::new();
        assert_eq!(write_records_text(&mut out, &buf).unwrap(), 3);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "10\tr\t2a\n1f\tR\t2a\tdeadbeef\n20\tS\n"
        );
    }

    #[test]
    fn empty_buffer_writes_nothing() {
        let buf = TraceBuffer::with_capacity(1024).unwrap();
        let mut out = Vec::new();
        assert_eq!(write_records_text(&mut out, &buf).unwrap(), 0);
        assert!(out.is_empty());
    }

    #[test]
    fn write_error_stops_partway() {
        let mut buf = TraceBuffer::with_capacity(1024).unwrap();
        for i in 0..8 {
            buf.push(i, EventKind::WriteIoStart, &[i, i]);
        }
        // room for a handful of bytes only
        let mut storage = [0u8; 12];
        let mut out = &mut storage[..];
        assert!(write_records_text(&mut out, &buf).is_err());
    }
}
