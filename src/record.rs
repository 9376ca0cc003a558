//! In-memory record arena.
//!
//! Records are packed back to back with no delimiters:
//!
//! time: u64 (nanoseconds since session start)
//! event: u8
//! padding: [u8; 3]
//! nvalues: u32
//! values: nvalues * u64
//!
//! All integers are native endian. The buffer is never written to disk in this
//! form, only as the text produced by [`crate::flush`].

use bytemuck::{Pod, Zeroable};

use crate::error::{Result, TraceError};
use crate::event::EventKind;

/// most auxiliary values a single record can carry
pub const MAX_VALUES: usize = 5;

pub const HEADER_SIZE: usize = std::mem::size_of::<RecordHeader>();

pub const MAX_RECORD_SIZE: usize = record_size(MAX_VALUES);

/// 1 GiB
pub const DEFAULT_CAPACITY: usize = 1 << 30;

#[inline(always)]
pub const fn record_size(nvalues: usize) -> usize {
    HEADER_SIZE + nvalues * std::mem::size_of::<u64>()
}

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Pod, Zeroable)]
pub struct RecordHeader {
    pub time: u64,
    pub event: u8,
    _pad: [u8; 3],
    pub nvalues: u32,
}

impl RecordHeader {
    pub fn new(time: u64, event: EventKind, nvalues: usize) -> Self {
        RecordHeader {
            time,
            event: event.code(),
            _pad: [0; 3],
            nvalues: nvalues as u32,
        }
    }
}

/// One decoded record, copied out of the arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Record {
    pub time: u64,
    pub event: u8,
    nvalues: usize,
    values: [u64; MAX_VALUES],
}

impl Record {
    pub fn values(&self) -> &[u64] {
        &self.values[..self.nvalues]
    }

    pub fn kind(&self) -> Result<EventKind> {
        EventKind::try_from(self.event)
    }
}

/// Fixed capacity arena. The backing allocation is reserved once and never
/// grows, so `len()` doubles as the write cursor and `clear()` as the reset.
pub struct TraceBuffer {
    bytes: Vec<u8>,
    capacity: usize,
}

impl TraceBuffer {
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        if capacity <= MAX_RECORD_SIZE {
            return Err(TraceError::Config(format!(
                "buffer capacity {capacity} must exceed the {MAX_RECORD_SIZE} byte maximum record"
            )));
        }
        let mut bytes = Vec::new();
        bytes
            .try_reserve_exact(capacity)
            .map_err(|_| TraceError::Allocation { len: capacity })?;
        Ok(TraceBuffer { bytes, capacity })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// bytes between origin and the write cursor
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.capacity - self.bytes.len()
    }

    /// The cursor must stay strictly below capacity after the record is written.
    #[inline(always)]
    pub fn fits(&self, nvalues: usize) -> bool {
        record_size(nvalues) < self.remaining()
    }

    /// Caller guarantees `values.len() <= MAX_VALUES` and `self.fits(values.len())`.
    #[inline(always)]
    pub(crate) fn push(&mut self, time: u64, event: EventKind, values: &[u64]) {
        debug_assert!(values.len() <= MAX_VALUES);
        debug_assert!(self.fits(values.len()));
        let header = RecordHeader::new(time, event, values.len());
        self.bytes.extend_from_slice(bytemuck::bytes_of(&header));
        for value in values {
            self.bytes.extend_from_slice(&value.to_ne_bytes());
        }
    }

    /// Logical truncation; the allocation is kept for reuse.
    pub fn clear(&mut self) {
        self.bytes.clear();
    }

    pub fn records(&self) -> Records<'_> {
        Records { rest: &self.bytes }
    }
}

/// Walks records from origin to cursor in append order.
pub struct Records<'a> {
    rest: &'a [u8],
}

impl Iterator for Records<'_> {
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        if self.rest.len() < HEADER_SIZE {
            return None;
        }
        let header: RecordHeader = bytemuck::pod_read_unaligned(&self.rest[..HEADER_SIZE]);
        let nvalues = header.nvalues as usize;
        // the stored count is authoritative; anything past it belongs to the next record
        if nvalues > MAX_VALUES || self.rest.len() < record_size(nvalues) {
            self.rest = &[];
            return None;
        }
        let mut values = [0u64; MAX_VALUES];
        for (i, chunk) in self.rest[HEADER_SIZE..record_size(nvalues)]
            .chunks_exact(8)
            .enumerate()
        {
            values[i] = bytemuck::pod_read_unaligned(chunk);
        }
        self.rest = &self.rest[record_size(nvalues)..];
        Some(Record {
            time: header.time,
            event: header.event,
            nvalues,
            values,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_is_sixteen_bytes() {
        assert_eq!(HEADER_SIZE, 16);
        assert_eq!(record_size(0), 16);
        assert_eq!(MAX_RECORD_SIZE, 56);
    }

    #[test]
    fn records_come_back_in_append_order() {
        let mut buf = TraceBuffer::with_capacity(4096).unwrap();
        buf.push(1, EventKind::ReadIoStart, &[0x2a, 7]);
        buf.push(2, EventKind::BucketScan, &[]);
        buf.push(3, EventKind::WriteIoFinish, &[1, 2, 3, 4, 5]);
        assert_eq!(buf.len(), record_size(2) + record_size(0) + record_size(5));

        let records: Vec<Record> = buf.records().collect();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].time, 1);
        assert_eq!(records[0].kind().unwrap(), EventKind::ReadIoStart);
        assert_eq!(records[0].values(), &[0x2a, 7]);
        assert_eq!(records[1].values(), &[] as &[u64]);
        assert_eq!(records[2].kind().unwrap(), EventKind::WriteIoFinish);
        assert_eq!(records[2].values(), &[1, 2, 3, 4, 5]);
    }

    #[test]
    fn clear_keeps_the_allocation() {
        let mut buf = TraceBuffer::with_capacity(1024).unwrap();
        buf.push(9, EventKind::BucketCreate, &[1]);
        buf.clear();
        assert!(buf.is_empty());
        assert_eq!(buf.remaining(), 1024);
        assert_eq!(buf.records().count(), 0);
        assert!(buf.bytes.capacity() >= 1024);
    }

    #[test]
    fn fits_accounts_for_value_count() {
        let mut buf = TraceBuffer::with_capacity(64).unwrap();
        assert!(buf.fits(5));
        buf.push(0, EventKind::ReadIoStart, &[1]);
        assert_eq!(buf.remaining(), 40);
        assert!(buf.fits(2));
        // 40 more bytes would put the cursor on capacity
        assert!(!buf.fits(3));
        assert!(!buf.fits(4));
    }

    #[test]
    fn capacity_below_one_record_is_rejected() {
        assert!(matches!(
            TraceBuffer::with_capacity(MAX_RECORD_SIZE - 1),
            Err(TraceError::Config(_))
        ));
        assert!(matches!(
            TraceBuffer::with_capacity(MAX_RECORD_SIZE),
            Err(TraceError::Config(_))
        ));
        assert!(TraceBuffer::with_capacity(MAX_RECORD_SIZE + 1).is_ok());
    }

    #[test]
    fn impossible_allocation_fails_cleanly() {
        assert!(matches!(
            TraceBuffer::with_capacity(usize::MAX),
            Err(TraceError::Allocation { .. })
        ));
    }
}
