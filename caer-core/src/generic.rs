//! Type-erased access to any event packet.
//!
//! Record size and timestamp offset are taken from the header, so validity
//! and timestamps can be read without knowing what the packet carries.

use crate::bitfield::VALID_MARK;
use crate::caer_log;
use crate::error::EventError;
use crate::header::{PacketHeader, HEADER_SIZE};
use crate::logging::LogLevel;
use crate::timestamp;

const SUBSYSTEM: &str = "Generic Event";

/// Read-only view over the bytes of a packet of any kind.
#[derive(Debug, Clone, Copy)]
pub struct GenericEventPacket<'a> {
    buffer: &'a [u8],
}

impl<'a> GenericEventPacket<'a> {
    /// Wraps raw packet bytes after checking that the header's record size,
    /// timestamp offset and capacity agree with the buffer length.
    pub fn new(buffer: &'a [u8]) -> Result<Self, EventError> {
        let header = PacketHeader::new(buffer).ok_or(EventError::Truncated(buffer.len()))?;

        let size = header.event_size();
        // A record must at least hold the first word and the timestamp.
        if size < 8 {
            return Err(EventError::WrongEventSize {
                expected: 8,
                found: size,
            });
        }
        if header.event_ts_offset() < 0 || header.event_ts_offset() > size - 4 {
            return Err(EventError::WrongTsOffset {
                expected: size - 4,
                found: header.event_ts_offset(),
            });
        }

        let capacity = header.event_capacity();
        if capacity < 0 {
            return Err(EventError::InvalidCapacity(capacity));
        }

        let expected = (capacity as usize)
            .checked_mul(size as usize)
            .and_then(|records| records.checked_add(HEADER_SIZE))
            .unwrap_or(usize::MAX);
        if buffer.len() != expected {
            return Err(EventError::BufferLength {
                expected,
                found: buffer.len(),
            });
        }

        Ok(Self { buffer })
    }

    pub(crate) fn new_unchecked(buffer: &'a [u8]) -> Self {
        Self { buffer }
    }

    #[inline]
    pub fn header(&self) -> PacketHeader<&'a [u8]> {
        PacketHeader::new_unchecked(self.buffer)
    }

    /// Event at slot `n`, or `None` (logged) when outside `[0, capacity)`.
    pub fn get_event(&self, n: i32) -> Option<GenericEvent<'a>> {
        let header = self.header();
        if n < 0 || n >= header.event_capacity() {
            caer_log!(
                LogLevel::Critical,
                SUBSYSTEM,
                "Called get_event() with invalid event offset {}, while maximum allowed value is {}. Negative values are not allowed!",
                n,
                header.event_capacity() - 1
            );
            return None;
        }

        // The header may have been edited after construction; never trust it
        // to index past the buffer.
        let size = header.event_size().max(0) as usize;
        let ts_offset = header.event_ts_offset().max(0) as usize;
        let offset = HEADER_SIZE + n as usize * size;
        let record = self
            .buffer
            .get(offset..offset + size)
            .filter(|record| record.len() >= 4 && ts_offset + 4 <= record.len());

        match record {
            Some(record) => Some(GenericEvent {
                record,
                ts_offset,
                ts_overflow: header.event_ts_overflow(),
            }),
            None => {
                caer_log!(
                    LogLevel::Critical,
                    SUBSYSTEM,
                    "Event {} lies outside the packet buffer, header is inconsistent.",
                    n
                );
                None
            }
        }
    }

    /// Every written event, valid or not.
    pub fn iter(&self) -> impl Iterator<Item = GenericEvent<'a>> + 'a {
        let packet = *self;
        let header = self.header();
        let written = header.event_number().clamp(0, header.event_capacity());
        (0..written).filter_map(move |n| packet.get_event(n))
    }

    /// Written events whose validity mark is set.
    pub fn iter_valid(&self) -> impl Iterator<Item = GenericEvent<'a>> + 'a {
        self.iter().filter(|event| event.is_valid())
    }
}

/// One record of a [`GenericEventPacket`].
#[derive(Debug, Clone, Copy)]
pub struct GenericEvent<'a> {
    record: &'a [u8],
    ts_offset: usize,
    ts_overflow: i32,
}

impl<'a> GenericEvent<'a> {
    #[inline]
    pub fn record(&self) -> &'a [u8] {
        self.record
    }

    /// The valid mark sits in bit 0 of the first little-endian word, which
    /// is the lowest bit of the record's first byte.
    #[inline]
    pub fn is_valid(&self) -> bool {
        (self.record[0] as u32 & VALID_MARK.mask) != 0
    }

    #[inline]
    pub fn timestamp(&self) -> i32 {
        timestamp::decode_timestamp32(self.record, self.ts_offset)
    }

    #[inline]
    pub fn timestamp64(&self) -> i64 {
        timestamp::compose_timestamp64(self.ts_overflow, self.timestamp())
    }
}
