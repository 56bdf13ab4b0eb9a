//! Event records living inside a packet buffer.
//!
//! An [`Event`] is a view of one slot of a packet: it borrows the whole
//! packet buffer (header included) and remembers its index, so validity
//! changes can update the header counters in the same call. Read access
//! needs `B: AsRef<[u8]>`, mutation `B: AsMut<[u8]>` as well. Type-specific
//! field accessors live next to each event kind.

use crate::bitfield::{self, VALID_MARK};
use crate::caer_log;
use crate::error::EventError;
use crate::header::{EventType, PacketHeader, HEADER_SIZE};
use crate::logging::LogLevel;
use crate::timestamp;
use std::marker::PhantomData;

/// Static layout description of one event type.
///
/// Every kind must keep its first packed word (holding the validity mark in
/// bit 0) at offset 0 of the record.
pub trait EventKind {
    /// Type id written into the packet header.
    const TYPE: EventType;
    /// Record size in bytes.
    const SIZE: usize;
    /// Byte offset of the main 32-bit timestamp inside a record.
    const TS_OFFSET: usize;
    /// Subsystem name used for diagnostics.
    const SUBSYSTEM: &'static str;
}

/// One event slot of a packet of kind `E`.
pub struct Event<B, E> {
    buffer: B,
    index: i32,
    _kind: PhantomData<E>,
}

impl<B: AsRef<[u8]>, E: EventKind> Event<B, E> {
    /// `buffer` is the whole packet; `index` must already be bounds-checked.
    pub(crate) fn new(buffer: B, index: i32) -> Self {
        Self {
            buffer,
            index,
            _kind: PhantomData,
        }
    }

    #[inline]
    fn offset(&self) -> usize {
        HEADER_SIZE + self.index as usize * E::SIZE
    }

    /// Position of this event in its packet.
    #[inline]
    pub fn index(&self) -> i32 {
        self.index
    }

    /// Raw little-endian bytes of this record.
    #[inline]
    pub fn record(&self) -> &[u8] {
        let offset = self.offset();
        &self.buffer.as_ref()[offset..offset + E::SIZE]
    }

    /// Header of the packet this event belongs to.
    #[inline]
    pub fn header(&self) -> PacketHeader<&[u8]> {
        PacketHeader::new_unchecked(self.buffer.as_ref())
    }

    /// First packed word, converted to host order.
    #[inline]
    pub fn first_word(&self) -> u32 {
        bitfield::load_word(self.record())
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        VALID_MARK.load(self.record()) != 0
    }

    /// The 31-bit timestamp stored in the record.
    #[inline]
    pub fn timestamp(&self) -> i32 {
        timestamp::decode_timestamp32(self.record(), E::TS_OFFSET)
    }

    /// Record timestamp extended with the packet's overflow counter.
    #[inline]
    pub fn timestamp64(&self) -> i64 {
        timestamp::compose_timestamp64(self.header().event_ts_overflow(), self.timestamp())
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>, E: EventKind> Event<B, E> {
    /// Mutable raw bytes of this record.
    ///
    /// Writing bit 0 of the first word through this bypasses the validity
    /// counters; use [`validate`](Self::validate) and
    /// [`invalidate`](Self::invalidate) instead.
    #[inline]
    pub fn record_mut(&mut self) -> &mut [u8] {
        let offset = self.offset();
        &mut self.buffer.as_mut()[offset..offset + E::SIZE]
    }

    #[inline]
    fn header_mut(&mut self) -> PacketHeader<&mut [u8]> {
        PacketHeader::new_unchecked(self.buffer.as_mut())
    }

    /// Stores the record timestamp. Negative values are refused, logged and
    /// leave the record unchanged.
    pub fn set_timestamp(&mut self, value: i32) -> Result<(), EventError> {
        timestamp::encode_timestamp32(self.record_mut(), E::TS_OFFSET, value).map_err(|err| {
            caer_log!(
                LogLevel::Critical,
                E::SUBSYSTEM,
                "Called set_timestamp() with negative value {}!",
                value
            );
            err
        })
    }

    /// Marks an invalid event valid and counts it in both `event_number`
    /// and `event_valid`.
    ///
    /// On an already valid event, or when either counter is already at
    /// `i32::MAX`, this logs and changes nothing.
    pub fn validate(&mut self) -> Result<(), EventError> {
        if self.is_valid() {
            caer_log!(
                LogLevel::Critical,
                E::SUBSYSTEM,
                "Called validate() on already valid event {}.",
                self.index
            );
            return Err(EventError::AlreadyValid(self.index));
        }

        let header = self.header();
        let (number, valid) = (header.event_number(), header.event_valid());
        let (next_number, next_valid) = match (number.checked_add(1), valid.checked_add(1)) {
            (Some(next_number), Some(next_valid)) => (next_number, next_valid),
            _ => return Err(self.counter_overflow("validate", number, valid)),
        };

        VALID_MARK.store(self.record_mut(), 1);

        let mut header = self.header_mut();
        header.set_event_number(next_number);
        header.set_event_valid(next_valid);
        Ok(())
    }

    /// Marks a valid event invalid. Only `event_valid` drops; the slot keeps
    /// counting towards `event_number`.
    ///
    /// On an already invalid event, or when `event_valid` is already zero,
    /// this logs and changes nothing.
    pub fn invalidate(&mut self) -> Result<(), EventError> {
        if !self.is_valid() {
            caer_log!(
                LogLevel::Critical,
                E::SUBSYSTEM,
                "Called invalidate() on already invalid event {}.",
                self.index
            );
            return Err(EventError::AlreadyInvalid(self.index));
        }

        let header = self.header();
        let (number, valid) = (header.event_number(), header.event_valid());
        let next_valid = match valid.checked_sub(1) {
            Some(next_valid) if next_valid >= 0 => next_valid,
            _ => return Err(self.counter_overflow("invalidate", number, valid)),
        };

        VALID_MARK.erase(self.record_mut());

        self.header_mut().set_event_valid(next_valid);
        Ok(())
    }

    fn counter_overflow(&self, operation: &str, number: i32, valid: i32) -> EventError {
        caer_log!(
            LogLevel::Critical,
            E::SUBSYSTEM,
            "Called {}() on event {}, but counters number={} valid={} cannot be updated.",
            operation,
            self.index,
            number,
            valid
        );
        EventError::CounterOverflow { number, valid }
    }
}
