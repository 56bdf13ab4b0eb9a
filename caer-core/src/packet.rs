//! Fixed-capacity event packets.
//!
//! A packet is one contiguous little-endian buffer: the 28-byte header
//! followed by `capacity` records of the same kind, without padding. The
//! buffer is allocated once and never resized.

use crate::caer_log;
use crate::error::EventError;
use crate::event::{Event, EventKind};
use crate::generic::GenericEventPacket;
use crate::header::{PacketHeader, HEADER_SIZE};
use crate::logging::LogLevel;
use std::fmt;
use std::marker::PhantomData;

/// A packet holding events of kind `E`.
pub struct EventPacket<E> {
    buffer: Vec<u8>,
    _kind: PhantomData<E>,
}

impl<E: EventKind> EventPacket<E> {
    /// Allocates a zeroed packet able to hold `capacity` events.
    ///
    /// All records start invalid and all counters at zero. Fails when
    /// `capacity <= 0` or when the memory cannot be obtained; no partial
    /// packet is ever returned.
    ///
    /// A negative `source` or `ts_overflow` is refused by the header setter,
    /// which logs it and leaves the field at zero.
    pub fn allocate(capacity: i32, source: i16, ts_overflow: i32) -> Result<Self, EventError> {
        if capacity <= 0 {
            return Err(reject::<E>(EventError::InvalidCapacity(capacity)));
        }

        let total = (capacity as usize)
            .checked_mul(E::SIZE)
            .and_then(|records| records.checked_add(HEADER_SIZE))
            .ok_or_else(|| reject::<E>(EventError::AllocationFailed(usize::MAX)))?;

        let mut buffer = Vec::new();
        buffer
            .try_reserve_exact(total)
            .map_err(|_| reject::<E>(EventError::AllocationFailed(total)))?;
        buffer.resize(total, 0);

        let mut packet = Self {
            buffer,
            _kind: PhantomData,
        };

        let mut header = packet.header_mut();
        header.set_event_type_id(E::TYPE.id());
        header.set_event_source(source);
        header.set_event_size(E::SIZE as i32);
        header.set_event_ts_offset(E::TS_OFFSET as i32);
        header.set_event_ts_overflow(ts_overflow);
        header.set_event_capacity(capacity);
        header.set_event_number(0);
        header.set_event_valid(0);

        Ok(packet)
    }

    /// Takes ownership of a raw packet buffer, e.g. one received from a
    /// device or read from disk.
    ///
    /// The header must describe this event kind, the buffer length must
    /// match the declared capacity exactly, and the counters must satisfy
    /// `0 <= valid <= number`. `number` may exceed the capacity, since
    /// revalidating a slot counts it again.
    pub fn from_bytes(buffer: Vec<u8>) -> Result<Self, EventError> {
        let header = PacketHeader::new(buffer.as_slice())
            .ok_or_else(|| reject::<E>(EventError::Truncated(buffer.len())))?;

        if header.event_type_id() != E::TYPE.id() {
            return Err(reject::<E>(EventError::WrongEventType {
                expected: E::TYPE.id(),
                found: header.event_type_id(),
            }));
        }
        if header.event_size() != E::SIZE as i32 {
            return Err(reject::<E>(EventError::WrongEventSize {
                expected: E::SIZE as i32,
                found: header.event_size(),
            }));
        }
        if header.event_ts_offset() != E::TS_OFFSET as i32 {
            return Err(reject::<E>(EventError::WrongTsOffset {
                expected: E::TS_OFFSET as i32,
                found: header.event_ts_offset(),
            }));
        }

        let capacity = header.event_capacity();
        if capacity <= 0 {
            return Err(reject::<E>(EventError::InvalidCapacity(capacity)));
        }

        let expected = (capacity as usize)
            .checked_mul(E::SIZE)
            .and_then(|records| records.checked_add(HEADER_SIZE))
            .unwrap_or(usize::MAX);
        if buffer.len() != expected {
            return Err(reject::<E>(EventError::BufferLength {
                expected,
                found: buffer.len(),
            }));
        }

        let number = header.event_number();
        let valid = header.event_valid();
        if valid < 0 || valid > number {
            return Err(reject::<E>(EventError::CounterMismatch {
                capacity,
                number,
                valid,
            }));
        }

        Ok(Self {
            buffer,
            _kind: PhantomData,
        })
    }

    #[inline]
    pub fn header(&self) -> PacketHeader<&[u8]> {
        PacketHeader::new_unchecked(self.buffer.as_slice())
    }

    /// Mutable header access, mainly for advancing the timestamp overflow
    /// counter. The event counters should only change through
    /// [`Event::validate`] and [`Event::invalidate`].
    #[inline]
    pub fn header_mut(&mut self) -> PacketHeader<&mut [u8]> {
        PacketHeader::new_unchecked(self.buffer.as_mut_slice())
    }

    #[inline]
    pub fn capacity(&self) -> i32 {
        self.header().event_capacity()
    }

    #[inline]
    pub fn event_number(&self) -> i32 {
        self.header().event_number()
    }

    #[inline]
    pub fn event_valid(&self) -> i32 {
        self.header().event_valid()
    }

    #[inline]
    pub fn ts_overflow(&self) -> i32 {
        self.header().event_ts_overflow()
    }

    #[inline]
    pub fn source(&self) -> i16 {
        self.header().event_source()
    }

    // Capacity as backed by the buffer, in case the header was edited.
    fn slots(&self) -> i32 {
        let stored = (self.buffer.len() - HEADER_SIZE) / E::SIZE;
        self.capacity().clamp(0, stored.min(i32::MAX as usize) as i32)
    }

    fn in_bounds(&self, n: i32) -> bool {
        if n < 0 || n >= self.slots() {
            caer_log!(
                LogLevel::Critical,
                E::SUBSYSTEM,
                "Called get_event() with invalid event offset {}, while maximum allowed value is {}.",
                n,
                self.slots() - 1
            );
            return false;
        }

        true
    }

    /// Event at slot `n`, or `None` (logged) when `n` is outside
    /// `[0, capacity)`.
    pub fn get_event(&self, n: i32) -> Option<Event<&[u8], E>> {
        if !self.in_bounds(n) {
            return None;
        }

        Some(Event::new(self.buffer.as_slice(), n))
    }

    /// Mutable event at slot `n`, or `None` (logged) when out of bounds.
    pub fn get_event_mut(&mut self, n: i32) -> Option<Event<&mut [u8], E>> {
        if !self.in_bounds(n) {
            return None;
        }

        Some(Event::new(self.buffer.as_mut_slice(), n))
    }

    // Clamped so a corrupt counter can never index past the buffer.
    fn written(&self) -> i32 {
        self.event_number().clamp(0, self.slots())
    }

    /// Every written event, valid or not: slots `0..event_number`.
    pub fn iter(&self) -> impl Iterator<Item = Event<&[u8], E>> + '_ {
        let buffer = self.buffer.as_slice();
        (0..self.written()).map(move |n| Event::new(buffer, n))
    }

    /// Written events whose validity mark is set.
    pub fn iter_valid(&self) -> impl Iterator<Item = Event<&[u8], E>> + '_ {
        self.iter().filter(|event| event.is_valid())
    }

    /// The packet as a type-erased view.
    pub fn as_generic(&self) -> GenericEventPacket<'_> {
        GenericEventPacket::new_unchecked(self.buffer.as_slice())
    }

    /// Raw little-endian packet bytes, header first.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    #[inline]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }
}

impl<E> Clone for EventPacket<E> {
    fn clone(&self) -> Self {
        Self {
            buffer: self.buffer.clone(),
            _kind: PhantomData,
        }
    }
}

impl<E: EventKind> fmt::Debug for EventPacket<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header = self.header();
        f.debug_struct("EventPacket")
            .field("kind", &E::TYPE)
            .field("source", &header.event_source())
            .field("capacity", &header.event_capacity())
            .field("number", &header.event_number())
            .field("valid", &header.event_valid())
            .field("ts_overflow", &header.event_ts_overflow())
            .finish()
    }
}

fn reject<E: EventKind>(err: EventError) -> EventError {
    caer_log!(LogLevel::Critical, E::SUBSYSTEM, "{}", err);
    err
}
