//! The common packet header.
//!
//! Every event packet, whatever it carries, starts with the same 28-byte
//! header describing the records that follow. All fields are little-endian
//! and signed, so the layout is readable from languages without unsigned
//! integers.
//!
//! ```text
//!   offset  type  field
//!   0       i16   event type
//!   2       i16   event source
//!   4       i32   event size (bytes per record)
//!   8       i32   timestamp offset inside a record
//!   12      i32   timestamp overflow counter
//!   16      i32   event capacity
//!   20      i32   event number (valid + invalid)
//!   24      i32   valid event number
//! ```

use crate::caer_log;
use crate::logging::LogLevel;
use byteorder::{ByteOrder, LittleEndian};

/// Size of the packet header in bytes, identical on every platform.
pub const HEADER_SIZE: usize = 28;

const EVENT_TYPE: usize = 0;
const EVENT_SOURCE: usize = 2;
const EVENT_SIZE: usize = 4;
const EVENT_TS_OFFSET: usize = 8;
const EVENT_TS_OVERFLOW: usize = 12;
const EVENT_CAPACITY: usize = 16;
const EVENT_NUMBER: usize = 20;
const EVENT_VALID: usize = 24;

const SUBSYSTEM: &str = "EventPacket Header";

/// Known event type ids.
///
/// Ids below 100 are reserved for the types defined here; user-defined
/// event types must pick ids from 100 upwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i16)]
pub enum EventType {
    /// Special events (0)
    Special = 0,
    /// Polarity (change, DVS) events (1)
    Polarity = 1,
    /// Frame (intensity, APS) events (2)
    Frame = 2,
    /// 6-axis IMU events (3)
    Imu6 = 3,
    /// 9-axis IMU events (4)
    Imu9 = 4,
    /// ADC sample events (5)
    Sample = 5,
    /// Ear (cochlea) events (6)
    Ear = 6,
}

impl EventType {
    /// Attempts to map a raw header id onto a known event type.
    #[inline]
    pub fn from_i16(value: i16) -> Option<Self> {
        match value {
            0 => Some(Self::Special),
            1 => Some(Self::Polarity),
            2 => Some(Self::Frame),
            3 => Some(Self::Imu6),
            4 => Some(Self::Imu9),
            5 => Some(Self::Sample),
            6 => Some(Self::Ear),
            _ => None,
        }
    }

    #[inline]
    pub fn id(self) -> i16 {
        self as i16
    }
}

/// Typed view over the header bytes at the start of a packet buffer.
///
/// Getters need `B: AsRef<[u8]>`, setters additionally `B: AsMut<[u8]>`.
/// The buffer must hold at least [`HEADER_SIZE`] bytes; the packet types in
/// this crate guarantee that before handing out a view.
#[derive(Debug, Clone, Copy)]
pub struct PacketHeader<B> {
    buffer: B,
}

impl<B: AsRef<[u8]>> PacketHeader<B> {
    /// Wraps a buffer, refusing ones shorter than a header.
    pub fn new(buffer: B) -> Option<Self> {
        if buffer.as_ref().len() < HEADER_SIZE {
            return None;
        }

        Some(Self { buffer })
    }

    /// Wraps a buffer already known to hold a full header.
    #[inline]
    pub(crate) fn new_unchecked(buffer: B) -> Self {
        debug_assert!(buffer.as_ref().len() >= HEADER_SIZE);
        Self { buffer }
    }

    #[inline]
    fn bytes(&self) -> &[u8] {
        &self.buffer.as_ref()[..HEADER_SIZE]
    }

    #[inline]
    fn read_i32(&self, offset: usize) -> i32 {
        LittleEndian::read_i32(&self.bytes()[offset..offset + 4])
    }

    /// Raw numerical event type id.
    #[inline]
    pub fn event_type_id(&self) -> i16 {
        LittleEndian::read_i16(&self.bytes()[EVENT_TYPE..EVENT_TYPE + 2])
    }

    /// Event type, if the id is one of the known ones.
    pub fn event_type(&self) -> Option<EventType> {
        EventType::from_i16(self.event_type_id())
    }

    /// Numerical id of the source that generated the events.
    #[inline]
    pub fn event_source(&self) -> i16 {
        LittleEndian::read_i16(&self.bytes()[EVENT_SOURCE..EVENT_SOURCE + 2])
    }

    /// Size of a single record in bytes.
    #[inline]
    pub fn event_size(&self) -> i32 {
        self.read_i32(EVENT_SIZE)
    }

    /// Byte offset of the main 32-bit timestamp inside a record.
    #[inline]
    pub fn event_ts_offset(&self) -> i32 {
        self.read_i32(EVENT_TS_OFFSET)
    }

    /// Packet-level timestamp overflow counter.
    #[inline]
    pub fn event_ts_overflow(&self) -> i32 {
        self.read_i32(EVENT_TS_OVERFLOW)
    }

    /// Maximum number of records the packet can store.
    #[inline]
    pub fn event_capacity(&self) -> i32 {
        self.read_i32(EVENT_CAPACITY)
    }

    /// Number of records written so far, valid or not.
    #[inline]
    pub fn event_number(&self) -> i32 {
        self.read_i32(EVENT_NUMBER)
    }

    /// Number of records currently marked valid.
    #[inline]
    pub fn event_valid(&self) -> i32 {
        self.read_i32(EVENT_VALID)
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> PacketHeader<B> {
    #[inline]
    fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.buffer.as_mut()[..HEADER_SIZE]
    }

    // Negative values would set the sign bit, which readers without unsigned
    // integers cannot represent. They are refused and logged.
    fn write_i32(&mut self, offset: usize, value: i32, field: &str) -> bool {
        if value < 0 {
            caer_log!(
                LogLevel::Critical,
                SUBSYSTEM,
                "Called set_{}() with negative value {}!",
                field,
                value
            );
            return false;
        }

        LittleEndian::write_i32(&mut self.bytes_mut()[offset..offset + 4], value);
        true
    }

    fn write_i16(&mut self, offset: usize, value: i16, field: &str) -> bool {
        if value < 0 {
            caer_log!(
                LogLevel::Critical,
                SUBSYSTEM,
                "Called set_{}() with negative value {}!",
                field,
                value
            );
            return false;
        }

        LittleEndian::write_i16(&mut self.bytes_mut()[offset..offset + 2], value);
        true
    }

    /// Each setter returns `false` and leaves the field untouched when given
    /// a negative value.
    pub fn set_event_type_id(&mut self, event_type: i16) -> bool {
        self.write_i16(EVENT_TYPE, event_type, "event_type")
    }

    pub fn set_event_source(&mut self, event_source: i16) -> bool {
        self.write_i16(EVENT_SOURCE, event_source, "event_source")
    }

    pub fn set_event_size(&mut self, event_size: i32) -> bool {
        self.write_i32(EVENT_SIZE, event_size, "event_size")
    }

    pub fn set_event_ts_offset(&mut self, ts_offset: i32) -> bool {
        self.write_i32(EVENT_TS_OFFSET, ts_offset, "event_ts_offset")
    }

    /// Overflow is advanced by the producer whenever the 31-bit record
    /// timestamps wrap around.
    pub fn set_event_ts_overflow(&mut self, ts_overflow: i32) -> bool {
        self.write_i32(EVENT_TS_OVERFLOW, ts_overflow, "event_ts_overflow")
    }

    /// Capacity is fixed at allocation; changing it afterwards desynchronizes
    /// the header from the buffer length.
    pub fn set_event_capacity(&mut self, capacity: i32) -> bool {
        self.write_i32(EVENT_CAPACITY, capacity, "event_capacity")
    }

    pub fn set_event_number(&mut self, number: i32) -> bool {
        self.write_i32(EVENT_NUMBER, number, "event_number")
    }

    pub fn set_event_valid(&mut self, valid: i32) -> bool {
        self.write_i32(EVENT_VALID, valid, "event_valid")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_parsing() {
        assert_eq!(EventType::from_i16(1), Some(EventType::Polarity));
        assert_eq!(EventType::from_i16(4), Some(EventType::Imu9));
        assert_eq!(EventType::from_i16(7), None);
        assert_eq!(EventType::from_i16(-1), None);
        assert_eq!(EventType::Imu9.id(), 4);
    }

    #[test]
    fn test_header_too_short() {
        assert!(PacketHeader::new(&[0u8; HEADER_SIZE - 1][..]).is_none());
        assert!(PacketHeader::new(&[0u8; HEADER_SIZE][..]).is_some());
    }

    #[test]
    fn test_header_field_layout() {
        let mut buffer = [0u8; HEADER_SIZE];
        {
            let mut header = PacketHeader::new(&mut buffer[..]).unwrap();
            assert!(header.set_event_type_id(EventType::Polarity.id()));
            assert!(header.set_event_source(0x0102));
            assert!(header.set_event_size(8));
            assert!(header.set_event_ts_offset(4));
            assert!(header.set_event_ts_overflow(0x0A0B0C0D));
            assert!(header.set_event_capacity(300));
            assert!(header.set_event_number(2));
            assert!(header.set_event_valid(1));
        }

        assert_eq!(&buffer[0..2], &[1, 0]);
        assert_eq!(&buffer[2..4], &[0x02, 0x01]);
        assert_eq!(&buffer[4..8], &[8, 0, 0, 0]);
        assert_eq!(&buffer[12..16], &[0x0D, 0x0C, 0x0B, 0x0A]);
        assert_eq!(&buffer[16..20], &[0x2C, 0x01, 0, 0]);

        let header = PacketHeader::new(&buffer[..]).unwrap();
        assert_eq!(header.event_type(), Some(EventType::Polarity));
        assert_eq!(header.event_source(), 0x0102);
        assert_eq!(header.event_size(), 8);
        assert_eq!(header.event_ts_offset(), 4);
        assert_eq!(header.event_ts_overflow(), 0x0A0B0C0D);
        assert_eq!(header.event_capacity(), 300);
        assert_eq!(header.event_number(), 2);
        assert_eq!(header.event_valid(), 1);
    }

    #[test]
    fn test_negative_values_rejected() {
        let mut buffer = [0u8; HEADER_SIZE];
        let mut header = PacketHeader::new(&mut buffer[..]).unwrap();
        header.set_event_number(5);

        assert!(!header.set_event_number(-1));
        assert!(!header.set_event_source(-3));
        assert_eq!(header.event_number(), 5);
        assert_eq!(header.event_source(), 0);
    }
}
