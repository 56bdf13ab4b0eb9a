//! Polarity (DVS change) events.
//!
//! A polarity event reports a brightness change at one pixel. The record is
//! 8 bytes: a packed 32-bit `data` word and a 32-bit timestamp.
//!
//! ```text
//!   data word, from the LSB:
//!   [0]      valid mark
//!   [1]      polarity (1 = ON, 0 = OFF)
//!   [16:2]   y address (15 bits)
//!   [31:17]  x address (15 bits)
//! ```
//!
//! The (0, 0) address is the lower left corner. Field setters OR into the
//! word, so a slot must be zero (as allocated) before it is filled in.

use crate::bitfield::{BitField, VALID_MARK};
use crate::event::{Event, EventKind};
use crate::header::EventType;
use crate::packet::EventPacket;

pub const POLARITY: BitField = BitField::new(1, 0x0000_0001);
pub const Y_ADDR: BitField = BitField::new(2, 0x0000_7FFF);
pub const X_ADDR: BitField = BitField::new(17, 0x0000_7FFF);

/// Largest address representable on either axis.
pub const MAX_ADDRESS: u16 = 0x7FFF;

/// Field table of the `data` word.
pub const FIELDS: [(&str, BitField); 4] = [
    ("valid", VALID_MARK),
    ("polarity", POLARITY),
    ("y", Y_ADDR),
    ("x", X_ADDR),
];

/// Marker for polarity event packets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Polarity;

impl EventKind for Polarity {
    const TYPE: EventType = EventType::Polarity;
    const SIZE: usize = 8;
    const TS_OFFSET: usize = 4;
    const SUBSYSTEM: &'static str = "Polarity Event";
}

pub type PolarityEventPacket = EventPacket<Polarity>;
pub type PolarityEvent<'a> = Event<&'a [u8], Polarity>;
pub type PolarityEventMut<'a> = Event<&'a mut [u8], Polarity>;

impl<B: AsRef<[u8]>> Event<B, Polarity> {
    /// The packed `data` word in host order.
    #[inline]
    pub fn data(&self) -> u32 {
        self.first_word()
    }

    /// `true` for an ON (brightness increase) event.
    #[inline]
    pub fn polarity(&self) -> bool {
        POLARITY.load(self.record()) != 0
    }

    #[inline]
    pub fn y(&self) -> u16 {
        Y_ADDR.load(self.record()) as u16
    }

    #[inline]
    pub fn x(&self) -> u16 {
        X_ADDR.load(self.record()) as u16
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> Event<B, Polarity> {
    #[inline]
    pub fn set_polarity(&mut self, polarity: bool) {
        POLARITY.store(self.record_mut(), polarity as u32);
    }

    /// Addresses above [`MAX_ADDRESS`] are truncated to 15 bits.
    #[inline]
    pub fn set_y(&mut self, y: u16) {
        Y_ADDR.store(self.record_mut(), y as u32);
    }

    #[inline]
    pub fn set_x(&mut self, x: u16) {
        X_ADDR.store(self.record_mut(), x as u32);
    }
}
