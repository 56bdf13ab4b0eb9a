//! Shift/mask codec for fields packed into a 32-bit word.
//!
//! Each event type describes its packed word as a table of [`BitField`]s.
//! Words are always loaded and stored little-endian, independent of the host.
//!
//! Encoding ORs the new bits into the word and never clears the field first.
//! Records are meant to be built field by field on a zeroed slot; writing the
//! same field twice with different values merges both bit patterns.

use byteorder::{ByteOrder, LittleEndian};

/// Position of one field inside a packed word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitField {
    pub shift: u32,
    pub mask: u32,
}

/// Validity mark, bit 0 of the first word of every event type.
///
/// A zeroed record is therefore always invalid.
pub const VALID_MARK: BitField = BitField::new(0, 0x0000_0001);

impl BitField {
    pub const fn new(shift: u32, mask: u32) -> Self {
        Self { shift, mask }
    }

    /// Extracts this field from a host-order word.
    #[inline]
    pub fn get(self, word: u32) -> u32 {
        (word >> self.shift) & self.mask
    }

    /// ORs `value` (truncated to the mask) into a host-order word.
    #[inline]
    pub fn set(self, word: u32, value: u32) -> u32 {
        word | ((value & self.mask) << self.shift)
    }

    /// Clears every bit of this field in a host-order word.
    #[inline]
    pub fn clear(self, word: u32) -> u32 {
        word & !(self.mask << self.shift)
    }

    /// Decodes this field from the little-endian word at the start of `bytes`.
    #[inline]
    pub fn load(self, bytes: &[u8]) -> u32 {
        self.get(load_word(bytes))
    }

    /// ORs `value` into the little-endian word at the start of `bytes`.
    #[inline]
    pub fn store(self, bytes: &mut [u8], value: u32) {
        let word = load_word(bytes);
        store_word(bytes, self.set(word, value));
    }

    /// Zeroes this field inside the little-endian word at the start of `bytes`.
    #[inline]
    pub fn erase(self, bytes: &mut [u8]) {
        let word = load_word(bytes);
        store_word(bytes, self.clear(word));
    }
}

#[inline]
pub fn load_word(bytes: &[u8]) -> u32 {
    LittleEndian::read_u32(&bytes[..4])
}

#[inline]
pub fn store_word(bytes: &mut [u8], word: u32) {
    LittleEndian::write_u32(&mut bytes[..4], word);
}
