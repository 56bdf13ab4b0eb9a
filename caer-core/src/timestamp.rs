//! 31-bit record timestamps and their 64-bit composition.
//!
//! Records carry a signed 32-bit microsecond timestamp whose sign bit must
//! stay clear, so it wraps after 2^31 - 1. The packet header holds an
//! overflow counter for those wraps; shifting it by 31 and OR-ing in the
//! record timestamp yields a 62-bit clock that does not wrap in practice.

use crate::error::EventError;
use byteorder::{ByteOrder, LittleEndian};

/// Shift applied to the overflow counter when building a 64-bit timestamp.
pub const TS_OVERFLOW_SHIFT: u32 = 31;

/// Largest value a record timestamp can hold.
pub const MAX_TIMESTAMP32: i32 = i32::MAX;

/// Reads the little-endian 32-bit timestamp at `offset` inside a record.
#[inline]
pub fn decode_timestamp32(record: &[u8], offset: usize) -> i32 {
    LittleEndian::read_i32(&record[offset..offset + 4])
}

/// Stores `value` as the record timestamp at `offset`.
///
/// Negative values are refused and leave the record untouched. No ordering
/// against earlier timestamps is checked.
#[inline]
pub fn encode_timestamp32(record: &mut [u8], offset: usize, value: i32) -> Result<(), EventError> {
    if value < 0 {
        return Err(EventError::NegativeTimestamp(value));
    }

    LittleEndian::write_i32(&mut record[offset..offset + 4], value);
    Ok(())
}

/// Combines the header overflow counter with a record timestamp.
///
/// Both operands are treated as unsigned bit patterns before combining.
#[inline]
pub fn compose_timestamp64(ts_overflow: i32, timestamp: i32) -> i64 {
    (((ts_overflow as u32 as u64) << TS_OVERFLOW_SHIFT) | (timestamp as u32 as u64)) as i64
}

/// Splits a 64-bit timestamp into `(overflow counter, record timestamp)`.
///
/// Fails for negative input or when the overflow part does not fit the
/// header's non-negative 32-bit counter.
pub fn split_timestamp64(timestamp: i64) -> Result<(i32, i32), EventError> {
    if timestamp < 0 || (timestamp >> TS_OVERFLOW_SHIFT) > i32::MAX as i64 {
        return Err(EventError::TimestampOutOfRange(timestamp));
    }

    let overflow = (timestamp >> TS_OVERFLOW_SHIFT) as i32;
    let low = (timestamp & MAX_TIMESTAMP32 as i64) as i32;
    Ok((overflow, low))
}
