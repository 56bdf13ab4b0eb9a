//! Error type shared by packet construction, event access and file I/O.

use thiserror::Error;

/// Errors that can occur while building, mutating or loading event packets.
///
/// None of these are fatal: every variant is reported through the logging
/// threshold at the point where it happens, and the packet is left unchanged.
#[derive(Error, Debug)]
pub enum EventError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid event capacity {0}, must be greater than zero")]
    InvalidCapacity(i32),

    #[error("Failed to allocate {0} bytes for event packet")]
    AllocationFailed(usize),

    #[error("Negative timestamp {0} is not allowed, bit 31 is reserved")]
    NegativeTimestamp(i32),

    #[error("Timestamp {0} cannot be split into overflow counter and 31-bit timestamp")]
    TimestampOutOfRange(i64),

    #[error("Event {0} is already valid")]
    AlreadyValid(i32),

    #[error("Event {0} is already invalid")]
    AlreadyInvalid(i32),

    #[error("Packet holds event type {found}, expected {expected}")]
    WrongEventType { expected: i16, found: i16 },

    #[error("Unsupported event type {0}")]
    UnsupportedEventType(i16),

    #[error("Packet declares event size {found}, expected {expected}")]
    WrongEventSize { expected: i32, found: i32 },

    #[error("Packet declares timestamp offset {found}, expected {expected}")]
    WrongTsOffset { expected: i32, found: i32 },

    #[error("Packet buffer is {found} bytes, header declares {expected}")]
    BufferLength { expected: usize, found: usize },

    #[error("Counter update would overflow: number={number}, valid={valid}")]
    CounterOverflow { number: i32, valid: i32 },

    #[error("Inconsistent packet counters: capacity={capacity}, number={number}, valid={valid}")]
    CounterMismatch {
        capacity: i32,
        number: i32,
        valid: i32,
    },

    #[error("Buffer of {0} bytes is too small for a packet header")]
    Truncated(usize),
}
