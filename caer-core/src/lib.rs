//! Event packets for neuromorphic sensor data.
//!
//! This crate defines the fixed binary layout used to stream events from
//! dynamic vision sensors and their companion IMUs: a 28-byte packet header
//! followed by a contiguous array of fixed-size little-endian records. It
//! supports polarity (DVS change) events and 9-axis IMU events.
//!
//! # Example
//!
//! ```
//! use caer_core::PolarityEventPacket;
//!
//! let mut packet = PolarityEventPacket::allocate(2, 1, 0).unwrap();
//!
//! let mut event = packet.get_event_mut(0).unwrap();
//! event.set_x(100);
//! event.set_y(200);
//! event.set_polarity(true);
//! event.set_timestamp(42).unwrap();
//! event.validate().unwrap();
//!
//! assert_eq!(packet.event_number(), 1);
//! assert_eq!(packet.event_valid(), 1);
//!
//! for event in packet.iter_valid() {
//!     println!("{},{} {} @ {}", event.x(), event.y(), event.polarity(), event.timestamp64());
//! }
//! ```
//!
//! # Features
//!
//! - Host-independent little-endian layout, checked on every access
//! - Validity marks kept in sync with the header counters
//! - 31-bit record timestamps extended to 64 bits via the packet overflow counter
//! - Type-erased access to any packet through its header
//! - Non-fatal error handling: misuse is logged and reported, never panics

pub mod bitfield;
pub mod error;
pub mod event;
pub mod generic;
pub mod header;
pub mod imu9;
pub mod io;
pub mod logging;
pub mod output;
pub mod packet;
pub mod polarity;
pub mod timestamp;

// Re-export commonly used types
pub use error::EventError;
pub use event::{Event, EventKind};
pub use generic::{GenericEvent, GenericEventPacket};
pub use header::{EventType, PacketHeader, HEADER_SIZE};
pub use imu9::{Imu9, Imu9Channel, Imu9Event, Imu9EventMut, Imu9EventPacket};
pub use io::{read_packet_file, write_packet_file, AnyEventPacket};
pub use logging::{log_level, set_log_level, LogLevel};
pub use output::{EventFilter, FieldOrder, OutputError};
pub use packet::EventPacket;
pub use polarity::{Polarity, PolarityEvent, PolarityEventMut, PolarityEventPacket};
pub use timestamp::{compose_timestamp64, split_timestamp64};
