//! Loading and storing whole packets.
//!
//! A packet file is exactly one packet's bytes, header first, with nothing
//! before or after it.

use crate::error::EventError;
use crate::generic::GenericEventPacket;
use crate::header::{EventType, PacketHeader};
use crate::imu9::Imu9EventPacket;
use crate::polarity::PolarityEventPacket;
use std::fs;
use std::path::Path;

/// A packet whose kind was determined from its header.
#[derive(Debug, Clone)]
pub enum AnyEventPacket {
    Polarity(PolarityEventPacket),
    Imu9(Imu9EventPacket),
}

impl AnyEventPacket {
    /// Dispatches raw packet bytes on the header's event type.
    pub fn from_bytes(buffer: Vec<u8>) -> Result<Self, EventError> {
        let type_id = PacketHeader::new(buffer.as_slice())
            .ok_or(EventError::Truncated(buffer.len()))?
            .event_type_id();

        match EventType::from_i16(type_id) {
            Some(EventType::Polarity) => {
                PolarityEventPacket::from_bytes(buffer).map(Self::Polarity)
            }
            Some(EventType::Imu9) => Imu9EventPacket::from_bytes(buffer).map(Self::Imu9),
            _ => Err(EventError::UnsupportedEventType(type_id)),
        }
    }

    pub fn event_type(&self) -> EventType {
        match self {
            Self::Polarity(_) => EventType::Polarity,
            Self::Imu9(_) => EventType::Imu9,
        }
    }

    pub fn as_generic(&self) -> GenericEventPacket<'_> {
        match self {
            Self::Polarity(packet) => packet.as_generic(),
            Self::Imu9(packet) => packet.as_generic(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Polarity(packet) => packet.as_bytes(),
            Self::Imu9(packet) => packet.as_bytes(),
        }
    }
}

/// Reads a packet file and checks it against its declared event type.
pub fn read_packet_file<P: AsRef<Path>>(path: P) -> Result<AnyEventPacket, EventError> {
    let buffer = fs::read(path.as_ref())?;
    AnyEventPacket::from_bytes(buffer)
}

/// Writes raw packet bytes to `path`, replacing any existing file.
pub fn write_packet_file<P: AsRef<Path>>(path: P, packet: &[u8]) -> Result<(), EventError> {
    fs::write(path.as_ref(), packet)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::HEADER_SIZE;

    #[test]
    fn test_dispatch_on_event_type() {
        let polarity = PolarityEventPacket::allocate(2, 0, 0).unwrap();
        let imu = Imu9EventPacket::allocate(2, 0, 0).unwrap();

        let any = AnyEventPacket::from_bytes(polarity.into_bytes()).unwrap();
        assert_eq!(any.event_type(), EventType::Polarity);

        let any = AnyEventPacket::from_bytes(imu.into_bytes()).unwrap();
        assert_eq!(any.event_type(), EventType::Imu9);
        assert_eq!(any.as_bytes().len(), HEADER_SIZE + 2 * 48);
    }

    #[test]
    fn test_unsupported_event_type() {
        let mut bytes = PolarityEventPacket::allocate(1, 0, 0).unwrap().into_bytes();
        bytes[0] = EventType::Frame.id() as u8;

        assert!(matches!(
            AnyEventPacket::from_bytes(bytes),
            Err(EventError::UnsupportedEventType(2))
        ));
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("packet.bin");

        let mut packet = PolarityEventPacket::allocate(4, 3, 1).unwrap();
        packet.get_event_mut(0).unwrap().validate().unwrap();
        write_packet_file(&path, packet.as_bytes()).unwrap();

        match read_packet_file(&path).unwrap() {
            AnyEventPacket::Polarity(read) => {
                assert_eq!(read.as_bytes(), packet.as_bytes());
                assert_eq!(read.source(), 3);
                assert_eq!(read.event_valid(), 1);
            }
            other => panic!("unexpected packet kind {:?}", other.event_type()),
        }
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            read_packet_file(dir.path().join("absent.bin")),
            Err(EventError::Io(_))
        ));
    }
}
