//! Integration tests for event packets, built and inspected through the
//! public API only.
//!
//! Run with: cargo test --test integration_tests

use caer_core::{
    compose_timestamp64, output, read_packet_file, split_timestamp64, write_packet_file,
    AnyEventPacket, EventError, EventFilter, EventType, FieldOrder, GenericEventPacket,
    Imu9Channel, Imu9EventPacket, PolarityEventPacket, HEADER_SIZE,
};

/// Allocate, fill one event, validate, read everything back.
#[test]
fn test_polarity_end_to_end() {
    let mut packet = PolarityEventPacket::allocate(2, 1, 0).expect("Failed to allocate packet");

    {
        let mut event = packet.get_event_mut(0).unwrap();
        event.set_x(100);
        event.set_y(200);
        event.set_polarity(true);
        event.set_timestamp(42).unwrap();
        event.validate().unwrap();
    }

    assert_eq!(packet.event_number(), 1);
    assert_eq!(packet.event_valid(), 1);

    let event = packet.get_event(0).unwrap();
    assert_eq!(event.x(), 100);
    assert_eq!(event.y(), 200);
    assert!(event.polarity());
    assert_eq!(event.timestamp(), 42);
    assert_eq!(event.timestamp64(), 42);

    let untouched = packet.get_event(1).unwrap();
    assert!(!untouched.is_valid());
    assert_eq!(untouched.timestamp(), 0);
    assert_eq!(untouched.x(), 0);
    assert_eq!(untouched.y(), 0);
}

/// Fresh packets of every size start with zeroed counters and records.
#[test]
fn test_allocation_starts_empty() {
    for capacity in [1, 2, 17, 1024] {
        let packet = Imu9EventPacket::allocate(capacity, 3, 9).unwrap();
        assert_eq!(packet.capacity(), capacity);
        assert_eq!(packet.event_number(), 0);
        assert_eq!(packet.event_valid(), 0);
        assert_eq!(packet.iter().count(), 0);

        for n in 0..capacity {
            let event = packet.get_event(n).unwrap();
            assert!(!event.is_valid());
            assert_eq!(event.timestamp(), 0);
            for channel in Imu9Channel::ALL {
                assert_eq!(event.channel(channel), 0.0);
            }
        }
    }

    for capacity in [0, -1, i32::MIN] {
        assert!(PolarityEventPacket::allocate(capacity, 0, 0).is_err());
    }
}

/// Invalidating keeps the slot counted in `event_number`.
#[test]
fn test_invalidate_decouples_counters() {
    let mut packet = PolarityEventPacket::allocate(4, 0, 0).unwrap();
    for n in 0..3 {
        packet.get_event_mut(n).unwrap().validate().unwrap();
    }

    let before = packet.event_valid();
    packet.get_event_mut(2).unwrap().validate().unwrap_err();
    assert_eq!(packet.event_valid(), before);

    packet.get_event_mut(1).unwrap().invalidate().unwrap();
    assert_eq!(packet.event_number(), 3);
    assert_eq!(packet.event_valid(), 2);

    let err = packet.get_event_mut(1).unwrap().invalidate().unwrap_err();
    assert!(matches!(err, EventError::AlreadyInvalid(1)));
    assert_eq!(packet.event_valid(), 2);

    let valid: Vec<i32> = packet.iter_valid().map(|e| e.index()).collect();
    assert_eq!(valid, vec![0, 2]);
}

/// A refused timestamp write leaves the previous value in place.
#[test]
fn test_negative_timestamp_refused() {
    let mut packet = Imu9EventPacket::allocate(1, 0, 0).unwrap();
    let mut event = packet.get_event_mut(0).unwrap();
    event.set_timestamp(1000).unwrap();

    assert!(matches!(
        event.set_timestamp(-1),
        Err(EventError::NegativeTimestamp(-1))
    ));
    assert_eq!(event.timestamp(), 1000);
}

/// Producers split a 64-bit clock into header overflow and record timestamp.
#[test]
fn test_timestamp_wraparound() {
    let clock: i64 = (5i64 << 31) + 123;
    let (overflow, low) = split_timestamp64(clock).unwrap();
    assert_eq!((overflow, low), (5, 123));

    let mut packet = PolarityEventPacket::allocate(1, 0, overflow).unwrap();
    packet.get_event_mut(0).unwrap().set_timestamp(low).unwrap();

    assert_eq!(packet.get_event(0).unwrap().timestamp64(), clock);
    assert_eq!(compose_timestamp64(3, 5), 6_442_450_949);
}

/// The wire layout is little-endian regardless of host.
#[test]
fn test_wire_layout() {
    let mut packet = PolarityEventPacket::allocate(1, 0x0102, 0).unwrap();
    {
        let mut event = packet.get_event_mut(0).unwrap();
        event.set_x(1);
        event.set_timestamp(0x00AB_CDEF).unwrap();
        event.validate().unwrap();
    }

    let bytes = packet.as_bytes();
    assert_eq!(bytes.len(), HEADER_SIZE + 8);
    assert_eq!(&bytes[0..2], &[1, 0]);
    assert_eq!(&bytes[2..4], &[0x02, 0x01]);
    assert_eq!(&bytes[20..24], &[1, 0, 0, 0]);
    assert_eq!(&bytes[24..28], &[1, 0, 0, 0]);

    let data = (1u32 << 17) | 1;
    assert_eq!(&bytes[28..32], &data.to_le_bytes());
    assert_eq!(&bytes[32..36], &[0xEF, 0xCD, 0xAB, 0x00]);
}

/// Packets survive a trip through a file, and the generic view agrees.
#[test]
fn test_file_roundtrip_and_generic_view() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("imu.caer");

    let mut packet = Imu9EventPacket::allocate(3, 2, 1).unwrap();
    for n in 0..2 {
        let mut event = packet.get_event_mut(n).unwrap();
        event.set_timestamp(500 + n).unwrap();
        event.set_accel_z(1.0);
        event.set_temp(30.0 + n as f32);
        event.validate().unwrap();
    }
    write_packet_file(&path, packet.as_bytes()).unwrap();

    let loaded = read_packet_file(&path).unwrap();
    assert_eq!(loaded.event_type(), EventType::Imu9);

    let generic = loaded.as_generic();
    assert_eq!(generic.header().event_capacity(), 3);
    let stamps: Vec<i64> = generic.iter_valid().map(|e| e.timestamp64()).collect();
    assert_eq!(stamps, vec![(1i64 << 31) | 500, (1i64 << 31) | 501]);

    match loaded {
        AnyEventPacket::Imu9(imu) => {
            let event = imu.get_event(1).unwrap();
            assert_eq!(event.temp(), 31.0);
            assert_eq!(event.accel_z(), 1.0);
        }
        AnyEventPacket::Polarity(_) => panic!("expected an IMU9 packet"),
    }
}

/// A slot validated twice counts twice in `event_number`, which may then
/// exceed the capacity. Such a packet must still survive a file round trip.
#[test]
fn test_revalidated_packet_survives_file_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("revalidated.caer");

    let mut packet = PolarityEventPacket::allocate(1, 0, 0).unwrap();
    {
        let mut event = packet.get_event_mut(0).unwrap();
        event.set_x(7);
        event.validate().unwrap();
        event.invalidate().unwrap();
        event.validate().unwrap();
    }
    assert_eq!(packet.event_number(), 2);
    assert_eq!(packet.capacity(), 1);
    write_packet_file(&path, packet.as_bytes()).unwrap();

    let loaded = read_packet_file(&path).unwrap();
    assert_eq!(loaded.as_generic().iter_valid().count(), 1);
    match loaded {
        AnyEventPacket::Polarity(polarity) => {
            let xs: Vec<u16> = polarity.iter_valid().map(|e| e.x()).collect();
            assert_eq!(xs, vec![7]);
            assert_eq!(polarity.event_valid(), 1);
        }
        AnyEventPacket::Imu9(_) => panic!("expected a polarity packet"),
    }
}

/// Corrupted headers are refused instead of producing a packet.
#[test]
fn test_corrupt_packet_rejected() {
    let packet = PolarityEventPacket::allocate(2, 0, 0).unwrap();
    let mut bytes = packet.into_bytes();
    bytes.extend_from_slice(&[0u8; 8]);

    assert!(matches!(
        AnyEventPacket::from_bytes(bytes.clone()),
        Err(EventError::BufferLength { .. })
    ));
    assert!(GenericEventPacket::new(&bytes).is_err());
}

/// CSV export of a file-loaded packet.
#[test]
fn test_csv_export() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("events.csv");

    let mut packet = PolarityEventPacket::allocate(3, 0, 0).unwrap();
    for (n, x) in [10u16, 20, 30].into_iter().enumerate() {
        let mut event = packet.get_event_mut(n as i32).unwrap();
        event.set_x(x);
        event.set_y(x + 1);
        event.set_timestamp(n as i32).unwrap();
        event.validate().unwrap();
    }
    packet.get_event_mut(0).unwrap().invalidate().unwrap();

    let written =
        output::write_polarity_csv(&csv_path, &packet, FieldOrder::XYPT, EventFilter::Valid)
            .unwrap();
    assert_eq!(written, 2);

    let contents = std::fs::read_to_string(&csv_path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines, vec!["x,y,polarity,timestamp", "20,21,0,1", "30,31,0,2"]);
}
