//! 9-axis IMU events.
//!
//! Readings from the inertial measurement unit: 3-axis accelerometer,
//! 3-axis gyroscope, temperature and 3-axis magnetometer. The record is 48
//! bytes: the `info` word, the timestamp and ten IEEE 754 binary32 values,
//! all little-endian. Only bit 0 of `info` (the valid mark) is assigned;
//! the remaining bits are reserved and need not be zero.

use crate::event::{Event, EventKind};
use crate::header::EventType;
use crate::packet::EventPacket;
use byteorder::{ByteOrder, LittleEndian};

/// Marker for IMU9 event packets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Imu9;

impl EventKind for Imu9 {
    const TYPE: EventType = EventType::Imu9;
    const SIZE: usize = 48;
    const TS_OFFSET: usize = 4;
    const SUBSYSTEM: &'static str = "IMU9 Event";
}

pub type Imu9EventPacket = EventPacket<Imu9>;
pub type Imu9Event<'a> = Event<&'a [u8], Imu9>;
pub type Imu9EventMut<'a> = Event<&'a mut [u8], Imu9>;

/// Measurement channels, in record order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Imu9Channel {
    /// Acceleration on X, in g (9.81 m/s²)
    AccelX,
    AccelY,
    AccelZ,
    /// Rotation around X, in °/s
    GyroX,
    GyroY,
    GyroZ,
    /// Temperature, in °C
    Temp,
    /// Magnetometer X, in µT
    CompX,
    CompY,
    CompZ,
}

const FIRST_CHANNEL_OFFSET: usize = 8;

impl Imu9Channel {
    pub const ALL: [Self; 10] = [
        Self::AccelX,
        Self::AccelY,
        Self::AccelZ,
        Self::GyroX,
        Self::GyroY,
        Self::GyroZ,
        Self::Temp,
        Self::CompX,
        Self::CompY,
        Self::CompZ,
    ];

    /// Byte offset of this channel inside a record.
    #[inline]
    pub fn offset(self) -> usize {
        FIRST_CHANNEL_OFFSET + 4 * self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::AccelX => "accel_x",
            Self::AccelY => "accel_y",
            Self::AccelZ => "accel_z",
            Self::GyroX => "gyro_x",
            Self::GyroY => "gyro_y",
            Self::GyroZ => "gyro_z",
            Self::Temp => "temp",
            Self::CompX => "comp_x",
            Self::CompY => "comp_y",
            Self::CompZ => "comp_z",
        }
    }
}

impl<B: AsRef<[u8]>> Event<B, Imu9> {
    /// The `info` word in host order.
    #[inline]
    pub fn info(&self) -> u32 {
        self.first_word()
    }

    /// Reads one channel, converting from little-endian on every call.
    #[inline]
    pub fn channel(&self, channel: Imu9Channel) -> f32 {
        let offset = channel.offset();
        LittleEndian::read_f32(&self.record()[offset..offset + 4])
    }

    pub fn accel_x(&self) -> f32 {
        self.channel(Imu9Channel::AccelX)
    }

    pub fn accel_y(&self) -> f32 {
        self.channel(Imu9Channel::AccelY)
    }

    pub fn accel_z(&self) -> f32 {
        self.channel(Imu9Channel::AccelZ)
    }

    pub fn gyro_x(&self) -> f32 {
        self.channel(Imu9Channel::GyroX)
    }

    pub fn gyro_y(&self) -> f32 {
        self.channel(Imu9Channel::GyroY)
    }

    pub fn gyro_z(&self) -> f32 {
        self.channel(Imu9Channel::GyroZ)
    }

    pub fn temp(&self) -> f32 {
        self.channel(Imu9Channel::Temp)
    }

    pub fn comp_x(&self) -> f32 {
        self.channel(Imu9Channel::CompX)
    }

    pub fn comp_y(&self) -> f32 {
        self.channel(Imu9Channel::CompY)
    }

    pub fn comp_z(&self) -> f32 {
        self.channel(Imu9Channel::CompZ)
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> Event<B, Imu9> {
    /// Overwrites one channel.
    #[inline]
    pub fn set_channel(&mut self, channel: Imu9Channel, value: f32) {
        let offset = channel.offset();
        LittleEndian::write_f32(&mut self.record_mut()[offset..offset + 4], value);
    }

    pub fn set_accel_x(&mut self, value: f32) {
        self.set_channel(Imu9Channel::AccelX, value);
    }

    pub fn set_accel_y(&mut self, value: f32) {
        self.set_channel(Imu9Channel::AccelY, value);
    }

    pub fn set_accel_z(&mut self, value: f32) {
        self.set_channel(Imu9Channel::AccelZ, value);
    }

    pub fn set_gyro_x(&mut self, value: f32) {
        self.set_channel(Imu9Channel::GyroX, value);
    }

    pub fn set_gyro_y(&mut self, value: f32) {
        self.set_channel(Imu9Channel::GyroY, value);
    }

    pub fn set_gyro_z(&mut self, value: f32) {
        self.set_channel(Imu9Channel::GyroZ, value);
    }

    pub fn set_temp(&mut self, value: f32) {
        self.set_channel(Imu9Channel::Temp, value);
    }

    pub fn set_comp_x(&mut self, value: f32) {
        self.set_channel(Imu9Channel::CompX, value);
    }

    pub fn set_comp_y(&mut self, value: f32) {
        self.set_channel(Imu9Channel::CompY, value);
    }

    pub fn set_comp_z(&mut self, value: f32) {
        self.set_channel(Imu9Channel::CompZ, value);
    }
}
