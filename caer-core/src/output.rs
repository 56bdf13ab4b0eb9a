//! CSV export of packet contents.
//!
//! Polarity events are written as `x,y,p,t` lines in a configurable field
//! order, IMU9 events as a timestamp followed by the ten channels. Timestamps
//! are always the 64-bit composed value.

use crate::event::{Event, EventKind};
use crate::imu9::{Imu9, Imu9Channel, Imu9EventPacket};
use crate::packet::EventPacket;
use crate::polarity::{Polarity, PolarityEventPacket};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during output writing.
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Field ordering for polarity CSV output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldOrder {
    /// x, y, p, t (default)
    #[default]
    XYPT,
    /// t, x, y, p
    TXYP,
    /// x, y, t, p
    XYTP,
    /// Custom order specified by indices
    Custom([usize; 4]),
}

impl std::str::FromStr for FieldOrder {
    type Err = OutputError;

    /// Parses a comma-separated column list such as "x,y,p,t" or
    /// "timestamp,x,y,polarity". Each column must appear exactly once.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let columns = s
            .split(',')
            .map(Self::column)
            .collect::<Result<Vec<_>, _>>()?;
        let indices: [usize; 4] = columns.try_into().map_err(|columns: Vec<usize>| {
            OutputError::InvalidFormat(format!(
                "Expected 4 columns (x, y, p, t), got {}",
                columns.len()
            ))
        })?;
        Self::from_indices(indices)
    }
}

impl FieldOrder {
    const NAMES: [&'static str; 4] = ["x", "y", "polarity", "timestamp"];

    /// Column index of a short (`p`) or full (`polarity`) name.
    fn column(name: &str) -> Result<usize, OutputError> {
        let name = name.trim().to_lowercase();
        Self::NAMES
            .iter()
            .position(|full| name == *full || full.get(..1) == Some(name.as_str()))
            .ok_or_else(|| {
                OutputError::InvalidFormat(format!("Unknown column: {}. Use x, y, p, t", name))
            })
    }

    /// Builds an order from column indices (x=0, y=1, p=2, t=3).
    pub fn from_indices(indices: [usize; 4]) -> Result<Self, OutputError> {
        let mut seen = [false; 4];
        for &column in &indices {
            match seen.get_mut(column) {
                Some(slot) if !*slot => *slot = true,
                Some(_) => {
                    return Err(OutputError::InvalidFormat(format!(
                        "Column {} appears more than once",
                        Self::NAMES[column]
                    )))
                }
                None => {
                    return Err(OutputError::InvalidFormat(format!(
                        "Column index {} out of range",
                        column
                    )))
                }
            }
        }

        Ok(match indices {
            [0, 1, 2, 3] => Self::XYPT,
            [3, 0, 1, 2] => Self::TXYP,
            [0, 1, 3, 2] => Self::XYTP,
            custom => Self::Custom(custom),
        })
    }

    /// Column indices (x=0, y=1, p=2, t=3) in output order.
    pub fn indices(&self) -> [usize; 4] {
        match self {
            Self::XYPT => [0, 1, 2, 3],
            Self::TXYP => [3, 0, 1, 2],
            Self::XYTP => [0, 1, 3, 2],
            Self::Custom(indices) => *indices,
        }
    }

    /// The CSV header line for this order.
    pub fn header(&self) -> String {
        self.indices()
            .iter()
            .map(|&i| Self::NAMES[i])
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Which events of a packet are exported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventFilter {
    /// Only events with the valid mark set (default).
    #[default]
    Valid,
    /// Every written event, valid or not.
    All,
}

fn selected<E: EventKind>(
    packet: &EventPacket<E>,
    filter: EventFilter,
) -> impl Iterator<Item = Event<&[u8], E>> + '_ {
    packet
        .iter()
        .filter(move |event| filter == EventFilter::All || event.is_valid())
}

/// CSV output writer for polarity events.
pub struct PolarityCsvWriter<W: Write> {
    writer: BufWriter<W>,
    field_order: FieldOrder,
}

impl<W: Write> PolarityCsvWriter<W> {
    pub fn new(writer: W, field_order: FieldOrder) -> Self {
        Self {
            writer: BufWriter::new(writer),
            field_order,
        }
    }

    /// Writes the column header line.
    pub fn write_header(&mut self) -> Result<(), OutputError> {
        writeln!(self.writer, "{}", self.field_order.header())?;
        Ok(())
    }

    /// Writes the selected events of a packet and returns how many were written.
    pub fn write_packet(
        &mut self,
        packet: &PolarityEventPacket,
        filter: EventFilter,
    ) -> Result<usize, OutputError> {
        let mut written = 0;
        for event in selected(packet, filter) {
            self.write_event(&event)?;
            written += 1;
        }
        Ok(written)
    }

    /// Writes a single polarity event.
    #[inline]
    pub fn write_event<B: AsRef<[u8]>>(
        &mut self,
        event: &Event<B, Polarity>,
    ) -> Result<(), OutputError> {
        let values = [
            event.x() as i64,
            event.y() as i64,
            event.polarity() as i64,
            event.timestamp64(),
        ];
        let [a, b, c, d] = self.field_order.indices();
        writeln!(
            self.writer,
            "{},{},{},{}",
            values[a], values[b], values[c], values[d]
        )?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), OutputError> {
        self.writer.flush()?;
        Ok(())
    }
}

/// CSV output writer for IMU9 events.
pub struct Imu9CsvWriter<W: Write> {
    writer: BufWriter<W>,
}

impl<W: Write> Imu9CsvWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
        }
    }

    /// Writes `timestamp` followed by the channel names.
    pub fn write_header(&mut self) -> Result<(), OutputError> {
        write!(self.writer, "timestamp")?;
        for channel in Imu9Channel::ALL {
            write!(self.writer, ",{}", channel.name())?;
        }
        writeln!(self.writer)?;
        Ok(())
    }

    pub fn write_packet(
        &mut self,
        packet: &Imu9EventPacket,
        filter: EventFilter,
    ) -> Result<usize, OutputError> {
        let mut written = 0;
        for event in selected(packet, filter) {
            self.write_event(&event)?;
            written += 1;
        }
        Ok(written)
    }

    pub fn write_event<B: AsRef<[u8]>>(&mut self, event: &Event<B, Imu9>) -> Result<(), OutputError> {
        write!(self.writer, "{}", event.timestamp64())?;
        for channel in Imu9Channel::ALL {
            write!(self.writer, ",{}", event.channel(channel))?;
        }
        writeln!(self.writer)?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), OutputError> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Writes a polarity packet to a CSV file, returning the number of events written.
pub fn write_polarity_csv<P: AsRef<Path>>(
    path: P,
    packet: &PolarityEventPacket,
    field_order: FieldOrder,
    filter: EventFilter,
) -> Result<usize, OutputError> {
    let file = File::create(path)?;
    let mut writer = PolarityCsvWriter::new(file, field_order);
    writer.write_header()?;
    let written = writer.write_packet(packet, filter)?;
    writer.flush()?;
    Ok(written)
}

/// Writes an IMU9 packet to a CSV file, returning the number of events written.
pub fn write_imu9_csv<P: AsRef<Path>>(
    path: P,
    packet: &Imu9EventPacket,
    filter: EventFilter,
) -> Result<usize, OutputError> {
    let file = File::create(path)?;
    let mut writer = Imu9CsvWriter::new(file);
    writer.write_header()?;
    let written = writer.write_packet(packet, filter)?;
    writer.flush()?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn sample_packet() -> PolarityEventPacket {
        let mut packet = PolarityEventPacket::allocate(3, 0, 1).unwrap();
        for (n, (x, y, p, t)) in [(100u16, 200u16, true, 12345), (101, 201, false, 12346)]
            .into_iter()
            .enumerate()
        {
            let mut event = packet.get_event_mut(n as i32).unwrap();
            event.set_x(x);
            event.set_y(y);
            event.set_polarity(p);
            event.set_timestamp(t).unwrap();
            event.validate().unwrap();
        }
        packet.get_event_mut(1).unwrap().invalidate().unwrap();
        packet
    }

    #[test]
    fn test_field_order_parsing() {
        assert_eq!(FieldOrder::from_str("x,y,p,t").unwrap(), FieldOrder::XYPT);
        assert_eq!(FieldOrder::from_str("t,x,y,p").unwrap(), FieldOrder::TXYP);
        assert_eq!(FieldOrder::from_str("x,y,t,p").unwrap(), FieldOrder::XYTP);
        assert_eq!(
            FieldOrder::from_str("X, Y, P, T").unwrap(),
            FieldOrder::XYPT
        );
        assert_eq!(
            FieldOrder::from_str("p,t,y,x").unwrap(),
            FieldOrder::Custom([2, 3, 1, 0])
        );
    }

    #[test]
    fn test_field_order_invalid() {
        assert!(FieldOrder::from_str("x,y,z,t").is_err());
        assert!(FieldOrder::from_str("x,y,p").is_err());
        assert!(FieldOrder::from_str("x,x,y,t").is_err());
    }

    #[test]
    fn test_field_order_full_names_and_indices() {
        assert_eq!(
            FieldOrder::from_str("timestamp,x,y,polarity").unwrap(),
            FieldOrder::TXYP
        );
        assert_eq!(FieldOrder::from_indices([0, 1, 3, 2]).unwrap(), FieldOrder::XYTP);
        assert!(matches!(
            FieldOrder::from_indices([0, 1, 2, 4]),
            Err(OutputError::InvalidFormat(_))
        ));
        assert!(matches!(
            FieldOrder::from_indices([3, 3, 1, 0]),
            Err(OutputError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_field_order_header() {
        assert_eq!(FieldOrder::XYPT.header(), "x,y,polarity,timestamp");
        assert_eq!(FieldOrder::Custom([2, 3, 1, 0]).header(), "polarity,timestamp,y,x");
    }

    #[test]
    fn test_polarity_csv_valid_only() {
        let packet = sample_packet();
        let mut output = Vec::new();
        {
            let mut writer = PolarityCsvWriter::new(&mut output, FieldOrder::XYPT);
            writer.write_header().unwrap();
            assert_eq!(writer.write_packet(&packet, EventFilter::Valid).unwrap(), 1);
            writer.flush().unwrap();
        }

        let output_str = String::from_utf8(output).unwrap();
        let expected_t = (1i64 << 31) | 12345;
        assert_eq!(
            output_str,
            format!("x,y,polarity,timestamp\n100,200,1,{}\n", expected_t)
        );
    }

    #[test]
    fn test_polarity_csv_all_txyp() {
        let packet = sample_packet();
        let mut output = Vec::new();
        {
            let mut writer = PolarityCsvWriter::new(&mut output, FieldOrder::TXYP);
            assert_eq!(writer.write_packet(&packet, EventFilter::All).unwrap(), 2);
            writer.flush().unwrap();
        }

        let output_str = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = output_str.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], format!("{},101,201,0", (1i64 << 31) | 12346));
    }

    #[test]
    fn test_imu9_csv() {
        let mut packet = Imu9EventPacket::allocate(1, 0, 0).unwrap();
        {
            let mut event = packet.get_event_mut(0).unwrap();
            event.set_timestamp(7).unwrap();
            event.set_temp(21.5);
            event.validate().unwrap();
        }

        let mut output = Vec::new();
        {
            let mut writer = Imu9CsvWriter::new(&mut output);
            writer.write_header().unwrap();
            writer.write_packet(&packet, EventFilter::Valid).unwrap();
            writer.flush().unwrap();
        }

        let output_str = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = output_str.lines().collect();
        assert_eq!(
            lines[0],
            "timestamp,accel_x,accel_y,accel_z,gyro_x,gyro_y,gyro_z,temp,comp_x,comp_y,comp_z"
        );
        assert_eq!(lines[1], "7,0,0,0,0,0,0,21.5,0,0,0");
    }
}
