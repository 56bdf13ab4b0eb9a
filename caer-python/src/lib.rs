//! Python bindings for event packets with numpy column access.
//!
//! Packets are decoded once into columnar vectors (one per field) which are
//! then handed to numpy on demand.

use caer_core::{
    read_packet_file, AnyEventPacket, EventError, Imu9Channel, Imu9EventPacket,
    PolarityEventPacket,
};
use numpy::{IntoPyArray, PyArray1};
use pyo3::exceptions::{PyIOError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyDict;

fn to_py_err(err: EventError) -> PyErr {
    match err {
        EventError::Io(e) => PyIOError::new_err(format!("Failed to read packet: {}", e)),
        other => PyValueError::new_err(format!("Invalid event packet: {}", other)),
    }
}

/// Container for decoded polarity events.
#[pyclass]
pub struct PolarityEvents {
    /// X addresses
    x: Vec<u16>,
    /// Y addresses
    y: Vec<u16>,
    /// Polarities: 1 = ON, 0 = OFF
    polarity: Vec<u8>,
    /// 64-bit timestamps in microseconds
    timestamp: Vec<i64>,
    /// Valid marks
    valid: Vec<bool>,
    /// Source id from the packet header
    source: i16,
}

#[pymethods]
impl PolarityEvents {
    fn __len__(&self) -> usize {
        self.x.len()
    }

    fn __repr__(&self) -> String {
        format!(
            "PolarityEvents(count={}, source={})",
            self.x.len(),
            self.source
        )
    }

    #[getter]
    fn x<'py>(&self, py: Python<'py>) -> &'py PyArray1<u16> {
        self.x.clone().into_pyarray(py)
    }

    #[getter]
    fn y<'py>(&self, py: Python<'py>) -> &'py PyArray1<u16> {
        self.y.clone().into_pyarray(py)
    }

    #[getter]
    fn polarity<'py>(&self, py: Python<'py>) -> &'py PyArray1<u8> {
        self.polarity.clone().into_pyarray(py)
    }

    /// Alias for polarity (shorter name).
    #[getter]
    fn p<'py>(&self, py: Python<'py>) -> &'py PyArray1<u8> {
        self.polarity.clone().into_pyarray(py)
    }

    #[getter]
    fn timestamp<'py>(&self, py: Python<'py>) -> &'py PyArray1<i64> {
        self.timestamp.clone().into_pyarray(py)
    }

    /// Alias for timestamp (shorter name).
    #[getter]
    fn t<'py>(&self, py: Python<'py>) -> &'py PyArray1<i64> {
        self.timestamp.clone().into_pyarray(py)
    }

    #[getter]
    fn valid<'py>(&self, py: Python<'py>) -> &'py PyArray1<bool> {
        self.valid.clone().into_pyarray(py)
    }

    #[getter]
    fn source(&self) -> i16 {
        self.source
    }

    /// Returns all arrays as a dictionary, e.g. for a pandas DataFrame.
    fn to_dict<'py>(&self, py: Python<'py>) -> PyResult<PyObject> {
        let dict = PyDict::new(py);
        dict.set_item("x", self.x.clone().into_pyarray(py))?;
        dict.set_item("y", self.y.clone().into_pyarray(py))?;
        dict.set_item("polarity", self.polarity.clone().into_pyarray(py))?;
        dict.set_item("timestamp", self.timestamp.clone().into_pyarray(py))?;
        dict.set_item("valid", self.valid.clone().into_pyarray(py))?;
        Ok(dict.into())
    }
}

impl PolarityEvents {
    fn from_packet(packet: &PolarityEventPacket, all: bool) -> Self {
        let len = packet.event_number().max(0) as usize;
        let mut events = Self {
            x: Vec::with_capacity(len),
            y: Vec::with_capacity(len),
            polarity: Vec::with_capacity(len),
            timestamp: Vec::with_capacity(len),
            valid: Vec::with_capacity(len),
            source: packet.source(),
        };

        for event in packet.iter().filter(|e| all || e.is_valid()) {
            events.x.push(event.x());
            events.y.push(event.y());
            events.polarity.push(event.polarity() as u8);
            events.timestamp.push(event.timestamp64());
            events.valid.push(event.is_valid());
        }

        events
    }
}

/// Container for decoded IMU9 events.
#[pyclass]
pub struct Imu9Events {
    timestamp: Vec<i64>,
    valid: Vec<bool>,
    /// One column per channel, in record order
    channels: Vec<Vec<f32>>,
    source: i16,
}

#[pymethods]
impl Imu9Events {
    fn __len__(&self) -> usize {
        self.timestamp.len()
    }

    fn __repr__(&self) -> String {
        format!(
            "Imu9Events(count={}, source={})",
            self.timestamp.len(),
            self.source
        )
    }

    #[getter]
    fn timestamp<'py>(&self, py: Python<'py>) -> &'py PyArray1<i64> {
        self.timestamp.clone().into_pyarray(py)
    }

    #[getter]
    fn valid<'py>(&self, py: Python<'py>) -> &'py PyArray1<bool> {
        self.valid.clone().into_pyarray(py)
    }

    #[getter]
    fn source(&self) -> i16 {
        self.source
    }

    /// Returns one channel by name (accel_x ... comp_z).
    fn channel<'py>(&self, py: Python<'py>, name: &str) -> PyResult<&'py PyArray1<f32>> {
        Imu9Channel::ALL
            .iter()
            .position(|c| c.name() == name)
            .map(|i| self.channels[i].clone().into_pyarray(py))
            .ok_or_else(|| PyValueError::new_err(format!("Unknown IMU9 channel: {}", name)))
    }

    /// Returns the timestamp, valid marks and every channel as a dictionary.
    fn to_dict<'py>(&self, py: Python<'py>) -> PyResult<PyObject> {
        let dict = PyDict::new(py);
        dict.set_item("timestamp", self.timestamp.clone().into_pyarray(py))?;
        dict.set_item("valid", self.valid.clone().into_pyarray(py))?;
        for (channel, column) in Imu9Channel::ALL.iter().zip(&self.channels) {
            dict.set_item(channel.name(), column.clone().into_pyarray(py))?;
        }
        Ok(dict.into())
    }
}

impl Imu9Events {
    fn from_packet(packet: &Imu9EventPacket, all: bool) -> Self {
        let len = packet.event_number().max(0) as usize;
        let mut events = Self {
            timestamp: Vec::with_capacity(len),
            valid: Vec::with_capacity(len),
            channels: vec![Vec::with_capacity(len); Imu9Channel::ALL.len()],
            source: packet.source(),
        };

        for event in packet.iter().filter(|e| all || e.is_valid()) {
            events.timestamp.push(event.timestamp64());
            events.valid.push(event.is_valid());
            for (column, channel) in events.channels.iter_mut().zip(Imu9Channel::ALL) {
                column.push(event.channel(channel));
            }
        }

        events
    }
}

fn into_py_events(py: Python<'_>, packet: AnyEventPacket, all: bool) -> PyResult<PyObject> {
    match packet {
        AnyEventPacket::Polarity(packet) => {
            let events = PolarityEvents::from_packet(&packet, all);
            Ok(Py::new(py, events)?.into_py(py))
        }
        AnyEventPacket::Imu9(packet) => {
            let events = Imu9Events::from_packet(&packet, all);
            Ok(Py::new(py, events)?.into_py(py))
        }
    }
}

/// Decodes one event packet from bytes.
///
/// Args:
///     data: Raw packet bytes, header first
///     all: Also return events whose valid mark is cleared (default: False)
///
/// Returns:
///     PolarityEvents or Imu9Events, depending on the packet header
#[pyfunction]
#[pyo3(signature = (data, all=false))]
fn decode_packet(py: Python<'_>, data: &[u8], all: bool) -> PyResult<PyObject> {
    let packet = AnyEventPacket::from_bytes(data.to_vec()).map_err(to_py_err)?;
    into_py_events(py, packet, all)
}

/// Decodes an event packet file.
///
/// Example:
///     >>> import caer
///     >>> events = caer.decode_file("dvs.caer")
///     >>> print(f"Decoded {len(events)} events")
///     >>> x = events.x
#[pyfunction]
#[pyo3(signature = (path, all=false))]
fn decode_file(py: Python<'_>, path: &str, all: bool) -> PyResult<PyObject> {
    let packet = read_packet_file(path).map_err(to_py_err)?;
    into_py_events(py, packet, all)
}

/// Event packet module for Python.
#[pymodule]
fn caer(_py: Python<'_>, m: &PyModule) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(decode_packet, m)?)?;
    m.add_function(wrap_pyfunction!(decode_file, m)?)?;
    m.add_class::<PolarityEvents>()?;
    m.add_class::<Imu9Events>()?;
    Ok(())
}
