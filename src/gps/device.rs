// src/gps/device.rs
//! Serial port discovery and the open device handle

use super::{data::RawSentence, nmea};
use crate::error::{Result, TrackerError};
use std::{
    fmt,
    io::{self, BufRead, BufReader, Read},
    time::Duration,
};
use tokio_serial::{SerialPortInfo, SerialPortType};
use tracing::{debug, info, warn};

/// A port reported by the operating system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialPortDescriptor {
    pub name: String,
    pub kind: String,
}

impl SerialPortDescriptor {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
        }
    }
}

impl From<SerialPortInfo> for SerialPortDescriptor {
    fn from(info: SerialPortInfo) -> Self {
        let kind = match info.port_type {
            SerialPortType::UsbPort(usb) => match usb.product {
                Some(product) => format!("USB ({})", product),
                None => "USB".to_string(),
            },
            SerialPortType::PciPort => "PCI".to_string(),
            SerialPortType::BluetoothPort => "Bluetooth".to_string(),
            SerialPortType::Unknown => "Unknown".to_string(),
        };
        Self::new(info.port_name, kind)
    }
}

/// Line settings used for every port we open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkSettings {
    pub baud_rate: u32,
    pub read_timeout: Duration,
}

impl Default for LinkSettings {
    fn default() -> Self {
        Self {
            baud_rate: 9600,
            read_timeout: Duration::from_secs(1),
        }
    }
}

/// An open, exclusively owned line reader over a serial device.
///
/// The underlying port is closed when the handle is dropped.
pub struct DeviceHandle {
    port_name: String,
    reader: BufReader<Box<dyn Read + Send>>,
}

impl DeviceHandle {
    pub fn new(port_name: impl Into<String>, stream: impl Read + Send + 'static) -> Self {
        Self {
            port_name: port_name.into(),
            reader: BufReader::new(Box::new(stream)),
        }
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    /// Read one line from the device.
    ///
    /// Returns `None` unless a full `\n`-terminated line arrived. A read
    /// timeout or end of stream is not an error; the unterminated bytes are
    /// dropped.
    pub fn read_sentence(&mut self) -> Result<Option<RawSentence>> {
        let mut buf = Vec::new();
        match self.reader.read_until(b'\n', &mut buf) {
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::TimedOut => {
                debug!(port = %self.port_name, partial = buf.len(), "Serial read timed out");
            }
            Err(e) => return Err(TrackerError::Io(e)),
        }

        if buf.last() != Some(&b'\n') {
            if !buf.is_empty() {
                debug!(
                    port = %self.port_name,
                    line = %RawSentence::from_bytes(&buf),
                    "Discarding unterminated line"
                );
            }
            return Ok(None);
        }
        Ok(Some(RawSentence::from_bytes(&buf)))
    }
}

impl fmt::Debug for DeviceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceHandle")
            .field("port_name", &self.port_name)
            .finish_non_exhaustive()
    }
}

/// Source of serial ports: the host system, or a fake in tests.
pub trait PortProvider {
    fn available_ports(&self) -> Result<Vec<SerialPortDescriptor>>;

    fn open(&self, port: &SerialPortDescriptor, settings: &LinkSettings) -> Result<DeviceHandle>;
}

/// Ports of the running host, opened through `tokio_serial`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemPorts;

impl PortProvider for SystemPorts {
    fn available_ports(&self) -> Result<Vec<SerialPortDescriptor>> {
        let ports = tokio_serial::available_ports()?;
        Ok(ports.into_iter().map(SerialPortDescriptor::from).collect())
    }

    fn open(&self, port: &SerialPortDescriptor, settings: &LinkSettings) -> Result<DeviceHandle> {
        let serial = tokio_serial::new(port.name.as_str(), settings.baud_rate)
            .timeout(settings.read_timeout)
            .open()?;
        Ok(DeviceHandle::new(port.name.clone(), serial))
    }
}

/// List the ports a provider currently reports.
pub fn list_ports<P: PortProvider + ?Sized>(provider: &P) -> Result<Vec<SerialPortDescriptor>> {
    provider
        .available_ports()
        .map_err(|e| TrackerError::Other(format!("Failed to list serial ports: {}", e)))
}

/// Scan ports in enumeration order and return the first one emitting GPS
/// sentences.
///
/// Ports that fail to open or read are skipped. Non-matching ports are closed
/// before the next one is tried, and scanning stops at the first match.
pub fn find_device<P: PortProvider + ?Sized>(
    provider: &P,
    settings: &LinkSettings,
) -> Option<DeviceHandle> {
    let ports = match provider.available_ports() {
        Ok(ports) => ports,
        Err(e) => {
            warn!("Failed to enumerate serial ports: {}", e);
            return None;
        }
    };

    for port in &ports {
        match check_port(provider, port, settings) {
            Ok(Some(handle)) => {
                info!(port = %port.name, "GPS device found");
                return Some(handle);
            }
            Ok(None) => debug!(port = %port.name, "No GPS output, closing port"),
            Err(e) => warn!("Error testing port {}: {}", port.name, e),
        }
    }

    info!(scanned = ports.len(), "No GPS device found");
    None
}

fn check_port<P: PortProvider + ?Sized>(
    provider: &P,
    port: &SerialPortDescriptor,
    settings: &LinkSettings,
) -> Result<Option<DeviceHandle>> {
    let mut handle = provider
        .open(port, settings)
        .map_err(|e| TrackerError::port_unavailable(port.name.as_str(), e))?;

    let Some(line) = handle.read_sentence()? else {
        return Ok(None);
    };
    debug!(port = %port.name, line = %line, "Discovery read");

    Ok(nmea::is_gps_sentence(&line).then_some(handle))
}
