//! Serial transport abstractions
//!
//! The M8 enumerates as a USB CDC serial port. These traits cover the
//! handful of operations the session needs: list ports, open one with fixed
//! link parameters, read whatever is buffered, and write with a deadline.

use alloc::string::String;
use alloc::vec::Vec;
use core::time::Duration;

/// Errors reported by a transport backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError {
    /// Backend rejected the arguments (bad port name, bad config)
    InvalidArgs,
    /// Operation failed, including write timeouts and vanished devices
    Failed,
    /// Backend ran out of memory
    OutOfMemory,
    /// Operation not supported by this OS or port type
    Unsupported,
}

impl core::fmt::Display for TransportError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            TransportError::InvalidArgs => write!(f, "invalid transport arguments"),
            TransportError::Failed => write!(f, "transport operation failed"),
            TransportError::OutOfMemory => write!(f, "transport out of memory"),
            TransportError::Unsupported => write!(f, "transport operation not supported"),
        }
    }
}

/// USB vendor and product id of a port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UsbIds {
    pub vid: u16,
    pub pid: u16,
}

/// A port reported by enumeration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortInfo {
    /// Stable OS name of the port (`/dev/ttyACM0`, `COM3`)
    pub name: String,
    /// USB identity, `None` for ports not backed by USB
    pub usb: Option<UsbIds>,
}

impl PortInfo {
    pub fn new(name: impl Into<String>, usb: Option<UsbIds>) -> Self {
        Self {
            name: name.into(),
            usb,
        }
    }

    pub fn usb(name: impl Into<String>, vid: u16, pid: u16) -> Self {
        Self::new(name, Some(UsbIds { vid, pid }))
    }
}

/// An open serial link
pub trait SerialPort {
    /// Read whatever is buffered into `buf` without blocking
    ///
    /// Returns `Ok(0)` when nothing is available.
    fn read_nonblocking(&mut self, buf: &mut [u8]) -> Result<usize, TransportError>;

    /// Write all of `data`, giving up after `timeout`
    ///
    /// A timeout is reported as [`TransportError::Failed`].
    fn write_timeout(&mut self, data: &[u8], timeout: Duration) -> Result<(), TransportError>;

    /// Release the OS handle
    fn close(&mut self);
}

/// Port discovery and opening
pub trait PortEnumerator {
    /// Port type produced by [`PortEnumerator::open`]
    type Port: SerialPort;

    /// List the ports currently present
    fn available_ports(&mut self) -> Result<Vec<PortInfo>, TransportError>;

    /// Open and configure the named port
    fn open(&mut self, name: &str, config: &LinkConfig) -> Result<Self::Port, TransportError>;
}

/// Serial link configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkConfig {
    /// Baud rate in bits per second
    pub baudrate: u32,
    /// Number of data bits (typically 8)
    pub data_bits: DataBits,
    /// Parity mode
    pub parity: Parity,
    /// Number of stop bits
    pub stop_bits: StopBits,
    /// Flow control mode
    pub flow_control: FlowControl,
}

impl Default for LinkConfig {
    /// Parameters the M8 expects: 115200 8N1, no flow control
    fn default() -> Self {
        Self {
            baudrate: 115200,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
            flow_control: FlowControl::None,
        }
    }
}

/// Number of data bits per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataBits {
    Seven,
    Eight,
}

/// Parity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Number of stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopBits {
    One,
    Two,
}

/// Flow control mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlowControl {
    None,
    Software,
    Hardware,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_link_config_is_115200_8n1() {
        let config = LinkConfig::default();
        assert_eq!(config.baudrate, 115200);
        assert_eq!(config.data_bits, DataBits::Eight);
        assert_eq!(config.parity, Parity::None);
        assert_eq!(config.stop_bits, StopBits::One);
        assert_eq!(config.flow_control, FlowControl::None);
    }

    #[test]
    fn test_port_info_usb() {
        let port = PortInfo::usb("/dev/ttyACM0", 0x16C0, 0x048A);
        assert_eq!(
            port.usb,
            Some(UsbIds {
                vid: 0x16C0,
                pid: 0x048A
            })
        );
    }
}
