//! Serial port transport for supply communication.
//!
//! This module provides [`SerialTransport`], which implements the
//! [`Transport`] trait for USB virtual COM ports and physical RS-232/TTL
//! serial connections.
//!
//! Bench supplies with a serial interface typically run:
//! - BK Precision 1785B series: 4800/9600/19200/38400 baud, 8N1 (9600 default)
//!
//! # Example
//!
//! ```no_run
//! use psulib_transport::SerialTransport;
//! use psulib_core::transport::Transport;
//!
//! # fn example() -> psulib_core::Result<()> {
//! let mut transport = SerialTransport::open("/dev/ttyUSB0", 9600)?;
//!
//! // Read-config request to a 1785B-series supply at address 0
//! let mut frame = [0u8; 26];
//! frame[0] = 0xAA;
//! frame[2] = 0x26;
//! frame[25] = 0xD0;
//! transport.send(&frame)?;
//!
//! let mut buf = [0u8; 26];
//! let n = transport.receive(&mut buf)?;
//! # Ok(())
//! # }
//! ```

use std::io::{Read, Write};
use std::time::Duration;

use psulib_core::error::{Error, Result};
use psulib_core::transport::Transport;
use serialport::SerialPort;

/// Serial port configuration.
///
/// Defaults are appropriate for most bench supplies:
/// - 9600 baud
/// - 8 data bits
/// - 1 stop bit
/// - No parity
/// - No flow control
/// - 500 ms read timeout
#[derive(Debug, Clone)]
pub struct SerialConfig {
    /// Baud rate (e.g., 4800, 9600, 19200, 38400)
    pub baud_rate: u32,
    /// Number of data bits (typically 8)
    pub data_bits: DataBits,
    /// Number of stop bits (typically 1)
    pub stop_bits: StopBits,
    /// Parity checking (typically None)
    pub parity: Parity,
    /// Flow control (typically None)
    pub flow_control: FlowControl,
    /// How long a single read blocks before reporting a timeout.
    pub timeout: Duration,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            baud_rate: 9600,
            data_bits: DataBits::Eight,
            stop_bits: StopBits::One,
            parity: Parity::None,
            flow_control: FlowControl::None,
            timeout: Duration::from_millis(500),
        }
    }
}

/// Number of data bits per character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataBits {
    Five,
    Six,
    Seven,
    Eight,
}

impl From<DataBits> for serialport::DataBits {
    fn from(bits: DataBits) -> Self {
        match bits {
            DataBits::Five => serialport::DataBits::Five,
            DataBits::Six => serialport::DataBits::Six,
            DataBits::Seven => serialport::DataBits::Seven,
            DataBits::Eight => serialport::DataBits::Eight,
        }
    }
}

/// Number of stop bits per character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopBits {
    One,
    Two,
}

impl From<StopBits> for serialport::StopBits {
    fn from(bits: StopBits) -> Self {
        match bits {
            StopBits::One => serialport::StopBits::One,
            StopBits::Two => serialport::StopBits::Two,
        }
    }
}

/// Parity checking mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parity {
    None,
    Odd,
    Even,
}

impl From<Parity> for serialport::Parity {
    fn from(parity: Parity) -> Self {
        match parity {
            Parity::None => serialport::Parity::None,
            Parity::Odd => serialport::Parity::Odd,
            Parity::Even => serialport::Parity::Even,
        }
    }
}

/// Flow control mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowControl {
    None,
    Software,
    Hardware,
}

impl From<FlowControl> for serialport::FlowControl {
    fn from(flow: FlowControl) -> Self {
        match flow {
            FlowControl::None => serialport::FlowControl::None,
            FlowControl::Software => serialport::FlowControl::Software,
            FlowControl::Hardware => serialport::FlowControl::Hardware,
        }
    }
}

/// Map an I/O error from the port onto the library error type.
fn map_io_error(e: std::io::Error) -> Error {
    match e.kind() {
        std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock => Error::Timeout,
        std::io::ErrorKind::BrokenPipe | std::io::ErrorKind::NotConnected => {
            Error::ConnectionLost
        }
        _ => Error::Io(e),
    }
}

/// Serial port transport for supply communication.
///
/// Implements the [`Transport`] trait over a blocking `serialport` handle.
pub struct SerialTransport {
    /// The underlying serial port
    port: Option<Box<dyn SerialPort>>,
    /// Port name for logging/debugging
    port_name: String,
}

impl SerialTransport {
    /// Open a serial port with the given baud rate and default settings.
    ///
    /// # Arguments
    ///
    /// * `port` - Serial port path (e.g., "/dev/ttyUSB0" on Linux, "COM3" on Windows)
    /// * `baud_rate` - Baud rate (e.g., 4800, 9600, 19200, 38400)
    pub fn open(port: &str, baud_rate: u32) -> Result<Self> {
        let config = SerialConfig {
            baud_rate,
            ..Default::default()
        };
        Self::open_with_config(port, config)
    }

    /// Open a serial port with full configuration control.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use psulib_transport::{SerialTransport, SerialConfig, DataBits, StopBits, Parity, FlowControl};
    /// # use std::time::Duration;
    /// # fn example() -> psulib_core::Result<()> {
    /// let config = SerialConfig {
    ///     baud_rate: 38400,
    ///     data_bits: DataBits::Eight,
    ///     stop_bits: StopBits::One,
    ///     parity: Parity::None,
    ///     flow_control: FlowControl::None,
    ///     timeout: Duration::from_millis(250),
    /// };
    /// let transport = SerialTransport::open_with_config("/dev/ttyUSB0", config)?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn open_with_config(port: &str, config: SerialConfig) -> Result<Self> {
        tracing::debug!(
            port = %port,
            baud_rate = config.baud_rate,
            data_bits = ?config.data_bits,
            stop_bits = ?config.stop_bits,
            parity = ?config.parity,
            flow_control = ?config.flow_control,
            timeout_ms = config.timeout.as_millis(),
            "Opening serial port"
        );

        let serial_port = serialport::new(port, config.baud_rate)
            .data_bits(config.data_bits.into())
            .stop_bits(config.stop_bits.into())
            .parity(config.parity.into())
            .flow_control(config.flow_control.into())
            .timeout(config.timeout)
            .open()
            .map_err(|e| {
                tracing::error!(port = %port, error = %e, "Failed to open serial port");
                Error::Transport(format!("Failed to open serial port {}: {}", port, e))
            })?;

        tracing::info!(port = %port, baud_rate = config.baud_rate, "Serial port opened successfully");

        Ok(Self {
            port: Some(serial_port),
            port_name: port.to_string(),
        })
    }

    /// Get the name of the serial port.
    pub fn port_name(&self) -> &str {
        &self.port_name
    }
}

impl Transport for SerialTransport {
    fn send(&mut self, data: &[u8]) -> Result<()> {
        let port = self.port.as_mut().ok_or(Error::NotConnected)?;

        tracing::trace!(
            port = %self.port_name,
            bytes = data.len(),
            data = ?data,
            "Sending data"
        );

        port.write_all(data).map_err(|e| {
            tracing::error!(port = %self.port_name, error = %e, "Failed to send data");
            map_io_error(e)
        })?;

        port.flush().map_err(|e| {
            tracing::error!(port = %self.port_name, error = %e, "Failed to flush serial port");
            Error::Io(e)
        })?;

        Ok(())
    }

    fn receive(&mut self, buf: &mut [u8]) -> Result<usize> {
        let port = self.port.as_mut().ok_or(Error::NotConnected)?;

        match port.read(buf) {
            Ok(0) => {
                tracing::trace!(port = %self.port_name, "No data before timeout");
                Err(Error::Timeout)
            }
            Ok(n) => {
                tracing::trace!(
                    port = %self.port_name,
                    bytes = n,
                    data = ?&buf[..n],
                    "Received data"
                );
                Ok(n)
            }
            Err(e) => {
                let err = map_io_error(e);
                if matches!(err, Error::Timeout) {
                    tracing::trace!(port = %self.port_name, "Timeout waiting for data");
                } else {
                    tracing::error!(port = %self.port_name, error = %err, "Failed to receive data");
                }
                Err(err)
            }
        }
    }

    fn close(&mut self) -> Result<()> {
        if let Some(mut port) = self.port.take() {
            tracing::debug!(port = %self.port_name, "Closing serial port");

            if let Err(e) = port.flush() {
                tracing::warn!(
                    port = %self.port_name,
                    error = %e,
                    "Failed to flush before closing (continuing anyway)"
                );
            }

            tracing::info!(port = %self.port_name, "Serial port closed");
        }

        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.port.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serial_config_default() {
        let config = SerialConfig::default();
        assert_eq!(config.baud_rate, 9600);
        assert_eq!(config.data_bits, DataBits::Eight);
        assert_eq!(config.stop_bits, StopBits::One);
        assert_eq!(config.parity, Parity::None);
        assert_eq!(config.flow_control, FlowControl::None);
        assert_eq!(config.timeout, Duration::from_millis(500));
    }

    #[test]
    fn test_line_setting_conversion() {
        assert_eq!(
            serialport::DataBits::from(DataBits::Eight),
            serialport::DataBits::Eight
        );
        assert_eq!(
            serialport::StopBits::from(StopBits::Two),
            serialport::StopBits::Two
        );
        assert_eq!(
            serialport::Parity::from(Parity::Even),
            serialport::Parity::Even
        );
        assert_eq!(
            serialport::FlowControl::from(FlowControl::Hardware),
            serialport::FlowControl::Hardware
        );
    }

    #[test]
    fn test_io_error_mapping() {
        let timed_out = std::io::Error::new(std::io::ErrorKind::TimedOut, "t");
        assert!(matches!(map_io_error(timed_out), Error::Timeout));

        let broken = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "b");
        assert!(matches!(map_io_error(broken), Error::ConnectionLost));

        let other = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "p");
        assert!(matches!(map_io_error(other), Error::Io(_)));
    }

    #[test]
    fn test_open_missing_port_fails() {
        let result = SerialTransport::open("/dev/psulib-does-not-exist", 9600);
        assert!(matches!(result, Err(Error::Transport(_))));
    }
}
