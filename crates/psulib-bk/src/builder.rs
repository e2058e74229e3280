//! Bk1785Builder -- fluent builder for constructing [`Bk1785`] instances.
//!
//! Separates configuration from construction so that callers can set up
//! serial port parameters, the supply address, and retry bounds before
//! opening the transport.
//!
//! # Example
//!
//! ```no_run
//! use psulib_bk::builder::Bk1785Builder;
//! use psulib_bk::models::bk_1787b;
//! use std::time::Duration;
//!
//! # fn example() -> psulib_core::Result<()> {
//! let psu = Bk1785Builder::new(bk_1787b())
//!     .serial_port("/dev/ttyUSB0")
//!     .baud_rate(38_400)
//!     .retry_delay(Duration::from_millis(20))
//!     .build()?;
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use psulib_core::error::{Error, Result};
use psulib_core::transport::Transport;
use psulib_core::types::RetryPolicy;
use psulib_transport::{SerialConfig, SerialTransport};

use crate::models::{Bk1785Model, DEFAULT_ADDRESS};
use crate::psu::Bk1785;

/// Fluent builder for [`Bk1785`].
///
/// All configuration has sensible defaults derived from the [`Bk1785Model`],
/// so the simplest usage is:
///
/// ```ignore
/// let psu = Bk1785Builder::new(bk_1785b())
///     .serial_port("/dev/ttyUSB0")
///     .build()?;
/// ```
pub struct Bk1785Builder {
    model: Bk1785Model,
    serial_port: Option<String>,
    baud_rate: Option<u32>,
    address: u8,
    max_attempts: u32,
    retry_delay: Duration,
    resync_window: usize,
    read_timeout: Duration,
}

impl Bk1785Builder {
    /// Create a new builder for the given model.
    pub fn new(model: Bk1785Model) -> Self {
        Bk1785Builder {
            model,
            serial_port: None,
            baud_rate: None,
            address: DEFAULT_ADDRESS,
            max_attempts: RetryPolicy::DEFAULT_MAX_ATTEMPTS,
            retry_delay: Duration::ZERO,
            resync_window: RetryPolicy::DEFAULT_RESYNC_WINDOW,
            read_timeout: Duration::from_millis(500),
        }
    }

    /// Set the serial port path (e.g. `/dev/ttyUSB0` or `COM3`).
    pub fn serial_port(mut self, port: &str) -> Self {
        self.serial_port = Some(port.to_string());
        self
    }

    /// Override the model's default baud rate.
    ///
    /// Must match the rate configured in the supply's menu.
    pub fn baud_rate(mut self, baud: u32) -> Self {
        self.baud_rate = Some(baud);
        self
    }

    /// Set the supply address (default: 0).
    ///
    /// Use this when the address has been changed from the factory default,
    /// either in the supply's menu or with
    /// [`Bk1785::set_address`](crate::psu::Bk1785::set_address).
    pub fn address(mut self, address: u8) -> Self {
        self.address = address;
        self
    }

    /// Set the maximum number of frames written per command (default: 10).
    pub fn max_attempts(mut self, n: u32) -> Self {
        self.max_attempts = n;
        self
    }

    /// Set a fixed pause between attempts (default: none).
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Set how many extra bytes the reader may skip while looking for a
    /// start byte (default: 64).
    pub fn resync_window(mut self, bytes: usize) -> Self {
        self.resync_window = bytes;
        self
    }

    /// Set how long one serial read may block (default: 500ms).
    ///
    /// Only used by [`build()`](Self::build); a caller-provided transport
    /// brings its own timeout.
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    fn retry_policy(&self) -> Result<RetryPolicy> {
        if self.max_attempts == 0 {
            return Err(Error::InvalidParameter(
                "max_attempts must be at least 1".into(),
            ));
        }
        Ok(RetryPolicy {
            max_attempts: self.max_attempts,
            delay: self.retry_delay,
            resync_window: self.resync_window,
        })
    }

    fn resolved_baud_rate(&self) -> Result<u32> {
        let baud = self.baud_rate.unwrap_or(self.model.default_baud_rate);
        if !self.model.supports_baud_rate(baud) {
            return Err(Error::InvalidParameter(format!(
                "{} does not support {baud} baud (supported: {:?})",
                self.model.name, self.model.baud_rates
            )));
        }
        Ok(baud)
    }

    /// Build a [`Bk1785`] with a caller-provided transport.
    ///
    /// This is the primary entry point for testing (pass a
    /// `MockTransport` from `psulib-test-harness`) and for
    /// advanced use cases where the caller manages the transport
    /// lifecycle directly.
    pub fn build_with_transport(self, transport: Box<dyn Transport>) -> Result<Bk1785> {
        let policy = self.retry_policy()?;
        Ok(Bk1785::new(transport, self.model, self.address, policy))
    }

    /// Build a [`Bk1785`] using a serial transport.
    ///
    /// Requires that [`serial_port()`](Self::serial_port) has been called.
    /// The baud rate defaults to the model's default if not overridden.
    pub fn build(self) -> Result<Bk1785> {
        let port = self
            .serial_port
            .as_deref()
            .ok_or_else(|| Error::InvalidParameter("serial_port is required for build()".into()))?;
        let config = SerialConfig {
            baud_rate: self.resolved_baud_rate()?,
            timeout: self.read_timeout,
            ..SerialConfig::default()
        };
        // Validate retry bounds before touching the port.
        self.retry_policy()?;

        let transport = SerialTransport::open_with_config(port, config)?;
        self.build_with_transport(Box::new(transport))
    }
}
