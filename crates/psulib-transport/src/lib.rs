//! Transport implementations for psulib.
//!
//! This crate provides concrete implementations of the
//! [`Transport`](psulib_core::Transport) trait from `psulib-core`:
//!
//! - [`SerialTransport`]: USB virtual COM ports and RS-232/TTL serial
//!   connections, via the blocking `serialport` crate
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
//! let mut buf = [0u8; 26];
//! let n = transport.receive(&mut buf)?;
//! # Ok(())
//! # }
//! ```

pub mod serial;

pub use serial::{DataBits, FlowControl, Parity, SerialConfig, SerialTransport, StopBits};
