//! BK Precision 1785B-series protocol backend for psulib.
//!
//! This crate implements the fixed-length binary protocol spoken by the
//! 1785B/1786B/1787B/1788B programmable supplies. It provides:
//!
//! - **Frame codec** ([`frame`]) -- 26-byte frames with a start byte,
//!   address, command, little-endian payload, and additive checksum.
//! - **Scaling** ([`scale`]) -- volts/amps to and from the protocol's
//!   milli-units, with range checks against the field width.
//! - **Command builders** ([`commands`]) -- the opcode table and pure
//!   functions building a frame for each supported operation.
//! - **Frame reader** ([`reader`]) -- reads one frame, resynchronizing on
//!   the start byte when the stream is out of phase.
//! - **Dispatcher** ([`io`]) -- send/read/check exchanges with bounded
//!   retries.
//! - **Status decoding** ([`status`]) -- the read-config response as a
//!   [`StatusSnapshot`](psulib_core::StatusSnapshot).
//! - **Model definitions** ([`models`]) -- ratings and baud rates for each
//!   supported supply.
//! - **Bk1785** ([`psu`]) -- the [`PowerSupply`](psulib_core::PowerSupply)
//!   implementation that ties the protocol to a
//!   [`Transport`](psulib_core::Transport).
//! - **Bk1785Builder** ([`builder`]) -- fluent builder for constructing
//!   `Bk1785` instances with configurable address, baud rate and retries.
//!
//! # Example
//!
//! ```
//! use psulib_bk::commands::cmd_read_config;
//! use psulib_bk::io::check_ack;
//! use psulib_bk::frame::encode_frame;
//!
//! // Read-config request to the supply at address 0
//! let request = cmd_read_config(0x00).unwrap();
//! assert_eq!(&request.as_bytes()[..3], &[0xAA, 0x00, 0x26]);
//! assert_eq!(request.checksum(), 0xD0);
//!
//! // A successful acknowledgement from that supply
//! let ack = encode_frame(0x00, &[0x12, 0x80]).unwrap();
//! assert!(check_ack(&ack, 0x00).is_ok());
//! ```

pub mod builder;
pub mod commands;
pub mod frame;
pub mod io;
pub mod models;
pub mod psu;
pub mod reader;
pub mod scale;
pub mod status;

pub use builder::Bk1785Builder;
pub use psu::Bk1785;
