//! Transport trait for supply communication.
//!
//! The [`Transport`] trait abstracts over the physical link to a power
//! supply. The serial implementation lives in `psulib-transport`; a
//! scripted mock for tests lives in `psulib-test-harness`.
//!
//! Line settings (baud rate, parity, stop bits) and the read timeout belong
//! to the implementation. Protocol engines only move bytes.

use crate::error::Result;

/// Blocking byte-level transport to a supply.
///
/// A transport is exclusively owned by one driver. Nothing here is
/// internally synchronized; sharing one across threads requires the caller
/// to wrap it in a lock.
pub trait Transport: Send {
    /// Write all of `data` to the supply.
    fn send(&mut self, data: &[u8]) -> Result<()>;

    /// Read up to `buf.len()` bytes from the supply.
    ///
    /// Blocks until at least one byte is available or the implementation's
    /// read timeout expires, in which case it returns
    /// [`Error::Timeout`](crate::error::Error::Timeout). Returns the number of
    /// bytes actually read, which may be fewer than requested.
    fn receive(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Close the transport connection.
    ///
    /// After calling `close()`, subsequent `send()` and `receive()` calls
    /// should return [`Error::NotConnected`](crate::error::Error::NotConnected).
    fn close(&mut self) -> Result<()>;

    /// Check whether the transport is currently connected.
    fn is_connected(&self) -> bool;
}
