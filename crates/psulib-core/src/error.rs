//! Error types for psulib.
//!
//! All fallible operations across the library return [`Result<T>`], which
//! uses [`Error`] as the error type. Transport-layer, protocol-layer, and
//! caller input errors are all captured here.

/// Why a single request/response exchange with the supply did not succeed.
///
/// The retry loop absorbs these; they only reach the caller as the `last`
/// field of [`Error::TransmitFailed`] once every attempt has been used up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AttemptFailure {
    /// No start marker was found within the resync window, or the
    /// transport timed out before a full frame arrived.
    #[error("framing lost")]
    FramingLoss,

    /// A framed response arrived, but from the wrong address or carrying
    /// an unexpected command byte.
    #[error("unexpected response (address 0x{address:02X}, command 0x{command:02X})")]
    Mismatch {
        /// Address byte of the response.
        address: u8,
        /// Command byte of the response.
        command: u8,
    },

    /// The response checksum did not match the sum of its first 25 bytes.
    #[error("checksum mismatch (expected 0x{expected:02X}, received 0x{received:02X})")]
    BadChecksum {
        /// Checksum computed over the received bytes.
        expected: u8,
        /// Checksum byte carried by the frame.
        received: u8,
    },

    /// The supply answered with an acknowledgement code other than success.
    #[error("negative acknowledgement (code 0x{0:02X})")]
    Nak(u8),

    /// The retry policy allowed zero attempts, so nothing was sent.
    #[error("no attempt made")]
    NotAttempted,
}

/// The error type for all psulib operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A transport-level error (serial port open/configure failure).
    #[error("transport error: {0}")]
    Transport(String),

    /// A protocol-level error (unexpected bytes on the wire, mock mismatch).
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Timed out waiting for bytes from the supply.
    ///
    /// This typically indicates the supply is powered off, the baud rate is
    /// wrong, or the address is incorrect.
    #[error("timeout waiting for response")]
    Timeout,

    /// Every attempt of a command exchange failed.
    ///
    /// `last` is the classification of the final attempt. Callers that only
    /// need to know the command did not go through can ignore it.
    #[error("transmit failed after {attempts} attempts: {last}")]
    TransmitFailed {
        /// Number of frames written before giving up.
        attempts: u32,
        /// What went wrong on the final attempt.
        last: AttemptFailure,
    },

    /// An invalid parameter was passed to a supply command.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// No connection to the supply has been established.
    #[error("not connected")]
    NotConnected,

    /// The connection to the supply was lost unexpectedly.
    #[error("connection lost")]
    ConnectionLost,

    /// An underlying I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenience `Result` alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;
