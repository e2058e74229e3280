//! 1785B-series frame encoder/decoder.
//!
//! Every message on the wire, in either direction, is exactly 26 bytes.
//! This module handles the pure byte-level encoding of command frames and
//! the field accessors used to inspect response frames.
//!
//! # Frame format
//!
//! ```text
//! 0xAA <addr> <cmd> <data 0..22 bytes, zero padded> <checksum>
//! ```
//!
//! | Offset | Field                                                  |
//! |--------|--------------------------------------------------------|
//! | 0      | start byte `0xAA`                                      |
//! | 1      | supply address                                         |
//! | 2      | command (or `0x12` in acknowledgement responses)       |
//! | 3      | ack code in acknowledgements, first data byte otherwise |
//! | 4-24   | command-specific data                                  |
//! | 25     | checksum: sum of bytes 0-24, modulo 256                |

use bytes::BufMut;
use psulib_core::{Error, Result};

/// Start byte opening every frame.
pub const START_BYTE: u8 = 0xAA;

/// Length of every frame on the wire.
pub const FRAME_LEN: usize = 26;

/// Offset of the address byte.
pub const ADDRESS_OFFSET: usize = 1;

/// Offset of the command byte.
pub const COMMAND_OFFSET: usize = 2;

/// Offset of the ack code in acknowledgement responses.
pub const ACK_OFFSET: usize = 3;

/// Offset of the checksum byte.
pub const CHECKSUM_OFFSET: usize = FRAME_LEN - 1;

/// Longest command body (command byte plus data) that fits in a frame.
pub const MAX_BODY_LEN: usize = CHECKSUM_OFFSET - COMMAND_OFFSET;

/// Sum of `bytes`, modulo 256.
///
/// # Example
///
/// ```
/// use psulib_bk::frame::checksum;
///
/// assert_eq!(checksum(&[0xAA, 0x00, 0x26]), 0xD0);
/// assert_eq!(checksum(&[0xFF, 0x02]), 0x01);
/// ```
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, &b| acc.wrapping_add(b))
}

/// A single 26-byte frame, as sent or as received.
///
/// Received frames are stored as-is; use [`is_framed`](Frame::is_framed) and
/// [`checksum_valid`](Frame::checksum_valid) to decide whether the contents
/// can be trusted.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    bytes: [u8; FRAME_LEN],
}

impl Frame {
    /// Wrap raw bytes read from the wire.
    pub fn from_bytes(bytes: [u8; FRAME_LEN]) -> Self {
        Frame { bytes }
    }

    /// The all-zero frame, produced when the reader could not find a start
    /// byte. It never matches any expected response.
    pub fn zeroed() -> Self {
        Frame {
            bytes: [0; FRAME_LEN],
        }
    }

    /// Raw bytes of the frame.
    pub fn as_bytes(&self) -> &[u8; FRAME_LEN] {
        &self.bytes
    }

    /// `true` if the frame opens with the start byte.
    pub fn is_framed(&self) -> bool {
        self.bytes[0] == START_BYTE
    }

    /// Address byte.
    pub fn address(&self) -> u8 {
        self.bytes[ADDRESS_OFFSET]
    }

    /// Command byte.
    pub fn command(&self) -> u8 {
        self.bytes[COMMAND_OFFSET]
    }

    /// Ack code byte (meaningful only in acknowledgement responses).
    pub fn ack_code(&self) -> u8 {
        self.bytes[ACK_OFFSET]
    }

    /// Checksum byte carried by the frame.
    pub fn checksum(&self) -> u8 {
        self.bytes[CHECKSUM_OFFSET]
    }

    /// Checksum computed over bytes 0-24.
    pub fn computed_checksum(&self) -> u8 {
        checksum(&self.bytes[..CHECKSUM_OFFSET])
    }

    /// `true` if the carried checksum matches the computed one.
    pub fn checksum_valid(&self) -> bool {
        self.checksum() == self.computed_checksum()
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Frame({:02X?})", self.bytes)
    }
}

/// Encode a command body into a frame ready for transmission.
///
/// `body` is the command byte followed by its little-endian data; it lands
/// at offset 2. Unused data bytes are zero and the checksum is filled in.
/// Bodies longer than [`MAX_BODY_LEN`] or empty bodies are rejected.
///
/// # Example
///
/// ```
/// use psulib_bk::frame::{encode_frame, FRAME_LEN};
///
/// // Remote control on, supply at address 0
/// let frame = encode_frame(0x00, &[0x20, 0x01]).unwrap();
/// let bytes = frame.as_bytes();
/// assert_eq!(&bytes[..4], &[0xAA, 0x00, 0x20, 0x01]);
/// assert_eq!(bytes[FRAME_LEN - 1], 0xCB);
/// ```
pub fn encode_frame(address: u8, body: &[u8]) -> Result<Frame> {
    if body.is_empty() {
        return Err(Error::InvalidParameter("command body is empty".into()));
    }
    if body.len() > MAX_BODY_LEN {
        return Err(Error::InvalidParameter(format!(
            "command body is {} bytes, at most {} fit in a frame",
            body.len(),
            MAX_BODY_LEN
        )));
    }

    let mut bytes = [0u8; FRAME_LEN];
    let mut buf = &mut bytes[..CHECKSUM_OFFSET];
    buf.put_u8(START_BYTE);
    buf.put_u8(address);
    buf.put_slice(body);
    bytes[CHECKSUM_OFFSET] = checksum(&bytes[..CHECKSUM_OFFSET]);

    Ok(Frame { bytes })
}
