//! Milli-unit encoding of electrical values.
//!
//! All voltages and currents travel as unsigned little-endian integers in
//! millivolts or milliamps. Voltage fields are 4 bytes wide; the output
//! current field is 2 bytes wide.

use bytes::Buf;
use psulib_core::{Error, Result};

/// Wire units per volt or amp.
pub const MILLI: f64 = 1000.0;

/// Width of a numeric field on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldWidth {
    /// Two bytes, little-endian.
    U16,
    /// Four bytes, little-endian.
    U32,
}

impl FieldWidth {
    /// Number of bytes this field occupies.
    pub fn byte_len(self) -> usize {
        match self {
            FieldWidth::U16 => 2,
            FieldWidth::U32 => 4,
        }
    }

    /// Largest raw value the field can carry.
    pub fn max_raw(self) -> u32 {
        match self {
            FieldWidth::U16 => u32::from(u16::MAX),
            FieldWidth::U32 => u32::MAX,
        }
    }
}

/// Convert a value in volts or amps to its rounded milli-unit integer.
///
/// Rejects values that are not finite, negative, or too large for `width`
/// instead of letting them wrap. `what` names the quantity in the error.
///
/// # Example
///
/// ```
/// use psulib_bk::scale::{to_milli, FieldWidth};
///
/// assert_eq!(to_milli(12.0, FieldWidth::U32, "voltage").unwrap(), 12_000);
/// assert_eq!(to_milli(0.2, FieldWidth::U16, "current").unwrap(), 200);
/// assert!(to_milli(-1.0, FieldWidth::U32, "voltage").is_err());
/// assert!(to_milli(70.0, FieldWidth::U16, "current").is_err());
/// ```
pub fn to_milli(value: f64, width: FieldWidth, what: &str) -> Result<u32> {
    if !value.is_finite() {
        return Err(Error::InvalidParameter(format!("{what} must be finite, got {value}")));
    }
    if value < 0.0 {
        return Err(Error::InvalidParameter(format!("{what} must not be negative, got {value}")));
    }
    let raw = (value * MILLI).round();
    if raw > f64::from(width.max_raw()) {
        return Err(Error::InvalidParameter(format!(
            "{what} {value} does not fit a {}-byte field",
            width.byte_len()
        )));
    }
    Ok(raw as u32)
}

/// Convert a raw milli-unit integer back to volts or amps.
pub fn from_milli(raw: u32) -> f64 {
    f64::from(raw) / MILLI
}

/// Read a little-endian unsigned integer of 1 to 4 bytes.
pub fn read_le(bytes: &[u8]) -> u32 {
    let mut buf = bytes;
    buf.get_uint_le(bytes.len()) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn to_milli_rounds_to_nearest() {
        assert_eq!(to_milli(1.0004, FieldWidth::U32, "voltage").unwrap(), 1000);
        assert_eq!(to_milli(1.0006, FieldWidth::U32, "voltage").unwrap(), 1001);
        assert_eq!(to_milli(0.0, FieldWidth::U16, "current").unwrap(), 0);
    }

    #[test]
    fn to_milli_u16_limit() {
        assert_eq!(to_milli(65.535, FieldWidth::U16, "current").unwrap(), 65_535);
        assert!(to_milli(65.536, FieldWidth::U16, "current").is_err());
    }

    #[test]
    fn to_milli_rejects_nan_and_infinity() {
        assert!(matches!(
            to_milli(f64::NAN, FieldWidth::U32, "voltage"),
            Err(Error::InvalidParameter(_))
        ));
        assert!(matches!(
            to_milli(f64::INFINITY, FieldWidth::U32, "voltage"),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn to_milli_error_names_quantity() {
        let err = to_milli(-0.5, FieldWidth::U16, "current").unwrap_err();
        assert!(err.to_string().contains("current"));
    }

    #[test]
    fn read_le_widths() {
        assert_eq!(read_le(&[0xE0, 0x2E]), 12_000);
        assert_eq!(read_le(&[0xE0, 0x2E, 0x00, 0x00]), 12_000);
        assert_eq!(read_le(&[0x78, 0x56, 0x34, 0x12]), 0x1234_5678);
    }

    #[test]
    fn from_milli_scales() {
        assert_eq!(from_milli(12_000), 12.0);
        assert_eq!(from_milli(200), 0.2);
    }

    proptest! {
        #[test]
        fn milli_round_trip_u32(value in 0.0f64..4_000_000.0) {
            let raw = to_milli(value, FieldWidth::U32, "voltage").unwrap();
            let bytes = raw.to_le_bytes();
            let back = from_milli(read_le(&bytes));
            prop_assert!((back - value).abs() < 0.001);
        }

        #[test]
        fn milli_round_trip_u16(value in 0.0f64..65.535) {
            let raw = to_milli(value, FieldWidth::U16, "current").unwrap();
            let bytes = (raw as u16).to_le_bytes();
            let back = from_milli(read_le(&bytes));
            prop_assert!((back - value).abs() < 0.001);
        }
    }
}
