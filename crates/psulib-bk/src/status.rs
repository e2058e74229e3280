//! Read-config response decoding.
//!
//! The response to [`Opcode::ReadConfig`](crate::commands::Opcode::ReadConfig)
//! packs the supply's telemetry into fixed offsets of the 26-byte frame:
//!
//! | Offset | Width | Field                                   |
//! |--------|-------|-----------------------------------------|
//! | 3-4    | 2     | measured output current (mA)            |
//! | 5-8    | 4     | measured output voltage (mV)            |
//! | 9      | 1     | state flags (see below)                 |
//! | 10-11  | 2     | current setpoint (mA)                   |
//! | 12-15  | 4     | maximum voltage (mV)                    |
//! | 16-19  | 4     | voltage setpoint (mV)                   |
//!
//! State flags: bit 0 output on, bit 1 over-heat, bits 2-3 output mode
//! (1 = CV, 2 = CC, otherwise UR), bits 4-6 fan speed, bit 7 remote control.

use std::ops::Range;

use psulib_core::{OperationState, OutputMode, StatusSnapshot};

use crate::frame::Frame;
use crate::scale::{from_milli, read_le};

const OUTPUT_CURRENT: Range<usize> = 3..5;
const OUTPUT_VOLTAGE: Range<usize> = 5..9;
const STATE: usize = 9;
const TARGET_CURRENT: Range<usize> = 10..12;
const MAXIMUM_VOLTAGE: Range<usize> = 12..16;
const TARGET_VOLTAGE: Range<usize> = 16..20;

const OUTPUT_ON: u8 = 0x01;
const OVER_HEAT: u8 = 0x02;
const MODE_MASK: u8 = 0x0C;
const MODE_SHIFT: u32 = 2;
const FAN_MASK: u8 = 0x70;
const FAN_SHIFT: u32 = 4;
const REMOTE: u8 = 0x80;

/// Map the 2-bit output mode field.
pub fn output_mode(bits: u8) -> OutputMode {
    match bits {
        1 => OutputMode::ConstantVoltage,
        2 => OutputMode::ConstantCurrent,
        _ => OutputMode::Unregulated,
    }
}

fn milli_field(frame: &Frame, range: Range<usize>) -> f64 {
    from_milli(read_le(&frame.as_bytes()[range]))
}

/// Decode a validated read-config response.
///
/// The frame is expected to have passed [`check_status`](crate::io::check_status);
/// this function only extracts fields.
///
/// The measured output current is decoded as documented but is known to
/// disagree with the supply's own display; see
/// [`StatusSnapshot::output_current`].
///
/// # Example
///
/// ```
/// use psulib_bk::frame::encode_frame;
/// use psulib_bk::status::parse_status;
/// use psulib_core::{OperationState, OutputMode};
///
/// let mut body = [0u8; 18];
/// body[0] = 0x26;        // echoed command
/// body[7] = 0b1001_0001; // state: output on, UR, fan 1, remote
/// let frame = encode_frame(0x00, &body).unwrap();
///
/// let status = parse_status(&frame);
/// assert!(status.output_enabled);
/// assert_eq!(status.output_mode, OutputMode::Unregulated);
/// assert_eq!(status.fan_speed, 1);
/// assert_eq!(status.operation_state, OperationState::RemoteControl);
/// ```
pub fn parse_status(frame: &Frame) -> StatusSnapshot {
    let state = frame.as_bytes()[STATE];

    StatusSnapshot {
        address: frame.address(),
        command: frame.command(),
        output_enabled: state & OUTPUT_ON != 0,
        over_heat: state & OVER_HEAT != 0,
        output_mode: output_mode((state & MODE_MASK) >> MODE_SHIFT),
        fan_speed: (state & FAN_MASK) >> FAN_SHIFT,
        operation_state: if state & REMOTE != 0 {
            OperationState::RemoteControl
        } else {
            OperationState::FrontPanel
        },
        output_current: milli_field(frame, OUTPUT_CURRENT),
        output_voltage: milli_field(frame, OUTPUT_VOLTAGE),
        target_current: milli_field(frame, TARGET_CURRENT),
        target_voltage: milli_field(frame, TARGET_VOLTAGE),
        maximum_voltage: milli_field(frame, MAXIMUM_VOLTAGE),
    }
}
