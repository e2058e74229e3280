//! 1785B-series command table and command builders.
//!
//! This module provides the opcode table and functions that construct
//! complete frames for each supported operation. All builders are pure:
//! they produce frames without performing any I/O. The caller hands the
//! frame to the dispatcher in [`io`](crate::io).

use bytes::BufMut;
use psulib_core::{Error, Result};

use crate::frame::{Frame, MAX_BODY_LEN, encode_frame};
use crate::scale::{FieldWidth, to_milli};

/// Ack code reported by the supply when a command was accepted.
pub const ACK_SUCCESS: u8 = 0x80;

/// Command bytes understood by the 1785B series.
///
/// The calibration family is listed for completeness; no public operation
/// sends it.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    /// Command status returned by the supply (the acknowledgement frame).
    ReturnInfo = 0x12,
    /// Set remote control mode.
    RemoteEnable = 0x20,
    /// Set output on/off state.
    OutputEnable = 0x21,
    /// Set maximum output voltage.
    SetLimitV = 0x22,
    /// Set output voltage.
    SetOutputV = 0x23,
    /// Set output current.
    SetOutputI = 0x24,
    /// Set communication address.
    SetAddress = 0x25,
    /// Read present current/voltage, maximum voltage, setpoints, and state.
    ReadConfig = 0x26,
    /// Enter calibration mode.
    CalMode = 0x27,
    /// Read calibration mode state.
    CalState = 0x28,
    /// Calibrate voltage value.
    CalReadV = 0x29,
    /// Send the output voltage to the calibration program.
    CalSendV = 0x2A,
    /// Calibrate current value.
    CalReadI = 0x2B,
    /// Send the output current to the calibration program.
    CalSendI = 0x2C,
    /// Save calibration data to EEPROM.
    CalSaveData = 0x2D,
    /// Set calibration information.
    CalSetInfo = 0x2E,
    /// Read calibration information.
    CalReadInfo = 0x2F,
    /// Read model, series, and version information.
    ReadId = 0x31,
    /// Restore factory default calibration data.
    CalReset = 0x32,
    /// Enable the local (front panel) keys.
    EnaLocalKey = 0x37,
}

impl Opcode {
    /// Every opcode, in numeric order.
    pub const ALL: [Opcode; 20] = [
        Opcode::ReturnInfo,
        Opcode::RemoteEnable,
        Opcode::OutputEnable,
        Opcode::SetLimitV,
        Opcode::SetOutputV,
        Opcode::SetOutputI,
        Opcode::SetAddress,
        Opcode::ReadConfig,
        Opcode::CalMode,
        Opcode::CalState,
        Opcode::CalReadV,
        Opcode::CalSendV,
        Opcode::CalReadI,
        Opcode::CalSendI,
        Opcode::CalSaveData,
        Opcode::CalSetInfo,
        Opcode::CalReadInfo,
        Opcode::ReadId,
        Opcode::CalReset,
        Opcode::EnaLocalKey,
    ];

    /// The byte sent on the wire.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// `true` for the calibration family.
    pub fn is_calibration(self) -> bool {
        matches!(
            self,
            Opcode::CalMode
                | Opcode::CalState
                | Opcode::CalReadV
                | Opcode::CalSendV
                | Opcode::CalReadI
                | Opcode::CalSendI
                | Opcode::CalSaveData
                | Opcode::CalSetInfo
                | Opcode::CalReadInfo
                | Opcode::CalReset
        )
    }
}

impl TryFrom<u8> for Opcode {
    type Error = Error;

    fn try_from(byte: u8) -> Result<Self> {
        Opcode::ALL
            .iter()
            .copied()
            .find(|op| op.code() == byte)
            .ok_or_else(|| Error::Protocol(format!("unknown opcode 0x{byte:02X}")))
    }
}

/// Build a frame from an opcode and its data bytes.
fn command_frame(address: u8, opcode: Opcode, data: &[u8]) -> Result<Frame> {
    let mut body = Vec::with_capacity(MAX_BODY_LEN);
    body.put_u8(opcode.code());
    body.put_slice(data);
    encode_frame(address, &body)
}

fn switch_frame(address: u8, opcode: Opcode, on: bool) -> Result<Frame> {
    command_frame(address, opcode, &[u8::from(on)])
}

/// Build a remote-control on/off command.
///
/// # Example
///
/// ```
/// use psulib_bk::commands::cmd_remote_control;
///
/// let frame = cmd_remote_control(0x00, true).unwrap();
/// assert_eq!(&frame.as_bytes()[..4], &[0xAA, 0x00, 0x20, 0x01]);
/// ```
pub fn cmd_remote_control(address: u8, on: bool) -> Result<Frame> {
    switch_frame(address, Opcode::RemoteEnable, on)
}

/// Build an output on/off command.
pub fn cmd_output_enable(address: u8, on: bool) -> Result<Frame> {
    switch_frame(address, Opcode::OutputEnable, on)
}

/// Build a set-maximum-voltage command. Data: 4-byte millivolts.
pub fn cmd_set_maximum_voltage(address: u8, volts: f64) -> Result<Frame> {
    let mv = to_milli(volts, FieldWidth::U32, "maximum voltage")?;
    command_frame(address, Opcode::SetLimitV, &mv.to_le_bytes())
}

/// Build a set-output-voltage command. Data: 4-byte millivolts.
///
/// # Example
///
/// ```
/// use psulib_bk::commands::cmd_set_output_voltage;
///
/// // 12 V = 12000 mV = 0x00002EE0
/// let frame = cmd_set_output_voltage(0x00, 12.0).unwrap();
/// assert_eq!(&frame.as_bytes()[2..7], &[0x23, 0xE0, 0x2E, 0x00, 0x00]);
/// ```
pub fn cmd_set_output_voltage(address: u8, volts: f64) -> Result<Frame> {
    let mv = to_milli(volts, FieldWidth::U32, "output voltage")?;
    command_frame(address, Opcode::SetOutputV, &mv.to_le_bytes())
}

/// Build a set-output-current command. Data: 2-byte milliamps.
pub fn cmd_set_output_current(address: u8, amps: f64) -> Result<Frame> {
    let ma = to_milli(amps, FieldWidth::U16, "output current")?;
    command_frame(address, Opcode::SetOutputI, &(ma as u16).to_le_bytes())
}

/// Build a read-config (status) request.
pub fn cmd_read_config(address: u8) -> Result<Frame> {
    command_frame(address, Opcode::ReadConfig, &[])
}

/// Build a set-address command moving the supply to `new_address`.
pub fn cmd_set_address(address: u8, new_address: u8) -> Result<Frame> {
    command_frame(address, Opcode::SetAddress, &[new_address])
}

/// Build a local-key enable/disable command.
pub fn cmd_local_key(address: u8, on: bool) -> Result<Frame> {
    switch_frame(address, Opcode::EnaLocalKey, on)
}
