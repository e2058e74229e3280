//! The `PowerSupply` trait -- unified interface for supply backends.
//!
//! Bench automation code programs against `dyn PowerSupply` without needing
//! to know which manufacturer's protocol is in use. Each backend crate
//! (currently `psulib-bk`) provides a concrete type implementing it.

use crate::error::Result;
use crate::types::{PsuInfo, StatusSnapshot};

/// Blocking interface for controlling a programmable bench supply.
///
/// Every method that talks to the supply takes `&mut self`: a driver owns
/// its transport exclusively and performs no internal locking. Callers that
/// share a driver between threads must provide their own synchronization
/// (for example `Mutex<Box<dyn PowerSupply>>`).
///
/// Each call performs a complete exchange before returning. There is no
/// cancellation; the transport's read timeout bounds how long one attempt
/// can block.
pub trait PowerSupply: Send {
    /// Return static information about the supply (manufacturer, model).
    fn info(&self) -> &PsuInfo;

    /// Turn the output stage on or off.
    fn output_enable(&mut self, on: bool) -> Result<()>;

    /// Switch between remote (serial) control and front panel control.
    ///
    /// Most supplies ignore setpoint commands until remote control is on.
    fn remote_control(&mut self, on: bool) -> Result<()>;

    /// Set the output voltage setpoint in volts.
    fn set_output_voltage(&mut self, volts: f64) -> Result<()>;

    /// Set the output current setpoint in amps.
    fn set_output_current(&mut self, amps: f64) -> Result<()>;

    /// Set the maximum output voltage (voltage limit) in volts.
    fn set_maximum_voltage(&mut self, volts: f64) -> Result<()>;

    /// Query a fresh snapshot of the supply's state and setpoints.
    fn status(&mut self) -> Result<StatusSnapshot>;

    /// Orderly shutdown: disable the output, then release remote control.
    ///
    /// Both steps are attempted even if the first fails. The first error
    /// encountered is returned.
    fn close(&mut self) -> Result<()>;
}
