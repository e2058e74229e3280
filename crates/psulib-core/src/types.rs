//! Core types used throughout psulib.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Supply manufacturer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Manufacturer {
    /// BK Precision (1785B-series binary protocol).
    BkPrecision,
}

impl fmt::Display for Manufacturer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Manufacturer::BkPrecision => write!(f, "BK Precision"),
        }
    }
}

/// Static information about a connected supply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PsuInfo {
    /// The manufacturer of the supply.
    pub manufacturer: Manufacturer,
    /// Human-readable model name (e.g. "1787B").
    pub model_name: String,
}

/// Description of a supported supply model.
///
/// A manufacturer-agnostic view of a model, suitable for model pickers and
/// listings where the application should not depend on backend-specific
/// types. Obtained via `psulib::supported_supplies()` (facade crate) or by
/// converting a backend model type via its `From` implementation.
#[derive(Debug, Clone, PartialEq)]
pub struct SupplyDefinition {
    /// The manufacturer of the supply.
    pub manufacturer: Manufacturer,
    /// Human-readable model name (e.g. "1787B").
    pub model_name: &'static str,
    /// Rated maximum output voltage in volts.
    pub max_voltage: f64,
    /// Rated maximum output current in amps.
    pub max_current: f64,
    /// Factory default serial baud rate.
    pub default_baud_rate: u32,
}

/// Regulation mode the output stage is currently in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputMode {
    /// Constant voltage.
    ConstantVoltage,
    /// Constant current.
    ConstantCurrent,
    /// Unregulated, or a mode code the supply did not document.
    Unregulated,
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OutputMode::ConstantVoltage => "CV",
            OutputMode::ConstantCurrent => "CC",
            OutputMode::Unregulated => "UR",
        };
        write!(f, "{s}")
    }
}

/// Whether the supply is taking orders from the serial link or its own keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationState {
    /// Remote control over the serial link.
    RemoteControl,
    /// Front panel control.
    FrontPanel,
}

impl fmt::Display for OperationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OperationState::RemoteControl => "RC",
            OperationState::FrontPanel => "FP",
        };
        write!(f, "{s}")
    }
}

/// Error returned when a string cannot be parsed as an on/off switch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseSwitchError(String);

impl fmt::Display for ParseSwitchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expected on/off, got: {}", self.0)
    }
}

impl std::error::Error for ParseSwitchError {}

/// An on/off setting, parsed from the usual spellings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Switch(pub bool);

impl FromStr for Switch {
    type Err = ParseSwitchError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "on" | "1" | "true" | "enable" => Ok(Switch(true)),
            "off" | "0" | "false" | "disable" => Ok(Switch(false)),
            _ => Err(ParseSwitchError(s.to_string())),
        }
    }
}

/// Decoded snapshot of a supply's operating state and setpoints.
///
/// Built fresh for every status query and never updated afterwards.
/// All electrical values are in volts or amps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusSnapshot {
    /// Address byte the response came from.
    pub address: u8,
    /// Command byte echoed in the response.
    pub command: u8,
    /// Output stage enabled.
    pub output_enabled: bool,
    /// Over-temperature protection tripped.
    pub over_heat: bool,
    /// Regulation mode.
    pub output_mode: OutputMode,
    /// Fan speed step, 0 through 7.
    pub fan_speed: u8,
    /// Remote or front panel control.
    pub operation_state: OperationState,
    /// Measured output current.
    ///
    /// Known limitation: this reading does not track the supply's own front
    /// panel display. Treat it as indicative only.
    pub output_current: f64,
    /// Measured output voltage.
    pub output_voltage: f64,
    /// Current setpoint.
    pub target_current: f64,
    /// Voltage setpoint.
    pub target_voltage: f64,
    /// Configured voltage ceiling.
    ///
    /// The meaning of this field is not documented by the manufacturer
    /// beyond "maximum value". It is reported as received.
    pub maximum_voltage: f64,
}

impl fmt::Display for StatusSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "output {} ({}), {} / {} (set {} / {}, max {}), fan {}, {}{}",
            if self.output_enabled { "on" } else { "off" },
            self.output_mode,
            crate::helpers::format_volts(self.output_voltage),
            crate::helpers::format_amps(self.output_current),
            crate::helpers::format_volts(self.target_voltage),
            crate::helpers::format_amps(self.target_current),
            crate::helpers::format_volts(self.maximum_voltage),
            self.fan_speed,
            self.operation_state,
            if self.over_heat { ", OVER-HEAT" } else { "" },
        )
    }
}

/// Bounds on how hard a command exchange is retried.
///
/// Each retry resends the identical frame. There is no backoff; `delay` is a
/// fixed pause between attempts and defaults to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of frames written for one command.
    pub max_attempts: u32,
    /// Pause before each retry (not before the first attempt).
    pub delay: Duration,
    /// Extra bytes the reader may consume while hunting for a start marker.
    pub resync_window: usize,
}

impl RetryPolicy {
    /// Default attempt bound.
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

    /// Default resync window in bytes.
    pub const DEFAULT_RESYNC_WINDOW: usize = 64;
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
            delay: Duration::ZERO,
            resync_window: Self::DEFAULT_RESYNC_WINDOW,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_mode_display() {
        assert_eq!(OutputMode::ConstantVoltage.to_string(), "CV");
        assert_eq!(OutputMode::ConstantCurrent.to_string(), "CC");
        assert_eq!(OutputMode::Unregulated.to_string(), "UR");
    }

    #[test]
    fn operation_state_display() {
        assert_eq!(OperationState::RemoteControl.to_string(), "RC");
        assert_eq!(OperationState::FrontPanel.to_string(), "FP");
    }

    #[test]
    fn switch_parse() {
        assert_eq!("on".parse::<Switch>().unwrap(), Switch(true));
        assert_eq!("OFF".parse::<Switch>().unwrap(), Switch(false));
        assert_eq!("1".parse::<Switch>().unwrap(), Switch(true));
        assert!("maybe".parse::<Switch>().is_err());
    }

    #[test]
    fn retry_policy_default() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 10);
        assert_eq!(policy.delay, Duration::ZERO);
        assert_eq!(policy.resync_window, 64);
    }

    #[test]
    fn status_display() {
        let status = StatusSnapshot {
            address: 0,
            command: 0x26,
            output_enabled: true,
            over_heat: false,
            output_mode: OutputMode::ConstantVoltage,
            fan_speed: 1,
            operation_state: OperationState::RemoteControl,
            output_current: 0.2,
            output_voltage: 12.0,
            target_current: 0.2,
            target_voltage: 12.0,
            maximum_voltage: 18.0,
        };
        assert_eq!(
            status.to_string(),
            "output on (CV), 12.000 V / 0.200 A (set 12.000 V / 0.200 A, max 18.000 V), fan 1, RC"
        );
    }

    #[test]
    fn manufacturer_display() {
        assert_eq!(Manufacturer::BkPrecision.to_string(), "BK Precision");
    }
}
