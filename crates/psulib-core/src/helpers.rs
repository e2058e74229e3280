//! Formatting helpers for electrical values.

/// Format a voltage with millivolt precision.
///
/// # Example
///
/// ```
/// use psulib_core::format_volts;
///
/// assert_eq!(format_volts(12.0), "12.000 V");
/// assert_eq!(format_volts(1.5), "1.500 V");
/// ```
pub fn format_volts(volts: f64) -> String {
    format!("{volts:.3} V")
}

/// Format a current with milliamp precision.
///
/// # Example
///
/// ```
/// use psulib_core::format_amps;
///
/// assert_eq!(format_amps(0.2), "0.200 A");
/// ```
pub fn format_amps(amps: f64) -> String {
    format!("{amps:.3} A")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_volts_whole() {
        assert_eq!(format_volts(5.0), "5.000 V");
    }

    #[test]
    fn format_amps_small() {
        assert_eq!(format_amps(0.001), "0.001 A");
    }
}
