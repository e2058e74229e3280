//! BK Precision 1785B-series model definitions.
//!
//! Each supported supply is described by a [`Bk1785Model`] struct that
//! captures its rated output and serial parameters. The driver uses the
//! ratings to reject setpoints the supply cannot produce before anything
//! is written to the wire.
//!
//! | Model  | Max voltage | Max current | Baud                        |
//! |--------|-------------|-------------|-----------------------------|
//! | 1785B  | 18 V        | 5 A         | 4800/9600/19200/38400       |
//! | 1786B  | 32 V        | 3 A         | 4800/9600/19200/38400       |
//! | 1787B  | 72 V        | 1.5 A       | 4800/9600/19200/38400       |
//! | 1788B  | 32 V        | 6 A         | 4800/9600/19200/38400       |

use psulib_core::{Manufacturer, SupplyDefinition};

/// Baud rates accepted by the whole series.
pub const SERIES_BAUD_RATES: &[u32] = &[4800, 9600, 19200, 38400];

/// Factory default baud rate.
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Factory default supply address.
pub const DEFAULT_ADDRESS: u8 = 0;

/// Static model definition for a 1785B-series supply.
#[derive(Debug, Clone, PartialEq)]
pub struct Bk1785Model {
    /// Human-readable model name (e.g. "1787B").
    pub name: &'static str,
    /// Rated maximum output voltage in volts.
    pub max_voltage: f64,
    /// Rated maximum output current in amps.
    pub max_current: f64,
    /// Baud rates the supply can be configured for.
    pub baud_rates: &'static [u32],
    /// Factory default baud rate.
    pub default_baud_rate: u32,
}

impl Bk1785Model {
    /// `true` if the supply can be configured for `baud`.
    pub fn supports_baud_rate(&self, baud: u32) -> bool {
        self.baud_rates.contains(&baud)
    }
}

impl From<&Bk1785Model> for SupplyDefinition {
    fn from(model: &Bk1785Model) -> Self {
        SupplyDefinition {
            manufacturer: Manufacturer::BkPrecision,
            model_name: model.name,
            max_voltage: model.max_voltage,
            max_current: model.max_current,
            default_baud_rate: model.default_baud_rate,
        }
    }
}

fn series_model(name: &'static str, max_voltage: f64, max_current: f64) -> Bk1785Model {
    Bk1785Model {
        name,
        max_voltage,
        max_current,
        baud_rates: SERIES_BAUD_RATES,
        default_baud_rate: DEFAULT_BAUD_RATE,
    }
}

/// BK Precision 1785B: 0-18 V, 0-5 A.
pub fn bk_1785b() -> Bk1785Model {
    series_model("1785B", 18.0, 5.0)
}

/// BK Precision 1786B: 0-32 V, 0-3 A.
pub fn bk_1786b() -> Bk1785Model {
    series_model("1786B", 32.0, 3.0)
}

/// BK Precision 1787B: 0-72 V, 0-1.5 A.
pub fn bk_1787b() -> Bk1785Model {
    series_model("1787B", 72.0, 1.5)
}

/// BK Precision 1788B: 0-32 V, 0-6 A.
pub fn bk_1788b() -> Bk1785Model {
    series_model("1788B", 32.0, 6.0)
}

/// All supported models.
pub fn all_models() -> Vec<Bk1785Model> {
    vec![bk_1785b(), bk_1786b(), bk_1787b(), bk_1788b()]
}

/// Look up a model by name, case-insensitively. A leading "BK" is ignored.
///
/// # Example
///
/// ```
/// use psulib_bk::models::model_by_name;
///
/// assert_eq!(model_by_name("1787b").unwrap().max_voltage, 72.0);
/// assert_eq!(model_by_name("BK 1785B").unwrap().name, "1785B");
/// assert!(model_by_name("9129B").is_none());
/// ```
pub fn model_by_name(name: &str) -> Option<Bk1785Model> {
    let upper = name.trim().to_uppercase();
    let wanted = upper
        .strip_prefix("BK")
        .map(|rest| rest.trim_start_matches([' ', '-']))
        .unwrap_or(upper.as_str());
    all_models().into_iter().find(|m| m.name == wanted)
}
