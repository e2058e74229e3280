//! # psulib -- Bench Power Supply Control
//!
//! `psulib` is a blocking Rust library for controlling programmable bench
//! power supplies over serial links. It is meant for test fixtures and lab
//! automation scripts that need to set a voltage, switch an output, and
//! read back what the supply is doing.
//!
//! ## Quick Start
//!
//! Add `psulib` to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! psulib = { version = "0.1", features = ["bk"] }
//! ```
//!
//! Connect to a supply, program it, and read its status:
//!
//! ```no_run
//! use psulib::PowerSupply;
//! use psulib::bk::{Bk1785Builder, models::bk_1785b};
//!
//! fn main() -> psulib::Result<()> {
//!     let mut psu = Bk1785Builder::new(bk_1785b())
//!         .serial_port("/dev/ttyUSB0")
//!         .build()?;
//!
//!     psu.remote_control(true)?;
//!     psu.set_output_voltage(12.0)?;
//!     psu.set_output_current(0.5)?;
//!     psu.output_enable(true)?;
//!     println!("{}", psu.status()?);
//!     psu.close()?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! The library is organized as a workspace of focused crates:
//!
//! | Crate                 | Purpose                                          |
//! |-----------------------|--------------------------------------------------|
//! | `psulib-core`         | Traits ([`PowerSupply`], [`Transport`]), types, errors |
//! | `psulib-transport`    | Serial transport implementation                  |
//! | `psulib-bk`           | BK Precision 1785B-series binary protocol driver |
//! | `psulib-test-harness` | Mock transport for protocol tests                |
//! | **`psulib`**          | This facade crate -- re-exports everything       |
//!
//! All backends implement the [`PowerSupply`] trait, so application code
//! can work with `dyn PowerSupply` and remain manufacturer-agnostic.
//!
//! ## Feature Flags
//!
//! | Feature | Enables                                  | Default |
//! |---------|------------------------------------------|---------|
//! | `bk`    | [`bk`] module (1785B-series protocol)    | yes     |
//! | `full`  | All manufacturer backends                | no      |
//!
//! ## Threading
//!
//! Drivers are blocking and own their transport. Every operation takes
//! `&mut self` and returns only after its exchange completes (or its
//! retries run out). Share a driver between threads by wrapping it in a
//! `Mutex`.
//!
//! ## Supported Supplies
//!
//! - **BK Precision**: 1785B, 1786B, 1787B, 1788B

pub use psulib_core::*;

/// Transport implementations (serial).
pub mod transport {
    pub use psulib_transport::*;
}

/// BK Precision 1785B-series protocol backend.
///
/// Provides [`Bk1785`](bk::Bk1785) and [`Bk1785Builder`](bk::Bk1785Builder)
/// for controlling the 1785B/1786B/1787B/1788B over their 26-byte binary
/// serial protocol.
#[cfg(feature = "bk")]
pub mod bk {
    pub use psulib_bk::*;
}

/// Returns a flat list of all supported supply models across all enabled
/// manufacturer backends.
///
/// # Example
///
/// ```
/// let supplies = psulib::supported_supplies();
/// for s in &supplies {
///     println!("{} {} ({} V / {} A)", s.manufacturer, s.model_name, s.max_voltage, s.max_current);
/// }
/// ```
pub fn supported_supplies() -> Vec<SupplyDefinition> {
    #[allow(unused_mut)]
    let mut supplies = Vec::new();

    #[cfg(feature = "bk")]
    {
        supplies.extend(
            bk::models::all_models()
                .iter()
                .map(SupplyDefinition::from),
        );
    }

    supplies
}
