//! psulib-core: Core traits, types, and error definitions for psulib.
//!
//! This crate defines the manufacturer-agnostic abstractions that all psulib
//! backends implement. Bench automation code depends on these types without
//! pulling in any specific supply driver.
//!
//! # Key types
//!
//! - [`PowerSupply`] -- the unified trait for controlling a bench supply
//! - [`Transport`] -- blocking byte-level communication channel
//! - [`StatusSnapshot`] -- decoded operating state and setpoints
//! - [`RetryPolicy`] -- attempt bound and resync window for exchanges
//! - [`Error`] / [`Result`] -- error handling

pub mod error;
pub mod helpers;
pub mod supply;
pub mod transport;
pub mod types;

// Re-export key types at crate root for ergonomic `use psulib_core::*`.
pub use error::{AttemptFailure, Error, Result};
pub use helpers::{format_amps, format_volts};
pub use supply::PowerSupply;
pub use transport::Transport;
pub use types::*;
