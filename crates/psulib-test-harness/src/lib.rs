//! psulib-test-harness: Test utilities and mock transports for psulib.
//!
//! This crate provides [`MockTransport`] for deterministic unit testing of
//! protocol engines without requiring a real power supply.

pub mod mock_serial;

pub use mock_serial::MockTransport;
