//! Bk1785 -- [`PowerSupply`] implementation for the BK Precision 1785B series.
//!
//! This module ties together the frame codec ([`frame`](crate::frame)),
//! command builders ([`commands`](crate::commands)), the retrying
//! dispatcher ([`io`](crate::io)), and status decoding
//! ([`status`](crate::status)) to provide a blocking driver that
//! implements the [`PowerSupply`] trait from `psulib-core`.

use psulib_core::error::{Error, Result};
use psulib_core::transport::Transport;
use psulib_core::types::{Manufacturer, PsuInfo, RetryPolicy, StatusSnapshot};
use psulib_core::{PowerSupply, format_amps, format_volts};
use tracing::{debug, warn};

use crate::commands;
use crate::frame::Frame;
use crate::io;
use crate::models::Bk1785Model;
use crate::status::parse_status;

/// A connected BK Precision 1785B-series supply.
///
/// Created via [`Bk1785Builder`](crate::builder::Bk1785Builder). All
/// communication happens over the [`Transport`] the driver owns; each call
/// completes its exchange before returning.
pub struct Bk1785 {
    transport: Box<dyn Transport>,
    model: Bk1785Model,
    info: PsuInfo,
    address: u8,
    policy: RetryPolicy,
}

impl Bk1785 {
    /// Create a new `Bk1785` from its constituent parts.
    ///
    /// This is called by [`Bk1785Builder`](crate::builder::Bk1785Builder);
    /// callers should use the builder API instead.
    pub(crate) fn new(
        transport: Box<dyn Transport>,
        model: Bk1785Model,
        address: u8,
        policy: RetryPolicy,
    ) -> Self {
        let info = PsuInfo {
            manufacturer: Manufacturer::BkPrecision,
            model_name: model.name.to_string(),
        };
        Bk1785 {
            transport,
            model,
            info,
            address,
            policy,
        }
    }

    /// The address commands are sent to and responses are expected from.
    pub fn address(&self) -> u8 {
        self.address
    }

    /// The model definition this driver was built for.
    pub fn model(&self) -> &Bk1785Model {
        &self.model
    }

    /// The retry bounds applied to every exchange.
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Move the supply to a new communication address.
    ///
    /// The command goes out on the current address. Once the supply
    /// acknowledges it, the driver talks to `new_address` from then on.
    pub fn set_address(&mut self, new_address: u8) -> Result<()> {
        let frame = commands::cmd_set_address(self.address, new_address)?;
        self.ack_command(&frame)?;
        debug!(old = self.address, new = new_address, "supply address changed");
        self.address = new_address;
        Ok(())
    }

    /// Enable or disable the supply's front-panel keys.
    pub fn local_key(&mut self, on: bool) -> Result<()> {
        let frame = commands::cmd_local_key(self.address, on)?;
        self.ack_command(&frame)
    }

    /// Release the driver and hand back its transport without sending
    /// anything. Use [`close`](PowerSupply::close) first for an orderly
    /// shutdown.
    pub fn into_transport(self) -> Box<dyn Transport> {
        self.transport
    }

    fn ack_command(&mut self, frame: &Frame) -> Result<()> {
        io::execute_ack_command(self.transport.as_mut(), self.address, frame, &self.policy)
    }

    fn check_voltage_rating(&self, volts: f64, what: &str) -> Result<()> {
        if volts > self.model.max_voltage {
            return Err(Error::InvalidParameter(format!(
                "{what} {} exceeds the {} rating of {}",
                format_volts(volts),
                self.model.name,
                format_volts(self.model.max_voltage),
            )));
        }
        Ok(())
    }
}

impl PowerSupply for Bk1785 {
    fn info(&self) -> &PsuInfo {
        &self.info
    }

    fn output_enable(&mut self, on: bool) -> Result<()> {
        debug!(on, "output enable");
        let frame = commands::cmd_output_enable(self.address, on)?;
        self.ack_command(&frame)
    }

    fn remote_control(&mut self, on: bool) -> Result<()> {
        debug!(on, "remote control");
        let frame = commands::cmd_remote_control(self.address, on)?;
        self.ack_command(&frame)
    }

    fn set_output_voltage(&mut self, volts: f64) -> Result<()> {
        let frame = commands::cmd_set_output_voltage(self.address, volts)?;
        self.check_voltage_rating(volts, "output voltage")?;
        debug!(volts, "set output voltage");
        self.ack_command(&frame)
    }

    fn set_output_current(&mut self, amps: f64) -> Result<()> {
        let frame = commands::cmd_set_output_current(self.address, amps)?;
        if amps > self.model.max_current {
            return Err(Error::InvalidParameter(format!(
                "output current {} exceeds the {} rating of {}",
                format_amps(amps),
                self.model.name,
                format_amps(self.model.max_current),
            )));
        }
        debug!(amps, "set output current");
        self.ack_command(&frame)
    }

    fn set_maximum_voltage(&mut self, volts: f64) -> Result<()> {
        let frame = commands::cmd_set_maximum_voltage(self.address, volts)?;
        self.check_voltage_rating(volts, "maximum voltage")?;
        debug!(volts, "set maximum voltage");
        self.ack_command(&frame)
    }

    fn status(&mut self) -> Result<StatusSnapshot> {
        let request = commands::cmd_read_config(self.address)?;
        let response = io::execute_status_query(
            self.transport.as_mut(),
            self.address,
            &request,
            &self.policy,
        )?;
        let status = parse_status(&response);
        debug!(%status, "status");
        Ok(status)
    }

    fn close(&mut self) -> Result<()> {
        let output = self.output_enable(false);
        if let Err(ref e) = output {
            warn!(error = %e, "failed to disable output while closing");
        }
        let remote = self.remote_control(false);
        if let Err(ref e) = remote {
            warn!(error = %e, "failed to release remote control while closing");
        }
        output.and(remote)
    }
}
