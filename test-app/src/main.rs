// psulib test application -- CLI tool for exercising the BK Precision
// 1785B-series backend against real hardware.
//
// Usage:
//   psulib-test-app list
//   psulib-test-app --model 1785B --port /dev/ttyUSB0 status
//   psulib-test-app --model 1787B --port /dev/ttyUSB0 --baud 38400 voltage 24.5
//   psulib-test-app --port COM3 --address 0x05 output on
//   psulib-test-app --port /dev/ttyUSB0 demo --wait 5

use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use psulib::bk::builder::Bk1785Builder;
use psulib::bk::models::{self, Bk1785Model};
use psulib::bk::Bk1785;
use psulib::{PowerSupply, Switch, format_amps, format_volts};

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// psulib test application -- drives a bench supply from the command line.
#[derive(Parser)]
#[command(name = "psulib-test-app", version, about)]
struct Cli {
    /// Supply model (1785B, 1786B, 1787B, 1788B).
    #[arg(long, default_value = "1785B")]
    model: String,

    /// Serial port path (e.g. /dev/ttyUSB0, COM3).
    /// Required for all commands except `list`.
    #[arg(long)]
    port: Option<String>,

    /// Override the default baud rate (4800, 9600, 19200, 38400).
    #[arg(long)]
    baud: Option<u32>,

    /// Supply address (decimal, or hex with 0x prefix).
    #[arg(long, value_parser = parse_address, default_value = "0")]
    address: u8,

    /// Maximum frames written per command before giving up.
    #[arg(long, default_value_t = 10)]
    retries: u32,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List all supported supply models.
    List,

    /// Read and print the supply's status.
    Status,

    /// Turn the output on or off.
    Output {
        /// on or off.
        state: Switch,
    },

    /// Take or release remote control.
    Remote {
        /// on or off.
        state: Switch,
    },

    /// Set the output voltage (volts).
    Voltage {
        /// Volts, e.g. 12.0.
        volts: f64,
    },

    /// Set the output current (amps).
    Current {
        /// Amps, e.g. 0.2.
        amps: f64,
    },

    /// Set the maximum output voltage (volts).
    MaxVoltage {
        /// Volts, e.g. 15.0.
        volts: f64,
    },

    /// Move the supply to a new address.
    Address {
        /// New address (decimal, or hex with 0x prefix).
        #[arg(value_parser = parse_address)]
        new_address: u8,
    },

    /// Enable or disable the front-panel keys.
    LocalKey {
        /// on or off.
        state: Switch,
    },

    /// Remote on, 12 V / 0.2 A, output on, print status, wait, close.
    Demo {
        /// Seconds to hold the output on before closing.
        #[arg(long, default_value_t = 5)]
        wait: u64,
    },
}

/// Parse an address like "5", "0x05" or "0X05" into a u8.
fn parse_address(s: &str) -> std::result::Result<u8, String> {
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16).map_err(|e| format!("invalid hex address: {e}")),
        None => s.parse::<u8>().map_err(|e| format!("invalid address: {e}")),
    }
}

fn on_off(on: bool) -> &'static str {
    if on { "ON" } else { "OFF" }
}

// ---------------------------------------------------------------------------
// Model lookup and connection
// ---------------------------------------------------------------------------

fn lookup_model(name: &str) -> Result<Bk1785Model> {
    models::model_by_name(name).with_context(|| {
        let names: Vec<_> = models::all_models().iter().map(|m| m.name).collect();
        format!("unknown model '{name}'. Supported: {}", names.join(", "))
    })
}

fn connect(cli: &Cli) -> Result<Bk1785> {
    let model = lookup_model(&cli.model)?;
    let Some(port) = cli.port.as_deref() else {
        bail!("--port is required for this command");
    };

    let mut builder = Bk1785Builder::new(model)
        .serial_port(port)
        .address(cli.address)
        .max_attempts(cli.retries);
    if let Some(baud) = cli.baud {
        builder = builder.baud_rate(baud);
    }

    let psu = builder
        .build()
        .with_context(|| format!("failed to connect to {port}"))?;
    println!(
        "Connected to {port} -- BK Precision {} at address {}",
        psu.model().name,
        psu.address()
    );
    Ok(psu)
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn cmd_list() -> Result<()> {
    let supplies = psulib::supported_supplies();
    if supplies.is_empty() {
        println!("No models found.");
        return Ok(());
    }

    println!(
        "{:<12}  {:<6}  {:>10}  {:>9}  {:>6}",
        "Manufacturer", "Model", "Voltage", "Current", "Baud"
    );
    println!(
        "{:<12}  {:<6}  {:>10}  {:>9}  {:>6}",
        "------------", "------", "----------", "---------", "------"
    );
    for s in &supplies {
        println!(
            "{:<12}  {:<6}  {:>10}  {:>9}  {:>6}",
            s.manufacturer.to_string(),
            s.model_name,
            format_volts(s.max_voltage),
            format_amps(s.max_current),
            s.default_baud_rate,
        );
    }
    println!();
    println!("{} models total.", supplies.len());
    Ok(())
}

fn cmd_status(psu: &mut dyn PowerSupply) -> Result<()> {
    let status = psu.status().context("status query failed")?;

    println!("Supply Status");
    println!("  Address:         {}", status.address);
    println!("  Output:          {}", on_off(status.output_enabled));
    println!("  Mode:            {}", status.output_mode);
    println!("  Control:         {}", status.operation_state);
    println!("  Fan speed:       {}", status.fan_speed);
    println!("  Over-heat:       {}", if status.over_heat { "YES" } else { "no" });
    println!();
    println!("  Output voltage:  {}", format_volts(status.output_voltage));
    println!("  Output current:  {}", format_amps(status.output_current));
    println!("  Target voltage:  {}", format_volts(status.target_voltage));
    println!("  Target current:  {}", format_amps(status.target_current));
    println!("  Maximum voltage: {}", format_volts(status.maximum_voltage));
    Ok(())
}

fn cmd_demo(psu: &mut dyn PowerSupply, wait: u64) -> Result<()> {
    psu.remote_control(true).context("remote control on")?;
    println!("Remote control: ON");
    psu.set_output_voltage(12.0).context("set 12 V")?;
    println!("Voltage set to {}", format_volts(12.0));
    psu.set_output_current(0.2).context("set 0.2 A")?;
    println!("Current set to {}", format_amps(0.2));
    psu.output_enable(true).context("output on")?;
    println!("Output: ON");

    let status = psu.status().context("status query failed")?;
    println!("{status}");

    println!("Holding for {wait} s...");
    thread::sleep(Duration::from_secs(wait));

    psu.close().context("close sequence failed")?;
    println!("Output: OFF, remote control released");
    Ok(())
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();

    // The `list` command does not require a connection.
    if matches!(cli.command, Command::List) {
        return cmd_list();
    }

    let mut psu = connect(&cli)?;

    match &cli.command {
        Command::Status => cmd_status(&mut psu),
        Command::Output { state } => {
            psu.output_enable(state.0).context("output enable failed")?;
            println!("Output: {}", on_off(state.0));
            Ok(())
        }
        Command::Remote { state } => {
            psu.remote_control(state.0).context("remote control failed")?;
            println!("Remote control: {}", on_off(state.0));
            Ok(())
        }
        Command::Voltage { volts } => {
            psu.set_output_voltage(*volts).context("set voltage failed")?;
            println!("Voltage set to {}", format_volts(*volts));
            Ok(())
        }
        Command::Current { amps } => {
            psu.set_output_current(*amps).context("set current failed")?;
            println!("Current set to {}", format_amps(*amps));
            Ok(())
        }
        Command::MaxVoltage { volts } => {
            psu.set_maximum_voltage(*volts)
                .context("set maximum voltage failed")?;
            println!("Maximum voltage set to {}", format_volts(*volts));
            Ok(())
        }
        Command::Address { new_address } => {
            let old = psu.address();
            psu.set_address(*new_address).context("set address failed")?;
            println!("Address changed: {old} -> {new_address}");
            Ok(())
        }
        Command::LocalKey { state } => {
            psu.local_key(state.0).context("local key failed")?;
            println!("Front-panel keys: {}", on_off(state.0));
            Ok(())
        }
        Command::Demo { wait } => cmd_demo(&mut psu, *wait),
        Command::List => unreachable!("list handled above"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_addresses() {
        assert_eq!(parse_address("5"), Ok(5));
        assert_eq!(parse_address("0x1F"), Ok(0x1F));
        assert_eq!(parse_address("0X0a"), Ok(0x0A));
        assert!(parse_address("256").is_err());
        assert!(parse_address("0xZZ").is_err());
    }

    #[test]
    fn parses_switch_subcommand() {
        let cli = Cli::try_parse_from(["psulib-test-app", "--port", "COM3", "output", "on"]).unwrap();
        assert!(matches!(cli.command, Command::Output { state: Switch(true) }));
        assert_eq!(cli.model, "1785B");
        assert_eq!(cli.retries, 10);
    }

    #[test]
    fn rejects_bad_switch() {
        assert!(Cli::try_parse_from(["psulib-test-app", "remote", "maybe"]).is_err());
    }

    #[test]
    fn unknown_model_lists_supported() {
        let err = lookup_model("9129B").unwrap_err().to_string();
        assert!(err.contains("1785B"));
        assert!(err.contains("1788B"));
    }
}
