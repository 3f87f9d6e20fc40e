//! Kali tool server.
//!
//! `kali-mcpd` speaks line-delimited JSON-RPC 2.0 on stdin and stdout and
//! exposes a fixed catalog of security tools (nmap, sqlmap, gobuster,
//! hash identification, John the Ripper, LocalAI analysis, WiFi scanning and
//! aircrack-ng) to an MCP client. Each `tools/call` becomes one bounded
//! child process run through [`kali_exec`]; the captured output is shaped
//! into a tool-specific JSON payload.
//!
//! The crate is layered bottom-up:
//!
//! - [`protocol`] decodes request envelopes and frames responses;
//! - [`registry`] holds tool descriptors and validates arguments;
//! - [`tools`] contains one handler per tool;
//! - [`dispatch`] routes methods to the registry;
//! - [`transport`] runs the read-dispatch-write loop.
//!
//! [`run`] wires these together with [`telemetry`] and [`signals`] for the
//! binary.

pub mod dispatch;
pub mod protocol;
pub mod registry;
pub mod signals;
pub mod telemetry;
pub mod tools;
pub mod transport;

use std::io::{self, Write};
use std::process::ExitCode;

use kali_config::Config;
use kali_exec::SystemRunner;
use tracing::{error, info};

use crate::dispatch::Dispatcher;
use crate::tools::{ToolSettings, builtin_registry};

pub use crate::dispatch::{PROTOCOL_VERSION, SERVER_NAME};
pub use crate::transport::{TransportError, serve};

const SERVER_TARGET: &str = "kali_mcpd";

/// Runs the server on the process's stdin and stdout until end of input.
///
/// Returns success on end of input and failure after an unrecoverable
/// error. Interrupts exit the process directly with success status.
pub fn run(config: &Config) -> ExitCode {
    if let Err(telemetry_error) = telemetry::initialise(config) {
        writeln!(io::stderr(), "kali-mcpd: {telemetry_error}").ok();
        return ExitCode::FAILURE;
    }

    let _signals = match signals::install() {
        Ok(listener) => listener,
        Err(signal_error) => {
            error!(target: SERVER_TARGET, %signal_error, "cannot handle interrupts");
            return ExitCode::FAILURE;
        }
    };

    let registry = match builtin_registry(&ToolSettings::from_config(config)) {
        Ok(registry) => registry,
        Err(registry_error) => {
            error!(target: SERVER_TARGET, %registry_error, "tool registry is inconsistent");
            return ExitCode::FAILURE;
        }
    };
    info!(
        target: SERVER_TARGET,
        version = env!("CARGO_PKG_VERSION"),
        tools = registry.len(),
        "server starting"
    );

    let dispatcher = Dispatcher::new(registry, SystemRunner::new());
    match serve(&dispatcher, io::stdin().lock(), io::stdout().lock()) {
        Ok(answered) => {
            info!(target: SERVER_TARGET, answered, "end of input, shutting down");
            ExitCode::SUCCESS
        }
        Err(transport_error) => {
            error!(target: SERVER_TARGET, %transport_error, "transport failed");
            transport::write_fatal(io::stdout(), &transport_error);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests;
