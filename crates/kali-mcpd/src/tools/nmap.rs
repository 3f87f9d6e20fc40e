//! `nmap_scan`: network scanning with nmap.

use std::time::Duration;

use kali_exec::{CommandRunner, CommandSpec};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::report::{RunReport, into_payload, not_installed, positional};
use super::{ToolArguments, ToolError, ToolHandler};
use crate::registry::{ParamSpec, ToolDescriptor};

const PROGRAM: &str = "nmap";
const TIMEOUT: Duration = Duration::from_secs(300);

/// Scan profile selected by `scan_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Profile {
    Stealth,
    Full,
    Quick,
}

impl Profile {
    /// Unrecognised names fall back to a quick scan.
    fn from_name(name: &str) -> Self {
        match name {
            "stealth" => Self::Stealth,
            "full" => Self::Full,
            _ => Self::Quick,
        }
    }

    const fn flags(self) -> &'static [&'static str] {
        match self {
            Self::Stealth => &["-sS", "-T2"],
            Self::Full => &["-sV", "-sC", "-A"],
            Self::Quick => &["-sV", "-sC"],
        }
    }
}

#[derive(Debug, Deserialize)]
struct Params {
    target: String,
    scan_type: String,
    ports: String,
}

#[derive(Debug, Serialize)]
struct Report<'a> {
    tool: &'static str,
    target: &'a str,
    #[serde(flatten)]
    run: RunReport,
}

/// Runs `nmap` against a host or network.
#[derive(Debug, Clone)]
pub struct NmapScan {
    descriptor: ToolDescriptor,
}

impl NmapScan {
    /// Tool name.
    pub const NAME: &'static str = "nmap_scan";

    /// Creates the handler.
    pub fn new() -> Self {
        let descriptor = ToolDescriptor::new(Self::NAME, "Perform network scanning with nmap")
            .required_param(ParamSpec::string("target", "Target host or IP address"))
            .optional(
                ParamSpec::string("scan_type", "Scan type (stealth, full, quick)")
                    .with_default("quick"),
            )
            .optional(
                ParamSpec::string("ports", "Port range (e.g., '80,443' or '1-1000')")
                    .with_default(""),
            );
        Self { descriptor }
    }
}

impl Default for NmapScan {
    fn default() -> Self {
        Self::new()
    }
}

fn command(params: &Params) -> Result<CommandSpec, ToolError> {
    let target = positional("target", &params.target)?;
    let mut spec = CommandSpec::new(PROGRAM)
        .args(Profile::from_name(&params.scan_type).flags().iter().copied());
    if !params.ports.is_empty() {
        spec = spec.args(["-p", params.ports.as_str()]);
    }
    Ok(spec.arg(target).timeout(TIMEOUT))
}

impl ToolHandler for NmapScan {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    fn call(
        &self,
        arguments: ToolArguments,
        runner: &dyn CommandRunner,
    ) -> Result<Value, ToolError> {
        let params: Params = arguments.parse()?;
        let spec = command(&params)?;
        if !runner.is_available(PROGRAM) {
            return Ok(not_installed(PROGRAM));
        }

        let result = runner.run(&spec);
        into_payload(&Report {
            tool: PROGRAM,
            target: &params.target,
            run: RunReport::from(&result),
        })
    }
}
