//! `gobuster_scan`: directory and file brute-forcing.

use std::time::Duration;

use kali_exec::{CommandRunner, CommandSpec};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::report::{RunReport, into_payload, not_installed, positional};
use super::{ToolArguments, ToolError, ToolHandler};
use crate::registry::{ParamSpec, ToolDescriptor};

const PROGRAM: &str = "gobuster";
const TIMEOUT: Duration = Duration::from_secs(600);
const DEFAULT_WORDLIST: &str = "/usr/share/wordlists/dirb/common.txt";

#[derive(Debug, Deserialize)]
struct Params {
    url: String,
    wordlist: String,
    extensions: String,
}

#[derive(Debug, Serialize)]
struct Report<'a> {
    tool: &'static str,
    url: &'a str,
    #[serde(flatten)]
    run: RunReport,
}

/// Runs `gobuster dir` against a web root.
#[derive(Debug, Clone)]
pub struct GobusterScan {
    descriptor: ToolDescriptor,
}

impl GobusterScan {
    /// Tool name.
    pub const NAME: &'static str = "gobuster_scan";

    /// Creates the handler.
    pub fn new() -> Self {
        let descriptor =
            ToolDescriptor::new(Self::NAME, "Directory/file brute-forcing with gobuster")
                .required_param(ParamSpec::string("url", "Target URL"))
                .optional(
                    ParamSpec::string("wordlist", "Wordlist path").with_default(DEFAULT_WORDLIST),
                )
                .optional(
                    ParamSpec::string(
                        "extensions",
                        "File extensions to search (e.g., 'php,html,txt')",
                    )
                    .with_default(""),
                );
        Self { descriptor }
    }
}

impl Default for GobusterScan {
    fn default() -> Self {
        Self::new()
    }
}

fn command(params: &Params) -> Result<CommandSpec, ToolError> {
    let url = positional("url", &params.url)?;
    let wordlist = positional("wordlist", &params.wordlist)?;
    let mut spec = CommandSpec::new(PROGRAM).args(["dir", "-u", url, "-w", wordlist]);
    if !params.extensions.is_empty() {
        spec = spec.args(["-x", params.extensions.as_str()]);
    }
    Ok(spec.timeout(TIMEOUT))
}

impl ToolHandler for GobusterScan {
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
            url: &params.url,
            run: RunReport::from(&result),
        })
    }
}
