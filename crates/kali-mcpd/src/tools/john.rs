//! `john_crack`: dictionary attack with John the Ripper.

use std::time::Duration;

use camino::Utf8PathBuf;
use kali_exec::{CommandRunner, CommandSpec};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::report::{RunReport, into_payload, missing_file, not_installed, positional};
use super::{DEFAULT_CRACK_WORDLIST, ToolArguments, ToolError, ToolHandler};
use crate::registry::{ParamSpec, ToolDescriptor};

const PROGRAM: &str = "john";
const TIMEOUT: Duration = Duration::from_secs(3600);

#[derive(Debug, Deserialize)]
struct Params {
    hash_file: Utf8PathBuf,
    wordlist: Utf8PathBuf,
}

#[derive(Debug, Serialize)]
struct Report<'a> {
    tool: &'static str,
    hash_file: &'a Utf8PathBuf,
    wordlist: &'a Utf8PathBuf,
    #[serde(flatten)]
    run: RunReport,
}

/// Runs `john` with a wordlist against a file of hashes.
#[derive(Debug, Clone)]
pub struct JohnCrack {
    descriptor: ToolDescriptor,
}

impl JohnCrack {
    /// Tool name.
    pub const NAME: &'static str = "john_crack";

    /// Creates the handler.
    pub fn new() -> Self {
        let descriptor =
            ToolDescriptor::new(Self::NAME, "Crack password hash with John the Ripper")
                .required_param(ParamSpec::string("hash_file", "Path to hash file"))
                .optional(
                    ParamSpec::string("wordlist", "Wordlist path")
                        .with_default(DEFAULT_CRACK_WORDLIST),
                );
        Self { descriptor }
    }
}

impl Default for JohnCrack {
    fn default() -> Self {
        Self::new()
    }
}

fn command(params: &Params) -> Result<CommandSpec, ToolError> {
    let hash_file = positional("hash_file", params.hash_file.as_str())?;
    Ok(CommandSpec::new(PROGRAM)
        .arg(format!("--wordlist={}", params.wordlist))
        .arg(hash_file)
        .timeout(TIMEOUT))
}

impl ToolHandler for JohnCrack {
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
        if let Some(notice) = missing_file("Hash file", &params.hash_file)
            .or_else(|| missing_file("Wordlist", &params.wordlist))
        {
            return Ok(notice);
        }

        let result = runner.run(&spec);
        into_payload(&Report {
            tool: PROGRAM,
            hash_file: &params.hash_file,
            wordlist: &params.wordlist,
            run: RunReport::from(&result),
        })
    }
}
