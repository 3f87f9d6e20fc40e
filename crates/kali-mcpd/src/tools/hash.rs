//! `hash_identify`: hash type identification.
//!
//! Prefers `hashid`, then `hash-identifier` (which reads the hash from
//! stdin). With neither installed, a length and prefix heuristic classifies
//! the common formats.

use std::time::Duration;

use kali_exec::{CommandRunner, CommandSpec};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::report::{RunReport, into_payload, positional};
use super::{ToolArguments, ToolError, ToolHandler};
use crate::registry::{ParamSpec, ToolDescriptor};

const HASHID: &str = "hashid";
const HASH_IDENTIFIER: &str = "hash-identifier";
const TIMEOUT: Duration = Duration::from_secs(30);
const UNKNOWN: &str = "Unknown - install hashid for better detection";

#[derive(Debug, Deserialize)]
struct Params {
    hash: String,
}

#[derive(Debug, Serialize)]
struct Report<'a> {
    tool: &'static str,
    hash: &'a str,
    #[serde(flatten)]
    run: RunReport,
}

#[derive(Debug, Serialize)]
struct Heuristic<'a> {
    tool: &'static str,
    hash: &'a str,
    length: usize,
    possible_types: Vec<&'static str>,
    output: String,
}

/// Identifies the algorithm behind a hash string.
#[derive(Debug, Clone)]
pub struct HashIdentify {
    descriptor: ToolDescriptor,
}

impl HashIdentify {
    /// Tool name.
    pub const NAME: &'static str = "hash_identify";

    /// Creates the handler.
    pub fn new() -> Self {
        let descriptor = ToolDescriptor::new(Self::NAME, "Identify hash type")
            .required_param(ParamSpec::string("hash", "Hash to identify"));
        Self { descriptor }
    }
}

impl Default for HashIdentify {
    fn default() -> Self {
        Self::new()
    }
}

/// Classifies `hash` by hex length, then by crypt prefix.
fn classify(hash: &str) -> Option<&'static str> {
    let is_hex = !hash.is_empty() && hash.chars().all(|c| c.is_ascii_hexdigit());
    match hash.chars().count() {
        32 if is_hex => return Some("MD5"),
        40 if is_hex => return Some("SHA1"),
        64 if is_hex => return Some("SHA256"),
        _ => {}
    }
    [
        ("$2", "bcrypt"),
        ("$1$", "MD5 Crypt"),
        ("$5$", "SHA256 Crypt"),
        ("$6$", "SHA512 Crypt"),
    ]
    .into_iter()
    .find_map(|(prefix, name)| hash.starts_with(prefix).then_some(name))
}

fn heuristic(hash: &str) -> Heuristic<'_> {
    let length = hash.chars().count();
    let (possible_types, summary) = match classify(hash) {
        Some(name) => (vec![name], name),
        None => (vec![UNKNOWN], "Unknown"),
    };
    Heuristic {
        tool: "hash_identify",
        hash,
        length,
        possible_types,
        output: format!("Hash length: {length}, Possible types: {summary}"),
    }
}

impl ToolHandler for HashIdentify {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    fn call(
        &self,
        arguments: ToolArguments,
        runner: &dyn CommandRunner,
    ) -> Result<Value, ToolError> {
        let params: Params = arguments.parse()?;
        let hash = positional("hash", &params.hash)?;

        let (tool, spec) = if runner.is_available(HASHID) {
            (HASHID, CommandSpec::new(HASHID).arg(hash))
        } else if runner.is_available(HASH_IDENTIFIER) {
            (
                HASH_IDENTIFIER,
                CommandSpec::new(HASH_IDENTIFIER).input(format!("{hash}\n")),
            )
        } else {
            return into_payload(&heuristic(hash));
        };

        let result = runner.run(&spec.timeout(TIMEOUT));
        into_payload(&Report {
            tool,
            hash,
            run: RunReport::from(&result),
        })
    }
}
