//! Log output formats for the stderr diagnostic stream.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// How diagnostic events are rendered on stderr.
///
/// Stdout is reserved for protocol responses, so both formats only ever
/// affect stderr.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// One flattened JSON object per event, for log collectors wrapping the
    /// MCP client.
    #[default]
    Json,
    /// Single-line human-readable events, for running the server by hand.
    Compact,
}

/// Error returned when `--log-format` or `KALI_MCP_LOG_FORMAT` names an
/// unknown format.
pub type LogFormatParseError = strum::ParseError;
