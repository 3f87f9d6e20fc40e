//! Payload shaping shared by the handlers.
//!
//! Execution failures are data, not protocol errors: a handler whose binary
//! is missing, whose input file does not exist, or whose command fails still
//! returns a payload, and the dispatcher wraps it in a successful response.

use camino::Utf8Path;
use kali_exec::ExecutionResult;
use serde::Serialize;
use serde_json::{Value, json};

use super::error::ToolError;

/// Hint appended to "not found" notices for the scanner binaries.
pub const INSTALL_HINT: &str = "Install with: just install-kali-tools";

/// `output`/`error` pair carried by every execution payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Merged stdout/stderr of the run.
    pub output: String,
    /// Error text when the run did not succeed, otherwise `null`.
    pub error: Option<String>,
}

impl From<&ExecutionResult> for RunReport {
    fn from(result: &ExecutionResult) -> Self {
        Self {
            output: result.output().to_owned(),
            error: result.error_text().map(str::to_owned),
        }
    }
}

/// Payload for a tool whose binary is not installed.
pub fn not_installed(program: &str) -> Value {
    notice(format!("{program} not found. {INSTALL_HINT}"))
}

/// Payload carrying only an `error` message.
pub fn notice(message: impl Into<String>) -> Value {
    json!({ "error": message.into() })
}

/// Serializes a typed report into the payload value.
///
/// # Errors
///
/// Returns [`ToolError::Internal`] if the report cannot be represented as
/// JSON.
pub fn into_payload<T: Serialize>(report: &T) -> Result<Value, ToolError> {
    serde_json::to_value(report)
        .map_err(|error| ToolError::internal(format!("failed to encode payload: {error}")))
}

/// Rejects values that a tool would read as an option flag.
///
/// # Errors
///
/// Returns [`ToolError::InvalidValue`] when `value` is blank or begins with
/// `-`.
pub fn positional<'a>(name: &str, value: &'a str) -> Result<&'a str, ToolError> {
    if value.trim().is_empty() {
        return Err(ToolError::invalid_value(name, "must not be empty"));
    }
    if value.starts_with('-') {
        return Err(ToolError::invalid_value(name, "must not start with '-'"));
    }
    Ok(value)
}

/// Returns a "not found" notice when `path` does not exist.
pub fn missing_file(label: &str, path: &Utf8Path) -> Option<Value> {
    (!path.exists()).then(|| notice(format!("{label} not found: {path}")))
}
