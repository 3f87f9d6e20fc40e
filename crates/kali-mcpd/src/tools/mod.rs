//! Tool handlers.
//!
//! Each handler owns its [`ToolDescriptor`] and turns validated
//! [`ToolArguments`] into a discrete argument vector for the executor, then
//! shapes the [`ExecutionResult`](kali_exec::ExecutionResult) into a
//! tool-specific JSON payload. Handlers never touch the process API
//! directly; they receive a [`CommandRunner`] so tests can observe exactly
//! what would have been spawned.
//!
//! Adding a capability means adding one module here and one line to
//! [`builtin_registry`].

mod aircrack;
mod arguments;
mod error;
mod gobuster;
mod hash;
mod john;
mod localai;
mod nmap;
pub mod report;
mod sqlmap;
mod wifi;

#[cfg(test)]
pub(crate) mod test_support;

use kali_config::Config;
use kali_exec::CommandRunner;
use serde_json::Value;

pub use self::aircrack::AircrackCrack;
pub use self::arguments::ToolArguments;
pub use self::error::ToolError;
pub use self::gobuster::GobusterScan;
pub use self::hash::HashIdentify;
pub use self::john::JohnCrack;
pub use self::localai::AnalyzeWithLocalAi;
pub use self::nmap::NmapScan;
pub use self::sqlmap::SqlmapScan;
pub use self::wifi::WifiScan;
use crate::registry::{RegistryError, ToolDescriptor, ToolRegistry};

/// Wordlist used by the cracking tools when none is given.
pub const DEFAULT_CRACK_WORDLIST: &str = "/usr/share/wordlists/rockyou.txt";

/// A single capability exposed through `tools/call`.
pub trait ToolHandler: Send + Sync {
    /// The tool's name and parameter schema.
    fn descriptor(&self) -> &ToolDescriptor;

    /// Runs the tool with arguments already validated against
    /// [`ToolHandler::descriptor`].
    ///
    /// # Errors
    ///
    /// Returns a [`ToolError`] when an argument value is unusable or the
    /// payload cannot be built. Failed executions are reported inside the
    /// returned payload instead.
    fn call(&self, arguments: ToolArguments, runner: &dyn CommandRunner)
    -> Result<Value, ToolError>;
}

/// Settings the handlers take from the server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolSettings {
    /// Model name sent with LocalAI analysis requests.
    pub localai_model: String,
}

impl ToolSettings {
    /// Extracts handler settings from the server configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            localai_model: config.localai_model().to_owned(),
        }
    }
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Builds the registry holding the eight built-in tools, in the order they
/// are advertised.
///
/// # Errors
///
/// Returns [`RegistryError::Duplicate`] if two handlers share a name.
pub fn builtin_registry(settings: &ToolSettings) -> Result<ToolRegistry, RegistryError> {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(NmapScan::new()))?;
    registry.register(Box::new(SqlmapScan::new()))?;
    registry.register(Box::new(GobusterScan::new()))?;
    registry.register(Box::new(HashIdentify::new()))?;
    registry.register(Box::new(JohnCrack::new()))?;
    registry.register(Box::new(AnalyzeWithLocalAi::new(
        settings.localai_model.clone(),
    )))?;
    registry.register(Box::new(WifiScan::new()))?;
    registry.register(Box::new(AircrackCrack::new()))?;
    Ok(registry)
}
