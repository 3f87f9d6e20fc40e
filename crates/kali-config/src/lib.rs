//! Shared configuration for the Kali tool server.
//!
//! Settings are layered in the usual order: command-line flags win over
//! environment variables, which win over the compiled-in defaults exposed by
//! the [`defaults`] module. Parsing is delegated to `clap` so the binary gains
//! `--help` and `--version` handling for free.
//!
//! Only ambient concerns live here (log filtering, log format, and the model
//! requested from LocalAI). Tool parameter defaults are part of the tool
//! catalog and are not configurable.

use std::ffi::OsString;

use clap::Parser;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod defaults;
mod logging;

pub use defaults::{
    DEFAULT_LOCALAI_MODEL, DEFAULT_LOG_FILTER, LOCALAI_MODEL_ENV, LOG_FILTER_ENV, LOG_FORMAT_ENV,
    default_localai_model, default_log_filter, default_log_format,
};
pub use logging::{LogFormat, LogFormatParseError};

/// Runtime configuration for the server binary.
#[derive(Debug, Clone, PartialEq, Eq, Parser, Serialize, Deserialize)]
#[command(
    name = "kali-mcpd",
    version,
    about = "Line-delimited JSON-RPC server exposing Kali security tools"
)]
pub struct Config {
    /// Tracing filter expression (for example `info` or `kali_exec=debug`).
    #[arg(long, env = LOG_FILTER_ENV, default_value = DEFAULT_LOG_FILTER)]
    pub log_filter: String,

    /// Log output format written to stderr.
    #[arg(long, env = LOG_FORMAT_ENV, default_value_t = LogFormat::Json)]
    pub log_format: LogFormat,

    /// Model name sent with LocalAI analysis requests.
    #[arg(long, env = LOCALAI_MODEL_ENV, default_value = DEFAULT_LOCALAI_MODEL)]
    pub localai_model: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter().to_owned(),
            log_format: default_log_format(),
            localai_model: default_localai_model().to_owned(),
        }
    }
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Command-line or environment parsing failed, or help/version was
    /// requested.
    #[error(transparent)]
    Parse(#[from] clap::Error),
}

impl ConfigError {
    /// Returns `true` when the error represents an informational exit such as
    /// `--help` or `--version` rather than a genuine failure.
    #[must_use]
    pub fn is_informational(&self) -> bool {
        match self {
            Self::Parse(error) => !error.use_stderr(),
        }
    }

    /// Prints the diagnostic using clap's formatting rules.
    ///
    /// # Errors
    ///
    /// Returns an error when the diagnostic cannot be written.
    pub fn print(&self) -> std::io::Result<()> {
        match self {
            Self::Parse(error) => error.print(),
        }
    }
}

impl Config {
    /// Loads configuration from the process arguments and environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the arguments are invalid or when
    /// help/version output was requested.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_iter(std::env::args_os())
    }

    /// Loads configuration from an explicit argument list.
    ///
    /// The first element is treated as the binary name, mirroring
    /// [`std::env::args_os`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the arguments are invalid.
    pub fn load_from_iter<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Ok(Self::try_parse_from(args)?)
    }

    /// Tracing filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Selected log format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Model name used for LocalAI analysis.
    #[must_use]
    pub fn localai_model(&self) -> &str {
        self.localai_model.as_str()
    }
}
