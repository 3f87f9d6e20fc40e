//! Compiled-in defaults and the environment variable names that override
//! them.

/// Default log filter expression used by the server.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Model requested from the LocalAI endpoint when none is configured.
pub const DEFAULT_LOCALAI_MODEL: &str = "llama-3-8b";

/// Environment variable overriding the log filter.
pub const LOG_FILTER_ENV: &str = "KALI_MCP_LOG_FILTER";

/// Environment variable overriding the log format.
pub const LOG_FORMAT_ENV: &str = "KALI_MCP_LOG_FORMAT";

/// Environment variable overriding the LocalAI model name.
pub const LOCALAI_MODEL_ENV: &str = "KALI_MCP_LOCALAI_MODEL";

/// Default log filter expression used by the server.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Default logging format for the server.
#[must_use]
pub const fn default_log_format() -> crate::logging::LogFormat {
    crate::logging::LogFormat::Json
}

/// Default model name sent with LocalAI analysis requests.
#[must_use]
pub const fn default_localai_model() -> &'static str {
    DEFAULT_LOCALAI_MODEL
}
