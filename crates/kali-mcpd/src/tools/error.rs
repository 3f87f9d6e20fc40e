use thiserror::Error;

/// Failures raised by tool handlers before or after execution.
///
/// Everything except [`ToolError::Internal`] is a parameter problem and is
/// reported to the client as invalid params.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolError {
    /// A required parameter was absent or `null`.
    #[error("missing required parameter '{name}'")]
    MissingParameter {
        /// Parameter name.
        name: String,
    },

    /// A parameter had the wrong JSON type.
    #[error("parameter '{name}' must be {expected}")]
    InvalidType {
        /// Parameter name.
        name: String,
        /// Expected type, with article.
        expected: &'static str,
    },

    /// A parameter had the right type but an unusable value.
    #[error("invalid value for '{name}': {reason}")]
    InvalidValue {
        /// Parameter name.
        name: String,
        /// What is wrong with it.
        reason: String,
    },

    /// The handler failed for reasons unrelated to its parameters.
    #[error("{message}")]
    Internal {
        /// Failure description.
        message: String,
    },
}

impl ToolError {
    /// Creates a missing parameter error.
    pub fn missing(name: impl Into<String>) -> Self {
        Self::MissingParameter { name: name.into() }
    }

    /// Creates an invalid type error.
    pub fn invalid_type(name: impl Into<String>, expected: &'static str) -> Self {
        Self::InvalidType {
            name: name.into(),
            expected,
        }
    }

    /// Creates an invalid value error.
    pub fn invalid_value(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` when the caller's parameters are at fault.
    pub const fn is_invalid_params(&self) -> bool {
        !matches!(self, Self::Internal { .. })
    }
}
