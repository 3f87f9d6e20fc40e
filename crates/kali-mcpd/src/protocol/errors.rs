//! Protocol-level error taxonomy.
//!
//! Every failure that reaches the client is one of a small, closed set of
//! kinds, each with a stable numeric code. Tool execution failures are not
//! protocol errors: they travel as payload data inside a successful
//! `tools/call` result.

use thiserror::Error;

use super::response::ErrorObject;

/// Stable numeric codes sent in the `error.code` field.
pub mod codes {
    /// The line was not a decodable request envelope.
    pub const PARSE_ERROR: i64 = -32700;
    /// The `method` is not one the server implements.
    pub const METHOD_NOT_FOUND: i64 = -32601;
    /// Parameters were missing, mistyped, or out of range.
    pub const INVALID_PARAMS: i64 = -32602;
    /// The server failed while handling an otherwise valid request.
    pub const INTERNAL_ERROR: i64 = -32603;
    /// `tools/call` named a tool that is not registered.
    pub const TOOL_NOT_FOUND: i64 = -32001;
}

/// Category of a protocol error, for branching without string matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`codes::PARSE_ERROR`].
    Parse,
    /// See [`codes::METHOD_NOT_FOUND`].
    UnknownMethod,
    /// See [`codes::INVALID_PARAMS`].
    InvalidParams,
    /// See [`codes::INTERNAL_ERROR`].
    Internal,
    /// See [`codes::TOOL_NOT_FOUND`].
    ToolNotFound,
}

impl ErrorKind {
    /// Returns the wire code for this kind.
    #[must_use]
    pub const fn code(self) -> i64 {
        match self {
            Self::Parse => codes::PARSE_ERROR,
            Self::UnknownMethod => codes::METHOD_NOT_FOUND,
            Self::InvalidParams => codes::INVALID_PARAMS,
            Self::Internal => codes::INTERNAL_ERROR,
            Self::ToolNotFound => codes::TOOL_NOT_FOUND,
        }
    }
}

/// Failures reported to the client as JSON-RPC error objects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// The line could not be decoded as a request envelope.
    #[error("Parse error: {message}")]
    Parse { message: String },

    /// The request named a method the server does not implement.
    #[error("Unknown method: {method}")]
    UnknownMethod { method: String },

    /// Parameters failed validation.
    #[error("Invalid params: {message}")]
    InvalidParams { message: String },

    /// `tools/call` named an unregistered tool.
    #[error("Unknown tool: {name}")]
    ToolNotFound { name: String },

    /// A handler failed or panicked.
    #[error("Internal error: {message}")]
    Internal { message: String },

    /// The transport failed and the server is about to exit.
    #[error("Fatal error: {message}")]
    Fatal { message: String },
}

impl ProtocolError {
    /// Returns the error category.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Parse { .. } => ErrorKind::Parse,
            Self::UnknownMethod { .. } => ErrorKind::UnknownMethod,
            Self::InvalidParams { .. } => ErrorKind::InvalidParams,
            Self::ToolNotFound { .. } => ErrorKind::ToolNotFound,
            Self::Internal { .. } | Self::Fatal { .. } => ErrorKind::Internal,
        }
    }

    /// Returns the wire code.
    #[must_use]
    pub const fn code(&self) -> i64 {
        self.kind().code()
    }

    /// Builds the error object placed in a response.
    #[must_use]
    pub fn to_error_object(&self) -> ErrorObject {
        ErrorObject::new(self.code(), self.to_string())
    }

    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Creates an unknown method error.
    pub fn unknown_method(method: impl Into<String>) -> Self {
        Self::UnknownMethod {
            method: method.into(),
        }
    }

    /// Creates an invalid params error.
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::InvalidParams {
            message: message.into(),
        }
    }

    /// Creates a tool not found error.
    pub fn tool_not_found(name: impl Into<String>) -> Self {
        Self::ToolNotFound { name: name.into() }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Creates a fatal transport error.
    pub fn fatal(message: impl Into<String>) -> Self {
        Self::Fatal {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::parse(ProtocolError::parse("expected value"), -32700)]
    #[case::method(ProtocolError::unknown_method("resources/list"), -32601)]
    #[case::params(ProtocolError::invalid_params("missing target"), -32602)]
    #[case::internal(ProtocolError::internal("handler panicked"), -32603)]
    #[case::fatal(ProtocolError::fatal("stdin closed"), -32603)]
    #[case::tool(ProtocolError::tool_not_found("hydra"), -32001)]
    fn codes_are_stable(#[case] error: ProtocolError, #[case] expected: i64) {
        assert_eq!(error.code(), expected);
    }

    #[test]
    fn messages_name_the_subject() {
        assert_eq!(
            ProtocolError::unknown_method("resources/list").to_string(),
            "Unknown method: resources/list"
        );
        assert_eq!(
            ProtocolError::tool_not_found("hydra").to_string(),
            "Unknown tool: hydra"
        );
    }

    #[test]
    fn error_object_carries_code_and_message() {
        let object = ProtocolError::parse("EOF while parsing").to_error_object();
        assert_eq!(object.code, -32700);
        assert_eq!(object.message, "Parse error: EOF while parsing");
    }
}
