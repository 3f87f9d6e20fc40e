//! Response envelopes and line framing.

use std::io::{self, Write};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::ProtocolError;

/// Version tag written on every response.
pub const JSONRPC_VERSION: &str = "2.0";

/// Error member of a failed response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorObject {
    /// Stable numeric code.
    pub code: i64,
    /// Human-readable message.
    pub message: String,
}

impl ErrorObject {
    /// Creates an error object.
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Exactly one of a result or an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseBody {
    /// Successful result payload.
    Result(Value),
    /// Failure description.
    Error(ErrorObject),
}

/// A response line.
///
/// ```json
/// {"jsonrpc":"2.0","id":1,"result":{"tools":[]}}
/// {"jsonrpc":"2.0","id":null,"error":{"code":-32700,"message":"Parse error: ..."}}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Always [`JSONRPC_VERSION`].
    pub jsonrpc: String,
    /// Identifier echoed from the request, or `null`.
    pub id: Value,
    /// Result or error member.
    #[serde(flatten)]
    pub body: ResponseBody,
}

impl Response {
    /// Creates a successful response.
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: String::from(JSONRPC_VERSION),
            id,
            body: ResponseBody::Result(result),
        }
    }

    /// Creates an error response.
    pub fn error(id: Value, error: &ProtocolError) -> Self {
        Self {
            jsonrpc: String::from(JSONRPC_VERSION),
            id,
            body: ResponseBody::Error(error.to_error_object()),
        }
    }

    /// Returns the result payload, if successful.
    pub fn result(&self) -> Option<&Value> {
        match &self.body {
            ResponseBody::Result(value) => Some(value),
            ResponseBody::Error(_) => None,
        }
    }

    /// Returns the error object, if failed.
    pub fn error_object(&self) -> Option<&ErrorObject> {
        match &self.body {
            ResponseBody::Result(_) => None,
            ResponseBody::Error(error) => Some(error),
        }
    }
}

/// Writes responses as newline-terminated JSON, flushing after each one.
pub struct ResponseWriter<W> {
    writer: W,
}

impl<W: Write> ResponseWriter<W> {
    /// Wraps an output stream.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Writes one response line and flushes.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization, writing, or flushing fails.
    pub fn write_response(&mut self, response: &Response) -> io::Result<()> {
        serde_json::to_writer(&mut self.writer, response)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()
    }
}
