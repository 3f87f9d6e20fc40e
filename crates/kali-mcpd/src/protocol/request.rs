//! Request envelope decoding.
//!
//! A request line must decode to a JSON object. Every field is optional at
//! this stage: a missing `id` is echoed as `null`, and a missing or
//! non-string `method` is routed as an unknown method rather than rejected as
//! a parse failure.

use serde::Deserialize;
use serde_json::Value;

use super::errors::ProtocolError;

/// Decoded request envelope.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Request {
    /// Protocol version tag. Accepted but not validated.
    #[serde(default)]
    pub jsonrpc: Option<Value>,
    /// Correlation identifier echoed in the response; `null` when absent.
    #[serde(default)]
    pub id: Value,
    /// Method name.
    #[serde(default)]
    pub method: Option<Value>,
    /// Method parameters.
    #[serde(default)]
    pub params: Option<Value>,
}

impl Request {
    /// Decodes one request line.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Parse`] when the line is not valid JSON or is
    /// not a JSON object.
    pub fn parse(line: &[u8]) -> Result<Self, ProtocolError> {
        let value: Value =
            serde_json::from_slice(line).map_err(|error| ProtocolError::parse(error.to_string()))?;
        if !value.is_object() {
            return Err(ProtocolError::parse("request must be a JSON object"));
        }
        serde_json::from_value(value).map_err(|error| ProtocolError::parse(error.to_string()))
    }

    /// Creates a request for `method` with the given id and params.
    pub fn new(id: Value, method: &str, params: Option<Value>) -> Self {
        Self {
            jsonrpc: Some(Value::from("2.0")),
            id,
            method: Some(Value::from(method)),
            params,
        }
    }

    /// Returns the method name when it is a string.
    pub fn method_name(&self) -> Option<&str> {
        self.method.as_ref().and_then(Value::as_str)
    }

    /// Describes the method for error messages, including non-string values.
    pub fn method_label(&self) -> String {
        match &self.method {
            Some(Value::String(name)) => name.clone(),
            Some(other) => other.to_string(),
            None => String::from("(none)"),
        }
    }
}
