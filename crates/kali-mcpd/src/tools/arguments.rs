//! Validated tool arguments.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::error::ToolError;

/// Arguments that passed schema validation, with defaults applied.
///
/// Handlers turn these into their own typed parameter struct with
/// [`ToolArguments::parse`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolArguments(Map<String, Value>);

impl ToolArguments {
    /// Wraps an already-validated argument map.
    pub const fn new(arguments: Map<String, Value>) -> Self {
        Self(arguments)
    }

    /// Looks up one argument.
    #[cfg(test)]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Deserializes into a handler's parameter type.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::InvalidValue`] when the arguments do not fit `T`.
    pub fn parse<T: DeserializeOwned>(self) -> Result<T, ToolError> {
        serde_json::from_value(Value::Object(self.0))
            .map_err(|error| ToolError::invalid_value("arguments", error.to_string()))
    }
}
