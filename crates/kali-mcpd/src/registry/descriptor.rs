//! Tool descriptors and their parameter schemas.
//!
//! A [`ToolDescriptor`] is the single source of truth for a tool: it is what
//! `tools/list` advertises and what `tools/call` validates against.

use serde::Serialize;
use serde::ser::{SerializeMap, SerializeStruct, Serializer};
use serde_json::{Map, Value};

use crate::tools::{ToolArguments, ToolError};

/// JSON type accepted by a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    /// A JSON string.
    String,
    /// A JSON integer.
    Integer,
}

impl ParamType {
    fn accepts(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Integer => value.is_i64() || value.is_u64(),
        }
    }

    const fn article(self) -> &'static str {
        match self {
            Self::String => "a string",
            Self::Integer => "an integer",
        }
    }
}

/// One named parameter of a tool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParamSpec {
    #[serde(skip)]
    name: String,
    #[serde(rename = "type")]
    kind: ParamType,
    description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    default: Option<Value>,
}

impl ParamSpec {
    /// Declares a string parameter.
    pub fn string(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, ParamType::String, description)
    }

    /// Declares an integer parameter.
    pub fn integer(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, ParamType::Integer, description)
    }

    fn new(name: impl Into<String>, kind: ParamType, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            description: description.into(),
            default: None,
        }
    }

    /// Sets the value applied when the caller omits the parameter.
    #[must_use]
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Parameter name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Accepted JSON type.
    pub const fn kind(&self) -> ParamType {
        self.kind
    }
}

/// Immutable description of one tool.
///
/// # Example
///
/// ```
/// use kali_mcpd::registry::{ParamSpec, ToolDescriptor};
///
/// let descriptor = ToolDescriptor::new("wifi_scan", "Scan for WiFi networks")
///     .optional(ParamSpec::string("interface", "WiFi interface").with_default("wlan0"));
/// assert!(descriptor.required().next().is_none());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ToolDescriptor {
    name: String,
    description: String,
    params: Vec<ParamSpec>,
    required: Vec<String>,
}

impl ToolDescriptor {
    /// Creates a descriptor with no parameters.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            params: Vec::new(),
            required: Vec::new(),
        }
    }

    /// Adds a parameter the caller must supply.
    #[must_use]
    pub fn required_param(mut self, param: ParamSpec) -> Self {
        self.required.push(param.name.clone());
        self.params.push(param);
        self
    }

    /// Adds a parameter the caller may omit.
    #[must_use]
    pub fn optional(mut self, param: ParamSpec) -> Self {
        self.params.push(param);
        self
    }

    /// Tool name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Human-readable description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Parameters in declaration order.
    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    /// Names of required parameters in declaration order.
    pub fn required(&self) -> impl Iterator<Item = &str> {
        self.required.iter().map(String::as_str)
    }

    /// Validates caller arguments and fills in declared defaults.
    ///
    /// Required parameters are checked in declaration order, so the first
    /// missing one is always the one reported. A `null` value counts as
    /// missing. Arguments the schema does not declare are passed through.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::MissingParameter`] or
    /// [`ToolError::InvalidType`].
    pub fn prepare(&self, arguments: &Map<String, Value>) -> Result<ToolArguments, ToolError> {
        if let Some(missing) = self
            .required()
            .find(|name| arguments.get(*name).is_none_or(Value::is_null))
        {
            return Err(ToolError::missing(missing));
        }

        let mut prepared = arguments.clone();
        for param in &self.params {
            match prepared.get(&param.name) {
                Some(value) if !value.is_null() => {
                    if !param.kind.accepts(value) {
                        return Err(ToolError::invalid_type(&param.name, param.kind.article()));
                    }
                }
                _ => match &param.default {
                    Some(default) => {
                        prepared.insert(param.name.clone(), default.clone());
                    }
                    None => {
                        prepared.remove(&param.name);
                    }
                },
            }
        }

        Ok(ToolArguments::new(prepared))
    }
}

impl Serialize for ToolDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ToolDescriptor", 3)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("description", &self.description)?;
        state.serialize_field("inputSchema", &InputSchema(self))?;
        state.end()
    }
}

struct InputSchema<'a>(&'a ToolDescriptor);

impl Serialize for InputSchema<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let descriptor = self.0;
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("type", "object")?;
        map.serialize_entry("properties", &Properties(&descriptor.params))?;
        if !descriptor.required.is_empty() {
            map.serialize_entry("required", &descriptor.required)?;
        }
        map.end()
    }
}

struct Properties<'a>(&'a [ParamSpec]);

impl Serialize for Properties<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for param in self.0 {
            map.serialize_entry(&param.name, param)?;
        }
        map.end()
    }
}
