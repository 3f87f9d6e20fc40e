//! Method routing for decoded requests.
//!
//! The [`Dispatcher`] owns the tool registry and the command runner. It
//! resolves `initialize`, `tools/list` and `tools/call`; every other method is
//! answered with an unknown-method error. A handler that fails or panics
//! produces an internal error for that request only.
//!
//! ## `tools/call`
//!
//! ```json
//! {"method":"tools/call","params":{"name":"hash_identify","arguments":{"hash":"5f4d..."}},"id":2}
//! ```
//!
//! Arguments are validated against the tool's descriptor before the handler
//! runs, so a request missing a required parameter never reaches the
//! executor. The handler's payload is returned as a single text content
//! block holding pretty-printed JSON.

use std::panic::{self, AssertUnwindSafe};

use kali_exec::CommandRunner;
use serde::Serialize;
use serde_json::{Map, Value, json};
use tracing::{debug, warn};

use crate::protocol::{ProtocolError, Request, Response};
use crate::registry::ToolRegistry;
use crate::tools::ToolError;

/// Tracing target for dispatch.
pub(crate) const DISPATCH_TARGET: &str = "kali_mcpd::dispatch";

/// MCP protocol revision announced by `initialize`.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Server name announced by `initialize`.
pub const SERVER_NAME: &str = "kali-tools-mcp-server";

/// Routes requests to the registry's handlers.
#[derive(Debug)]
pub struct Dispatcher<R> {
    registry: ToolRegistry,
    runner: R,
}

impl<R> Dispatcher<R> {
    /// Creates a dispatcher over a fully built registry.
    pub const fn new(registry: ToolRegistry, runner: R) -> Self {
        Self { registry, runner }
    }

    /// The registry consulted by `tools/list` and `tools/call`.
    pub const fn registry(&self) -> &ToolRegistry {
        &self.registry
    }
}

impl<R: CommandRunner> Dispatcher<R> {
    /// Decodes one request line and dispatches it.
    ///
    /// Lines that do not decode yield a parse error with a `null` id.
    pub fn handle_line(&self, line: &[u8]) -> Response {
        match Request::parse(line) {
            Ok(request) => self.dispatch(&request),
            Err(error) => {
                warn!(target: DISPATCH_TARGET, %error, "malformed request line");
                Response::error(Value::Null, &error)
            }
        }
    }

    /// Dispatches a decoded request, always producing exactly one response.
    pub fn dispatch(&self, request: &Request) -> Response {
        let id = request.id.clone();
        match self.route(request) {
            Ok(result) => Response::success(id, result),
            Err(error) => {
                warn!(
                    target: DISPATCH_TARGET,
                    method = %request.method_label(),
                    code = error.code(),
                    %error,
                    "request failed"
                );
                Response::error(id, &error)
            }
        }
    }

    fn route(&self, request: &Request) -> Result<Value, ProtocolError> {
        debug!(
            target: DISPATCH_TARGET,
            method = %request.method_label(),
            "dispatching request"
        );
        match request.method_name() {
            Some("initialize") => Ok(initialize_result()),
            Some("tools/list") => tool_list(self.registry.descriptors()),
            Some("tools/call") => self.call_tool(request.params.as_ref()),
            _ => Err(ProtocolError::unknown_method(request.method_label())),
        }
    }

    fn call_tool(&self, params: Option<&Value>) -> Result<Value, ProtocolError> {
        let call = ToolCall::from_params(params)?;
        let handler = self
            .registry
            .get(call.name)
            .ok_or_else(|| ProtocolError::tool_not_found(call.name))?;

        let arguments = handler
            .descriptor()
            .prepare(&call.arguments)
            .map_err(to_protocol)?;

        debug!(target: DISPATCH_TARGET, tool = call.name, "invoking tool");
        let runner: &dyn CommandRunner = &self.runner;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| handler.call(arguments, runner)));
        let payload = match outcome {
            Ok(result) => result.map_err(to_protocol)?,
            Err(_) => {
                return Err(ProtocolError::internal(format!(
                    "tool '{}' panicked",
                    call.name
                )));
            }
        };

        let text = serde_json::to_string_pretty(&payload)
            .map_err(|error| ProtocolError::internal(error.to_string()))?;
        Ok(json!({ "content": [{ "type": "text", "text": text }] }))
    }
}

/// The fixed capability announcement.
pub fn initialize_result() -> Value {
    json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": { "tools": {} },
        "serverInfo": {
            "name": SERVER_NAME,
            "version": env!("CARGO_PKG_VERSION"),
        }
    })
}

/// Builds the `tools/list` result. A descriptor that fails to serialise
/// fails the whole listing.
fn tool_list<'a, T>(descriptors: impl Iterator<Item = &'a T>) -> Result<Value, ProtocolError>
where
    T: Serialize + 'a,
{
    let tools = descriptors
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|error| ProtocolError::internal(format!("tool listing failed: {error}")))?;
    Ok(json!({ "tools": tools }))
}

/// `tools/call` parameters.
struct ToolCall<'a> {
    name: &'a str,
    arguments: Map<String, Value>,
}

impl<'a> ToolCall<'a> {
    fn from_params(params: Option<&'a Value>) -> Result<Self, ProtocolError> {
        let params = match params {
            None | Some(Value::Null) => None,
            Some(Value::Object(map)) => Some(map),
            Some(_) => return Err(ProtocolError::invalid_params("params must be an object")),
        };

        let name = params
            .and_then(|map| map.get("name"))
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| to_protocol(ToolError::missing("name")))?;

        let arguments = match params.and_then(|map| map.get("arguments")) {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(map)) => map.clone(),
            Some(_) => {
                return Err(to_protocol(ToolError::invalid_type(
                    "arguments",
                    "an object",
                )));
            }
        };

        Ok(Self { name, arguments })
    }
}

fn to_protocol(error: ToolError) -> ProtocolError {
    if error.is_invalid_params() {
        ProtocolError::invalid_params(error.to_string())
    } else {
        ProtocolError::internal(error.to_string())
    }
}
